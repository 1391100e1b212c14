//! Application state management for tickbox.
//!
//! This module contains the `App` struct that owns the UI state (current
//! screen, form fields, selections) and drives the session and to-do stores.
//! Network work runs on spawned tasks; the render loop calls `sync` every
//! frame to pick up their effects.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use tickbox_core::models::{Filter, LoginRequest, RegisterRequest, Todo};
use tickbox_core::{
    AccessGate, Config, GateView, Route, SessionState, SessionStore, TodoState, TodoStore,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for email input (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for username input. Matches the backend's user model.
const MAX_USERNAME_LENGTH: usize = 150;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a new to-do item.
const MAX_TODO_LENGTH: usize = 255;

/// How long the sign-up success message stays before returning to sign-in.
const SIGNUP_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// How long the logout confirmation stays before returning to sign-in.
const LOGOUT_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// How long a status bar message is shown.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ConfirmingQuit,
    Quitting,
}

/// Sign-in form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInFocus {
    Email,
    Password,
    Button,
    SignUpLink,
}

impl SignInFocus {
    pub fn next(&self) -> Self {
        match self {
            SignInFocus::Email => SignInFocus::Password,
            SignInFocus::Password => SignInFocus::Button,
            SignInFocus::Button => SignInFocus::SignUpLink,
            SignInFocus::SignUpLink => SignInFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SignInFocus::Email => SignInFocus::SignUpLink,
            SignInFocus::Password => SignInFocus::Email,
            SignInFocus::Button => SignInFocus::Password,
            SignInFocus::SignUpLink => SignInFocus::Button,
        }
    }
}

/// Sign-up form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpFocus {
    Username,
    Email,
    Password,
    Button,
    SignInLink,
}

impl SignUpFocus {
    pub fn next(&self) -> Self {
        match self {
            SignUpFocus::Username => SignUpFocus::Email,
            SignUpFocus::Email => SignUpFocus::Password,
            SignUpFocus::Password => SignUpFocus::Button,
            SignUpFocus::Button => SignUpFocus::SignInLink,
            SignUpFocus::SignInLink => SignUpFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SignUpFocus::Username => SignUpFocus::SignInLink,
            SignUpFocus::Email => SignUpFocus::Username,
            SignUpFocus::Password => SignUpFocus::Email,
            SignUpFocus::Button => SignUpFocus::Password,
            SignUpFocus::SignInLink => SignUpFocus::Button,
        }
    }
}

/// Dashboard focus: the new-item input line or the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardFocus {
    Input,
    List,
}

/// Outcome banner on the sign-up screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    shown_at: Instant,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned tasks whose outcome the UI reacts to.
/// State changes inside the stores are picked up by `sync` directly.
#[derive(Debug)]
enum TaskResult {
    Registered,
    RegistrationFailed(String),
    LoggedOut,
    Status(&'static str),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub todos: Arc<TodoStore>,
    gate: AccessGate,

    // Navigation
    pub route: Route,
    pub state: AppState,
    pending_redirect: Option<(Instant, Route)>,

    // Store snapshots, refreshed every frame
    pub session_state: SessionState,
    pub todo_state: TodoState,

    // Sign-in form state
    pub signin_email: String,
    pub signin_password: String,
    pub signin_focus: SignInFocus,
    pub signin_hint: Option<String>,

    // Sign-up form state
    pub signup_username: String,
    pub signup_email: String,
    pub signup_password: String,
    pub signup_focus: SignUpFocus,
    pub signup_notice: Option<Notice>,

    // Dashboard state
    pub todo_input: String,
    pub dashboard_focus: DashboardFocus,
    pub todo_selection: usize,
    todos_requested: bool,

    // Logout screen
    pub logout_complete: bool,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,

    pub status_message: Option<StatusMessage>,
}

impl App {
    /// Create the application on the protected dashboard. Until start-up
    /// restoration finishes, the gate keeps it on the verifying placeholder.
    pub fn new(config: Config, session: Arc<SessionStore>, todos: Arc<TodoStore>) -> Self {
        let gate = AccessGate::new(&session);
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let signin_email = config.last_email.clone().unwrap_or_default();
        let session_state = session.snapshot();
        let todo_state = todos.snapshot();

        Self {
            config,
            session,
            todos,
            gate,

            route: Route::Dashboard,
            state: AppState::Normal,
            pending_redirect: None,

            session_state,
            todo_state,

            signin_email,
            signin_password: String::new(),
            signin_focus: SignInFocus::Email,
            signin_hint: None,

            signup_username: String::new(),
            signup_email: String::new(),
            signup_password: String::new(),
            signup_focus: SignUpFocus::Username,
            signup_notice: None,

            todo_input: String::new(),
            dashboard_focus: DashboardFocus::Input,
            todo_selection: 0,
            todos_requested: false,

            logout_complete: false,

            task_rx,
            task_tx,

            status_message: None,
        }
    }

    pub fn gate_view(&self) -> GateView {
        self.gate.current()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch screens, running the entry actions of the target screen.
    pub fn navigate(&mut self, route: Route) {
        debug!(from = ?self.route, to = ?route, "Navigating");
        self.route = route;
        self.pending_redirect = None;

        match route {
            Route::SignIn => {
                // Don't show a stale message from a previous attempt.
                self.session.clear_error();
                self.signin_password.clear();
                self.signin_hint = None;
                self.signin_focus = if self.signin_email.is_empty() {
                    SignInFocus::Email
                } else {
                    SignInFocus::Password
                };
            }
            Route::SignUp => {
                self.session.clear_error();
                self.signup_notice = None;
                self.signup_focus = SignUpFocus::Username;
            }
            Route::Dashboard => {
                self.todos_requested = false;
                self.dashboard_focus = DashboardFocus::Input;
                self.todo_selection = 0;
            }
            Route::Logout => {
                self.logout_complete = false;
                self.spawn_logout();
            }
        }

        self.session_state = self.session.snapshot();
    }

    /// Pull in store changes and background results, then apply the
    /// navigation rules for the current screen.
    pub fn sync(&mut self) {
        self.session_state = self.session.snapshot();
        self.todo_state = self.todos.snapshot();
        self.check_background_tasks();
        self.expire_status_message();

        if let Some((at, route)) = self.pending_redirect {
            if Instant::now() >= at {
                self.navigate(route);
            }
        }

        match self.route {
            Route::SignIn if self.session_state.authenticated => {
                self.remember_email();
                self.navigate(Route::Dashboard);
            }
            route if route.requires_session() => match self.gate_view() {
                GateView::Verifying => {}
                GateView::Protected => {
                    if !self.todos_requested {
                        self.todos_requested = true;
                        self.spawn_fetch_todos();
                    }
                }
                GateView::Redirect(target) => self.navigate(target),
            },
            _ => {}
        }

        let visible = self.todo_state.visible().len();
        if self.todo_selection >= visible {
            self.todo_selection = visible.saturating_sub(1);
        }
    }

    fn remember_email(&mut self) {
        let email = self.signin_email.trim().to_string();
        if email.is_empty() || self.config.last_email.as_deref() == Some(email.as_str()) {
            return;
        }
        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            shown_at: Instant::now(),
        });
    }

    fn expire_status_message(&mut self) {
        if let Some(ref msg) = self.status_message {
            if msg.shown_at.elapsed() >= STATUS_MESSAGE_TTL {
                self.status_message = None;
            }
        }
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Drain finished background tasks and apply their results
    fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_task_result(result);
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Registered => {
                self.signup_notice = Some(Notice::Success("User registered successfully!".into()));
                self.signup_username.clear();
                self.signup_email.clear();
                self.signup_password.clear();
                if self.route == Route::SignUp {
                    let at = Instant::now() + SIGNUP_REDIRECT_DELAY;
                    self.pending_redirect = Some((at, Route::SignIn));
                }
            }
            TaskResult::RegistrationFailed(message) => {
                self.signup_notice = Some(Notice::Error(message));
            }
            TaskResult::LoggedOut => {
                self.logout_complete = true;
                self.todos.reset();
                self.todo_state = self.todos.snapshot();
                if self.route == Route::Logout {
                    let at = Instant::now() + LOGOUT_REDIRECT_DELAY;
                    self.pending_redirect = Some((at, Route::SignIn));
                }
            }
            TaskResult::Status(text) => self.set_status(text),
        }
    }

    fn spawn_fetch_todos(&self) {
        let todos = self.todos.clone();
        tokio::spawn(async move { todos.fetch_todos().await });
    }

    fn spawn_logout(&self) {
        let session = self.session.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            session.logout_user().await;
            Self::send_result(&tx, TaskResult::LoggedOut).await;
        });
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Submit the sign-in form
    pub fn submit_login(&mut self) {
        let email = self.signin_email.trim().to_string();
        if email.is_empty() || self.signin_password.is_empty() {
            self.signin_hint = Some("Email and password required".to_string());
            return;
        }
        self.signin_hint = None;
        self.session.clear_error();

        let request = LoginRequest::new(email, std::mem::take(&mut self.signin_password));
        let session = self.session.clone();
        info!("Submitting login");
        tokio::spawn(async move { session.login_user(request).await });
    }

    /// Submit the sign-up form
    pub fn submit_registration(&mut self) {
        let username = self.signup_username.trim().to_string();
        let email = self.signup_email.trim().to_string();
        if username.is_empty() || email.is_empty() || self.signup_password.is_empty() {
            self.signup_notice = Some(Notice::Error("Please fill in all fields.".into()));
            return;
        }
        self.signup_notice = None;

        let request = RegisterRequest::new(username, email, self.signup_password.clone());
        let session = self.session.clone();
        let tx = self.task_tx.clone();
        info!("Submitting registration");
        tokio::spawn(async move {
            let result = match session.register_user(request).await {
                Ok(()) => TaskResult::Registered,
                Err(e) => TaskResult::RegistrationFailed(e.message().to_string()),
            };
            Self::send_result(&tx, result).await;
        });
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    pub fn visible_todos(&self) -> Vec<&Todo> {
        self.todo_state.visible()
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.visible_todos().get(self.todo_selection).copied()
    }

    pub fn add_todo(&mut self) {
        let text = self.todo_input.trim().to_string();
        if text.is_empty() {
            return;
        }
        self.todo_input.clear();

        let todos = self.todos.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            todos.add_todo(&text).await;
            Self::send_result(&tx, TaskResult::Status("Todo added successfully!")).await;
        });
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_todo().map(|t| t.id) else {
            return;
        };
        let todos = self.todos.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            todos.toggle_todo(id).await;
            Self::send_result(&tx, TaskResult::Status("Todo updated!")).await;
        });
    }

    pub fn clear_completed(&mut self) {
        if !self.todo_state.has_completed() {
            return;
        }
        let todos = self.todos.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            todos.clear_completed().await;
            Self::send_result(&tx, TaskResult::Status("Completed todos cleared!")).await;
        });
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.todos.set_filter(filter);
        self.todo_state = self.todos.snapshot();
        self.todo_selection = 0;
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.todo_state.filter.next());
    }

    pub fn select_next(&mut self) {
        let len = self.visible_todos().len();
        if len > 0 && self.todo_selection + 1 < len {
            self.todo_selection += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.todo_selection = self.todo_selection.saturating_sub(1);
    }
}

// ============================================================================
// Input Validation
// ============================================================================

/// Check if a character is valid for input (printable, non-control)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_todo_char(current_len: usize, c: char) -> bool {
    current_len < MAX_TODO_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
