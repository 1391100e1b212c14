//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use tickbox_core::models::Filter;
use tickbox_core::Route;

use crate::app::{
    can_add_email_char, can_add_password_char, can_add_todo_char, can_add_username_char, App,
    AppState, DashboardFocus, SignInFocus, SignUpFocus,
};

/// Handle one key press. Returns `true` when the app should exit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    match app.route {
        Route::SignIn => handle_signin_input(app, key),
        Route::SignUp => handle_signup_input(app, key),
        Route::Dashboard => handle_dashboard_input(app, key),
        Route::Logout => {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                app.state = AppState::ConfirmingQuit;
            }
        }
    }
    Ok(false)
}

fn handle_signin_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.signin_focus = app.signin_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.signin_focus = app.signin_focus.prev();
        }
        KeyCode::Enter => match app.signin_focus {
            SignInFocus::Email => app.signin_focus = SignInFocus::Password,
            SignInFocus::Password | SignInFocus::Button => app.submit_login(),
            SignInFocus::SignUpLink => app.navigate(Route::SignUp),
        },
        KeyCode::Backspace => match app.signin_focus {
            SignInFocus::Email => {
                app.signin_email.pop();
            }
            SignInFocus::Password => {
                app.signin_password.pop();
            }
            SignInFocus::Button | SignInFocus::SignUpLink => {}
        },
        KeyCode::Char(c) => match app.signin_focus {
            SignInFocus::Email => {
                if can_add_email_char(app.signin_email.chars().count(), c) {
                    app.signin_email.push(c);
                }
            }
            SignInFocus::Password => {
                if can_add_password_char(app.signin_password.chars().count(), c) {
                    app.signin_password.push(c);
                }
            }
            SignInFocus::Button | SignInFocus::SignUpLink => {
                if c == 's' {
                    app.navigate(Route::SignUp);
                }
            }
        },
        _ => {}
    }
}

fn handle_signup_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.navigate(Route::SignIn);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.signup_focus = app.signup_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.signup_focus = app.signup_focus.prev();
        }
        KeyCode::Enter => match app.signup_focus {
            SignUpFocus::Username => app.signup_focus = SignUpFocus::Email,
            SignUpFocus::Email => app.signup_focus = SignUpFocus::Password,
            SignUpFocus::Password | SignUpFocus::Button => app.submit_registration(),
            SignUpFocus::SignInLink => app.navigate(Route::SignIn),
        },
        KeyCode::Backspace => match app.signup_focus {
            SignUpFocus::Username => {
                app.signup_username.pop();
            }
            SignUpFocus::Email => {
                app.signup_email.pop();
            }
            SignUpFocus::Password => {
                app.signup_password.pop();
            }
            SignUpFocus::Button | SignUpFocus::SignInLink => {}
        },
        KeyCode::Char(c) => match app.signup_focus {
            SignUpFocus::Username => {
                if can_add_username_char(app.signup_username.chars().count(), c) {
                    app.signup_username.push(c);
                }
            }
            SignUpFocus::Email => {
                if can_add_email_char(app.signup_email.chars().count(), c) {
                    app.signup_email.push(c);
                }
            }
            SignUpFocus::Password => {
                if can_add_password_char(app.signup_password.chars().count(), c) {
                    app.signup_password.push(c);
                }
            }
            SignUpFocus::Button | SignUpFocus::SignInLink => {}
        },
        _ => {}
    }
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) {
    // Nothing to act on until the gate lets the dashboard through.
    if !app.session_state.authenticated || app.session_state.checking_auth {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
            app.state = AppState::ConfirmingQuit;
        }
        return;
    }

    match app.dashboard_focus {
        DashboardFocus::Input => match key.code {
            KeyCode::Enter => app.add_todo(),
            KeyCode::Tab | KeyCode::Down | KeyCode::Esc => {
                app.dashboard_focus = DashboardFocus::List;
            }
            KeyCode::Backspace => {
                app.todo_input.pop();
            }
            KeyCode::Char(c) => {
                if can_add_todo_char(app.todo_input.chars().count(), c) {
                    app.todo_input.push(c);
                }
            }
            _ => {}
        },
        DashboardFocus::List => match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('i') => {
                app.dashboard_focus = DashboardFocus::Input;
            }
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),
            KeyCode::Char('c') => app.clear_completed(),
            KeyCode::Char('1') => app.set_filter(Filter::All),
            KeyCode::Char('2') => app.set_filter(Filter::Active),
            KeyCode::Char('3') => app.set_filter(Filter::Completed),
            KeyCode::Char('f') => app.cycle_filter(),
            KeyCode::Char('L') => app.navigate(Route::Logout),
            KeyCode::Char('q') | KeyCode::Esc => {
                app.state = AppState::ConfirmingQuit;
            }
            _ => {}
        },
    }
}
