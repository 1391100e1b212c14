use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Filter, Todo};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Newest first.
    pub todos: Vec<Todo>,
    pub filter: Filter,
    pub loading: bool,
    pub error: Option<String>,
}

impl TodoState {
    /// Items matching the current filter, in list order.
    pub fn visible(&self) -> Vec<&Todo> {
        self.todos.iter().filter(|t| self.filter.matches(t)).collect()
    }

    pub fn items_left(&self) -> usize {
        self.todos.iter().filter(|t| !t.completed).count()
    }

    pub fn has_completed(&self) -> bool {
        self.todos.iter().any(|t| t.completed)
    }
}

fn describe(err: &ApiError) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

pub struct TodoStore {
    api: ApiClient,
    state: watch::Sender<TodoState>,
}

impl TodoStore {
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(TodoState::default());
        Self { api, state }
    }

    pub fn snapshot(&self) -> TodoState {
        self.state.borrow().clone()
    }

    fn update(&self, f: impl FnOnce(&mut TodoState)) {
        self.state.send_modify(f);
    }

    fn fail(&self, action: &str, err: &ApiError) {
        warn!(action, error = %err, "To-do request failed");
        let message = describe(err);
        self.update(|s| {
            s.error = Some(message);
            s.loading = false;
        });
    }

    /// Replace the list with the server's copy, newest first.
    pub async fn fetch_todos(&self) {
        self.update(|s| {
            s.loading = true;
            s.error = None;
        });

        match self.api.list_todos().await {
            Ok(mut todos) => {
                todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                debug!(count = todos.len(), "Fetched todos");
                self.update(|s| {
                    s.todos = todos;
                    s.loading = false;
                });
            }
            Err(e) => self.fail("fetch", &e),
        }
    }

    /// Create an item from trimmed `text`. Blank input is ignored.
    pub async fn add_todo(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match self.api.create_todo(text).await {
            Ok(todo) => self.update(|s| s.todos.insert(0, todo)),
            Err(e) => self.fail("add", &e),
        }
    }

    pub async fn toggle_todo(&self, id: i64) {
        match self.api.toggle_todo(id).await {
            Ok(updated) => self.update(|s| {
                if let Some(todo) = s.todos.iter_mut().find(|t| t.id == id) {
                    *todo = updated;
                }
            }),
            Err(e) => self.fail("toggle", &e),
        }
    }

    pub async fn clear_completed(&self) {
        match self.api.clear_completed().await {
            Ok(()) => self.update(|s| s.todos.retain(|t| !t.completed)),
            Err(e) => self.fail("clear completed", &e),
        }
    }

    pub fn set_filter(&self, filter: Filter) {
        self.update(|s| s.filter = filter);
    }

    /// Forget everything, e.g. after logging out.
    pub fn reset(&self) {
        self.update(|s| *s = TodoState::default());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::TransportMode;
    use crate::auth::TokenCache;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn todo_store(server: &MockServer) -> TodoStore {
        let api = ApiClient::new(
            &server.uri(),
            TransportMode::Cookie,
            Duration::from_secs(5),
            TokenCache::in_memory(),
        )
        .expect("client");
        TodoStore::new(api)
    }

    fn item(id: i64, completed: bool, day: u32) -> Todo {
        Todo {
            id,
            text: format!("item {}", id),
            completed,
            created_at: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
        }
    }

    fn seeded(store: &TodoStore, todos: Vec<Todo>) {
        store.update(|s| s.todos = todos);
    }

    #[tokio::test]
    async fn test_fetch_sorts_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/todos/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "text": "old", "completed": false, "created_at": "2025-01-01T08:00:00Z"},
                {"id": 2, "text": "new", "completed": true, "created_at": "2025-01-03T08:00:00Z"},
                {"id": 3, "text": "mid", "completed": false, "created_at": "2025-01-02T08:00:00Z"}
            ])))
            .mount(&server)
            .await;

        let store = todo_store(&server);
        store.fetch_todos().await;

        let state = store.snapshot();
        let ids: Vec<i64> = state.todos.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.items_left(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_sets_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/todos/"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({
                        "detail": "Authentication credentials were not provided."
                    })),
            )
            .mount(&server)
            .await;

        let store = todo_store(&server);
        store.fetch_todos().await;

        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some("Authentication credentials were not provided."));
        assert!(!state.loading);
        assert!(state.todos.is_empty());
    }

    #[tokio::test]
    async fn test_add_prepends_and_ignores_blank() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/todos/"))
            .and(wiremock::matchers::body_json(json!({"text": "buy milk"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 9,
                "text": "buy milk",
                "completed": false,
                "created_at": "2025-01-09T08:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = todo_store(&server);
        seeded(&store, vec![item(1, false, 1)]);

        store.add_todo("   ").await;
        store.add_todo("  buy milk ").await;

        let ids: Vec<i64> = store.snapshot().todos.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![9, 1]);
    }

    #[tokio::test]
    async fn test_toggle_replaces_item() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/auth/todos/2/toggle/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(
                {"id": 2, "text": "item 2", "completed": true, "created_at": "2025-01-02T12:00:00Z"}
            )))
            .mount(&server)
            .await;

        let store = todo_store(&server);
        seeded(&store, vec![item(2, false, 2), item(1, false, 1)]);
        store.toggle_todo(2).await;

        let state = store.snapshot();
        assert!(state.todos[0].completed);
        assert!(!state.todos[1].completed);
        assert_eq!(state.items_left(), 1);
    }

    #[tokio::test]
    async fn test_toggle_missing_item_reports_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/auth/todos/42/toggle/"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "Todo not found"})),
            )
            .mount(&server)
            .await;

        let store = todo_store(&server);
        store.toggle_todo(42).await;
        assert_eq!(store.snapshot().error.as_deref(), Some("Todo not found"));
    }

    #[tokio::test]
    async fn test_clear_completed_drops_done_items() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/auth/todos/clear_completed/"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let store = todo_store(&server);
        seeded(&store, vec![item(3, true, 3), item(2, false, 2), item(1, true, 1)]);
        assert!(store.snapshot().has_completed());

        store.clear_completed().await;

        let state = store.snapshot();
        assert_eq!(state.todos.len(), 1);
        assert_eq!(state.todos[0].id, 2);
        assert!(!state.has_completed());
    }

    #[tokio::test]
    async fn test_clear_completed_failure_keeps_items() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/auth/todos/clear_completed/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = todo_store(&server);
        seeded(&store, vec![item(1, true, 1)]);
        store.clear_completed().await;

        let state = store.snapshot();
        assert_eq!(state.todos.len(), 1);
        assert!(state.error.is_some());
    }

    #[test]
    fn test_visible_respects_filter() {
        let state = TodoState {
            todos: vec![item(3, true, 3), item(2, false, 2), item(1, false, 1)],
            filter: Filter::Active,
            ..Default::default()
        };
        let ids: Vec<i64> = state.visible().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let done = TodoState {
            filter: Filter::Completed,
            ..state.clone()
        };
        assert_eq!(done.visible().len(), 1);

        let all = TodoState {
            filter: Filter::All,
            ..state
        };
        assert_eq!(all.visible().len(), 3);
    }

    #[tokio::test]
    async fn test_set_filter_and_reset() {
        let server = MockServer::start().await;
        let store = todo_store(&server);
        seeded(&store, vec![item(1, false, 1)]);

        store.set_filter(Filter::Completed);
        assert_eq!(store.snapshot().filter, Filter::Completed);

        store.reset();
        assert_eq!(store.snapshot(), TodoState::default());
    }
}
