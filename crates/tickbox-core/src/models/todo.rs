use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTodo<'a> {
    pub text: &'a str,
}

/// Which items the dashboard shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    /// Get the next filter (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(completed: bool) -> Todo {
        Todo {
            id: 1,
            text: "walk the dog".into(),
            completed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_backend_todo() {
        let json = r#"{"id": 7, "text": "buy milk", "completed": false, "created_at": "2025-03-14T09:26:53.589793Z"}"#;
        let todo: Todo = serde_json::from_str(json).expect("parse");
        assert_eq!(todo.id, 7);
        assert_eq!(todo.text, "buy milk");
        assert!(!todo.completed);
        assert_eq!(todo.created_at.to_rfc3339(), "2025-03-14T09:26:53.589793+00:00");
    }

    #[test]
    fn test_filter_matches() {
        assert!(Filter::All.matches(&todo(true)));
        assert!(Filter::All.matches(&todo(false)));
        assert!(Filter::Active.matches(&todo(false)));
        assert!(!Filter::Active.matches(&todo(true)));
        assert!(Filter::Completed.matches(&todo(true)));
        assert!(!Filter::Completed.matches(&todo(false)));
    }

    #[test]
    fn test_filter_next_wraps() {
        assert_eq!(Filter::All.next(), Filter::Active);
        assert_eq!(Filter::Active.next(), Filter::Completed);
        assert_eq!(Filter::Completed.next(), Filter::All);
    }
}
