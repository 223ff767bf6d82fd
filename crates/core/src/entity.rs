//! Remote resource shapes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A remote entity: a numeric id plus whatever else the backend returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Result of a delete operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl Entity {
    /// Best-effort display label for the entity
    ///
    /// Looks at `title` (plain or `{ "rendered": .. }`), then `name`, then
    /// `post_title`, then `slug`.
    pub fn label(&self) -> Option<&str> {
        ["title", "name", "post_title", "slug"]
            .iter()
            .filter_map(|key| self.fields.get(*key))
            .find_map(|value| match value {
                Value::String(s) => Some(s.as_str()),
                Value::Object(o) => o.get("rendered").and_then(Value::as_str),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_keeps_unknown_fields() {
        let entity: Entity =
            serde_json::from_str(r#"{"id":7,"slug":"hello","status":"publish"}"#).unwrap();

        assert_eq!(entity.id, 7);
        assert_eq!(entity.fields["status"], "publish");

        let back = serde_json::to_value(&entity).unwrap();
        assert_eq!(back, serde_json::json!({"id":7,"slug":"hello","status":"publish"}));
    }

    #[test]
    fn test_label_prefers_rendered_title() {
        let entity: Entity = serde_json::from_str(
            r#"{"id":1,"title":{"rendered":"Hello world"},"slug":"hello-world"}"#,
        )
        .unwrap();
        assert_eq!(entity.label(), Some("Hello world"));
    }

    #[test]
    fn test_label_falls_back() {
        let tag: Entity = serde_json::from_str(r#"{"id":2,"name":"rust"}"#).unwrap();
        assert_eq!(tag.label(), Some("rust"));

        let course: Entity =
            serde_json::from_str(r#"{"id":3,"post_title":"Intro to Rust"}"#).unwrap();
        assert_eq!(course.label(), Some("Intro to Rust"));

        let bare: Entity = serde_json::from_str(r#"{"id":4}"#).unwrap();
        assert_eq!(bare.label(), None);
    }

    #[test]
    fn test_delete_outcome_defaults_message() {
        let outcome: DeleteOutcome = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "");
    }
}
