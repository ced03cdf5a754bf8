use folio_models::contact::ContactSubmission;
use serde::Deserialize;
use serde_json::Value;

/// Request body of the contact form. Fields are kept untyped so that a
/// wrong type is reported by the validator instead of the json parser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiContactSubmission {
    /// Full name of the visitor
    pub name: Value,
    /// Email address of the visitor
    pub email: Value,
    /// Optional phone number, never validated
    pub phone: Value,
    /// Content of the message
    pub message: Value,
}

impl From<ApiContactSubmission> for ContactSubmission {
    fn from(value: ApiContactSubmission) -> Self {
        Self {
            name: into_string(value.name),
            email: into_string(value.email),
            phone: into_text(value.phone),
            message: into_string(value.message),
        }
    }
}

fn into_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn into_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(display(&other)),
    }
}

/// Text of a json value the way a browser would print it: arrays are joined
/// with commas (null entries become empty) and objects become
/// `[object Object]`.
fn display(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                item => display(item),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".into(),
    }
}
