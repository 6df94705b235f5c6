//! Document query filters
//!
//! Queries are sent as JSON objects in repeated `queries[]` parameters.

use serde::Serialize;
use serde_json::Value;

/// A single document query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentQuery {
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    values: Vec<Value>,
}

impl DocumentQuery {
    /// Match documents whose attribute equals the value
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            method: "equal",
            attribute: Some(attribute.into()),
            values: vec![value.into()],
        }
    }

    /// Encoded form used as a `queries[]` parameter value
    pub fn to_param(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_param() {
        let query = DocumentQuery::equal("userId", "abc123");
        assert_eq!(
            query.to_param(),
            r#"{"method":"equal","attribute":"userId","values":["abc123"]}"#
        );
    }
}
