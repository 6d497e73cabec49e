//! Field mappings - how the extension locates a form field on an ATS page
//!
//! A mapping ties a `(platform, field_name)` pair to an ordered list of CSS
//! selectors. The extension tries them in order until one matches a DOM
//! element, so the order is significant and preserved end to end.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Kind of form control a mapping targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// `<input>` - the default for text-like fields
    #[default]
    Input,
    /// `<select>` dropdown
    Select,
    /// `<textarea>` free-form text
    Textarea,
}

impl FieldType {
    /// Get the string representation of the field type
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Input => "input",
            FieldType::Select => "select",
            FieldType::Textarea => "textarea",
        }
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "input" => Ok(FieldType::Input),
            "select" => Ok(FieldType::Select),
            "textarea" => Ok(FieldType::Textarea),
            _ => Err(Error::InvalidFieldType(s.to_string())),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request body for creating or fully replacing a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFieldMapping {
    pub platform: String,
    pub field_name: String,
    /// Selector candidates, tried in order. May be empty.
    pub selectors: Vec<String>,
    #[serde(default)]
    pub field_type: FieldType,
}

impl NewFieldMapping {
    pub fn new(
        platform: impl Into<String>,
        field_name: impl Into<String>,
        selectors: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            platform: platform.into(),
            field_name: field_name.into(),
            selectors: selectors.into_iter().map(Into::into).collect(),
            field_type: FieldType::Input,
        }
    }

    pub fn with_field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }
}

/// A persisted field mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub id: i64,
    pub platform: String,
    pub field_name: String,
    pub selectors: Vec<String>,
    pub field_type: FieldType,
    pub created_at: DateTime<Utc>,
    /// `None` until the first update
    pub updated_at: Option<DateTime<Utc>>,
}

/// All mappings of one platform folded into `field_name -> selectors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMappings {
    pub platform: String,
    pub mappings: BTreeMap<String, Vec<String>>,
}

impl PlatformMappings {
    /// Fold rows into a per-field dictionary.
    ///
    /// Rows must be in ascending id order. When several rows share a field
    /// name, the last one wins.
    pub fn resolve(platform: impl Into<String>, rows: impl IntoIterator<Item = FieldMapping>) -> Self {
        let mut mappings = BTreeMap::new();
        for row in rows {
            mappings.insert(row.field_name, row.selectors);
        }
        Self {
            platform: platform.into(),
            mappings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Selector candidates for a field, if the platform maps it
    pub fn selectors_for(&self, field_name: &str) -> Option<&[String]> {
        self.mappings.get(field_name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, field_name: &str, selectors: &[&str]) -> FieldMapping {
        FieldMapping {
            id,
            platform: "x".to_string(),
            field_name: field_name.to_string(),
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            field_type: FieldType::Input,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_field_type_parse() {
        for kind in [FieldType::Input, FieldType::Select, FieldType::Textarea] {
            assert_eq!(kind.as_str().parse::<FieldType>().unwrap(), kind);
        }
        assert!("checkbox".parse::<FieldType>().is_err());
        assert!("Input".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_field_type_defaults_to_input() {
        let body: NewFieldMapping = serde_json::from_str(
            r#"{"platform": "lever", "field_name": "email", "selectors": []}"#,
        )
        .unwrap();
        assert_eq!(body.field_type, FieldType::Input);
        assert!(body.selectors.is_empty());
    }

    #[test]
    fn test_unknown_field_type_rejected() {
        let res = serde_json::from_str::<NewFieldMapping>(
            r#"{"platform": "lever", "field_name": "email", "selectors": [], "field_type": "radio"}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_resolve_last_row_wins() {
        let rows = vec![
            row(1, "email", &["#old"]),
            row(2, "phone", &["#phone"]),
            row(3, "email", &["#new", "#newer"]),
        ];
        let resolved = PlatformMappings::resolve("x", rows);
        assert_eq!(resolved.mappings.len(), 2);
        assert_eq!(resolved.selectors_for("email").unwrap(), &["#new", "#newer"]);
    }

    #[test]
    fn test_resolve_empty() {
        let resolved = PlatformMappings::resolve("nobody", Vec::new());
        assert!(resolved.is_empty());
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json, serde_json::json!({"platform": "nobody", "mappings": {}}));
    }
}
