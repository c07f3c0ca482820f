use std::path::Path;

use serde::Deserialize;

use crate::errors::{FilterError, Result};
use crate::template::Template;

/// Template description read from JSON, e.g.
/// `{"fields": ["name", "type", "path"], "caseSensitive": false}`.
///
/// Only built-in fields can be declared this way; custom predicates are
/// code and go through [`Template::custom`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplateConfig {
    pub fields: Vec<String>,
    /// Call-site default used when options carry no flag of their own.
    #[serde(default)]
    pub case_sensitive: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            fields: vec!["name".into(), "type".into(), "path".into()],
            case_sensitive: false,
        }
    }
}

impl TemplateConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FilterError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| FilterError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn template(&self) -> Template {
        self.fields.iter().fold(Template::new(), |t, field| t.builtin(field.as_str()))
    }
}
