use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::BoxError;
use crate::value::FilterValue;

/// Option keys that can never be template fields.
pub const RESERVED_KEYS: [&str; 2] = ["caseSensitive", "comps"];

/// Custom per-field matcher. Receives the whole item and every value the
/// caller gave for the field.
pub type CustomPredicate =
    Arc<dyn Fn(&Value, &[FilterValue]) -> std::result::Result<bool, BoxError> + Send + Sync>;

/// Built-in comparison applied to the item's field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinMode {
    Exact,
    StartsWith,
    EndsWith,
    Contains,
}

impl BuiltinMode {
    pub const ALL: [BuiltinMode; 4] = [
        BuiltinMode::Exact,
        BuiltinMode::StartsWith,
        BuiltinMode::EndsWith,
        BuiltinMode::Contains,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinMode::Exact => "exact",
            BuiltinMode::StartsWith => "startsWith",
            BuiltinMode::EndsWith => "endsWith",
            BuiltinMode::Contains => "contains",
        }
    }

    /// Mode used for a built-in field. `name` and `type` always compare
    /// exactly; any other field uses the mode of the same name, if there is one.
    pub fn for_field(field: &str) -> Option<BuiltinMode> {
        match field {
            "name" | "type" => Some(BuiltinMode::Exact),
            other => Self::ALL.into_iter().find(|m| m.as_str() == other),
        }
    }
}

impl fmt::Display for BuiltinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a template field is matched.
#[derive(Clone)]
pub enum FieldRule {
    Builtin,
    Custom(CustomPredicate),
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::Builtin => f.write_str("Builtin"),
            FieldRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Ordered set of filterable fields. The first declared field receives
/// shorthand options.
#[derive(Debug, Clone, Default)]
pub struct Template {
    pub(crate) fields: Vec<(String, FieldRule)>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), FieldRule::Builtin));
        self
    }

    pub fn custom<F>(self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &[FilterValue]) -> bool + Send + Sync + 'static,
    {
        self.try_custom(field, move |item, values| Ok(f(item, values)))
    }

    /// Like [`Template::custom`], for predicates that can fail. Errors reach
    /// the caller of `filter`/`matches`.
    pub fn try_custom<F>(mut self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &[FilterValue]) -> std::result::Result<bool, BoxError> + Send + Sync + 'static,
    {
        self.fields.push((field.into(), FieldRule::Custom(Arc::new(f))));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
