use itertools::Itertools;
use tracing::warn;

use crate::value::{FilterValue, RawValue, ValuePredicateRef};

/// Field that `//`-prefixed shorthand text is bound to.
pub const PATH_FIELD: &str = "path";
const PATH_MARKER: &str = "//";

/// Canonical filter options: every template field mapped to the values it
/// accepts. An empty list leaves the field unconstrained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SanitizedOptions {
    pub(crate) fields: Vec<(String, Vec<FilterValue>)>,
    pub(crate) case_sensitive: Option<bool>,
    pub(crate) comps: Vec<FilterValue>,
}

impl SanitizedOptions {
    pub fn get(&self, field: &str) -> Option<&[FilterValue]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, values)| values.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[FilterValue])> {
        self.fields.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Fields that actually constrain an item.
    pub fn constrained(&self) -> impl Iterator<Item = (&str, &[FilterValue])> {
        self.fields().filter(|(_, values)| !values.is_empty())
    }

    pub fn case_sensitive(&self) -> Option<bool> {
        self.case_sensitive
    }

    /// Clearing the flag lets the call-site default of `filter` apply.
    pub fn set_case_sensitive(&mut self, case_sensitive: Option<bool>) {
        self.case_sensitive = case_sensitive;
    }

    pub fn comps(&self) -> &[FilterValue] {
        &self.comps
    }

    /// Replaces the values of an existing field. Unknown fields are ignored.
    pub fn set(&mut self, field: &str, values: Vec<FilterValue>) {
        if let Some((_, slot)) = self.fields.iter_mut().find(|(name, _)| name == field) {
            *slot = values;
        }
    }
}

impl From<SanitizedOptions> for RawValue {
    fn from(s: SanitizedOptions) -> Self {
        let mut entries: Vec<(String, RawValue)> = s
            .fields
            .into_iter()
            .map(|(name, values)| (name, RawValue::from(values)))
            .collect();
        if let Some(cs) = s.case_sensitive {
            entries.push(("caseSensitive".to_string(), RawValue::Bool(cs)));
        }
        if !s.comps.is_empty() {
            entries.push(("comps".to_string(), RawValue::from(s.comps)));
        }
        RawValue::Object(entries)
    }
}

impl std::fmt::Display for SanitizedOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let constrained = self
            .constrained()
            .map(|(name, values)| format!("{name}={values:?}"))
            .join(", ");
        write!(f, "{{{constrained}}} caseSensitive={:?}", self.case_sensitive)
    }
}

/// Normalizes raw options against the ordered template field names.
/// `case_sensitive` is used when the options have no `caseSensitive` key.
pub(crate) fn sanitize<'a>(
    field_names: impl Iterator<Item = &'a str> + Clone,
    options: RawValue,
    case_sensitive: bool,
) -> SanitizedOptions {
    let mut names = field_names.clone();
    let keyed = match options {
        RawValue::Null => {
            return SanitizedOptions {
                fields: field_names.map(|name| (name.to_string(), Vec::new())).collect(),
                case_sensitive: Some(case_sensitive),
                comps: Vec::new(),
            };
        }
        RawValue::Object(entries) => RawValue::Object(entries),
        RawValue::Text(s) if s.starts_with(PATH_MARKER) => {
            RawValue::object([(PATH_FIELD, RawValue::Text(s))])
        }
        shorthand => match names.next() {
            Some(first) => RawValue::object([(first, shorthand)]),
            None => RawValue::Object(Vec::new()),
        },
    };

    let fields = field_names
        .map(|name| {
            let values = keyed.get(name).map(to_values).unwrap_or_default();
            (name.to_string(), values)
        })
        .collect();

    SanitizedOptions {
        fields,
        case_sensitive: Some(keyed.get("caseSensitive").map_or(case_sensitive, RawValue::truthy)),
        comps: keyed.get("comps").map(to_values).unwrap_or_default(),
    }
}

/// Coerces one raw option value to a list of filter values.
fn to_values(raw: &RawValue) -> Vec<FilterValue> {
    match raw {
        RawValue::List(items) => items.iter().filter_map(list_item).collect(),
        RawValue::Object(_) => match raw.as_pattern_descriptor() {
            Some(Ok(p)) => vec![FilterValue::Pattern(p)],
            Some(Err(e)) => {
                warn!(error = %e, "ignoring invalid pattern in filter options");
                Vec::new()
            }
            None => Vec::new(),
        },
        RawValue::Null => Vec::new(),
        scalar => scalar_value(scalar).into_iter().collect(),
    }
}

fn list_item(raw: &RawValue) -> Option<FilterValue> {
    match raw.as_pattern_descriptor() {
        Some(Ok(p)) => Some(FilterValue::Pattern(p)),
        Some(Err(e)) => {
            warn!(error = %e, "dropping invalid pattern from filter list");
            None
        }
        None => Some(scalar_value(raw).unwrap_or_else(|| FilterValue::Opaque(raw.clone()))),
    }
}

fn scalar_value(raw: &RawValue) -> Option<FilterValue> {
    match raw {
        RawValue::Text(s) => Some(FilterValue::Text(s.clone())),
        RawValue::Pattern(p) => Some(FilterValue::Pattern(p.clone())),
        RawValue::Bool(b) => Some(FilterValue::Bool(*b)),
        RawValue::Number(n) => Some(FilterValue::Number(n.clone())),
        RawValue::Predicate(f) => Some(FilterValue::Predicate(ValuePredicateRef(f.clone()))),
        RawValue::Null | RawValue::List(_) | RawValue::Object(_) => None,
    }
}
