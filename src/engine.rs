use std::borrow::Cow;

use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, trace};

use crate::context::Context;
use crate::errors::{FilterError, Result};
use crate::pattern::Anchor;
use crate::sanitize::{self, SanitizedOptions};
use crate::strings;
use crate::template::{BuiltinMode, CustomPredicate, FieldRule, Template, RESERVED_KEYS};
use crate::value::{FilterValue, RawValue};

static NULL: Value = Value::Null;

/// Field rule resolved once, when the engine is built.
#[derive(Clone)]
enum Rule {
    Mode(BuiltinMode),
    Custom(CustomPredicate),
    /// Built-in field without a mode of its name; never constrains an item.
    Inert,
}

/// Matches items against declarative filter options.
///
/// AND across fields, OR across the values given for one field.
#[derive(Clone)]
pub struct Engine {
    fields: Vec<(String, Rule)>,
}

impl Engine {
    /// Resolves every template field. Fails on reserved or repeated names.
    pub fn new(template: Template) -> Result<Self> {
        if let Some(dup) = template.field_names().duplicates().next() {
            return Err(FilterError::DuplicateField(dup.to_string()));
        }
        if let Some(reserved) = template.field_names().find(|name| RESERVED_KEYS.contains(name)) {
            return Err(FilterError::ReservedField(reserved.to_string()));
        }

        let fields = template
            .fields
            .into_iter()
            .map(|(name, rule)| {
                let rule = match rule {
                    FieldRule::Custom(f) => Rule::Custom(f),
                    FieldRule::Builtin => match BuiltinMode::for_field(&name) {
                        Some(mode) => Rule::Mode(mode),
                        None => {
                            debug!(field = %name, "no built-in mode for field; it will not constrain items");
                            Rule::Inert
                        }
                    },
                };
                (name, rule)
            })
            .collect::<Vec<_>>();

        debug!(fields = %fields.iter().map(|(n, _)| n).join(", "), "filter engine ready");
        Ok(Self { fields })
    }

    /// Template field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> + Clone {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// The built-in mode a field resolved to, if any.
    pub fn mode_of(&self, field: &str) -> Option<BuiltinMode> {
        match self.rule(field)? {
            Rule::Mode(mode) => Some(*mode),
            _ => None,
        }
    }

    /// Normalizes raw options: every template field gets a (possibly empty)
    /// list of values. Malformed values degrade to "no constraint".
    pub fn sanitize(&self, options: impl Into<RawValue>) -> SanitizedOptions {
        self.sanitize_with_default(options, false)
    }

    /// Like [`Engine::sanitize`], but options without a `caseSensitive` key
    /// resolve to `case_sensitive` instead of `false`.
    pub fn sanitize_with_default(&self, options: impl Into<RawValue>, case_sensitive: bool) -> SanitizedOptions {
        sanitize::sanitize(self.field_names(), options.into(), case_sensitive)
    }

    /// Tests `item` against already sanitized options. `case_sensitive` only
    /// applies when the options carry no flag of their own.
    pub fn filter(&self, item: &Value, sanitized: &SanitizedOptions, case_sensitive: bool) -> Result<bool> {
        let ctx = Context::resolve(sanitized.case_sensitive(), case_sensitive);

        for (field, values) in sanitized.constrained() {
            let Some(rule) = self.rule(field) else {
                continue;
            };
            let passed = match rule {
                Rule::Custom(f) => f(item, values).map_err(|source| FilterError::Predicate {
                    field: field.to_string(),
                    source,
                })?,
                Rule::Mode(mode) => {
                    let actual = item.get(field).or_else(|| item.get("name")).unwrap_or(&NULL);
                    mode_matches(*mode, actual, values, ctx)
                }
                Rule::Inert => continue,
            };
            if !passed {
                trace!(field, "item rejected");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `filter(item, sanitize(options), case_sensitive)`.
    pub fn matches(&self, item: &Value, options: impl Into<RawValue>, case_sensitive: bool) -> Result<bool> {
        let sanitized = self.sanitize(options);
        self.filter(item, &sanitized, case_sensitive)
    }

    /// Keeps the items that match, in their original order. Options are
    /// sanitized once for the whole slice.
    pub fn filter_items<'a>(
        &self,
        items: &'a [Value],
        options: impl Into<RawValue>,
        case_sensitive: bool,
    ) -> Result<Vec<&'a Value>> {
        let sanitized = self.sanitize(options);
        self.filter_all(items, &sanitized, case_sensitive)
    }

    /// Keeps the items that match already sanitized options.
    pub fn filter_all<'a>(
        &self,
        items: &'a [Value],
        sanitized: &SanitizedOptions,
        case_sensitive: bool,
    ) -> Result<Vec<&'a Value>> {
        let mut kept = Vec::new();
        for item in items {
            if self.filter(item, sanitized, case_sensitive)? {
                kept.push(item);
            }
        }
        debug!(total = items.len(), kept = kept.len(), "filtered items");
        Ok(kept)
    }

    fn rule(&self, field: &str) -> Option<&Rule> {
        self.fields.iter().find(|(name, _)| name == field).map(|(_, rule)| rule)
    }
}

fn mode_matches(mode: BuiltinMode, actual: &Value, values: &[FilterValue], ctx: Context) -> bool {
    let text = item_text(actual);
    values.iter().any(|value| value_matches(mode, actual, text.as_deref(), value, ctx))
}

fn value_matches(mode: BuiltinMode, actual: &Value, text: Option<&str>, value: &FilterValue, ctx: Context) -> bool {
    match value {
        FilterValue::Predicate(f) => (f.0)(actual),
        // the pattern decides its own anchoring and case, whatever the mode
        FilterValue::Pattern(p) => text.is_some_and(|t| p.test(t, Anchor::None)),
        FilterValue::Text(needle) => text.is_some_and(|t| compare(mode, t, needle, ctx)),
        FilterValue::Bool(_) | FilterValue::Number(_) => {
            if mode == BuiltinMode::Exact && value.to_json().as_ref() == Some(actual) {
                return true;
            }
            let needle = match value {
                FilterValue::Bool(b) => b.to_string(),
                FilterValue::Number(n) => n.to_string(),
                _ => return false,
            };
            text.is_some_and(|t| compare(mode, t, &needle, ctx))
        }
        FilterValue::Opaque(_) => false,
    }
}

fn compare(mode: BuiltinMode, haystack: &str, needle: &str, ctx: Context) -> bool {
    let cs = ctx.case_sensitive;
    match mode {
        BuiltinMode::Exact => strings::equals(haystack, needle, cs),
        BuiltinMode::StartsWith => strings::starts_with(haystack, needle, cs),
        BuiltinMode::EndsWith => strings::ends_with(haystack, needle, cs),
        BuiltinMode::Contains => strings::contains(haystack, needle, cs),
    }
}

/// Text form of an item value. Containers and null have none.
fn item_text(v: &Value) -> Option<Cow<'_, str>> {
    match v {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn files() -> Engine {
        Engine::new(Template::new().builtin("name").builtin("type").builtin("startsWith"))
            .unwrap()
    }

    #[test]
    fn reserved_and_duplicate_fields_are_rejected() {
        let err = Engine::new(Template::new().builtin("name").builtin("comps")).err().unwrap();
        assert!(matches!(err, FilterError::ReservedField(ref f) if f == "comps"));
        let err = Engine::new(Template::new().builtin("caseSensitive")).err().unwrap();
        assert!(matches!(err, FilterError::ReservedField(_)));
        let err = Engine::new(Template::new().builtin("name").builtin("name")).err().unwrap();
        assert!(matches!(err, FilterError::DuplicateField(ref f) if f == "name"));
    }

    #[test]
    fn fields_resolve_to_modes() {
        let e = Engine::new(Template::new().builtin("name").builtin("path").builtin("endsWith")).unwrap();
        assert_eq!(e.mode_of("name"), Some(BuiltinMode::Exact));
        assert_eq!(e.mode_of("path"), None);
        assert_eq!(e.mode_of("endsWith"), Some(BuiltinMode::EndsWith));
        assert_eq!(e.field_names().collect::<Vec<_>>(), vec!["name", "path", "endsWith"]);
    }

    #[test]
    fn mode_fields_fall_back_to_name() {
        let e = files();
        let item = json!({"name": "Background.psd"});
        assert!(e.matches(&item, json!({"startsWith": "back"}), false).unwrap());
        assert!(!e.matches(&item, json!({"startsWith": "back", "caseSensitive": true}), false).unwrap());
    }

    #[test]
    fn and_across_fields_short_circuits() {
        let e = files();
        let item = json!({"name": "a.txt", "type": "file"});
        assert!(e.matches(&item, json!({"name": "a.txt", "type": "file"}), false).unwrap());
        assert!(!e.matches(&item, json!({"name": "a.txt", "type": "folder"}), false).unwrap());
    }

    #[test]
    fn patterns_are_unanchored_in_every_mode() {
        let e = files();
        let item = json!({"name": "report.final.txt"});
        let p = Pattern::new(r"\.txt$", "").unwrap();
        assert!(e.matches(&item, p.clone(), false).unwrap());
        assert!(e.matches(&item, RawValue::object([("startsWith", p)]), false).unwrap());
    }

    #[test]
    fn patterns_ignore_the_case_flag() {
        let e = files();
        let item = json!({"name": "bg_layer"});
        assert!(!e.matches(&item, Pattern::new("^Bg", "").unwrap(), false).unwrap());
        assert!(e.matches(&item, Pattern::new("^Bg", "i").unwrap(), true).unwrap());
        assert!(e.matches(&item, Pattern::new("^bg", "").unwrap(), false).unwrap());
    }

    #[test]
    fn numbers_and_booleans() {
        let e = Engine::new(Template::new().builtin("exact").builtin("startsWith")).unwrap();
        assert!(e.matches(&json!({"exact": 42}), json!({"exact": 42}), false).unwrap());
        assert!(e.matches(&json!({"exact": "42"}), json!({"exact": 42}), false).unwrap());
        assert!(e.matches(&json!({"exact": true}), json!({"exact": true}), false).unwrap());
        assert!(!e.matches(&json!({"exact": false}), json!({"exact": true}), false).unwrap());
        assert!(e.matches(&json!({"startsWith": 12345}), json!({"startsWith": 123}), false).unwrap());
    }

    #[test]
    fn value_predicates_see_the_field_value() {
        let e = files();
        let item = json!({"name": "x", "type": "layer"});
        let opts = RawValue::object([("type", RawValue::predicate(|v| v == "layer"))]);
        assert!(e.matches(&item, opts, false).unwrap());
        let opts = RawValue::object([("type", RawValue::predicate(|v| v.is_null()))]);
        assert!(!e.matches(&item, opts, false).unwrap());
    }

    #[test]
    fn opaque_values_never_match_builtin_modes() {
        let e = files();
        assert!(!e.matches(&json!({"name": "x"}), json!({"name": [null]}), false).unwrap());
    }

    #[test]
    fn containers_have_no_text() {
        let e = files();
        assert!(!e.matches(&json!({"name": ["x"]}), "x", false).unwrap());
        assert!(!e.matches(&json!({}), "x", false).unwrap());
    }

    #[test]
    fn stored_flag_beats_call_site_default() {
        let e = files();
        let item = json!({"name": "Foo"});
        let mut s = e.sanitize("foo");
        assert!(e.filter(&item, &s, true).unwrap());
        s.set_case_sensitive(None);
        assert!(!e.filter(&item, &s, true).unwrap());
        assert!(e.filter(&item, &s, false).unwrap());
    }

    #[test]
    fn sanitize_default_applies_only_without_a_key() {
        let e = files();
        let item = json!({"name": "Foo"});
        let s = e.sanitize_with_default("foo", true);
        assert_eq!(s.case_sensitive(), Some(true));
        assert!(!e.filter(&item, &s, false).unwrap());
        let s = e.sanitize_with_default(json!({"name": "foo", "caseSensitive": false}), true);
        assert_eq!(s.case_sensitive(), Some(false));
        assert!(e.filter(&item, &s, true).unwrap());
        assert_eq!(e.sanitize_with_default(RawValue::Null, true).case_sensitive(), Some(true));
        assert_eq!(e.sanitize("foo").case_sensitive(), Some(false));
    }

    #[test]
    fn comps_never_constrain() {
        let e = files();
        let s = e.sanitize(json!({"comps": ["Main"], "name": "a"}));
        assert_eq!(s.comps().len(), 1);
        assert!(e.filter(&json!({"name": "a"}), &s, false).unwrap());
    }

    #[test]
    fn filter_items_keeps_order() {
        let e = files();
        let items = vec![json!({"name": "b"}), json!({"name": "a"}), json!({"name": "B"})];
        let kept = e.filter_items(&items, vec!["b", "a"], false).unwrap();
        assert_eq!(kept, vec![&items[0], &items[1], &items[2]]);
        let kept = e.filter_items(&items, json!({"name": "b", "caseSensitive": true}), false).unwrap();
        assert_eq!(kept, vec![&items[0]]);
    }

    #[test]
    fn filter_all_reuses_sanitized_options() {
        let e = files();
        let items = vec![json!({"name": "b"}), json!({"name": "B"}), json!({"name": "c"})];
        let s = e.sanitize_with_default("b", true);
        assert_eq!(e.filter_all(&items, &s, false).unwrap(), vec![&items[0]]);
        assert_eq!(e.filter_all(&items, &e.sanitize("b"), true).unwrap(), vec![&items[0], &items[1]]);
    }
}
