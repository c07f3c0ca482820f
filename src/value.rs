use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Number, Value};

use crate::pattern::Pattern;

/// Caller-supplied test over an item's field value, usable as a filter value.
pub type ValuePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Raw, not yet sanitized filter options.
///
/// This mirrors the loose shapes callers hand to `Engine::sanitize`: a bare
/// scalar, a pattern, a list or a keyed object. Keyed objects keep their key
/// order.
#[derive(Clone, Default)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Pattern(Pattern),
    Predicate(ValuePredicate),
    List(Vec<RawValue>),
    Object(Vec<(String, RawValue)>),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Look up a key on a keyed object. Other shapes have no keys.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        match self {
            RawValue::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Builds a keyed object from `(key, value)` pairs.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<RawValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        RawValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        RawValue::Predicate(Arc::new(f))
    }

    /// Loose truthiness, used for the `caseSensitive` switch.
    pub fn truthy(&self) -> bool {
        match self {
            RawValue::Null => false,
            RawValue::Bool(b) => *b,
            RawValue::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
            RawValue::Text(s) => !s.is_empty(),
            RawValue::Pattern(_) | RawValue::Predicate(_) => true,
            RawValue::List(_) | RawValue::Object(_) => true,
        }
    }

    /// Recognizes `{"pattern": "<source>", "flags": "<flags>"}`. Returns
    /// `None` when the object does not have that shape, and `Some(Err)` when
    /// it does but the pattern does not compile.
    pub(crate) fn as_pattern_descriptor(&self) -> Option<crate::errors::Result<Pattern>> {
        let RawValue::Object(entries) = self else {
            return None;
        };
        let mut source = None;
        let mut flags = "";
        for (key, value) in entries {
            match (key.as_str(), value) {
                ("pattern", RawValue::Text(s)) => source = Some(s.as_str()),
                ("flags", RawValue::Text(f)) => flags = f.as_str(),
                _ => return None,
            }
        }
        source.map(|s| Pattern::new(s, flags))
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("Null"),
            RawValue::Bool(b) => write!(f, "Bool({b})"),
            RawValue::Number(n) => write!(f, "Number({n})"),
            RawValue::Text(s) => write!(f, "Text({s:?})"),
            RawValue::Pattern(p) => write!(f, "Pattern({p})"),
            RawValue::Predicate(_) => f.write_str("Predicate(..)"),
            RawValue::List(items) => f.debug_tuple("List").field(items).finish(),
            RawValue::Object(entries) => f.debug_map().entries(entries.iter().map(|(k, v)| (k, v))).finish(),
        }
    }
}

impl PartialEq for RawValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RawValue::Null, RawValue::Null) => true,
            (RawValue::Bool(a), RawValue::Bool(b)) => a == b,
            (RawValue::Number(a), RawValue::Number(b)) => a == b,
            (RawValue::Text(a), RawValue::Text(b)) => a == b,
            (RawValue::Pattern(a), RawValue::Pattern(b)) => a == b,
            (RawValue::Predicate(a), RawValue::Predicate(b)) => Arc::ptr_eq(a, b),
            (RawValue::List(a), RawValue::List(b)) => a == b,
            (RawValue::Object(a), RawValue::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Value> for RawValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => RawValue::Number(n),
            Value::String(s) => RawValue::Text(s),
            Value::Array(a) => RawValue::List(a.into_iter().map(RawValue::from).collect()),
            Value::Object(m) => RawValue::Object(m.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<&Value> for RawValue {
    fn from(v: &Value) -> Self {
        RawValue::from(v.clone())
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Number(n.into())
    }
}

impl From<Pattern> for RawValue {
    fn from(p: Pattern) -> Self {
        RawValue::Pattern(p)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(RawValue::Null)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(items: Vec<T>) -> Self {
        RawValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// One sanitized criterion for a field.
#[derive(Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Pattern(Pattern),
    Bool(bool),
    Number(Number),
    Predicate(ValuePredicateRef),
    /// Anything else found inside a list; handed to custom predicates as is.
    Opaque(RawValue),
}

/// Wrapper so `FilterValue` can derive `PartialEq` (identity comparison).
#[derive(Clone)]
pub struct ValuePredicateRef(pub ValuePredicate);

impl PartialEq for ValuePredicateRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl FilterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Plain JSON view of the value, when it has one. Patterns become their
    /// descriptor object; predicates have no JSON form.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            FilterValue::Text(s) => Some(Value::String(s.clone())),
            FilterValue::Bool(b) => Some(Value::Bool(*b)),
            FilterValue::Number(n) => Some(Value::Number(n.clone())),
            FilterValue::Pattern(p) => {
                let mut m = Map::new();
                m.insert("pattern".into(), Value::String(p.source().to_string()));
                m.insert("flags".into(), Value::String(p.flags().to_string()));
                Some(Value::Object(m))
            }
            FilterValue::Predicate(_) => None,
            FilterValue::Opaque(raw) => raw_to_json(raw),
        }
    }
}

fn raw_to_json(raw: &RawValue) -> Option<Value> {
    Some(match raw {
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Bool(*b),
        RawValue::Number(n) => Value::Number(n.clone()),
        RawValue::Text(s) => Value::String(s.clone()),
        RawValue::Pattern(p) => return FilterValue::Pattern(p.clone()).to_json(),
        RawValue::Predicate(_) => return None,
        RawValue::List(items) => Value::Array(items.iter().map(raw_to_json).collect::<Option<_>>()?),
        RawValue::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| raw_to_json(v).map(|v| (k.clone(), v)))
                .collect::<Option<_>>()?,
        ),
    })
}

impl fmt::Debug for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(s) => write!(f, "{s:?}"),
            FilterValue::Pattern(p) => write!(f, "{p}"),
            FilterValue::Bool(b) => write!(f, "{b}"),
            FilterValue::Number(n) => write!(f, "{n}"),
            FilterValue::Predicate(_) => f.write_str("<predicate>"),
            FilterValue::Opaque(raw) => write!(f, "{raw:?}"),
        }
    }
}

impl From<FilterValue> for RawValue {
    fn from(v: FilterValue) -> Self {
        match v {
            FilterValue::Text(s) => RawValue::Text(s),
            FilterValue::Pattern(p) => RawValue::Pattern(p),
            FilterValue::Bool(b) => RawValue::Bool(b),
            FilterValue::Number(n) => RawValue::Number(n),
            FilterValue::Predicate(p) => RawValue::Predicate(p.0),
            FilterValue::Opaque(raw) => raw,
        }
    }
}
