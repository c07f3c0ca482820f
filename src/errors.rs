use thiserror::Error;

/// Boxed error returned by fallible custom predicates.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum FilterError {
    // Pattern source that the regex engine rejects
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    // Pattern flag letter outside `gimsuxy`
    #[error("unsupported pattern flag '{0}'")]
    InvalidFlag(char),

    // `caseSensitive` and `comps` are option keys, never template fields
    #[error("field name '{0}' is reserved")]
    ReservedField(String),

    // Same field name declared twice in one template
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    // Error returned by a caller-supplied field predicate
    #[error("custom predicate for field '{field}' failed: {source}")]
    Predicate {
        field: String,
        #[source]
        source: BoxError,
    },

    // Template config or CLI input that could not be read
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
