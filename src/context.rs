/// Per-call evaluation settings shared by the built-in modes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context {
    pub case_sensitive: bool,
}

impl Context {
    /// The flag stored in sanitized options wins over the call-site default.
    pub fn resolve(stored: Option<bool>, default: bool) -> Self {
        Self {
            case_sensitive: stored.unwrap_or(default),
        }
    }
}
