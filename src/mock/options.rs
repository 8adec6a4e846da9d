//! Construction options for doubles.

/// Prefix every namespace starts with unless overridden.
pub const DEFAULT_PREFIX: &str = "understudy";

/// The `ns` field attached to a double's log events: `prefix:suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugNamespace {
    /// Leading segment.
    pub prefix: String,
    /// Trailing segment. `None` picks `wrap` or `stub` by constructor.
    pub suffix: Option<String>,
}

impl Default for DebugNamespace {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: None,
        }
    }
}

impl DebugNamespace {
    pub(crate) fn render(&self, default_suffix: &str) -> String {
        let suffix = self.suffix.as_deref().unwrap_or(default_suffix);
        format!("{}:{}", self.prefix, suffix)
    }
}

/// Options for [`wrap`](super::wrap) and [`stub`](super::stub).
///
/// They only affect diagnostics.
///
/// ```rust
/// use understudy::Options;
///
/// let options = Options::new().with_prefix("billing").with_suffix("ledger");
/// assert_eq!(options.debug.prefix, "billing");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Log namespace.
    pub debug: DebugNamespace,
}

impl Options {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the namespace prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.debug.prefix = prefix.into();
        self
    }

    /// Replace the namespace suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.debug.suffix = Some(suffix.into());
        self
    }

    pub(crate) fn namespace(&self, default_suffix: &str) -> String {
        self.debug.render(default_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespace() {
        assert_eq!(Options::default().namespace("wrap"), "understudy:wrap");
        assert_eq!(Options::default().namespace("stub"), "understudy:stub");
    }

    #[test]
    fn test_custom_namespace() {
        let options = Options::new().with_prefix("app").with_suffix("db");
        assert_eq!(options.namespace("wrap"), "app:db");
    }
}
