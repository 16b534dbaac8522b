//! Option and metadata types shared by every [`Statement`](crate::Statement)
//! implementation.

use std::fmt;

/// Which auto-generated keys a statement should make available.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeneratedKeys {
    /// Do not return generated keys.
    #[default]
    None,
    /// Return all generated keys the driver knows about.
    All,
    /// Return the keys of the listed columns, 1-based.
    ColumnIndexes(Vec<usize>),
    /// Return the keys of the named columns.
    ColumnNames(Vec<String>),
}

/// What to do with the current result when moving to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrentResult {
    /// Close the current result set.
    #[default]
    Close,
    /// Keep the current result set open.
    Keep,
    /// Close every result set that was kept open so far.
    CloseAll,
}

/// Hint for the direction rows will be fetched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchDirection {
    #[default]
    Forward,
    Reverse,
    Unknown,
}

/// Scrollability of the result sets a statement produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultSetType {
    #[default]
    ForwardOnly,
    ScrollInsensitive,
    ScrollSensitive,
}

/// Whether result sets produced by a statement can be updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    #[default]
    ReadOnly,
    Updatable,
}

/// Whether result sets survive a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Holdability {
    HoldOverCommit,
    #[default]
    CloseAtCommit,
}

/// A warning reported by the driver for a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlWarning {
    pub message: String,
    pub sql_state: Option<String>,
    pub code: i32,
}

impl SqlWarning {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql_state: None,
            code: 0,
        }
    }

    #[must_use]
    pub fn with_sql_state(mut self, state: impl Into<String>) -> Self {
        self.sql_state = Some(state.into());
        self
    }

    #[must_use]
    pub const fn with_code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }
}

impl fmt::Display for SqlWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sql_state {
            Some(state) => write!(f, "[{state}] {} (code {})", self.message, self.code),
            None => write!(f, "{} (code {})", self.message, self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(GeneratedKeys::default(), GeneratedKeys::None);
        assert_eq!(CurrentResult::default(), CurrentResult::Close);
        assert_eq!(FetchDirection::default(), FetchDirection::Forward);
        assert_eq!(ResultSetType::default(), ResultSetType::ForwardOnly);
        assert_eq!(Concurrency::default(), Concurrency::ReadOnly);
        assert_eq!(Holdability::default(), Holdability::CloseAtCommit);
    }

    #[test]
    fn test_warning_display_with_state() {
        let warning = SqlWarning::new("data truncated")
            .with_sql_state("01004")
            .with_code(7);
        assert_eq!(warning.to_string(), "[01004] data truncated (code 7)");
    }

    #[test]
    fn test_warning_display_without_state() {
        let warning = SqlWarning::new("cursor reset");
        assert_eq!(warning.to_string(), "cursor reset (code 0)");
    }
}
