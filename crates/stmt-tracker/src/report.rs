//! Leak report produced when a connection is reclaimed.

use std::fmt;
use std::time::Duration;

use crate::registry::StatementId;

/// A statement that was still open when its connection was reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeakedStatement {
    pub id: StatementId,
    /// How long the statement had been open.
    pub age: Duration,
}

/// A leaked statement whose driver close failed.
#[derive(Debug)]
pub struct CloseFailure<E> {
    pub id: StatementId,
    pub error: E,
}

/// Outcome of force-closing the statements of a reclaimed connection.
///
/// A report with failures is informational: the connection is reclaimed
/// either way.
#[derive(Debug)]
pub struct ReclaimReport<E> {
    pub leaked: Vec<LeakedStatement>,
    pub failures: Vec<CloseFailure<E>>,
}

impl<E> Default for ReclaimReport<E> {
    fn default() -> Self {
        Self {
            leaked: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<E> ReclaimReport<E> {
    /// No statement was left open.
    pub fn is_clean(&self) -> bool {
        self.leaked.is_empty()
    }

    pub fn leak_count(&self) -> usize {
        self.leaked.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Leaked statements that were closed successfully.
    pub fn closed_count(&self) -> usize {
        self.leaked.len() - self.failures.len()
    }

    pub fn leaked_ids(&self) -> impl Iterator<Item = StatementId> + '_ {
        self.leaked.iter().map(|leak| leak.id)
    }
}

impl<E: fmt::Display> fmt::Display for ReclaimReport<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "no leaked statements");
        }

        write!(
            f,
            "{} leaked statement(s), {} failed to close",
            self.leak_count(),
            self.failure_count()
        )?;
        for leak in &self.leaked {
            write!(f, "; {} open for {:?}", leak.id, leak.age)?;
            if let Some(failure) = self.failures.iter().find(|fail| fail.id == leak.id) {
                write!(f, " (close failed: {})", failure.error)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockError;

    fn leak(raw: u64) -> LeakedStatement {
        LeakedStatement {
            id: StatementId::from_raw(raw),
            age: Duration::from_millis(raw),
        }
    }

    #[test]
    fn test_default_is_clean() {
        let report: ReclaimReport<MockError> = ReclaimReport::default();
        assert!(report.is_clean());
        assert_eq!(report.leak_count(), 0);
        assert_eq!(report.closed_count(), 0);
        assert_eq!(report.to_string(), "no leaked statements");
    }

    #[test]
    fn test_counts() {
        let report = ReclaimReport {
            leaked: vec![leak(1), leak(2), leak(3)],
            failures: vec![CloseFailure {
                id: StatementId::from_raw(2),
                error: MockError::new("socket closed"),
            }],
        };

        assert!(!report.is_clean());
        assert_eq!(report.leak_count(), 3);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.closed_count(), 2);
        assert_eq!(
            report.leaked_ids().collect::<Vec<_>>(),
            vec![
                StatementId::from_raw(1),
                StatementId::from_raw(2),
                StatementId::from_raw(3)
            ]
        );
    }

    #[test]
    fn test_display_names_each_leak() {
        let report = ReclaimReport {
            leaked: vec![leak(7), leak(9)],
            failures: vec![CloseFailure {
                id: StatementId::from_raw(9),
                error: MockError::new("socket closed"),
            }],
        };

        let msg = report.to_string();
        assert!(msg.starts_with("2 leaked statement(s), 1 failed to close"));
        assert!(msg.contains("stmt-7"));
        assert!(msg.contains("stmt-9"));
        assert!(msg.contains("close failed: socket closed"));
    }
}
