//! Registry of the statements currently open on one pooled connection.
//!
//! # Locking
//!
//! The live map is guarded by a single mutex that is only held while the map
//! itself changes. Driver calls (including the close of a leaked statement
//! during [`StatementRegistry::close_all`]) always run after that lock is
//! released, so a slow driver cannot block unrelated registrations.
//!
//! Each statement lives in a slot shared between its handle and the registry.
//! Whoever empties the slot first closes the statement, which makes a handle
//! close racing a forced sweep safe: the statement is closed exactly once.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::driver::Statement;
use crate::handle::StatementHandle;
use crate::report::{CloseFailure, LeakedStatement, ReclaimReport};

/// Ids are process-wide so that a stale handle from an earlier lease can never
/// unregister a statement of the current one.
static NEXT_STATEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a tracked statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatementId(u64);

impl StatementId {
    fn next() -> Self {
        Self(NEXT_STATEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stmt-{}", self.0)
    }
}

/// Slot holding the real statement until it is closed.
pub(crate) type Slot<S> = Arc<Mutex<Option<S>>>;

struct Entry<S> {
    slot: Slot<S>,
    opened_at: Instant,
}

pub(crate) struct RegistryInner<S> {
    entries: Mutex<HashMap<StatementId, Entry<S>>>,
}

impl<S> RegistryInner<S> {
    pub(crate) fn unregister(&self, id: StatementId) -> bool {
        let removed = self.entries.lock().remove(&id).is_some();
        if removed {
            tracing::trace!(statement = %id, "statement unregistered");
        }
        removed
    }
}

/// A statement still tracked by a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenStatement {
    pub id: StatementId,
    pub age: Duration,
}

/// Set of statements currently open against one physical connection.
pub struct StatementRegistry<S: Statement> {
    inner: Arc<RegistryInner<S>>,
}

impl<S: Statement> fmt::Debug for StatementRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementRegistry")
            .field("open", &self.len())
            .finish()
    }
}

impl<S: Statement> Default for StatementRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Statement> StatementRegistry<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Start tracking `statement` and return the handle callers use instead.
    ///
    /// The entry is in the registry before the handle exists, so neither an
    /// unregister nor a sweep can ever observe an untracked handle.
    pub fn register(&self, statement: S) -> StatementHandle<S> {
        let id = StatementId::next();
        let slot: Slot<S> = Arc::new(Mutex::new(Some(statement)));

        self.inner.entries.lock().insert(
            id,
            Entry {
                slot: Arc::clone(&slot),
                opened_at: Instant::now(),
            },
        );
        tracing::trace!(statement = %id, "statement registered");
        #[cfg(feature = "metrics")]
        crate::observability::record_statement_opened();

        StatementHandle::new(id, slot, self.downgrade())
    }

    /// Stop tracking `id`. Returns `false` when it was not tracked.
    pub fn unregister(&self, id: StatementId) -> bool {
        self.inner.unregister(id)
    }

    /// Force-close every tracked statement and empty the registry.
    ///
    /// Close failures are collected in the returned report; one failing
    /// statement never prevents the others from being closed. The registry is
    /// empty and ready for new registrations afterwards.
    pub fn close_all(&self) -> ReclaimReport<S::Error> {
        let drained: Vec<(StatementId, Entry<S>)> = self.inner.entries.lock().drain().collect();

        let mut report = ReclaimReport::default();
        for (id, entry) in drained {
            let taken = entry.slot.lock().take();
            // Emptied by a concurrent close on the handle; nothing leaked.
            let Some(mut statement) = taken else {
                continue;
            };

            report.leaked.push(LeakedStatement {
                id,
                age: entry.opened_at.elapsed(),
            });
            if let Err(error) = statement.close() {
                report.failures.push(CloseFailure { id, error });
            }
        }

        #[cfg(feature = "metrics")]
        {
            if !report.is_clean() {
                crate::observability::record_statements_leaked(
                    report.leak_count(),
                    report.failure_count(),
                );
            }
        }
        report
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.lock().is_empty()
    }

    pub fn contains(&self, id: StatementId) -> bool {
        self.inner.entries.lock().contains_key(&id)
    }

    /// Snapshot of the tracked statements, oldest first.
    pub fn open_statements(&self) -> Vec<OpenStatement> {
        let now = Instant::now();
        let mut open: Vec<OpenStatement> = self
            .inner
            .entries
            .lock()
            .iter()
            .map(|(id, entry)| OpenStatement {
                id: *id,
                age: now.saturating_duration_since(entry.opened_at),
            })
            .collect();
        open.sort_by(|a, b| b.age.cmp(&a.age).then(a.id.cmp(&b.id)));
        open
    }

    fn downgrade(&self) -> Weak<RegistryInner<S>> {
        Arc::downgrade(&self.inner)
    }
}
