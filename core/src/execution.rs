use crate::{DocId, DocumentStatus};
use lazy_static::lazy_static;
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::sync::Arc;

/// How an operation schedules its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Sequential,
    /// Data-parallel over the given number of worker threads.
    Parallel(usize),
}

impl ExecutionMode {
    /// Parallel mode sized to the machine.
    pub fn parallel() -> Self {
        ExecutionMode::Parallel(rayon::current_num_threads())
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, ExecutionMode::Parallel(_))
    }

    /// Worker count, which is also the accumulator bucket count. Parallel
    /// requests are clamped to `1..=max_workers()`.
    pub fn workers(&self) -> usize {
        match self {
            ExecutionMode::Sequential => 1,
            ExecutionMode::Parallel(n) => (*n).clamp(1, max_workers()),
        }
    }

    /// Run `op` inside the pool for this mode. Sequential mode runs inline.
    pub(crate) fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self {
            ExecutionMode::Sequential => op(),
            ExecutionMode::Parallel(_) => match pool(self.workers()) {
                Some(pool) => pool.install(op),
                None => op(),
            },
        }
    }
}

/// Pools kept alive at once; older pool sizes are dropped beyond this.
const MAX_CACHED_POOLS: usize = 4;

lazy_static! {
    static ref MAX_WORKERS: usize = std::thread::available_parallelism().map_or(1, |n| n.get());
    static ref POOLS: Mutex<Vec<(usize, Arc<ThreadPool>)>> = Mutex::new(Vec::new());
}

/// Upper bound on worker threads for one parallel call: the machine's
/// available parallelism.
pub fn max_workers() -> usize {
    *MAX_WORKERS
}

fn pool(workers: usize) -> Option<Arc<ThreadPool>> {
    let mut pools = POOLS.lock();
    if let Some(pos) = pools.iter().position(|(n, _)| *n == workers) {
        let entry = pools.remove(pos);
        let p = entry.1.clone();
        pools.push(entry);
        return Some(p);
    }
    match ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |i| format!("sift-worker-{workers}-{i}"))
        .build()
    {
        Ok(p) => {
            let p = Arc::new(p);
            if pools.len() >= MAX_CACHED_POOLS {
                // least recently used; its threads exit once running calls release it
                pools.remove(0);
            }
            pools.push((workers, p.clone()));
            Some(p)
        }
        Err(err) => {
            tracing::warn!(workers, %err, "failed to build worker pool, using global pool");
            None
        }
    }
}

/// Document filter applied while scoring.
pub enum Predicate<'a> {
    Status(DocumentStatus),
    Custom(Box<dyn Fn(DocId, DocumentStatus, i32) -> bool + Send + Sync + 'a>),
}

impl<'a> Predicate<'a> {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(DocId, DocumentStatus, i32) -> bool + Send + Sync + 'a,
    {
        Predicate::Custom(Box::new(f))
    }

    pub fn matches(&self, id: DocId, status: DocumentStatus, rating: i32) -> bool {
        match self {
            Predicate::Status(wanted) => *wanted == status,
            Predicate::Custom(f) => f(id, status, rating),
        }
    }
}

impl Default for Predicate<'_> {
    fn default() -> Self {
        Predicate::Status(DocumentStatus::Actual)
    }
}

impl From<DocumentStatus> for Predicate<'_> {
    fn from(status: DocumentStatus) -> Self {
        Predicate::Status(status)
    }
}

impl fmt::Debug for Predicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Status(s) => f.debug_tuple("Status").field(s).finish(),
            Predicate::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workers_never_zero() {
        assert_eq!(ExecutionMode::Sequential.workers(), 1);
        assert_eq!(ExecutionMode::Parallel(0).workers(), 1);
        assert_eq!(ExecutionMode::Parallel(4).workers(), 4.min(max_workers()));
    }

    #[test]
    fn workers_are_capped_by_machine() {
        assert_eq!(ExecutionMode::Parallel(usize::MAX).workers(), max_workers());
        assert_eq!(ExecutionMode::Parallel(100_000_000_000_000_000).workers(), max_workers());
        assert_eq!(ExecutionMode::parallel().workers(), rayon::current_num_threads().min(max_workers()));
    }

    #[test]
    fn install_runs_on_sized_pool() {
        let n = ExecutionMode::Parallel(3).install(rayon::current_num_threads);
        assert_eq!(n, 3.min(max_workers()));
        assert_eq!(ExecutionMode::Sequential.install(|| 7), 7);
    }

    #[test]
    fn pool_cache_is_bounded() {
        for w in 1..=max_workers().min(16) {
            let n = ExecutionMode::Parallel(w).install(rayon::current_num_threads);
            assert_eq!(n, w);
        }
        assert!(POOLS.lock().len() <= MAX_CACHED_POOLS);
    }

    #[test]
    fn predicates() {
        let p: Predicate = DocumentStatus::Banned.into();
        assert!(p.matches(1, DocumentStatus::Banned, 0));
        assert!(!p.matches(1, DocumentStatus::Actual, 0));

        let even = Predicate::custom(|id, _, _| id % 2 == 0);
        assert!(even.matches(2, DocumentStatus::Removed, 0));
        assert!(!even.matches(3, DocumentStatus::Actual, 0));
        assert!(Predicate::default().matches(0, DocumentStatus::Actual, -5));
    }
}
