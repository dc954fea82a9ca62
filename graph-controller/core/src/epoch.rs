use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

pub type SharedEpoch = Arc<Epoch>;

/// A process-wide version stamp for cluster state.
///
/// The epoch starts at zero and is incremented once for each observed change to
/// workload, namespace, or network policy state. Readers never block writers.
#[derive(Debug, Default)]
pub struct Epoch(AtomicU64);

// === impl Epoch ===

impl Epoch {
    pub fn shared() -> SharedEpoch {
        Arc::new(Self::default())
    }

    #[inline]
    pub fn load(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Records a change, returning the new epoch.
    #[inline]
    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(Epoch::default().load(), 0);
    }

    #[test]
    fn increments_by_one() {
        let epoch = Epoch::default();
        assert_eq!(epoch.increment(), 1);
        assert_eq!(epoch.increment(), 2);
        assert_eq!(epoch.load(), 2);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        const THREADS: usize = 16;
        const PER_THREAD: u64 = 1_000;

        let epoch = Epoch::shared();
        let start = epoch.load();
        let handles = (0..THREADS)
            .map(|_| {
                let epoch = epoch.clone();
                std::thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        epoch.increment();
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("thread must not panic");
        }

        assert_eq!(epoch.load(), start + THREADS as u64 * PER_THREAD);
    }
}
