//! Process-wide switch for multi-threaded leaf hashing.

#[cfg(feature = "parallel")]
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
static PARALLEL_ENABLED: AtomicBool = AtomicBool::new(true);

/// Whether leaf batches may be hashed across threads.
#[cfg(feature = "parallel")]
pub fn parallelism_enabled() -> bool {
    PARALLEL_ENABLED.load(Ordering::SeqCst)
}

/// Whether leaf batches may be hashed across threads.
#[cfg(not(feature = "parallel"))]
pub fn parallelism_enabled() -> bool {
    false
}

/// Overrides the switch until the returned guard drops.
#[cfg(feature = "parallel")]
pub fn set_parallelism(enabled: bool) -> ParallelismGuard {
    let previous = PARALLEL_ENABLED.swap(enabled, Ordering::SeqCst);
    ParallelismGuard { previous }
}

/// Overrides the switch until the returned guard drops.
#[cfg(not(feature = "parallel"))]
pub fn set_parallelism(_enabled: bool) -> ParallelismGuard {
    ParallelismGuard {}
}

/// Restores the previous setting on drop.
pub struct ParallelismGuard {
    #[cfg(feature = "parallel")]
    previous: bool,
}

#[cfg(feature = "parallel")]
impl Drop for ParallelismGuard {
    fn drop(&mut self) {
        PARALLEL_ENABLED.store(self.previous, Ordering::SeqCst);
    }
}

#[cfg(not(feature = "parallel"))]
impl Drop for ParallelismGuard {
    fn drop(&mut self) {}
}
