use std::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Lock `lock`, taking the data back from a poisoned mutex. Capture buffers
/// hold plain samples, so a panic mid-update leaves nothing worth aborting for.
pub(crate) fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(context, "mutex poisoned; recovering");
            poisoned.into_inner()
        }
    }
}
