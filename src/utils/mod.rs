pub mod types;
mod test;

use rand::distr::Alphanumeric;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Returns a process-unique connection id. Ids start at 1 and are never reused.
pub fn get_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Generates a random alphanumeric room id of the given length.
pub fn random_room_id(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len.max(1))
        .map(char::from)
        .collect()
}
