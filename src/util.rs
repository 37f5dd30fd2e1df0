use std::time::{SystemTime, UNIX_EPOCH};

#[allow(dead_code)]
pub(crate) fn current_time_ms() -> u128 {
    let now = SystemTime::now();
    now.duration_since(UNIX_EPOCH).unwrap().as_millis()
}
