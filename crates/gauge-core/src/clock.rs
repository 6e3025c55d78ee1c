//! Wall-clock access shared by the state modules.
//!
//! Everything age-related works in milliseconds since the Unix epoch. Logic
//! takes an explicit `now_ms` so tests can pin time; callers use [`now_ms`].

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_past_2024() {
        // 2024-01-01T00:00:00Z
        assert!(now_ms() > 1_704_067_200_000);
    }
}
