//! Metric names recorded by the hub.
//!
//! Recording goes through the `metrics` facade; with no recorder installed
//! every call is a no-op.

/// Sessions that joined the room (counter).
pub const ROOM_JOINS_TOTAL: &str = "room_joins_total";
/// Sessions that left, excluding evictions (counter).
pub const ROOM_LEAVES_TOTAL: &str = "room_leaves_total";
/// Sessions evicted during fan-out (counter, labels: reason).
pub const ROOM_EVICTIONS_TOTAL: &str = "room_evictions_total";
/// Messages accepted for fan-out (counter).
pub const ROOM_MESSAGES_TOTAL: &str = "room_messages_total";
/// Messages queued on a member mailbox (counter).
pub const ROOM_DELIVERIES_TOTAL: &str = "room_deliveries_total";
/// Current members (gauge).
pub const ROOM_MEMBERS: &str = "room_members";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_are_snake_case() {
        for name in [
            ROOM_JOINS_TOTAL,
            ROOM_LEAVES_TOTAL,
            ROOM_EVICTIONS_TOTAL,
            ROOM_MESSAGES_TOTAL,
            ROOM_DELIVERIES_TOTAL,
            ROOM_MEMBERS,
        ] {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
