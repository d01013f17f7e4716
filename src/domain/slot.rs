// Player slot to player key mapping.

/// Number of player slots in a match.
pub const PLAYER_SLOTS: i64 = 10;

/// Map a numeric player slot to its player key (`player0` ..= `player9`).
///
/// Returns `None` for slots outside the valid range; callers treat that as an
/// unknown owner rather than an error.
pub fn slot_to_player_key(slot: i64) -> Option<String> {
    if (0..PLAYER_SLOTS).contains(&slot) {
        Some(format!("player{slot}"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_slot_is_in_range_then_returns_player_key() {
        assert_eq!(slot_to_player_key(0).as_deref(), Some("player0"));
        assert_eq!(slot_to_player_key(9).as_deref(), Some("player9"));
    }

    #[test]
    fn when_slot_is_out_of_range_then_returns_none() {
        assert_eq!(slot_to_player_key(-1), None);
        assert_eq!(slot_to_player_key(10), None);
        assert_eq!(slot_to_player_key(15), None);
    }
}
