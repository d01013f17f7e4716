// Cumulative damage-received tracking from instantaneous health readings.

use std::collections::BTreeMap;

/// Per-player health baseline and accumulated damage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDamageState {
    pub previous_health: Option<i64>,
    pub cumulative_damage_received: u64,
}

/// Converts health readings into a non-decreasing damage-received counter.
///
/// Only health drops between consecutive readings are counted. Healing never
/// decrements the counter, and damage taken then healed between two ticks is
/// invisible.
#[derive(Debug, Default)]
pub struct DamageAccumulator {
    players: BTreeMap<String, PlayerDamageState>,
}

impl DamageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a health reading and return the player's accumulated damage.
    pub fn update(&mut self, player_key: &str, current_health: Option<i64>) -> u64 {
        let state = self.players.entry(player_key.to_string()).or_default();

        if let (Some(previous), Some(current)) = (state.previous_health, current_health) {
            // Readings come straight from the client; saturate instead of overflowing.
            let delta = previous.saturating_sub(current);
            if delta > 0 {
                state.cumulative_damage_received = state
                    .cumulative_damage_received
                    .saturating_add(delta.unsigned_abs());
            }
        }

        if current_health.is_some() {
            state.previous_health = current_health;
        }

        state.cumulative_damage_received
    }

    pub fn get(&self, player_key: &str) -> Option<&PlayerDamageState> {
        self.players.get(player_key)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn reset(&mut self) {
        self.players.clear();
    }
}
