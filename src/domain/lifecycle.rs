// Match phase policy and active/inactive transitions.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub const GAME_IN_PROGRESS: &str = "DOTA_GAMERULES_STATE_GAME_IN_PROGRESS";
pub const PRE_GAME: &str = "DOTA_GAMERULES_STATE_PRE_GAME";

/// Which match phases count as "active".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivePhasePolicy {
    /// Only the in-progress phase.
    InProgress,
    /// In-progress or pre-game (horn countdown).
    #[default]
    InProgressOrPreGame,
}

impl ActivePhasePolicy {
    pub fn is_active(self, game_state: &str) -> bool {
        match self {
            Self::InProgress => game_state == GAME_IN_PROGRESS,
            Self::InProgressOrPreGame => game_state == GAME_IN_PROGRESS || game_state == PRE_GAME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown active phase policy `{}` (expected `in_progress` or `in_progress_or_pre_game`)",
            self.0
        )
    }
}

impl FromStr for ActivePhasePolicy {
    type Err = UnknownPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "in_progress" => Ok(Self::InProgress),
            "in_progress_or_pre_game" => Ok(Self::InProgressOrPreGame),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// Result of observing one tick's match phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseDecision {
    /// Phase missing; leave all state alone this tick.
    Unknown,
    Active,
    /// Inactive and derived state exists; the caller must reset it.
    Reset,
    /// Inactive with nothing to clear.
    Idle,
}

/// Decides per tick whether derived state should be updated or reset.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchLifecycle {
    policy: ActivePhasePolicy,
}

impl MatchLifecycle {
    pub fn new(policy: ActivePhasePolicy) -> Self {
        Self { policy }
    }

    /// `has_state` reports whether any derived state is non-empty. Once a
    /// reset has cleared it, further inactive ticks are idle.
    pub fn observe(&self, game_state: Option<&str>, has_state: bool) -> PhaseDecision {
        match game_state {
            None => PhaseDecision::Unknown,
            Some(phase) if self.policy.is_active(phase) => PhaseDecision::Active,
            Some(_) if has_state => PhaseDecision::Reset,
            Some(_) => PhaseDecision::Idle,
        }
    }
}
