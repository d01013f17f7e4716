// Use-case level inputs/outputs for the snapshot engine.

use crate::domain::snapshot::{HeroStats, PlayerStats};
use crate::domain::{Delivery, Snapshot};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug)]
pub enum IngestEvent {
    Snapshot(Box<Snapshot>),
}

/// Latest derived stats for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRecord {
    #[serde(rename = "heroName")]
    pub hero_name: Option<String>,
    #[serde(rename = "heroId")]
    pub hero_id: Option<i64>,
    pub level: Option<i64>,
    pub damage_dealt: Option<i64>,
    pub team: Option<String>,
    pub gpm: Option<i64>,
    pub xpm: Option<i64>,
    pub kills: Option<i64>,
    pub deaths: Option<i64>,
    pub assists: Option<i64>,
    pub last_hits: Option<i64>,
    pub denies: Option<i64>,
    pub net_worth: Option<i64>,
    pub hero_healing: Option<i64>,
    pub wards_placed: Option<i64>,
    pub wards_destroyed: Option<i64>,
    pub camps_stacked: Option<i64>,
    pub runes_activated: Option<i64>,
    pub damage_received: u64,
}

impl PlayerRecord {
    pub fn new(hero: &HeroStats, player: &PlayerStats, damage_received: u64) -> Self {
        Self {
            hero_name: hero.name.clone(),
            hero_id: hero.id,
            level: hero.level,
            damage_dealt: player.hero_damage,
            team: player.team_name.clone(),
            gpm: player.gpm,
            xpm: player.xpm,
            kills: player.kills,
            deaths: player.deaths,
            assists: player.assists,
            last_hits: player.last_hits,
            denies: player.denies,
            net_worth: player.net_worth,
            hero_healing: player.hero_healing,
            wards_placed: player.wards_placed,
            wards_destroyed: player.wards_destroyed,
            camps_stacked: player.camps_stacked,
            runes_activated: player.runes_activated,
            damage_received,
        }
    }
}

/// Immutable copy of the derived state, published after every snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedView {
    /// Number of snapshots processed so far.
    pub version: u64,
    pub players: BTreeMap<String, PlayerRecord>,
    /// Active deliveries in start order.
    pub deliveries: Vec<Delivery>,
}
