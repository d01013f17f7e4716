// Game state snapshot pushed by the client once per tick.
//
// Every section is optional. A section or map entry whose shape does not
// match is dropped during deserialization and reads as absent, so one bad
// block never rejects the whole snapshot.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Item name the client reports for an unoccupied item slot.
pub const EMPTY_ITEM: &str = "empty";

/// Team key -> player key -> entry.
pub type TeamTable<T> = BTreeMap<String, BTreeMap<String, T>>;

/// One tick's full observed state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "lenient")]
    pub map: Option<MapState>,
    #[serde(default, deserialize_with = "lenient_teams")]
    pub player: Option<TeamTable<PlayerStats>>,
    #[serde(default, deserialize_with = "lenient_teams")]
    pub hero: Option<TeamTable<HeroStats>>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub couriers: Option<BTreeMap<String, CourierState>>,
    /// Partial echo of the prior tick, supplied by the transport.
    #[serde(default, deserialize_with = "lenient")]
    pub previously: Option<PreviousSnapshotView>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapState {
    #[serde(default, deserialize_with = "lenient")]
    pub game_state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeroStats {
    pub name: Option<String>,
    pub id: Option<i64>,
    pub level: Option<i64>,
    pub health: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerStats {
    pub team_name: Option<String>,
    pub hero_damage: Option<i64>,
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
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourierState {
    /// Owning player slot.
    #[serde(default, deserialize_with = "lenient")]
    pub owner: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub alive: Option<bool>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub items: Option<BTreeMap<String, ItemSlot>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemSlot {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviousSnapshotView {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub couriers: Option<BTreeMap<String, PreviousCourier>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviousCourier {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub items: Option<BTreeMap<String, ItemSlot>>,
}

impl Snapshot {
    pub fn game_state(&self) -> Option<&str> {
        self.map.as_ref()?.game_state.as_deref()
    }

    /// Hero name for a player key, searching team tables in key order.
    pub fn hero_name_for(&self, player_key: &str) -> Option<&str> {
        self.hero
            .as_ref()?
            .values()
            .find_map(|team| team.get(player_key))
            .and_then(|hero| hero.name.as_deref())
    }
}

impl PreviousSnapshotView {
    /// Item names the transport reported on a courier during the prior tick.
    ///
    /// `None` when the prior view does not list items for that courier.
    pub fn courier_items(&self, courier_id: &str) -> Option<Vec<&str>> {
        let items = self.couriers.as_ref()?.get(courier_id)?.items.as_ref()?;
        Some(occupied_names(items).collect())
    }
}

impl CourierState {
    /// Occupied item slots in slot order, one entry per slot.
    pub fn item_names(&self) -> Vec<String> {
        self.items
            .as_ref()
            .map(|items| occupied_names(items).map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// Missing liveness reads as alive.
    pub fn is_alive(&self) -> bool {
        self.alive.unwrap_or(true)
    }
}

// Names in slot order: `item2` before `item10`, unnumbered keys last.
fn occupied_names(items: &BTreeMap<String, ItemSlot>) -> impl Iterator<Item = &str> {
    let mut slots: Vec<(&String, &ItemSlot)> = items.iter().collect();
    slots.sort_by_key(|(key, _)| slot_index(key).unwrap_or(u32::MAX));
    slots
        .into_iter()
        .filter_map(|(_, slot)| slot.name.as_deref())
        .filter(|name| *name != EMPTY_ITEM)
}

fn slot_index(key: &str) -> Option<u32> {
    let digits = key.trim_start_matches(|c: char| !c.is_ascii_digit());
    digits.parse().ok()
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Option<BTreeMap<String, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(entries)) => Ok(Some(collect_entries(entries))),
        _ => Ok(None),
    }
}

fn lenient_teams<'de, D, T>(deserializer: D) -> Result<Option<TeamTable<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(Value::Object(teams)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    // Non-object team values (flat single-player payloads) are skipped.
    let table = teams
        .into_iter()
        .filter_map(|(team, players)| match players {
            Value::Object(players) => Some((team, collect_entries(players))),
            _ => None,
        })
        .collect();
    Ok(Some(table))
}

fn collect_entries<T: DeserializeOwned>(entries: Map<String, Value>) -> BTreeMap<String, T> {
    entries
        .into_iter()
        .filter_map(|(key, value)| {
            serde_json::from_value(value)
                .ok()
                .map(|entry| (key, entry))
        })
        .collect()
}
