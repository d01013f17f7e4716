// Per-tick snapshot processing over the single derived-state container.

use super::types::{DerivedView, PlayerRecord};
use crate::domain::{
    ActivePhasePolicy, CourierDeliveryTracker, DamageAccumulator, Delivery, DeliveryEvent,
    MatchLifecycle, PhaseDecision, PlayerDamageState, Snapshot,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Owns all derived state and applies snapshots to it one at a time.
#[derive(Debug, Default)]
pub struct SnapshotProcessor {
    lifecycle: MatchLifecycle,
    damage: DamageAccumulator,
    tracker: CourierDeliveryTracker,
    players: BTreeMap<String, PlayerRecord>,
    version: u64,
}

impl SnapshotProcessor {
    pub fn new(policy: ActivePhasePolicy) -> Self {
        Self {
            lifecycle: MatchLifecycle::new(policy),
            ..Self::default()
        }
    }

    /// Apply one snapshot. Missing sections skip only the concern that needs
    /// them; a missing match phase leaves everything untouched.
    pub fn process(&mut self, snapshot: &Snapshot, tick_time_ms: u64) {
        self.version += 1;

        match self.lifecycle.observe(snapshot.game_state(), self.has_state()) {
            PhaseDecision::Active => {
                self.update_damage(snapshot);
                self.update_deliveries(snapshot, tick_time_ms);
            }
            PhaseDecision::Reset => {
                info!(
                    game_state = snapshot.game_state().unwrap_or_default(),
                    "match not active, resetting derived state"
                );
                self.reset();
            }
            PhaseDecision::Unknown | PhaseDecision::Idle => {}
        }
    }

    fn update_damage(&mut self, snapshot: &Snapshot) {
        let (Some(heroes), Some(players)) = (&snapshot.hero, &snapshot.player) else {
            return;
        };

        let mut records = BTreeMap::new();
        for (team_key, team) in heroes {
            let player_team = players.get(team_key);
            for (player_key, hero) in team {
                let Some(player) = player_team.and_then(|entries| entries.get(player_key)) else {
                    continue;
                };
                // Unpicked slots report hero id 0.
                let has_hero = matches!(hero.id, Some(id) if id != 0);
                if !has_hero || player.team_name.as_deref().is_none_or(str::is_empty) {
                    continue;
                }

                let damage_received = self.damage.update(player_key, hero.health);
                records.insert(
                    player_key.clone(),
                    PlayerRecord::new(hero, player, damage_received),
                );
            }
        }

        if records.is_empty() {
            return;
        }
        if records.len() != self.players.len() {
            debug!(heroes = records.len(), "processed heroes");
        }
        self.players = records;
    }

    fn update_deliveries(&mut self, snapshot: &Snapshot, tick_time_ms: u64) {
        let (Some(couriers), Some(_), Some(_)) =
            (&snapshot.couriers, &snapshot.hero, &snapshot.player)
        else {
            return;
        };

        let events = self.tracker.advance(
            couriers,
            snapshot.previously.as_ref(),
            |player_key| snapshot.hero_name_for(player_key).map(str::to_owned),
            tick_time_ms,
        );
        events.iter().for_each(log_delivery_event);
    }

    pub fn has_state(&self) -> bool {
        !self.players.is_empty() || !self.damage.is_empty() || !self.tracker.is_empty()
    }

    pub fn reset(&mut self) {
        self.players.clear();
        self.damage.reset();
        self.tracker.reset();
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn players(&self) -> &BTreeMap<String, PlayerRecord> {
        &self.players
    }

    pub fn deliveries(&self) -> &[Delivery] {
        self.tracker.deliveries()
    }

    pub fn damage_state(&self, player_key: &str) -> Option<&PlayerDamageState> {
        self.damage.get(player_key)
    }

    pub fn view(&self) -> DerivedView {
        DerivedView {
            version: self.version,
            players: self.players.clone(),
            deliveries: self.tracker.deliveries().to_vec(),
        }
    }
}

fn log_delivery_event(event: &DeliveryEvent) {
    match event {
        DeliveryEvent::Started {
            delivery_id,
            courier_id,
            owner_player_key,
            hero_name,
            alive,
        } => info!(
            %delivery_id,
            %courier_id,
            owner = %owner_player_key,
            hero = %hero_name,
            alive,
            "courier delivery started"
        ),
        DeliveryEvent::LivenessChanged {
            delivery_id,
            courier_id,
            alive,
        } => info!(
            %delivery_id,
            %courier_id,
            alive,
            "courier {}",
            if *alive { "respawned" } else { "died" }
        ),
        DeliveryEvent::Completed {
            delivery_id,
            courier_id,
            departed_item,
        } => info!(
            %delivery_id,
            %courier_id,
            item = %departed_item,
            "courier delivery completed"
        ),
    }
}
