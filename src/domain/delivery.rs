// Courier delivery detection across consecutive snapshots.

use crate::domain::slot::slot_to_player_key;
use crate::domain::snapshot::{CourierState, PreviousSnapshotView};
use serde::Serialize;
use std::collections::BTreeMap;

/// Owner key used when a courier's slot does not map to a player.
pub const UNKNOWN_OWNER: &str = "unknown_owner";
/// Hero name used when the owner's hero cannot be resolved.
pub const UNKNOWN_HERO: &str = "unknown_hero";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryItem {
    pub name: String,
}

/// One in-flight item transport by a courier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub delivery_id: String,
    pub courier_id: String,
    pub owner_player_key: String,
    pub hero_name: String,
    /// Items on the courier when tracking started, one per occupied slot.
    pub items: Vec<DeliveryItem>,
    /// Epoch milliseconds of the tick that started the delivery.
    pub start_time: u64,
    pub courier_alive: bool,
}

/// What the tracker changed during one `advance` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryEvent {
    Started {
        delivery_id: String,
        courier_id: String,
        owner_player_key: String,
        hero_name: String,
        alive: bool,
    },
    LivenessChanged {
        delivery_id: String,
        courier_id: String,
        alive: bool,
    },
    Completed {
        delivery_id: String,
        courier_id: String,
        departed_item: String,
    },
}

// Per-tick view of one courier; rebuilt every call.
#[derive(Debug)]
struct CourierObservation {
    owner: Option<i64>,
    slot_items: Vec<String>,
    names: Vec<String>,
    alive: bool,
}

impl CourierObservation {
    fn from_state(state: &CourierState) -> Self {
        let slot_items = state.item_names();
        let mut names: Vec<String> = Vec::with_capacity(slot_items.len());
        for item in &slot_items {
            if !names.contains(item) {
                names.push(item.clone());
            }
        }

        Self {
            owner: state.owner,
            slot_items,
            names,
            alive: state.is_alive(),
        }
    }

    fn carries(&self, name: &str) -> bool {
        self.names.iter().any(|carried| carried == name)
    }
}

/// Tracks active deliveries, at most one per courier.
#[derive(Debug, Default)]
pub struct CourierDeliveryTracker {
    /// Active deliveries in start order.
    active: Vec<Delivery>,
    /// Item names per courier as of the end of the previous call.
    baseline: BTreeMap<String, Vec<String>>,
}

impl CourierDeliveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one tick of courier state.
    ///
    /// Gain detection runs over every courier before loss detection runs over
    /// every active delivery, so a delivery created this tick cannot also end
    /// this tick.
    pub fn advance<F>(
        &mut self,
        couriers: &BTreeMap<String, CourierState>,
        previous_view: Option<&PreviousSnapshotView>,
        hero_lookup: F,
        tick_time_ms: u64,
    ) -> Vec<DeliveryEvent>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut events = Vec::new();
        let observations: BTreeMap<&str, CourierObservation> = couriers
            .iter()
            .map(|(courier_id, state)| (courier_id.as_str(), CourierObservation::from_state(state)))
            .collect();

        for (&courier_id, observation) in &observations {
            let has_arrivals = match self.baseline.get(courier_id) {
                Some(known) => observation.names.iter().any(|name| !known.contains(name)),
                None => !observation.names.is_empty(),
            };

            let existing = self
                .active
                .iter()
                .position(|delivery| delivery.courier_id == courier_id);

            match existing {
                Some(index) => {
                    let delivery = &mut self.active[index];
                    if delivery.courier_alive != observation.alive {
                        delivery.courier_alive = observation.alive;
                        events.push(DeliveryEvent::LivenessChanged {
                            delivery_id: delivery.delivery_id.clone(),
                            courier_id: courier_id.to_string(),
                            alive: observation.alive,
                        });
                    }
                }
                None if has_arrivals => {
                    let delivery =
                        start_delivery(courier_id, observation, &hero_lookup, tick_time_ms);
                    events.push(DeliveryEvent::Started {
                        delivery_id: delivery.delivery_id.clone(),
                        courier_id: delivery.courier_id.clone(),
                        owner_player_key: delivery.owner_player_key.clone(),
                        hero_name: delivery.hero_name.clone(),
                        alive: delivery.courier_alive,
                    });
                    self.active.push(delivery);
                }
                None => {}
            }
        }

        // Without the transport's prior view nothing can be judged complete.
        if let Some(view) = previous_view {
            self.active.retain(|delivery| {
                let current = observations.get(delivery.courier_id.as_str());
                match departed_item(delivery, view, current) {
                    Some(item) => {
                        events.push(DeliveryEvent::Completed {
                            delivery_id: delivery.delivery_id.clone(),
                            courier_id: delivery.courier_id.clone(),
                            departed_item: item.to_string(),
                        });
                        false
                    }
                    None => true,
                }
            });
        }

        self.baseline = observations
            .into_iter()
            .map(|(courier_id, observation)| (courier_id.to_string(), observation.names))
            .collect();

        events
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.baseline.is_empty()
    }

    pub fn reset(&mut self) {
        self.active.clear();
        self.baseline.clear();
    }
}

fn start_delivery<F>(
    courier_id: &str,
    observation: &CourierObservation,
    hero_lookup: &F,
    tick_time_ms: u64,
) -> Delivery
where
    F: Fn(&str) -> Option<String>,
{
    let owner = observation.owner.and_then(slot_to_player_key);
    let hero_name = owner
        .as_deref()
        .and_then(hero_lookup)
        .unwrap_or_else(|| UNKNOWN_HERO.to_string());

    Delivery {
        delivery_id: format!("{courier_id}-{tick_time_ms}"),
        courier_id: courier_id.to_string(),
        owner_player_key: owner.unwrap_or_else(|| UNKNOWN_OWNER.to_string()),
        hero_name,
        items: observation
            .slot_items
            .iter()
            .map(|name| DeliveryItem { name: name.clone() })
            .collect(),
        start_time: tick_time_ms,
        courier_alive: observation.alive,
    }
}

// First tracked item that the prior view still listed but the courier no
// longer carries. A courier missing from this tick carries nothing.
fn departed_item<'a>(
    delivery: &'a Delivery,
    view: &PreviousSnapshotView,
    current: Option<&CourierObservation>,
) -> Option<&'a str> {
    let previous = view.courier_items(&delivery.courier_id)?;
    delivery
        .items
        .iter()
        .map(|item| item.name.as_str())
        .find(|name| {
            previous.contains(name) && !current.is_some_and(|courier| courier.carries(name))
        })
}
