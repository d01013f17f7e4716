// Domain layer: snapshot model and the synchronous derivation rules.

pub mod damage;
pub mod delivery;
pub mod lifecycle;
pub mod ports;
pub mod slot;
pub mod snapshot;

pub use damage::{DamageAccumulator, PlayerDamageState};
pub use delivery::{CourierDeliveryTracker, Delivery, DeliveryEvent, DeliveryItem};
pub use lifecycle::{ActivePhasePolicy, MatchLifecycle, PhaseDecision};
pub use ports::{Clock, SystemClock};
pub use snapshot::Snapshot;
