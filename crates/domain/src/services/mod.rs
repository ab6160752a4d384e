//! Booking services.
//!
//! Each service is cheap to clone and shares the same store, clock and
//! policy. [`BookingServices`] wires them together.

pub mod availability;
pub mod catalog;
pub mod court_registry;
pub mod disablement;
pub mod lifecycle;
pub mod reputation;
pub mod stats;

use std::sync::Arc;

use crate::clock::Clock;
use crate::policy::BookingPolicy;
use crate::store::BookingStore;

pub use availability::{AvailabilityChecker, SlotAvailability};
pub use catalog::{standard_catalog, CatalogReport};
pub use court_registry::CourtRegistry;
pub use disablement::DisablementScheduler;
pub use lifecycle::{ReservationLifecycle, SweepReport, SweepSummary};
pub use reputation::ReputationLedger;
pub use stats::{compute_system_stats, StatsService};

/// All booking services over one store.
#[derive(Clone)]
pub struct BookingServices {
    pub courts: CourtRegistry,
    pub availability: AvailabilityChecker,
    pub lifecycle: ReservationLifecycle,
    pub reputation: ReputationLedger,
    pub disablement: DisablementScheduler,
    pub stats: StatsService,
    pub policy: BookingPolicy,
}

impl BookingServices {
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>, policy: BookingPolicy) -> Self {
        let courts = CourtRegistry::new(store.clone());
        let availability = AvailabilityChecker::new(store.clone(), clock.clone(), policy);
        let reputation = ReputationLedger::new(store.clone(), clock.clone());
        let lifecycle = ReservationLifecycle::new(
            store.clone(),
            clock.clone(),
            policy,
            availability.clone(),
            reputation.clone(),
        );
        let disablement = DisablementScheduler::new(courts.clone(), clock.clone(), policy);
        let stats = StatsService::new(store, clock, policy);

        Self {
            courts,
            availability,
            lifecycle,
            reputation,
            disablement,
            stats,
            policy,
        }
    }
}
