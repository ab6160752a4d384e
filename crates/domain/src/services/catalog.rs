//! Standard court catalog bootstrap.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::DomainResult;
use crate::models::{Court, Sport};
use crate::services::court_registry::CourtRegistry;

/// Courts per sport and their minimum party size, in display order.
const CATALOG: [(Sport, usize, i32); 4] = [
    (Sport::Basketball, 4, 4),
    (Sport::Volleyball, 2, 6),
    (Sport::Padel, 1, 2),
    (Sport::Football, 2, 10),
];

/// Outcome of [`CourtRegistry::ensure_catalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
    /// Stored courts that are not part of the catalog. Never deleted.
    pub unexpected: Vec<String>,
}

/// The venue's standard courts, numbered per sport ("Court 2 - Football").
/// Display order runs across the whole catalog.
pub fn standard_catalog() -> Vec<Court> {
    let mut courts = Vec::new();
    let mut order = 0;
    for (sport, count, minimum_party_size) in CATALOG {
        for number in 1..=count {
            order += 1;
            courts.push(Court::new(
                format!("Court {} - {}", number, sport.label()),
                sport,
                minimum_party_size,
                order,
            ));
        }
    }
    courts
}

impl CourtRegistry {
    /// Inserts every catalog court missing by name.
    ///
    /// Existing courts keep their state, so repeated or concurrent calls are
    /// harmless.
    pub async fn ensure_catalog(&self) -> DomainResult<CatalogReport> {
        let mut report = CatalogReport::default();
        let catalog = standard_catalog();

        for court in &catalog {
            if self.store().insert_court_if_absent(court).await? {
                report.created.push(court.name.clone());
            } else {
                report.existing.push(court.name.clone());
            }
        }

        let expected: HashSet<&str> = catalog.iter().map(|c| c.name.as_str()).collect();
        report.unexpected = self
            .list_courts()
            .await?
            .into_iter()
            .filter(|c| !expected.contains(c.name.as_str()))
            .map(|c| c.name)
            .collect();

        if !report.unexpected.is_empty() {
            warn!(courts = ?report.unexpected, "Courts outside the standard catalog");
        }
        info!(
            created = report.created.len(),
            existing = report.existing.len(),
            "Court catalog ensured"
        );
        Ok(report)
    }
}
