//! In-memory business-unit registry.
//!
//! Holds the authoritative list of business units and their
//! transformation-enabled flags, loaded in bulk from a
//! [`BusinessUnitStore`] collaborator. The snapshot is replaced wholesale
//! on reload - concurrent readers see either the old or the new set,
//! never a partial one.

use crate::errors::BffError;
use crate::models::BusinessUnit;
use crate::observability::metrics;
use crate::repositories::BusinessUnitStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

/// Registry over the business-unit snapshot.
pub struct BusinessUnitRegistry {
    /// Data-access collaborator supplying the records.
    store: Arc<dyn BusinessUnitStore>,

    /// Current snapshot; empty until the first successful reload.
    units: RwLock<Vec<BusinessUnit>>,
}

impl BusinessUnitRegistry {
    /// Create an empty registry over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn BusinessUnitStore>) -> Self {
        Self {
            store,
            units: RwLock::new(Vec::new()),
        }
    }

    /// Replace the snapshot with a fresh fetch from the store.
    ///
    /// Returns the number of records loaded.
    ///
    /// # Errors
    ///
    /// Returns `BffError::Database` when the store fetch fails; the
    /// previous snapshot stays in place.
    #[instrument(skip_all, name = "bff.authz.registry.reload")]
    pub async fn reload(&self) -> Result<usize, BffError> {
        let fresh = self.store.fetch_business_units().await?;
        let count = fresh.len();

        {
            let mut units = self.units.write().await;
            *units = fresh;
        }

        metrics::record_registry_reload(count);
        tracing::info!(
            target: "bff.authz.registry",
            business_units = count,
            "Business unit registry reloaded"
        );
        Ok(count)
    }

    /// The current snapshot.
    pub async fn all(&self) -> Vec<BusinessUnit> {
        self.units.read().await.clone()
    }

    /// Number of records currently loaded.
    pub async fn len(&self) -> usize {
        self.units.read().await.len()
    }

    /// Whether the registry holds no records.
    pub async fn is_empty(&self) -> bool {
        self.units.read().await.is_empty()
    }

    /// Records from an arbitrary list whose id equals the given unit id.
    #[must_use]
    pub fn matching_in(unit_id: &str, units: &[BusinessUnit]) -> Vec<BusinessUnit> {
        units
            .iter()
            .filter(|unit| unit.id == unit_id)
            .cloned()
            .collect()
    }

    /// Records in the snapshot whose id equals the given unit id.
    pub async fn matching(&self, unit_id: &str) -> Vec<BusinessUnit> {
        Self::matching_in(unit_id, &self.units.read().await)
    }

    /// Matching records that are also transformation-enabled.
    pub async fn enabled_matching(&self, unit_id: &str) -> Vec<BusinessUnit> {
        self.units
            .read()
            .await
            .iter()
            .filter(|unit| unit.id == unit_id && unit.transformation_enabled)
            .cloned()
            .collect()
    }

    /// Every transformation-enabled record; empty if the registry is
    /// unloaded.
    pub async fn all_enabled(&self) -> Vec<BusinessUnit> {
        self.units
            .read()
            .await
            .iter()
            .filter(|unit| unit.transformation_enabled)
            .cloned()
            .collect()
    }
}
