//! Business-unit data access.
//!
//! The registry loads its snapshot through the [`BusinessUnitStore`]
//! trait; production uses the PostgreSQL implementation, tests inject the
//! in-memory mock.
//!
//! The source table uses the upstream wire names: `bunit_id`,
//! `bunit_name` and the `periscope_on` flag (`'Y'`/`'N'`), which maps to
//! the model's `transformation_enabled` bool.

use crate::errors::BffError;
use crate::models::BusinessUnit;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

/// Data-access collaborator supplying business-unit records in bulk.
#[async_trait]
pub trait BusinessUnitStore: Send + Sync {
    /// Fetch every business-unit record.
    ///
    /// # Errors
    ///
    /// Returns `BffError::Database` when the underlying source fails.
    async fn fetch_business_units(&self) -> Result<Vec<BusinessUnit>, BffError>;
}

/// PostgreSQL-backed business-unit store.
pub struct PgBusinessUnitStore {
    pool: PgPool,
}

impl PgBusinessUnitStore {
    /// Create a store over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessUnitStore for PgBusinessUnitStore {
    #[instrument(skip_all, name = "bff.repo.fetch_business_units")]
    async fn fetch_business_units(&self) -> Result<Vec<BusinessUnit>, BffError> {
        let rows = sqlx::query(
            r#"
            SELECT bunit_id, bunit_name, periscope_on
            FROM business_units
            ORDER BY bunit_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut units = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("bunit_id")?;
            let name: String = row.try_get("bunit_name")?;
            let flag: String = row.try_get("periscope_on")?;
            units.push(BusinessUnit {
                id,
                name,
                transformation_enabled: flag == "Y",
            });
        }

        tracing::debug!(
            target: "bff.repo.business_units",
            count = units.len(),
            "Fetched business unit records"
        );
        Ok(units)
    }
}

/// In-memory store implementations for tests.
pub mod mock {
    use super::{async_trait, BffError, BusinessUnit, BusinessUnitStore};
    use std::sync::Mutex;

    /// A store serving a fixed (replaceable) record set, with optional
    /// one-shot failure injection.
    pub struct StaticBusinessUnitStore {
        units: Mutex<Vec<BusinessUnit>>,
        fail_next: Mutex<Option<String>>,
    }

    impl StaticBusinessUnitStore {
        /// A store serving the given records.
        #[must_use]
        pub fn with_units(units: Vec<BusinessUnit>) -> Self {
            Self {
                units: Mutex::new(units),
                fail_next: Mutex::new(None),
            }
        }

        /// Replace the records served by subsequent fetches.
        pub fn replace(&self, units: Vec<BusinessUnit>) {
            if let Ok(mut guard) = self.units.lock() {
                *guard = units;
            }
        }

        /// Make the next fetch fail with the given message.
        pub fn fail_next_fetch(&self, message: &str) {
            if let Ok(mut guard) = self.fail_next.lock() {
                *guard = Some(message.to_string());
            }
        }
    }

    #[async_trait]
    impl BusinessUnitStore for StaticBusinessUnitStore {
        async fn fetch_business_units(&self) -> Result<Vec<BusinessUnit>, BffError> {
            if let Ok(mut guard) = self.fail_next.lock() {
                if let Some(message) = guard.take() {
                    return Err(BffError::Database(message));
                }
            }
            Ok(self
                .units
                .lock()
                .map_err(|_| BffError::Internal)?
                .clone())
        }
    }
}
