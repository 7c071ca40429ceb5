//! Business-unit authorization engine.
//!
//! Decides which business units a caller may act on, combining the
//! caller's directory attribute, their role, and the registry's
//! transformation-enabled flags.
//!
//! The policy treats an attribute that matches no known unit as a
//! corporate or cross-cutting indicator and grants visibility over every
//! enabled unit. That default is deliberate and preserved from the
//! original product behavior; narrowing it is a product decision, not an
//! implementation one.

use crate::authz::registry::BusinessUnitRegistry;
use crate::authz::roles;
use crate::models::{AuthContext, BusinessUnit};
use std::sync::Arc;
use tracing::instrument;

/// Authorization engine over the business-unit registry.
pub struct AuthorizationEngine {
    registry: Arc<BusinessUnitRegistry>,
}

impl AuthorizationEngine {
    /// Create an engine over the given registry.
    #[must_use]
    pub fn new(registry: Arc<BusinessUnitRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this engine decides against.
    #[must_use]
    pub fn registry(&self) -> &BusinessUnitRegistry {
        &self.registry
    }

    /// Business units the caller is authorized for.
    ///
    /// Policy, evaluated in order:
    ///
    /// 1. privileged role - every enabled unit, independent of attribute;
    /// 2. empty attribute or empty role - no units (deny-all default);
    /// 3. attribute matches a known unit - that unit when enabled,
    ///    nothing when disabled;
    /// 4. attribute matches nothing - every enabled unit (corporate /
    ///    cross-cutting indicator).
    #[instrument(skip(self), name = "bff.authz.authorized_units")]
    pub async fn authorized_business_units(
        &self,
        caller_attribute: Option<&str>,
        role: &str,
    ) -> Vec<BusinessUnit> {
        if roles::is_privileged(role) {
            tracing::info!(
                target: "bff.authz.engine",
                role = %role,
                "Caller role grants access to all enabled business units"
            );
            return self.registry.all_enabled().await;
        }

        let attribute = caller_attribute.unwrap_or_default();
        if attribute.is_empty() || role.is_empty() {
            tracing::info!(
                target: "bff.authz.engine",
                attribute = %attribute,
                role = %role,
                "Caller attribute or role is empty, granting no business units"
            );
            return Vec::new();
        }

        let matched = self.registry.matching(attribute).await;
        if matched.is_empty() {
            // The attribute corresponds to no known unit - a corporate or
            // cross-cutting indicator code.
            tracing::info!(
                target: "bff.authz.engine",
                attribute = %attribute,
                "Caller attribute matches no business unit, granting all enabled units"
            );
            return self.registry.all_enabled().await;
        }

        let enabled = self.registry.enabled_matching(attribute).await;
        if enabled.is_empty() {
            tracing::info!(
                target: "bff.authz.engine",
                attribute = %attribute,
                "Caller's home business unit is not transformation enabled, granting no units"
            );
        } else {
            tracing::info!(
                target: "bff.authz.engine",
                attribute = %attribute,
                "Caller granted access to their home business unit"
            );
        }
        enabled
    }

    /// Whether the request's target unit is in the caller's authorized
    /// list.
    ///
    /// Never errors: an absent user-details payload or an empty authorized
    /// list simply denies.
    #[must_use]
    pub fn is_authorized_request(context: &AuthContext, requested_unit: &str) -> bool {
        let Some(details) = context.user_details.as_ref() else {
            tracing::warn!(
                target: "bff.authz.engine",
                "User details are empty for the request, so it is not authorized"
            );
            return false;
        };

        let matched =
            BusinessUnitRegistry::matching_in(requested_unit, &details.authorized_bunit_list);
        if matched.is_empty() {
            tracing::warn!(
                target: "bff.authz.engine",
                requested_unit = %requested_unit,
                "Requested business unit does not match the caller's authorized units"
            );
            false
        } else {
            tracing::info!(
                target: "bff.authz.engine",
                requested_unit = %requested_unit,
                "Requested business unit matched the caller's authorized units"
            );
            true
        }
    }
}
