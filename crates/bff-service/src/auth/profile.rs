//! User-details assembly from the edge proxy's user-claims header.
//!
//! The load balancer forwards the identity provider's profile claims in a
//! separate header alongside the access token. Its payload is decoded
//! without re-verification - the header only arrives over the trusted edge
//! hop - and combined with the authorization engine's decision into the
//! [`UserDetails`] attached to the request context.

use crate::authz::{AuthorizationEngine, RoleHierarchy};
use crate::models::UserDetails;
use common::jwt::decode_unverified;
use tracing::instrument;

/// Directory attribute claim carrying the caller's business unit.
const CLAIM_BUSINESS_UNIT: &str = "custom:bunit";

/// Claim carrying the caller's comma-separated role list.
const CLAIM_ROLES: &str = "custom:roles";

/// Claim carrying the caller's job title.
const CLAIM_JOB_TITLE: &str = "custom:jobtitle";

/// Assemble user details for an authenticated caller.
///
/// Returns `None` when the claims header is absent or undecodable; the
/// caller then carries no user details and downstream authorization
/// denies.
#[instrument(skip_all, name = "bff.auth.profile")]
pub async fn assemble_user_details(
    engine: &AuthorizationEngine,
    claims_document: Option<&str>,
    username: &str,
) -> Option<UserDetails> {
    let document = claims_document?;
    let decoded = match decode_unverified(document) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!(
                target: "bff.auth.profile",
                error = %e,
                "User claims header could not be decoded"
            );
            return None;
        }
    };
    let payload = decoded.payload;

    let claim = |name: &str| {
        payload
            .get(name)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    let attribute = payload
        .get(CLAIM_BUSINESS_UNIT)
        .and_then(|v| v.as_str())
        .map(ToString::to_string);

    let roles: Vec<String> = payload
        .get(CLAIM_ROLES)
        .and_then(|v| v.as_str())
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    // Prefer the highest recognized role; a caller with only directory
    // roles outside the hierarchy keeps their first raw role so the
    // engine's scoped-attribute branch still applies.
    let role = RoleHierarchy::regular()
        .highest_authority(&roles)
        .or_else(|| roles.first().cloned());
    let authorized_bunit_list = engine
        .authorized_business_units(attribute.as_deref(), role.as_deref().unwrap_or_default())
        .await;

    Some(UserDetails {
        authorized_bunit_list,
        email: claim("email"),
        first_name: claim("given_name"),
        last_name: claim("family_name"),
        job_title: claim(CLAIM_JOB_TITLE),
        username: username.to_string(),
        role,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::authz::BusinessUnitRegistry;
    use crate::models::BusinessUnit;
    use crate::repositories::mock::StaticBusinessUnitStore;
    use bff_test_utils::user_claims_header;
    use std::sync::Arc;

    async fn engine_with(units: Vec<BusinessUnit>) -> AuthorizationEngine {
        let store = Arc::new(StaticBusinessUnitStore::with_units(units));
        let registry = Arc::new(BusinessUnitRegistry::new(store));
        registry.reload().await.unwrap();
        AuthorizationEngine::new(registry)
    }

    fn fixture_units() -> Vec<BusinessUnit> {
        vec![
            BusinessUnit::new("001", "Jackson Division", true),
            BusinessUnit::new("002", "Atlanta Division", false),
            BusinessUnit::new("003", "Jacksonville Division", true),
        ]
    }

    #[tokio::test]
    async fn test_missing_header_yields_no_details() {
        let engine = engine_with(fixture_units()).await;

        let details = assemble_user_details(&engine, None, "jdoe").await;
        assert!(details.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_header_yields_no_details() {
        let engine = engine_with(fixture_units()).await;

        let details = assemble_user_details(&engine, Some("garbage"), "jdoe").await;
        assert!(details.is_none());
    }

    #[tokio::test]
    async fn test_privileged_caller_gets_all_enabled_units() {
        let engine = engine_with(fixture_units()).await;
        let header =
            user_claims_header("jdoe", "jane.doe@example.com", "Jane", "Doe", "002", "appadmin");

        let details = assemble_user_details(&engine, Some(&header), "jdoe")
            .await
            .unwrap();

        assert_eq!(details.role.as_deref(), Some("appadmin"));
        assert_eq!(details.username, "jdoe");
        assert_eq!(details.first_name, "Jane");
        assert_eq!(details.email, "jane.doe@example.com");
        let ids: Vec<&str> = details
            .authorized_bunit_list
            .iter()
            .map(|u| u.id.as_str())
            .collect();
        assert_eq!(ids, vec!["001", "003"]);
    }

    #[tokio::test]
    async fn test_scoped_caller_gets_home_unit() {
        let engine = engine_with(fixture_units()).await;
        let header = user_claims_header(
            "jdoe",
            "jane.doe@example.com",
            "Jane",
            "Doe",
            "001",
            "pricing_viewer",
        );

        let details = assemble_user_details(&engine, Some(&header), "jdoe")
            .await
            .unwrap();

        // Unrecognized role falls through as-is; the caller's enabled home
        // unit is granted.
        assert_eq!(details.role.as_deref(), Some("pricing_viewer"));
        assert_eq!(
            details.authorized_bunit_list,
            vec![BusinessUnit::new("001", "Jackson Division", true)]
        );
    }

    #[tokio::test]
    async fn test_caller_without_roles_gets_nothing() {
        let engine = engine_with(fixture_units()).await;
        let header =
            user_claims_header("jdoe", "jane.doe@example.com", "Jane", "Doe", "001", "");

        let details = assemble_user_details(&engine, Some(&header), "jdoe")
            .await
            .unwrap();

        assert_eq!(details.role, None);
        assert!(details.authorized_bunit_list.is_empty());
    }

    #[tokio::test]
    async fn test_roles_are_split_and_trimmed() {
        let engine = engine_with(fixture_units()).await;
        let header = user_claims_header(
            "jdoe",
            "jane.doe@example.com",
            "Jane",
            "Doe",
            "001",
            "otherRole, generaluser ,appadmin",
        );

        let details = assemble_user_details(&engine, Some(&header), "jdoe")
            .await
            .unwrap();

        assert_eq!(details.role.as_deref(), Some("appadmin"));
    }
}
