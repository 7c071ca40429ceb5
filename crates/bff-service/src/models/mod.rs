//! Pricing BFF models.
//!
//! Contains data types used across the service. Field names on the JSON
//! surface follow the frontend's existing contract (camelCase for request
//! bodies and user details, `bunit_*` wire names for business units).

use serde::{Deserialize, Serialize};

/// Application name reported by the support endpoints.
pub const APP_NAME: &str = "Pricing BFF";

/// Application version reported by the support endpoints.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A business unit (tenant) scope.
///
/// `transformation_enabled` gates whether pricing features are active for
/// the unit; the data source encodes it as `periscope_on = "Y"/"N"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessUnit {
    /// Business unit identifier (e.g. "001").
    #[serde(rename = "bunit_id")]
    pub id: String,

    /// Human-readable business unit name.
    #[serde(rename = "bunit_name")]
    pub name: String,

    /// Whether pricing transformation features are enabled for this unit.
    pub transformation_enabled: bool,
}

impl BusinessUnit {
    /// Convenience constructor for tests and fixtures.
    #[must_use]
    pub fn new(id: &str, name: &str, transformation_enabled: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            transformation_enabled,
        }
    }
}

/// The result of token validation.
///
/// Authentication failures are values carrying a display-safe cause; they
/// are never surfaced as errors. Infrastructure failures travel separately
/// as `BffError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    /// Whether the bearer token authenticated the caller.
    pub authenticated: bool,

    /// The real username (second half of the composite claim) on success.
    pub username: Option<String>,

    /// Human-readable rejection reason on failure.
    pub cause: Option<String>,
}

impl AuthOutcome {
    /// A successful outcome for the given username.
    #[must_use]
    pub fn authenticated(username: String) -> Self {
        Self {
            authenticated: true,
            username: Some(username),
            cause: None,
        }
    }

    /// A rejected outcome with a display-safe cause.
    #[must_use]
    pub fn rejected(cause: &str) -> Self {
        Self {
            authenticated: false,
            username: None,
            cause: Some(cause.to_string()),
        }
    }
}

/// User details assembled for an authenticated caller.
///
/// Serialized shape matches the frontend contract (camelCase, with the
/// authorized units under `authorizedBunitList`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    /// Business units the caller may act on.
    pub authorized_bunit_list: Vec<BusinessUnit>,

    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub username: String,

    /// The caller's highest-authority recognized role, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Identity context attached to every request that passes the gatekeeper.
///
/// Allowlisted paths carry a default (unauthenticated, detail-less)
/// context; the login path carries whatever the validator produced.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The validator's outcome for this request.
    pub outcome: AuthOutcome,

    /// Assembled user details; `None` when the caller is unauthenticated or
    /// the user-claims header was missing/undecodable.
    pub user_details: Option<UserDetails>,
}

impl AuthContext {
    /// Context for paths that bypass authentication.
    #[must_use]
    pub fn bypassed() -> Self {
        Self {
            outcome: AuthOutcome {
                authenticated: false,
                username: None,
                cause: None,
            },
            user_details: None,
        }
    }
}

/// Request body for the pricing-data endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingDataRequest {
    /// Business unit the price is requested for; gated against the
    /// caller's authorized list.
    pub business_unit_number: String,

    pub customer_account: String,
    pub price_request_date: String,

    /// Product payload forwarded verbatim to the pricing engine.
    pub product: serde_json::Value,

    /// Quantity for pci-price requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_quantity: Option<i64>,
}

/// Aggregated pricing response: both downstream price views side by side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedPricingResponse {
    pub product_prices: serde_json::Value,
    pub pci_prices: serde_json::Value,
}

/// S3 transfer direction for batch file operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchSource {
    /// Files uploaded by the user for processing.
    Input,
    /// Processed files available for download.
    Output,
}

impl BatchSource {
    /// Parse a path segment into a source, rejecting anything else.
    #[must_use]
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "input" => Some(BatchSource::Input),
            "output" => Some(BatchSource::Output),
            _ => None,
        }
    }

    /// The path segment for this source.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BatchSource::Input => "input",
            BatchSource::Output => "output",
        }
    }
}

/// Support endpoint response (healthcheck and status).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfoResponse {
    pub app_name: &'static str,
    pub app_version: &'static str,

    /// Number of business units currently loaded (status endpoint only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_units_loaded: Option<usize>,
}

/// Login flow response for unauthenticated browser calls.
///
/// The login endpoint renders its own failure payload instead of a hard
/// 401 so the frontend can show its error page.
#[derive(Debug, Clone, Serialize)]
pub struct LoginFailureResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_business_unit_wire_names() {
        let unit = BusinessUnit::new("001", "Jackson Division", true);
        let json = serde_json::to_value(&unit).unwrap();

        assert_eq!(json["bunit_id"], "001");
        assert_eq!(json["bunit_name"], "Jackson Division");
        assert_eq!(json["transformation_enabled"], true);
    }

    #[test]
    fn test_user_details_camel_case() {
        let details = UserDetails {
            authorized_bunit_list: vec![BusinessUnit::new("001", "Jackson Division", true)],
            email: "jane.doe@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            job_title: "Pricing Analyst".to_string(),
            username: "jdoe".to_string(),
            role: Some("appadmin".to_string()),
        };

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["authorizedBunitList"][0]["bunit_id"], "001");
        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["jobTitle"], "Pricing Analyst");
        assert_eq!(json["role"], "appadmin");
    }

    #[test]
    fn test_pricing_request_camel_case() {
        let body = serde_json::json!({
            "businessUnitNumber": "001",
            "customerAccount": "700001",
            "priceRequestDate": "20240801",
            "product": {"supc": "1000001"},
            "requestedQuantity": 4
        });

        let request: PricingDataRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.business_unit_number, "001");
        assert_eq!(request.requested_quantity, Some(4));
    }

    #[test]
    fn test_batch_source_parse() {
        assert_eq!(BatchSource::parse("input"), Some(BatchSource::Input));
        assert_eq!(BatchSource::parse("output"), Some(BatchSource::Output));
        assert_eq!(BatchSource::parse("archive"), None);
        assert_eq!(BatchSource::parse(""), None);
    }

    #[test]
    fn test_auth_outcome_constructors() {
        let ok = AuthOutcome::authenticated("jdoe".to_string());
        assert!(ok.authenticated);
        assert_eq!(ok.username.as_deref(), Some("jdoe"));
        assert!(ok.cause.is_none());

        let rejected = AuthOutcome::rejected("Not a valid JWT token");
        assert!(!rejected.authenticated);
        assert!(rejected.username.is_none());
        assert_eq!(rejected.cause.as_deref(), Some("Not a valid JWT token"));
    }
}
