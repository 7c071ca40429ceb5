//! User roles and the role-authority hierarchy.
//!
//! Roles arrive as plain strings from the identity provider's directory
//! attributes. Unrecognized values are meaningful to the policy (they make
//! a caller non-privileged but not absent), so roles stay strings at the
//! engine boundary; this module provides the fixed classification tables.

/// Application administrator - sees every enabled business unit.
pub const ROLE_APP_ADMIN: &str = "appadmin";

/// General user - sees every enabled business unit.
pub const ROLE_GENERAL_USER: &str = "generaluser";

/// Price-zone reviewer role.
pub const ROLE_CIPZ_REVIEWER: &str = "cipz_reviewer";

/// Price-zone submitter role.
pub const ROLE_CIPZ_SUBMITTER: &str = "cipz_submitter";

/// Sentinel above every real hierarchy number.
const MAX_ROLE_HIERARCHY_NUMBER: u32 = 10_000;

/// Whether a role grants visibility over all enabled business units.
#[must_use]
pub fn is_privileged(role: &str) -> bool {
    role == ROLE_APP_ADMIN || role == ROLE_GENERAL_USER
}

/// A static role→authority-number table. Lower number means higher
/// authority.
pub struct RoleHierarchy {
    table: &'static [(&'static str, u32)],
}

impl RoleHierarchy {
    /// The regular application role hierarchy.
    #[must_use]
    pub fn regular() -> Self {
        Self {
            table: &[(ROLE_APP_ADMIN, 1), (ROLE_GENERAL_USER, 2)],
        }
    }

    /// The price-zone (CIPZ) role hierarchy.
    #[must_use]
    pub fn cipz() -> Self {
        Self {
            table: &[(ROLE_CIPZ_REVIEWER, 1), (ROLE_CIPZ_SUBMITTER, 2)],
        }
    }

    /// The hierarchy number for a role, if recognized.
    #[must_use]
    pub fn number_for(&self, role: &str) -> Option<u32> {
        self.table
            .iter()
            .find(|(name, _)| *name == role)
            .map(|(_, number)| *number)
    }

    /// Select the highest-authority recognized role from the input.
    ///
    /// Walks the input in order; a role only replaces the current selection
    /// when its number is strictly lower, so the first-seen role wins ties.
    /// Returns `None` when no role is recognized.
    #[must_use]
    pub fn highest_authority<S: AsRef<str>>(&self, roles: &[S]) -> Option<String> {
        let mut selected: Option<&str> = None;
        let mut selected_number = MAX_ROLE_HIERARCHY_NUMBER;

        for role in roles {
            let role = role.as_ref();
            if let Some(number) = self.number_for(role) {
                if number < selected_number {
                    selected = Some(role);
                    selected_number = number;
                }
            }
        }

        if let Some(role) = selected {
            tracing::info!(
                target: "bff.authz.roles",
                role = %role,
                "Selected the caller's highest-authority role"
            );
        }
        selected.map(ToString::to_string)
    }
}
