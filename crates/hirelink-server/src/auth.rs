//! Role-based capability mapping.
//!
//! Roles are a closed sum type and the permission table is a pure function
//! over them, so an unknown role is unrepresentable.

use serde::{Deserialize, Serialize};

/// Platform roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Job seeker: funds referral requests from their wallet.
    Seeker,
    /// Referrer: claims requests and earns withdrawable payouts.
    Referrer,
    /// Platform administrator.
    Admin,
}

/// Individual capabilities gating wallet and referral operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewWallet,
    RechargeWallet,
    DebitWallet,
    CreateReferralRequest,
    ClaimReferralRequest,
    Withdraw,
    ManageWithdrawals,
}

/// Returns the capability set for a role.
pub fn capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Seeker => &[
            Capability::ViewWallet,
            Capability::RechargeWallet,
            Capability::DebitWallet,
            Capability::CreateReferralRequest,
        ],
        Role::Referrer => &[
            Capability::ViewWallet,
            Capability::ClaimReferralRequest,
            Capability::Withdraw,
        ],
        Role::Admin => &[
            Capability::ViewWallet,
            Capability::RechargeWallet,
            Capability::DebitWallet,
            Capability::CreateReferralRequest,
            Capability::ClaimReferralRequest,
            Capability::Withdraw,
            Capability::ManageWithdrawals,
        ],
    }
}

/// Returns true if the role grants the capability.
pub fn has_capability(role: Role, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeker_capabilities() {
        assert!(has_capability(Role::Seeker, Capability::RechargeWallet));
        assert!(has_capability(Role::Seeker, Capability::CreateReferralRequest));
        assert!(!has_capability(Role::Seeker, Capability::ClaimReferralRequest));
        assert!(!has_capability(Role::Seeker, Capability::Withdraw));
    }

    #[test]
    fn test_referrer_capabilities() {
        assert!(has_capability(Role::Referrer, Capability::ClaimReferralRequest));
        assert!(has_capability(Role::Referrer, Capability::Withdraw));
        assert!(!has_capability(Role::Referrer, Capability::ManageWithdrawals));
    }

    #[test]
    fn test_admin_has_everything() {
        for capability in [
            Capability::ViewWallet,
            Capability::RechargeWallet,
            Capability::DebitWallet,
            Capability::CreateReferralRequest,
            Capability::ClaimReferralRequest,
            Capability::Withdraw,
            Capability::ManageWithdrawals,
        ] {
            assert!(has_capability(Role::Admin, capability));
        }
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Seeker).unwrap(), "\"seeker\"");
        assert_eq!(
            serde_json::to_string(&Role::Referrer).unwrap(),
            "\"referrer\""
        );
    }
}
