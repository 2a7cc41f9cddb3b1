//! Actor roles in the aid approval chain.
//!
//! Roles form a closed set; every operation dispatches on an explicit
//! match between the passed role and the state machine's cursor rather
//! than comparing open-ended strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of the actor performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    /// Receives aid and submits requests and liquidations.
    Beneficiary,
    /// First-level reviewer; handles the physical handoff to beneficiaries.
    Caseworker,
    /// Second-level reviewer; releases approved funds.
    Finance,
    /// Final reviewer.
    Director,
    /// Administrative access, including the ledger repair tool.
    Admin,
}

impl ActorRole {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beneficiary" => Some(Self::Beneficiary),
            "caseworker" => Some(Self::Caseworker),
            "finance" => Some(Self::Finance),
            "director" => Some(Self::Director),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beneficiary => "beneficiary",
            Self::Caseworker => "caseworker",
            Self::Finance => "finance",
            Self::Director => "director",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(ActorRole::parse("beneficiary"), Some(ActorRole::Beneficiary));
        assert_eq!(ActorRole::parse("CASEWORKER"), Some(ActorRole::Caseworker));
        assert_eq!(ActorRole::parse("Finance"), Some(ActorRole::Finance));
        assert_eq!(ActorRole::parse("director"), Some(ActorRole::Director));
        assert_eq!(ActorRole::parse("admin"), Some(ActorRole::Admin));
        assert_eq!(ActorRole::parse("invalid"), None);
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(ActorRole::Beneficiary.as_str(), "beneficiary");
        assert_eq!(ActorRole::Caseworker.as_str(), "caseworker");
        assert_eq!(ActorRole::Finance.as_str(), "finance");
        assert_eq!(ActorRole::Director.as_str(), "director");
        assert_eq!(ActorRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_role_display_round_trip() {
        for role in [
            ActorRole::Beneficiary,
            ActorRole::Caseworker,
            ActorRole::Finance,
            ActorRole::Director,
            ActorRole::Admin,
        ] {
            assert_eq!(ActorRole::parse(&role.to_string()), Some(role));
        }
    }
}
