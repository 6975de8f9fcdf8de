//! Entry-form pass-through fields: auth mode and server region
//!
//! Neither influences the engine's transitions; both ride along into the
//! status view and the hand-off surface.

use serde::{Deserialize, Serialize};

/// Which tab of the entry form the identifier came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// New identifier plus region selection
    #[default]
    Signup,
    /// Existing identifier, no region selection
    Claim,
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuthMode::Signup => "signup",
            AuthMode::Claim => "claim",
        };
        write!(f, "{}", name)
    }
}

/// The selectable server regions, first entry is the default
pub const REGIONS: [&str; 4] = ["NA_EAST", "NA_WEST", "EU", "ASIA"];

/// Whether a region label is one of the selectable values
pub fn is_known_region(region: &str) -> bool {
    REGIONS.contains(&region)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_region_is_selectable() {
        assert!(is_known_region(crate::DEFAULT_REGION));
        assert_eq!(REGIONS[0], crate::DEFAULT_REGION);
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AuthMode::Claim).unwrap(), "\"claim\"");
        assert_eq!(AuthMode::default(), AuthMode::Signup);
    }
}
