//! Enumeration types for the access terminal
//!
//! This module contains the facility zones, visit states and the policy
//! applied when a student enters a zone they are already recorded in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Facility partition a student may occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Male restroom
    Male,
    /// Female restroom
    Female,
}

impl Zone {
    /// All zones, in display order
    pub const ALL: [Zone; 2] = [Zone::Male, Zone::Female];

    /// Label shown on the kiosk header
    pub fn display_label(&self) -> &'static str {
        match self {
            Zone::Male => "Banheiro Masculino",
            Zone::Female => "Banheiro Feminino",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Male => write!(f, "male"),
            Zone::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "masculino" => Ok(Zone::Male),
            "female" | "f" | "feminino" => Ok(Zone::Female),
            _ => Err(format!("Unknown zone: {}", s)),
        }
    }
}

/// Lifecycle state of a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    /// Student is inside the zone
    Open,
    /// Exit recorded; terminal state
    Closed,
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitStatus::Open => write!(f, "open"),
            VisitStatus::Closed => write!(f, "closed"),
        }
    }
}

/// What the ledger does when an entry is registered for a student who
/// already has an open visit in the same zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RepeatEntryPolicy {
    /// Always append a new open visit (each entry event is its own ledger line)
    #[default]
    Stack,
    /// Hand back the most recent open visit instead of creating another
    ReuseOpen,
}

impl fmt::Display for RepeatEntryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepeatEntryPolicy::Stack => write!(f, "stack"),
            RepeatEntryPolicy::ReuseOpen => write!(f, "reuse_open"),
        }
    }
}

impl FromStr for RepeatEntryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "stack" => Ok(RepeatEntryPolicy::Stack),
            "reuse_open" | "reuse" => Ok(RepeatEntryPolicy::ReuseOpen),
            _ => Err(format!("Unknown repeat entry policy: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_parsing() {
        assert_eq!("male".parse::<Zone>().unwrap(), Zone::Male);
        assert_eq!("Feminino".parse::<Zone>().unwrap(), Zone::Female);
        assert_eq!(" F ".parse::<Zone>().unwrap(), Zone::Female);
        assert!("unisex".parse::<Zone>().is_err());
    }

    #[test]
    fn test_zone_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Zone::Female).unwrap(), "\"female\"");
        let zone: Zone = serde_json::from_str("\"male\"").unwrap();
        assert_eq!(zone, Zone::Male);
    }

    #[test]
    fn test_zone_display_round_trips_through_from_str() {
        for zone in Zone::ALL {
            assert_eq!(zone.to_string().parse::<Zone>().unwrap(), zone);
            assert!(!zone.display_label().is_empty());
        }
    }

    #[test]
    fn test_repeat_entry_policy() {
        assert_eq!(RepeatEntryPolicy::default(), RepeatEntryPolicy::Stack);
        assert_eq!("reuse-open".parse::<RepeatEntryPolicy>().unwrap(), RepeatEntryPolicy::ReuseOpen);
        assert_eq!(
            serde_json::to_string(&RepeatEntryPolicy::ReuseOpen).unwrap(),
            "\"reuse_open\""
        );
        assert!("merge".parse::<RepeatEntryPolicy>().is_err());
    }
}
