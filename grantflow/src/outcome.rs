//! Final result of one permission negotiation

use grantflow_api::PermissionDescriptor;
use serde::{Deserialize, Serialize};

use crate::platform::RequestPartition;

/// The terminal artifact of a batch: who got what.
///
/// `granted` and `denied` are disjoint, together cover every requested
/// name, and preserve declaration order. Denial and partial grant are
/// ordinary outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether every requested permission was granted
    pub all_granted: bool,
    /// Names of granted permissions, in declaration order
    pub granted: Vec<String>,
    /// Names of denied permissions, in declaration order
    pub denied: Vec<String>,
}

impl Outcome {
    /// Build the outcome for a granted/denied partition.
    ///
    /// Pure function: same partition in, bit-identical outcome out.
    pub fn from_partition(partition: &RequestPartition) -> Self {
        let granted = names(&partition.granted);
        let denied = names(&partition.denied);
        Self {
            all_granted: denied.is_empty(),
            granted,
            denied,
        }
    }
}

fn names(descriptors: &[PermissionDescriptor]) -> Vec<String> {
    descriptors.iter().map(|d| d.name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition() -> RequestPartition {
        RequestPartition::new(
            vec![PermissionDescriptor::dialog("camera")],
            vec![PermissionDescriptor::dialog("microphone")],
        )
    }

    #[test]
    fn test_partial_grant() {
        let outcome = Outcome::from_partition(&partition());
        assert!(!outcome.all_granted);
        assert_eq!(outcome.granted, vec!["camera"]);
        assert_eq!(outcome.denied, vec!["microphone"]);
    }

    #[test]
    fn test_all_granted_tracks_denied_emptiness() {
        let outcome = Outcome::from_partition(&RequestPartition::all_granted(vec![
            PermissionDescriptor::dialog("camera"),
        ]));
        assert!(outcome.all_granted);
        assert!(outcome.denied.is_empty());

        let empty = Outcome::from_partition(&RequestPartition::default());
        assert!(empty.all_granted);
        assert!(empty.granted.is_empty());
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let p = partition();
        assert_eq!(Outcome::from_partition(&p), Outcome::from_partition(&p));
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::from_partition(&partition());
        let json = serde_json::to_string(&outcome).unwrap();
        let back: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
