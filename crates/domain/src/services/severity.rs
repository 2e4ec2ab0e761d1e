//! Severity classifier: (zone type, transition type) -> severity.

use crate::models::geofence_event::{Severity, TransitionType};
use crate::models::zone::ZoneType;

/// Fixed classification table for zone-scoped transitions.
const SEVERITY_TABLE: &[(ZoneType, TransitionType, Severity)] = &[
    (ZoneType::Restricted, TransitionType::Entry, Severity::Critical),
    (ZoneType::Restricted, TransitionType::Exit, Severity::Low),
    (ZoneType::Quarantine, TransitionType::Entry, Severity::Medium),
    (ZoneType::Quarantine, TransitionType::Exit, Severity::Critical),
    (ZoneType::Grazing, TransitionType::Entry, Severity::Low),
    (ZoneType::Grazing, TransitionType::Exit, Severity::Medium),
    (ZoneType::Watering, TransitionType::Entry, Severity::Low),
    (ZoneType::Watering, TransitionType::Exit, Severity::Low),
    (ZoneType::Shelter, TransitionType::Entry, Severity::Low),
    (ZoneType::Shelter, TransitionType::Exit, Severity::Low),
];

/// Severity for unmapped (zone type, transition) combinations.
pub const DEFAULT_SEVERITY: Severity = Severity::Medium;

/// Classifies a zone-scoped transition.
pub fn classify(zone_type: ZoneType, transition: TransitionType) -> Severity {
    SEVERITY_TABLE
        .iter()
        .find(|(zt, tt, _)| *zt == zone_type && *tt == transition)
        .map(|(_, _, severity)| *severity)
        .unwrap_or(DEFAULT_SEVERITY)
}

/// Classifies a transition with no specific zone.
///
/// A boundary violation is always high, a prolonged-absence timeout always
/// critical; these override the table.
pub fn classify_zoneless(transition: TransitionType) -> Severity {
    match transition {
        TransitionType::Violation => Severity::High,
        TransitionType::Timeout => Severity::Critical,
        _ => DEFAULT_SEVERITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_entry_is_critical() {
        assert_eq!(
            classify(ZoneType::Restricted, TransitionType::Entry),
            Severity::Critical
        );
    }

    #[test]
    fn test_quarantine_exit_is_critical() {
        assert_eq!(
            classify(ZoneType::Quarantine, TransitionType::Exit),
            Severity::Critical
        );
    }

    #[test]
    fn test_watering_exit_is_low() {
        assert_eq!(
            classify(ZoneType::Watering, TransitionType::Exit),
            Severity::Low
        );
    }

    #[test]
    fn test_grazing_transitions() {
        assert_eq!(
            classify(ZoneType::Grazing, TransitionType::Entry),
            Severity::Low
        );
        assert_eq!(
            classify(ZoneType::Grazing, TransitionType::Exit),
            Severity::Medium
        );
    }

    #[test]
    fn test_unmapped_combination_defaults_to_medium() {
        // No table entry exists for zone-scoped timeout or return transitions
        assert_eq!(
            classify(ZoneType::Grazing, TransitionType::Timeout),
            Severity::Medium
        );
        assert_eq!(
            classify(ZoneType::Shelter, TransitionType::Return),
            Severity::Medium
        );
    }

    #[test]
    fn test_zoneless_overrides() {
        assert_eq!(classify_zoneless(TransitionType::Violation), Severity::High);
        assert_eq!(
            classify_zoneless(TransitionType::Timeout),
            Severity::Critical
        );
        assert_eq!(classify_zoneless(TransitionType::Entry), Severity::Medium);
    }
}
