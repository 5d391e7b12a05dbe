//! Webhook event names.
//!
//! The incident system emits three notifications. Each one has its own
//! endpoint on the fixture and its own key in the call log, and the wire
//! name doubles as both the route segment and the JSON key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies which webhook endpoint a call arrived on.
///
/// Variants order the keys of a [`CallSnapshot`](crate::CallSnapshot), so
/// snapshots always list events in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    /// A new incident was created.
    IncidentAdded,
    /// An existing incident changed state or description.
    IncidentUpdated,
    /// A file was attached to an incident.
    IncidentAttached,
}

impl EventName {
    /// Every event the fixture records, in route registration order.
    pub const ALL: [Self; 3] = [Self::IncidentAdded, Self::IncidentUpdated, Self::IncidentAttached];

    /// Wire name used for the route segment and the snapshot key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IncidentAdded => "incidentAdded",
            Self::IncidentUpdated => "incidentUpdated",
            Self::IncidentAttached => "incidentAttached",
        }
    }

    /// Route path that receives this event, e.g. `/incidentAdded`.
    pub fn path(self) -> String {
        format!("/{}", self.as_str())
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_serde_representation() {
        for event in EventName::ALL {
            let json = serde_json::to_value(event).unwrap();
            assert_eq!(json, serde_json::Value::String(event.as_str().to_string()));
        }
    }

    #[test]
    fn paths_are_rooted() {
        assert_eq!(EventName::IncidentAdded.path(), "/incidentAdded");
        assert_eq!(EventName::IncidentUpdated.path(), "/incidentUpdated");
        assert_eq!(EventName::IncidentAttached.path(), "/incidentAttached");
    }

    #[test]
    fn display_uses_wire_name() {
        assert_eq!(EventName::IncidentAttached.to_string(), "incidentAttached");
    }
}
