/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the workspace, the session store and the report compositor.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One physical site with its before/after photo sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Opaque identifier, stable for the location's lifetime
    pub id: String,
    /// User-supplied label, never empty
    pub name: String,
    /// Encoded photos in capture order
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Location {
    /// Create an empty location with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            before: Vec::new(),
            after: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn status(&self) -> LocationStatus {
        match (self.before.is_empty(), self.after.is_empty()) {
            (false, false) => LocationStatus::Complete,
            (false, true) => LocationStatus::BeforeOnly,
            _ => LocationStatus::Empty,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == LocationStatus::Complete
    }

    /// Number of report rows: the longer of the two sequences
    pub fn pair_count(&self) -> usize {
        self.before.len().max(self.after.len())
    }

    pub fn photos(&self, mode: ShootMode) -> &[String] {
        match mode {
            ShootMode::Before => &self.before,
            ShootMode::After => &self.after,
        }
    }

    pub fn photos_mut(&mut self, mode: ShootMode) -> &mut Vec<String> {
        match mode {
            ShootMode::Before => &mut self.before,
            ShootMode::After => &mut self.after,
        }
    }
}

/// Which sequence of a location a photo belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShootMode {
    Before,
    After,
}

/// Derived capture progress of a location (never stored)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStatus {
    Empty,
    BeforeOnly,
    Complete,
}

/// Durable snapshot of every location at save time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub locations: Vec<Location>,
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location_with(before: usize, after: usize) -> Location {
        let mut loc = Location::new("Kitchen");
        loc.before = (0..before).map(|i| format!("b{i}")).collect();
        loc.after = (0..after).map(|i| format!("a{i}")).collect();
        loc
    }

    #[test]
    fn test_status_is_derived_from_sequences() {
        assert_eq!(location_with(0, 0).status(), LocationStatus::Empty);
        assert_eq!(location_with(2, 0).status(), LocationStatus::BeforeOnly);
        assert_eq!(location_with(0, 1).status(), LocationStatus::Empty);
        assert_eq!(location_with(1, 3).status(), LocationStatus::Complete);
        assert!(location_with(1, 1).is_complete());
    }

    #[test]
    fn test_pair_count_uses_longer_sequence() {
        assert_eq!(location_with(0, 0).pair_count(), 0);
        assert_eq!(location_with(3, 1).pair_count(), 3);
        assert_eq!(location_with(2, 5).pair_count(), 5);
    }

    #[test]
    fn test_new_locations_get_distinct_ids() {
        let a = Location::new("A");
        let b = Location::new("A");
        assert_ne!(a.id, b.id);
        assert!(a.before.is_empty() && a.after.is_empty());
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let loc = location_with(1, 0);
        let json = serde_json::to_string(&loc).unwrap();
        assert!(json.contains("\"createdAt\""));

        let restored: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, loc);
    }
}
