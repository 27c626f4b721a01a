use super::data::{Location, ShootMode};
use crate::error::{SnapError, SnapResult};

/// Volatile, ordered list of locations being documented.
///
/// Locations are mutated in place (append/remove photo) and never reordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    locations: Vec<Location>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_locations(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|loc| loc.id == id)
    }

    /// Locations with at least one before and one after photo
    pub fn completed(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter().filter(|loc| loc.is_complete())
    }

    pub fn completed_count(&self) -> usize {
        self.completed().count()
    }

    /// Create a location from a user-supplied name (trimmed, non-empty)
    pub fn add_location(&mut self, name: &str) -> SnapResult<&Location> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SnapError::validation("location name must not be empty"));
        }

        self.locations.push(Location::new(name));
        let last = self.locations.len() - 1;
        Ok(&self.locations[last])
    }

    /// Append photos to one sequence, keeping their order
    pub fn add_photos(&mut self, id: &str, mode: ShootMode, photos: Vec<String>) -> SnapResult<()> {
        self.location_mut(id)?.photos_mut(mode).extend(photos);
        Ok(())
    }

    /// Remove and return the photo at `index`
    pub fn remove_photo(&mut self, id: &str, mode: ShootMode, index: usize) -> SnapResult<String> {
        let photos = self.location_mut(id)?.photos_mut(mode);
        if index >= photos.len() {
            return Err(SnapError::validation(format!(
                "no {mode:?} photo at index {index} (have {})",
                photos.len()
            )));
        }
        Ok(photos.remove(index))
    }

    /// Remove a location together with all of its photos
    pub fn delete_location(&mut self, id: &str) -> SnapResult<Location> {
        let index = self
            .locations
            .iter()
            .position(|loc| loc.id == id)
            .ok_or_else(|| unknown(id))?;
        Ok(self.locations.remove(index))
    }

    fn location_mut(&mut self, id: &str) -> SnapResult<&mut Location> {
        self.locations
            .iter_mut()
            .find(|loc| loc.id == id)
            .ok_or_else(|| unknown(id))
    }
}

fn unknown(id: &str) -> SnapError {
    SnapError::validation(format!("unknown location {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::LocationStatus;

    fn photo(tag: &str) -> String {
        format!("data:image/jpeg;base64,{tag}")
    }

    #[test]
    fn test_add_location_trims_and_rejects_empty() {
        let mut ws = Workspace::new();
        assert!(ws.add_location("   ").is_err());

        let loc = ws.add_location("  Bathroom ").unwrap();
        assert_eq!(loc.name, "Bathroom");
        assert_eq!(ws.locations().len(), 1);
    }

    #[test]
    fn test_photos_append_in_order() {
        let mut ws = Workspace::new();
        let id = ws.add_location("Roof").unwrap().id.clone();

        ws.add_photos(&id, ShootMode::Before, vec![photo("1"), photo("2")])
            .unwrap();
        ws.add_photos(&id, ShootMode::Before, vec![photo("3")]).unwrap();
        assert_eq!(ws.get(&id).unwrap().before, vec![photo("1"), photo("2"), photo("3")]);
        assert_eq!(ws.get(&id).unwrap().status(), LocationStatus::BeforeOnly);

        ws.add_photos(&id, ShootMode::After, vec![photo("x")]).unwrap();
        assert_eq!(ws.completed_count(), 1);
    }

    #[test]
    fn test_remove_photo_checks_bounds() {
        let mut ws = Workspace::new();
        let id = ws.add_location("Deck").unwrap().id.clone();
        ws.add_photos(&id, ShootMode::After, vec![photo("a"), photo("b")])
            .unwrap();

        assert_eq!(ws.remove_photo(&id, ShootMode::After, 0).unwrap(), photo("a"));
        assert_eq!(ws.get(&id).unwrap().after, vec![photo("b")]);
        assert!(ws.remove_photo(&id, ShootMode::After, 1).is_err());
        assert!(ws.remove_photo(&id, ShootMode::Before, 0).is_err());
    }

    #[test]
    fn test_delete_location_cascades() {
        let mut ws = Workspace::new();
        let keep = ws.add_location("Keep").unwrap().id.clone();
        let gone = ws.add_location("Gone").unwrap().id.clone();
        ws.add_photos(&gone, ShootMode::Before, vec![photo("p")]).unwrap();

        let removed = ws.delete_location(&gone).unwrap();
        assert_eq!(removed.before, vec![photo("p")]);
        assert!(ws.get(&gone).is_none());
        assert_eq!(ws.locations().len(), 1);
        assert_eq!(ws.locations()[0].id, keep);

        assert!(ws.delete_location(&gone).is_err());
        assert!(ws.add_photos(&gone, ShootMode::After, vec![photo("q")]).is_err());
    }
}
