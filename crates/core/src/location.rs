//! Location set and its mirrored tags.
//!
//! Autocompleted locations carry trusted coordinates that are never
//! re-resolved. Free-typed locations are stored without coordinates; the
//! set is geocoded once at submission time, and only when no trusted
//! coordinate exists anywhere in it.
//!
//! Each location is mirrored into the tag list as `🌍 <name>`. Removing a
//! location removes exactly that marker tag; unrelated tags that merely
//! contain the location name are left alone.

use serde::{Deserialize, Serialize};

use crate::error::ValidationIssue;
use crate::types::Coordinates;

/// Prefix of the tag mirrored for each location.
pub const LOCATION_TAG_PREFIX: &str = "🌍 ";

/// Valid latitude range in degrees.
pub const LAT_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees.
pub const LNG_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// How a location's coordinates were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// Picked from autocomplete or loaded from a stored record; trusted.
    Autocomplete,
    /// Free-typed text; coordinates resolved at submission.
    FreeText,
}

/// One entry of the location set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub coordinates: Option<Coordinates>,
    pub source: LocationSource,
}

/// Location entry as it appears in the submission payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    pub name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// The mirrored tag for a location name.
pub fn location_tag(name: &str) -> String {
    format!("{LOCATION_TAG_PREFIX}{name}")
}

/// Whether `tag` is a mirrored location tag.
pub fn is_location_tag(tag: &str) -> bool {
    tag.starts_with(LOCATION_TAG_PREFIX)
}

/// Check a coordinate pair against the valid ranges.
pub fn validate_coordinates(field: &str, coords: Coordinates) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if !LAT_RANGE.contains(&coords.lat) {
        issues.push(ValidationIssue::new(
            field,
            format!("Latitude must be between -90 and 90, got {}", coords.lat),
        ));
    }
    if !LNG_RANGE.contains(&coords.lng) {
        issues.push(ValidationIssue::new(
            field,
            format!("Longitude must be between -180 and 180, got {}", coords.lng),
        ));
    }
    issues
}

/// Ordered set of locations for a draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationTagResolver {
    locations: Vec<Location>,
}

impl LocationTagResolver {
    /// Rebuild from a stored record. Stored coordinates are trusted.
    pub fn from_stored(locations: Vec<LocationPayload>) -> Self {
        let locations = locations
            .into_iter()
            .map(|loc| {
                let coordinates = match (loc.lat, loc.lng) {
                    (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
                    _ => None,
                };
                Location {
                    name: loc.name,
                    source: if coordinates.is_some() {
                        LocationSource::Autocomplete
                    } else {
                        LocationSource::FreeText
                    },
                    coordinates,
                }
            })
            .collect();
        Self { locations }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Add an autocompleted location with trusted coordinates.
    ///
    /// Idempotent: the same name and coordinates are stored once. A
    /// free-typed entry with the same name is upgraded in place. Returns
    /// whether anything changed.
    pub fn add_from_autocomplete(
        &mut self,
        name: &str,
        lat: f64,
        lng: f64,
        tags: &mut Vec<String>,
    ) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let coordinates = Some(Coordinates { lat, lng });

        let changed = match self.locations.iter_mut().find(|l| l.name == name) {
            Some(existing) if existing.coordinates == coordinates => false,
            Some(existing) => {
                existing.coordinates = coordinates;
                existing.source = LocationSource::Autocomplete;
                true
            }
            None => {
                self.locations.push(Location {
                    name: name.to_string(),
                    coordinates,
                    source: LocationSource::Autocomplete,
                });
                true
            }
        };
        push_unique(tags, location_tag(name));
        changed
    }

    /// Add a free-typed location whose coordinates are resolved later.
    pub fn add_from_free_text(&mut self, text: &str, tags: &mut Vec<String>) -> bool {
        let name = text.trim();
        if name.is_empty() {
            return false;
        }
        let added = if self.locations.iter().any(|l| l.name == name) {
            false
        } else {
            self.locations.push(Location {
                name: name.to_string(),
                coordinates: None,
                source: LocationSource::FreeText,
            });
            true
        };
        push_unique(tags, location_tag(name));
        added
    }

    /// Remove a location and its mirrored tag.
    pub fn remove(&mut self, index: usize, tags: &mut Vec<String>) -> Option<Location> {
        if index >= self.locations.len() {
            return None;
        }
        let removed = self.locations.remove(index);
        let marker = location_tag(&removed.name);
        tags.retain(|tag| *tag != marker);
        Some(removed)
    }

    /// Whether any location carries trusted coordinates.
    pub fn has_trusted_coordinates(&self) -> bool {
        self.locations
            .iter()
            .any(|l| l.source == LocationSource::Autocomplete && l.coordinates.is_some())
    }

    /// The free-text query to geocode at submission, if one is needed.
    ///
    /// `None` when the set is empty or already has trusted coordinates.
    pub fn pending_geocode_query(&self) -> Option<&str> {
        if self.has_trusted_coordinates() {
            return None;
        }
        self.locations
            .iter()
            .find(|l| l.coordinates.is_none())
            .map(|l| l.name.as_str())
    }

    /// Store the submission-time geocoding result for the primary free-text
    /// location. Ignored once the set has trusted coordinates.
    pub fn apply_geocoded(&mut self, coords: Coordinates) {
        if self.has_trusted_coordinates() {
            return;
        }
        if let Some(loc) = self.locations.iter_mut().find(|l| l.coordinates.is_none()) {
            loc.coordinates = Some(coords);
        }
    }

    /// Name of the primary (first) location.
    pub fn primary_name(&self) -> Option<&str> {
        self.locations.first().map(|l| l.name.as_str())
    }

    /// Coordinates of the first location that has any.
    pub fn primary_coordinates(&self) -> Option<Coordinates> {
        self.locations.iter().find_map(|l| l.coordinates)
    }

    /// Merge the existing tags with one marker per location, no duplicates.
    pub fn to_tags(&self, existing: &[String]) -> Vec<String> {
        let mut merged: Vec<String> = Vec::with_capacity(existing.len() + self.locations.len());
        for tag in existing {
            push_unique(&mut merged, tag.clone());
        }
        for loc in &self.locations {
            push_unique(&mut merged, location_tag(&loc.name));
        }
        merged
    }

    /// Range-check every known coordinate.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        self.locations
            .iter()
            .filter_map(|l| l.coordinates)
            .flat_map(|c| validate_coordinates("locations", c))
            .collect()
    }

    pub fn to_payload(&self) -> Vec<LocationPayload> {
        self.locations
            .iter()
            .map(|l| LocationPayload {
                name: l.name.clone(),
                lat: l.coordinates.map(|c| c.lat),
                lng: l.coordinates.map(|c| c.lng),
            })
            .collect()
    }
}

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autocomplete_is_idempotent() {
        let mut set = LocationTagResolver::default();
        let mut tags = vec!["lofi".to_string()];
        assert!(set.add_from_autocomplete("Lagos, Nigeria", 6.45, 3.39, &mut tags));
        assert!(!set.add_from_autocomplete("Lagos, Nigeria", 6.45, 3.39, &mut tags));
        assert_eq!(set.locations().len(), 1);
        assert_eq!(tags, vec!["lofi", "🌍 Lagos, Nigeria"]);
    }

    #[test]
    fn free_text_upgraded_by_autocomplete() {
        let mut set = LocationTagResolver::default();
        let mut tags = Vec::new();
        set.add_from_free_text("Berlin", &mut tags);
        assert_eq!(set.pending_geocode_query(), Some("Berlin"));

        set.add_from_autocomplete("Berlin", 52.52, 13.40, &mut tags);
        assert_eq!(set.locations().len(), 1);
        assert_eq!(set.locations()[0].source, LocationSource::Autocomplete);
        assert_eq!(set.pending_geocode_query(), None);
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn trusted_sets_are_never_geocoded() {
        let mut set = LocationTagResolver::default();
        let mut tags = Vec::new();
        set.add_from_autocomplete("Accra", 5.6, -0.19, &mut tags);
        set.add_from_free_text("Somewhere else", &mut tags);
        assert_eq!(set.pending_geocode_query(), None);

        set.apply_geocoded(Coordinates { lat: 1.0, lng: 1.0 });
        assert_eq!(set.locations()[1].coordinates, None);
        assert_eq!(set.primary_coordinates(), Some(Coordinates { lat: 5.6, lng: -0.19 }));
    }

    #[test]
    fn free_text_set_geocoded_once() {
        let mut set = LocationTagResolver::default();
        let mut tags = Vec::new();
        set.add_from_free_text("Nairobi", &mut tags);
        set.apply_geocoded(Coordinates { lat: -1.29, lng: 36.82 });
        assert_eq!(set.primary_coordinates(), Some(Coordinates { lat: -1.29, lng: 36.82 }));
        assert_eq!(set.locations()[0].source, LocationSource::FreeText);
    }

    #[test]
    fn remove_drops_only_the_marker_tag() {
        let mut set = LocationTagResolver::default();
        let mut tags = vec!["Paris nights".to_string()];
        set.add_from_autocomplete("Paris", 48.85, 2.35, &mut tags);
        assert_eq!(tags.len(), 2);

        let removed = set.remove(0, &mut tags).unwrap();
        assert_eq!(removed.name, "Paris");
        assert!(set.is_empty());
        assert_eq!(tags, vec!["Paris nights"]);
        assert!(set.remove(0, &mut tags).is_none());
    }

    #[test]
    fn to_tags_deduplicates() {
        let mut set = LocationTagResolver::default();
        let mut scratch = Vec::new();
        set.add_from_autocomplete("Tokyo", 35.68, 139.69, &mut scratch);
        let existing = vec!["ambient".to_string(), "🌍 Tokyo".to_string(), "ambient".to_string()];
        assert_eq!(set.to_tags(&existing), vec!["ambient", "🌍 Tokyo"]);
    }

    #[test]
    fn coordinate_bounds() {
        let ok = |lat, lng| validate_coordinates("loc", Coordinates { lat, lng }).is_empty();
        assert!(ok(90.0, 0.0));
        assert!(ok(-90.0, 0.0));
        assert!(ok(0.0, 180.0));
        assert!(ok(0.0, -180.0));
        assert!(!ok(90.0001, 0.0));
        assert!(!ok(0.0, 180.5));
    }

    #[test]
    fn blank_names_ignored() {
        let mut set = LocationTagResolver::default();
        let mut tags = Vec::new();
        assert!(!set.add_from_free_text("   ", &mut tags));
        assert!(tags.is_empty());
    }
}
