//! crates/alumni_map_core/src/grouping.rs
//!
//! Turns flat graduate rows into location groups and map markers.

use crate::domain::GraduateRow;
use crate::geo::{self, Coordinates};
use std::collections::{BTreeMap, HashMap};

/// All graduates sharing one city and state.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationGroup {
    pub city: String,
    pub state: Option<String>,
    pub members: Vec<GraduateRow>,
    pub industries: BTreeMap<String, usize>,
}

impl LocationGroup {
    fn new(city: &str, state: Option<&str>) -> Self {
        Self {
            city: city.to_string(),
            state: state.map(str::to_string),
            members: Vec::new(),
            industries: BTreeMap::new(),
        }
    }

    fn push(&mut self, row: &GraduateRow) {
        if let Some(industry) = &row.industry_name {
            *self.industries.entry(industry.clone()).or_insert(0) += 1;
        }
        self.members.push(row.clone());
    }

    pub fn student_count(&self) -> usize {
        self.members.len()
    }

    pub fn location_name(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}", self.city, state),
            None => self.city.clone(),
        }
    }

    /// Industry tally, most common first and alphabetical among ties.
    pub fn industries_by_count(&self) -> Vec<(&str, usize)> {
        let mut tally: Vec<_> = self
            .industries
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        tally.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tally
    }
}

/// Groups rows by exact `(city, state)`, in the order each location is first seen.
///
/// Rows are kept as-is, so a student that appears twice (for example with two
/// graduation records) is counted twice.
pub fn group_by_location(rows: &[GraduateRow]) -> Vec<LocationGroup> {
    let mut groups: Vec<LocationGroup> = Vec::new();
    let mut index: HashMap<(&str, Option<&str>), usize> = HashMap::new();

    for row in rows {
        let key = (row.city.as_str(), row.state.as_deref());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(LocationGroup::new(key.0, key.1));
            groups.len() - 1
        });
        groups[slot].push(row);
    }

    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerColor {
    Green,
    Yellow,
    Orange,
    Red,
}

impl MarkerColor {
    pub fn hex(self) -> &'static str {
        match self {
            MarkerColor::Green => "#38a169",
            MarkerColor::Yellow => "#d69e2e",
            MarkerColor::Orange => "#dd6b20",
            MarkerColor::Red => "#e53e3e",
        }
    }
}

/// Size and colour of a marker, banded by how many graduates it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    pub radius: u32,
    pub color: MarkerColor,
}

impl MarkerStyle {
    pub const MIN_RADIUS: u32 = 10;
    pub const MAX_RADIUS: u32 = 30;

    pub fn for_count(count: usize) -> Self {
        let scaled = u32::try_from(count)
            .unwrap_or(u32::MAX)
            .saturating_mul(3)
            .saturating_add(Self::MIN_RADIUS);
        let color = match count {
            0 | 1 => MarkerColor::Green,
            2 => MarkerColor::Yellow,
            3 | 4 => MarkerColor::Orange,
            _ => MarkerColor::Red,
        };
        Self {
            radius: scaled.min(Self::MAX_RADIUS),
            color,
        }
    }
}

/// A location group that could be placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub coordinates: Coordinates,
    pub style: MarkerStyle,
    pub group: LocationGroup,
}

/// Groups the rows and keeps only the groups the coordinate table knows about.
pub fn build_markers(rows: &[GraduateRow]) -> Vec<MapMarker> {
    group_by_location(rows)
        .into_iter()
        .filter_map(|group| {
            let coordinates = geo::lookup(&group.city, group.state.as_deref())?;
            Some(MapMarker {
                coordinates,
                style: MarkerStyle::for_count(group.student_count()),
                group,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i32, city: &str, state: &str, industry: Option<&str>) -> GraduateRow {
        GraduateRow {
            student_id: id,
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            email: None,
            loc_id: 1,
            city: city.to_string(),
            state: Some(state.to_string()),
            country: Some("USA".to_string()),
            graduation_year: Some(2023),
            degree: Some("BS".to_string()),
            honors: None,
            industry_id: None,
            industry_name: industry.map(str::to_string),
            club_id: None,
            club_name: None,
            club_category: None,
        }
    }

    #[test]
    fn two_austin_graduates_form_one_marker() {
        let rows = vec![
            row(1, "Austin", "TX", Some("Finance")),
            row(2, "Austin", "TX", None),
        ];

        let markers = build_markers(&rows);

        assert_eq!(markers.len(), 1);
        let marker = &markers[0];
        assert_eq!(marker.group.location_name(), "Austin, TX");
        assert_eq!(marker.group.student_count(), 2);
        assert_eq!(
            marker.group.industries,
            BTreeMap::from([("Finance".to_string(), 1)])
        );
        assert_eq!(marker.style.color, MarkerColor::Yellow);
        assert_eq!(marker.style.radius, 16);
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let rows = vec![
            row(1, "Denver", "CO", None),
            row(2, "Boston", "MA", None),
            row(3, "Denver", "CO", None),
        ];

        let groups = group_by_location(&rows);

        let names: Vec<_> = groups.iter().map(LocationGroup::location_name).collect();
        assert_eq!(names, ["Denver, CO", "Boston, MA"]);
        assert_eq!(groups[0].student_count(), 2);
    }

    #[test]
    fn regrouping_grouped_output_is_stable() {
        let rows = vec![
            row(1, "Denver", "CO", Some("Tech")),
            row(2, "Boston", "MA", Some("Finance")),
            row(3, "Denver", "CO", Some("Tech")),
            row(4, "Boise", "ID", None),
        ];

        let first = group_by_location(&rows);
        let flattened: Vec<GraduateRow> = first
            .iter()
            .flat_map(|group| group.members.iter().cloned())
            .collect();
        let second = group_by_location(&flattened);

        assert_eq!(first, second);
    }

    #[test]
    fn unknown_city_never_produces_a_marker() {
        let rows: Vec<_> = (0..12).map(|id| row(id, "Boise", "ID", None)).collect();

        assert!(build_markers(&rows).is_empty());
        assert_eq!(group_by_location(&rows).len(), 1);
    }

    #[test]
    fn marker_bands_follow_counts() {
        let bands: Vec<_> = [1, 2, 3, 4, 5, 9]
            .into_iter()
            .map(|count| MarkerStyle::for_count(count).color)
            .collect();
        assert_eq!(
            bands,
            [
                MarkerColor::Green,
                MarkerColor::Yellow,
                MarkerColor::Orange,
                MarkerColor::Orange,
                MarkerColor::Red,
                MarkerColor::Red
            ]
        );
        assert_eq!(MarkerStyle::for_count(1).radius, 13);
        assert_eq!(MarkerStyle::for_count(6).radius, 28);
        assert_eq!(MarkerStyle::for_count(7).radius, 30);
        assert_eq!(MarkerStyle::for_count(500).radius, 30);
    }

    #[test]
    fn industries_sort_by_count_then_name() {
        let rows = vec![
            row(1, "Austin", "TX", Some("Tech")),
            row(2, "Austin", "TX", Some("Finance")),
            row(3, "Austin", "TX", Some("Tech")),
            row(4, "Austin", "TX", Some("Energy")),
        ];

        let groups = group_by_location(&rows);

        assert_eq!(
            groups[0].industries_by_count(),
            [("Tech", 2), ("Energy", 1), ("Finance", 1)]
        );
    }
}
