//! crates/alumni_map_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

/// A graduate as stored in the `student` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub student_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

/// Everything needed to create a student together with its optional
/// current associations and graduation record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub location_id: Option<i32>,
    pub industry_id: Option<i32>,
    pub club_id: Option<i32>,
    pub graduation_year: Option<i32>,
    pub degree: Option<String>,
}

impl NewStudent {
    /// A graduation record is only written when both the year and the degree are known.
    pub fn graduation(&self) -> Option<(i32, &str)> {
        match (self.graduation_year, self.degree.as_deref()) {
            (Some(year), Some(degree)) if !degree.trim().is_empty() => Some((year, degree)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Club {
    pub club_id: i32,
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClub {
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub loc_id: i32,
    pub city: String,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    pub city: String,
    pub state: Option<String>,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Industry {
    pub industry_id: i32,
    pub name: String,
}

/// One row of the filtered graduate query: a student joined to their current
/// location, current industry, current club and a graduation record.
///
/// The location columns are always present; everything else may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraduateRow {
    pub student_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub loc_id: i32,
    pub city: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub graduation_year: Option<i32>,
    pub degree: Option<String>,
    pub honors: Option<String>,
    pub industry_id: Option<i32>,
    pub industry_name: Option<String>,
    pub club_id: Option<i32>,
    pub club_name: Option<String>,
    pub club_category: Option<String>,
}

impl GraduateRow {
    /// The `"City, ST"` label used by the map and the statistics view.
    pub fn location_name(&self) -> Option<String> {
        self.state
            .as_deref()
            .map(|state| format!("{}, {}", self.city, state))
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Distinct students currently living in one city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCount {
    pub city: String,
    pub state: Option<String>,
    pub student_count: i64,
}

/// Distinct students currently working in one industry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndustryCount {
    pub industry_name: String,
    pub student_count: i64,
}

/// Both distributions shown by the statistics view, each ordered by count descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub locations: Vec<LocationCount>,
    pub industries: Vec<IndustryCount>,
}

/// The identity held behind a demo session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub username: String,
    pub email: Option<String>,
}
