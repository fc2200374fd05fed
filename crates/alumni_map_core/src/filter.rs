//! crates/alumni_map_core/src/filter.rs
//!
//! The optional filters shared by the graduate query and both statistics queries.

/// Raised when a filter parameter is present but is not an integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be an integer, got '{value}'")]
pub struct FilterError {
    pub field: &'static str,
    pub value: String,
}

/// Optional equality filters on current club membership and graduation year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraduateFilter {
    pub club_id: Option<i32>,
    pub year: Option<i32>,
}

impl GraduateFilter {
    /// Builds a filter from raw query-string values.
    ///
    /// A missing or blank value means "no filter", matching how browsers submit
    /// an unselected `<select>`.
    pub fn parse(club_id: Option<&str>, year: Option<&str>) -> Result<Self, FilterError> {
        Ok(Self {
            club_id: parse_param("club_id", club_id)?,
            year: parse_param("year", year)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.club_id.is_none() && self.year.is_none()
    }
}

fn parse_param(field: &'static str, raw: Option<&str>) -> Result<Option<i32>, FilterError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<i32>().map(Some).map_err(|_| FilterError {
            field,
            value: value.to_string(),
        }),
    }
}
