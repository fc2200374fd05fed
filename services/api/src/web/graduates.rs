//! services/api/src/web/graduates.rs
//!
//! Handlers for the filtered graduate query, the statistics view and the
//! GeoJSON map feed.

use crate::error::{ApiError, ErrorBody};
use crate::web::{extract::ApiQuery, state::AppState};
use alumni_map_core::domain::{GraduateRow, IndustryCount, LocationCount};
use alumni_map_core::filter::GraduateFilter;
use alumni_map_core::grouping::{build_markers, MapMarker};
use axum::{
    extract::State,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// Query Parameters
//=========================================================================================

/// Optional filters shared by every endpoint in this module.
///
/// Values are taken as raw strings so that an empty parameter (`?year=`)
/// means "no filter" instead of a rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterParams {
    /// Only graduates currently in this club.
    pub club_id: Option<String>,
    /// Only graduates with a graduation record for this year.
    pub year: Option<String>,
}

impl FilterParams {
    fn to_filter(&self) -> Result<GraduateFilter, ApiError> {
        GraduateFilter::parse(self.club_id.as_deref(), self.year.as_deref())
            .map_err(|e| ApiError::Validation(e.to_string()))
    }
}

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GraduateRowDto {
    pub student_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub loc_id: i32,
    pub city: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub location_name: Option<String>,
    pub graduation_year: Option<i32>,
    pub degree: Option<String>,
    pub honors: Option<String>,
    pub industry_id: Option<i32>,
    pub industry_name: Option<String>,
    pub club_id: Option<i32>,
    pub club_name: Option<String>,
    pub club_category: Option<String>,
}

impl From<GraduateRow> for GraduateRowDto {
    fn from(row: GraduateRow) -> Self {
        let location_name = row.location_name();
        Self {
            student_id: row.student_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            loc_id: row.loc_id,
            city: row.city,
            state: row.state,
            country: row.country,
            location_name,
            graduation_year: row.graduation_year,
            degree: row.degree,
            honors: row.honors,
            industry_id: row.industry_id,
            industry_name: row.industry_name,
            club_id: row.club_id,
            club_name: row.club_name,
            club_category: row.club_category,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LocationCountDto {
    pub city: String,
    pub state: Option<String>,
    pub student_count: i64,
}

impl From<LocationCount> for LocationCountDto {
    fn from(count: LocationCount) -> Self {
        Self {
            city: count.city,
            state: count.state,
            student_count: count.student_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndustryCountDto {
    pub industry_name: String,
    pub student_count: i64,
}

impl From<IndustryCount> for IndustryCountDto {
    fn from(count: IndustryCount) -> Self {
        Self {
            industry_name: count.industry_name,
            student_count: count.student_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatisticsResponse {
    pub locations: Vec<LocationCountDto>,
    pub industries: Vec<IndustryCountDto>,
}

/// A GeoJSON `FeatureCollection` with one point per mapped location.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: PointGeometry,
    pub properties: MarkerProperties,
}

/// GeoJSON point; `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkerProperties {
    pub city: String,
    pub state: Option<String>,
    pub location_name: String,
    pub student_count: usize,
    pub students: Vec<MapStudent>,
    pub industries: BTreeMap<String, usize>,
    pub radius: u32,
    pub color: String,
}

/// A graduate as listed in a marker popup.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MapStudent {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub degree: Option<String>,
    pub graduation_year: Option<i32>,
    pub honors: Option<String>,
    pub industry: Option<String>,
    pub club: Option<String>,
    pub club_category: Option<String>,
}

impl From<MapMarker> for Feature {
    fn from(marker: MapMarker) -> Self {
        let group = marker.group;
        let location_name = group.location_name();
        let student_count = group.student_count();
        let students = group
            .members
            .into_iter()
            .map(|row| MapStudent {
                id: row.student_id,
                name: row.full_name(),
                email: row.email,
                degree: row.degree,
                graduation_year: row.graduation_year,
                honors: row.honors,
                industry: row.industry_name,
                club: row.club_name,
                club_category: row.club_category,
            })
            .collect();

        Feature {
            kind: "Feature".to_string(),
            geometry: PointGeometry {
                kind: "Point".to_string(),
                coordinates: vec![marker.coordinates.lng, marker.coordinates.lat],
            },
            properties: MarkerProperties {
                city: group.city,
                state: group.state,
                location_name,
                student_count,
                students,
                industries: group.industries,
                radius: marker.style.radius,
                color: marker.style.color.hex().to_string(),
            },
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List graduates with a current location, optionally filtered.
///
/// One row per student, current location, current industry, current club and
/// graduation record. A student with several graduation records appears once
/// per record.
#[utoipa::path(
    get,
    path = "/api/graduate-locations",
    params(FilterParams),
    responses(
        (status = 200, description = "Graduate rows ordered by last then first name", body = [GraduateRowDto]),
        (status = 400, description = "A filter value is not an integer", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn graduate_locations_handler(
    State(app_state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<FilterParams>,
) -> Result<Json<Vec<GraduateRowDto>>, ApiError> {
    let filter = params.to_filter()?;
    let rows = app_state
        .db
        .graduate_locations(filter)
        .await
        .map_err(ApiError::server_error)?;
    debug!(?filter, rows = rows.len(), "Graduate locations fetched");
    Ok(Json(rows.into_iter().map(GraduateRowDto::from).collect()))
}

/// Distinct-student counts per city and per industry, most populated first.
#[utoipa::path(
    get,
    path = "/api/statistics",
    params(FilterParams),
    responses(
        (status = 200, description = "Location and industry distributions", body = StatisticsResponse),
        (status = 400, description = "A filter value is not an integer", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn statistics_handler(
    State(app_state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<FilterParams>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let filter = params.to_filter()?;
    let (locations, industries) = tokio::try_join!(
        app_state.db.location_distribution(filter),
        app_state.db.industry_distribution(filter),
    )
    .map_err(ApiError::server_error)?;

    Ok(Json(StatisticsResponse {
        locations: locations.into_iter().map(LocationCountDto::from).collect(),
        industries: industries.into_iter().map(IndustryCountDto::from).collect(),
    }))
}

/// The filtered graduates grouped into map markers, as GeoJSON.
///
/// Locations missing from the built-in coordinate table are left out.
#[utoipa::path(
    get,
    path = "/api/graduate-map",
    params(FilterParams),
    responses(
        (status = 200, description = "One point feature per mapped location", body = FeatureCollection),
        (status = 400, description = "A filter value is not an integer", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn graduate_map_handler(
    State(app_state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<FilterParams>,
) -> Result<Json<FeatureCollection>, ApiError> {
    let filter = params.to_filter()?;
    let rows = app_state
        .db
        .graduate_locations(filter)
        .await
        .map_err(ApiError::server_error)?;

    let features: Vec<Feature> = build_markers(&rows).into_iter().map(Feature::from).collect();
    debug!(rows = rows.len(), markers = features.len(), "Graduate map built");

    Ok(Json(FeatureCollection {
        kind: "FeatureCollection".to_string(),
        features,
    }))
}
