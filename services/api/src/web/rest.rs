//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the reference-data and student endpoints and
//! the master definition for the OpenAPI specification.

use crate::error::{ApiError, ErrorBody};
use crate::web::{auth, extract::ApiJson, graduates, state::AppState};
use alumni_map_core::domain::{
    Club, Industry, Location, NewClub, NewLocation, NewStudent, Student,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        list_clubs_handler,
        create_club_handler,
        list_years_handler,
        list_locations_handler,
        create_location_handler,
        list_industries_handler,
        create_industry_handler,
        list_students_handler,
        create_student_handler,
        graduates::graduate_locations_handler,
        graduates::statistics_handler,
        graduates::graduate_map_handler,
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::verify_session_handler,
    ),
    components(
        schemas(
            ErrorBody, HealthResponse, ClubDto, YearDto, LocationDto, IndustryDto, StudentDto,
            CreateClubRequest, CreateLocationRequest, CreateIndustryRequest,
            CreateStudentRequest, CreateStudentResponse, IdInput,
            graduates::GraduateRowDto, graduates::StatisticsResponse,
            graduates::LocationCountDto, graduates::IndustryCountDto,
            graduates::FeatureCollection, graduates::Feature, graduates::PointGeometry,
            graduates::MarkerProperties, graduates::MapStudent,
            auth::CredentialsRequest, auth::AuthResponse, auth::SessionUserDto,
            auth::SessionRequest, auth::VerifySessionResponse, auth::SuccessResponse,
        )
    ),
    tags(
        (name = "Alumni Map API", description = "Graduate locations, statistics and reference data.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClubDto {
    pub club_id: i32,
    pub name: String,
    pub category: Option<String>,
}

impl From<Club> for ClubDto {
    fn from(club: Club) -> Self {
        Self {
            club_id: club.club_id,
            name: club.name,
            category: club.category,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct YearDto {
    pub year: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LocationDto {
    pub loc_id: i32,
    pub city: String,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl From<Location> for LocationDto {
    fn from(location: Location) -> Self {
        Self {
            loc_id: location.loc_id,
            city: location.city,
            state: location.state,
            country: location.country,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndustryDto {
    pub industry_id: i32,
    pub name: String,
}

impl From<Industry> for IndustryDto {
    fn from(industry: Industry) -> Self {
        Self {
            industry_id: industry.industry_id,
            name: industry.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentDto {
    pub student_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl From<Student> for StudentDto {
    fn from(student: Student) -> Self {
        Self {
            student_id: student.student_id,
            first_name: student.first_name,
            last_name: student.last_name,
            email: student.email,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateClubRequest {
    pub name: Option<String>,
    pub category: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateLocationRequest {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateIndustryRequest {
    pub name: Option<String>,
}

/// Form selects submit ids as strings, API clients as numbers; both are accepted.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum IdInput {
    Number(i64),
    Text(String),
}

#[derive(Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub club_id: Option<IdInput>,
    pub location_id: Option<IdInput>,
    pub industry_id: Option<IdInput>,
    pub graduation_year: Option<IdInput>,
    pub degree: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateStudentResponse {
    pub success: bool,
    pub student: StudentDto,
    pub message: String,
}

//=========================================================================================
// Payload Normalization
//=========================================================================================

/// Treats a missing, empty or whitespace-only string as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_id(field: &str, value: Option<IdInput>) -> Result<Option<i32>, ApiError> {
    let invalid = || ApiError::Validation(format!("{} must be an integer", field));
    match value {
        None => Ok(None),
        Some(IdInput::Number(n)) => i32::try_from(n).map(Some).map_err(|_| invalid()),
        Some(IdInput::Text(text)) => match text.trim() {
            "" => Ok(None),
            trimmed => trimmed.parse::<i32>().map(Some).map_err(|_| invalid()),
        },
    }
}

impl CreateStudentRequest {
    fn into_domain(self) -> Result<NewStudent, ApiError> {
        let (Some(first_name), Some(last_name)) =
            (non_blank(self.first_name), non_blank(self.last_name))
        else {
            return Err(ApiError::Validation(
                "First name and last name are required".to_string(),
            ));
        };

        Ok(NewStudent {
            first_name,
            last_name,
            email: non_blank(self.email),
            location_id: parse_id("location_id", self.location_id)?,
            industry_id: parse_id("industry_id", self.industry_id)?,
            club_id: parse_id("club_id", self.club_id)?,
            graduation_year: parse_id("graduation_year", self.graduation_year)?,
            degree: non_blank(self.degree),
        })
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Report whether the database is reachable.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    match app_state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
            }),
        ),
        Err(e) => {
            warn!("Health check failed: {:?}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                }),
            )
        }
    }
}

/// List all clubs ordered by name.
#[utoipa::path(
    get,
    path = "/api/clubs",
    responses(
        (status = 200, description = "All clubs", body = [ClubDto]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_clubs_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ClubDto>>, ApiError> {
    let clubs = app_state.db.list_clubs().await.map_err(ApiError::server_error)?;
    Ok(Json(clubs.into_iter().map(ClubDto::from).collect()))
}

/// Create a club. Club names are unique.
#[utoipa::path(
    post,
    path = "/api/clubs",
    request_body = CreateClubRequest,
    responses(
        (status = 200, description = "The created club row", body = ClubDto),
        (status = 400, description = "Missing name or duplicate club", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_club_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateClubRequest>,
) -> Result<Json<ClubDto>, ApiError> {
    let name = non_blank(req.name)
        .ok_or_else(|| ApiError::Validation("Club name is required".to_string()))?;
    let club = NewClub {
        name,
        category: non_blank(req.category),
    };

    let created = app_state.db.create_club(club).await.map_err(|e| {
        ApiError::from_port(e, "Club name already exists", "Failed to create club")
    })?;
    info!(club_id = created.club_id, name = %created.name, "Club created");
    Ok(Json(created.into()))
}

/// List the distinct graduation years, newest first.
#[utoipa::path(
    get,
    path = "/api/years",
    responses(
        (status = 200, description = "Distinct graduation years", body = [YearDto]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_years_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<YearDto>>, ApiError> {
    let years = app_state.db.list_years().await.map_err(ApiError::server_error)?;
    Ok(Json(years.into_iter().map(|year| YearDto { year }).collect()))
}

/// List all locations ordered by city.
#[utoipa::path(
    get,
    path = "/api/locations",
    responses(
        (status = 200, description = "All locations", body = [LocationDto]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_locations_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<LocationDto>>, ApiError> {
    let locations = app_state
        .db
        .list_locations()
        .await
        .map_err(ApiError::server_error)?;
    Ok(Json(locations.into_iter().map(LocationDto::from).collect()))
}

/// Create a location. The country defaults to "USA".
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 200, description = "The created location row", body = LocationDto),
        (status = 400, description = "Missing city", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_location_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateLocationRequest>,
) -> Result<Json<LocationDto>, ApiError> {
    let city = non_blank(req.city)
        .ok_or_else(|| ApiError::Validation("City is required".to_string()))?;
    let location = NewLocation {
        city,
        state: non_blank(req.state),
        country: non_blank(req.country).unwrap_or_else(|| "USA".to_string()),
    };

    let created = app_state.db.create_location(location).await.map_err(|e| {
        ApiError::from_port(e, "Location already exists", "Failed to create location")
    })?;
    info!(loc_id = created.loc_id, city = %created.city, "Location created");
    Ok(Json(created.into()))
}

/// List all industries ordered by name.
#[utoipa::path(
    get,
    path = "/api/industries",
    responses(
        (status = 200, description = "All industries", body = [IndustryDto]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_industries_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<IndustryDto>>, ApiError> {
    let industries = app_state
        .db
        .list_industries()
        .await
        .map_err(ApiError::server_error)?;
    Ok(Json(industries.into_iter().map(IndustryDto::from).collect()))
}

/// Create an industry. Industry names are unique.
#[utoipa::path(
    post,
    path = "/api/industries",
    request_body = CreateIndustryRequest,
    responses(
        (status = 200, description = "The created industry row", body = IndustryDto),
        (status = 400, description = "Missing name or duplicate industry", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_industry_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateIndustryRequest>,
) -> Result<Json<IndustryDto>, ApiError> {
    let name = non_blank(req.name)
        .ok_or_else(|| ApiError::Validation("Industry name is required".to_string()))?;

    let created = app_state.db.create_industry(&name).await.map_err(|e| {
        ApiError::from_port(e, "Industry already exists", "Failed to create industry")
    })?;
    info!(industry_id = created.industry_id, name = %created.name, "Industry created");
    Ok(Json(created.into()))
}

/// List all students ordered by last then first name.
#[utoipa::path(
    get,
    path = "/api/students",
    responses(
        (status = 200, description = "All students", body = [StudentDto]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_students_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<StudentDto>>, ApiError> {
    let students = app_state
        .db
        .list_students()
        .await
        .map_err(ApiError::server_error)?;
    Ok(Json(students.into_iter().map(StudentDto::from).collect()))
}

/// Create a student together with an optional current location, industry,
/// club membership and graduation record, all-or-nothing.
///
/// The graduation record is written only when both `graduation_year` and
/// `degree` are given.
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentRequest,
    responses(
        (status = 200, description = "Student created", body = CreateStudentResponse),
        (status = 400, description = "Missing names, malformed ids or duplicate email", body = ErrorBody),
        (status = 500, description = "Internal server error; nothing was written", body = ErrorBody)
    )
)]
pub async fn create_student_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateStudentRequest>,
) -> Result<Json<CreateStudentResponse>, ApiError> {
    let new_student = req.into_domain()?;

    let student = app_state
        .db
        .create_student(new_student)
        .await
        .map_err(|e| ApiError::from_port(e, "Email already exists", "Failed to create student"))?;

    Ok(Json(CreateStudentResponse {
        success: true,
        student: student.into(),
        message: "Student created successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> CreateStudentRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn string_and_numeric_ids_are_both_accepted() {
        let student = request(
            r#"{"first_name":"Ada","last_name":"Lovelace","location_id":"4","club_id":2,
                "industry_id":"","graduation_year":"2023","degree":"BS"}"#,
        )
        .into_domain()
        .unwrap();

        assert_eq!(student.location_id, Some(4));
        assert_eq!(student.club_id, Some(2));
        assert_eq!(student.industry_id, None);
        assert_eq!(student.graduation(), Some((2023, "BS")));
    }

    #[test]
    fn blank_names_are_rejected() {
        let err = request(r#"{"first_name":"  ","last_name":"Lovelace"}"#)
            .into_domain()
            .unwrap_err();
        assert_eq!(err.to_string(), "First name and last name are required");
    }

    #[test]
    fn malformed_id_is_a_validation_error() {
        let err = request(r#"{"first_name":"Ada","last_name":"Lovelace","location_id":"Austin"}"#)
            .into_domain()
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(message) if message == "location_id must be an integer"));
    }

    #[test]
    fn year_without_degree_skips_graduation() {
        let student = request(r#"{"first_name":"Ada","last_name":"Lovelace","graduation_year":2023}"#)
            .into_domain()
            .unwrap();
        assert_eq!(student.graduation(), None);
    }
}
