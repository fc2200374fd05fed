//! crates/alumni_map_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases.

use async_trait::async_trait;
use crate::domain::{
    Club, Industry, IndustryCount, Location, LocationCount, NewClub, NewLocation, NewStudent,
    SessionUser, Student, GraduateRow,
};
use crate::filter::GraduateFilter;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    /// Round trip to the store, used by the health check.
    async fn ping(&self) -> PortResult<()>;

    // --- Reference Data ---
    async fn list_clubs(&self) -> PortResult<Vec<Club>>;

    /// Distinct graduation years, newest first.
    async fn list_years(&self) -> PortResult<Vec<i32>>;

    async fn list_locations(&self) -> PortResult<Vec<Location>>;

    async fn list_industries(&self) -> PortResult<Vec<Industry>>;

    async fn list_students(&self) -> PortResult<Vec<Student>>;

    // --- Graduate Queries ---

    /// Students with a current location, joined to their current industry,
    /// current club and graduation records, ordered by last then first name.
    async fn graduate_locations(&self, filter: GraduateFilter) -> PortResult<Vec<GraduateRow>>;

    /// Distinct students per current city, most populated first.
    async fn location_distribution(&self, filter: GraduateFilter)
        -> PortResult<Vec<LocationCount>>;

    /// Distinct students per current industry, most populated first.
    async fn industry_distribution(&self, filter: GraduateFilter)
        -> PortResult<Vec<IndustryCount>>;

    // --- Mutations ---
    async fn create_club(&self, club: NewClub) -> PortResult<Club>;

    async fn create_location(&self, location: NewLocation) -> PortResult<Location>;

    async fn create_industry(&self, name: &str) -> PortResult<Industry>;

    /// Creates the student and its optional associations all-or-nothing.
    async fn create_student(&self, student: NewStudent) -> PortResult<Student>;
}

/// Storage for demo session tokens.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, token: &str, user: SessionUser) -> PortResult<()>;

    async fn get(&self, token: &str) -> PortResult<Option<SessionUser>>;

    /// Removing an unknown token is not an error.
    async fn remove(&self, token: &str) -> PortResult<()>;
}
