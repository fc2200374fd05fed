//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use crate::adapters::query;
use alumni_map_core::domain::{
    Club, GraduateRow, Industry, IndustryCount, Location, LocationCount, NewClub, NewLocation,
    NewStudent, Student,
};
use alumni_map_core::filter::GraduateFilter;
use alumni_map_core::ports::{DatabaseService, PortError, PortResult};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps a `sqlx` error onto the port error taxonomy.
///
/// SQLSTATE 23505 (unique violation) becomes `Conflict`; everything else is unexpected.
fn map_db_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound("Row not found".to_string()),
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            PortError::Conflict(db_err.message().to_string())
        }
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct StudentRecord {
    student_id: i32,
    first_name: String,
    last_name: String,
    email: Option<String>,
}
impl StudentRecord {
    fn to_domain(self) -> Student {
        Student {
            student_id: self.student_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct ClubRecord {
    club_id: i32,
    name: String,
    category: Option<String>,
}
impl ClubRecord {
    fn to_domain(self) -> Club {
        Club {
            club_id: self.club_id,
            name: self.name,
            category: self.category,
        }
    }
}

#[derive(FromRow)]
struct LocationRecord {
    loc_id: i32,
    city: String,
    state: Option<String>,
    country: Option<String>,
}
impl LocationRecord {
    fn to_domain(self) -> Location {
        Location {
            loc_id: self.loc_id,
            city: self.city,
            state: self.state,
            country: self.country,
        }
    }
}

#[derive(FromRow)]
struct IndustryRecord {
    industry_id: i32,
    name: String,
}
impl IndustryRecord {
    fn to_domain(self) -> Industry {
        Industry {
            industry_id: self.industry_id,
            name: self.name,
        }
    }
}

#[derive(FromRow)]
struct YearRecord {
    year: i32,
}

#[derive(FromRow)]
struct GraduateRecord {
    student_id: i32,
    first_name: String,
    last_name: String,
    email: Option<String>,
    loc_id: i32,
    city: String,
    state: Option<String>,
    country: Option<String>,
    graduation_year: Option<i32>,
    degree: Option<String>,
    honors: Option<String>,
    industry_id: Option<i32>,
    industry_name: Option<String>,
    club_id: Option<i32>,
    club_name: Option<String>,
    club_category: Option<String>,
}
impl GraduateRecord {
    fn to_domain(self) -> GraduateRow {
        GraduateRow {
            student_id: self.student_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            loc_id: self.loc_id,
            city: self.city,
            state: self.state,
            country: self.country,
            graduation_year: self.graduation_year,
            degree: self.degree,
            honors: self.honors,
            industry_id: self.industry_id,
            industry_name: self.industry_name,
            club_id: self.club_id,
            club_name: self.club_name,
            club_category: self.club_category,
        }
    }
}

#[derive(FromRow)]
struct LocationCountRecord {
    city: String,
    state: Option<String>,
    student_count: i64,
}
impl LocationCountRecord {
    fn to_domain(self) -> LocationCount {
        LocationCount {
            city: self.city,
            state: self.state,
            student_count: self.student_count,
        }
    }
}

#[derive(FromRow)]
struct IndustryCountRecord {
    industry_name: String,
    student_count: i64,
}
impl IndustryCountRecord {
    fn to_domain(self) -> IndustryCount {
        IndustryCount {
            industry_name: self.industry_name,
            student_count: self.student_count,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn ping(&self) -> PortResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn list_clubs(&self) -> PortResult<Vec<Club>> {
        let records = sqlx::query_as::<_, ClubRecord>(
            "SELECT club_id, name, category FROM club ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_years(&self) -> PortResult<Vec<i32>> {
        let records = sqlx::query_as::<_, YearRecord>(
            "SELECT DISTINCT year FROM graduated_in ORDER BY year DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(|r| r.year).collect())
    }

    async fn list_locations(&self) -> PortResult<Vec<Location>> {
        let records = sqlx::query_as::<_, LocationRecord>(
            "SELECT loc_id, city, state, country FROM location ORDER BY city",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_industries(&self) -> PortResult<Vec<Industry>> {
        let records = sqlx::query_as::<_, IndustryRecord>(
            "SELECT industry_id, name FROM industry ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_students(&self) -> PortResult<Vec<Student>> {
        let records = sqlx::query_as::<_, StudentRecord>(
            "SELECT student_id, first_name, last_name, email FROM student ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn graduate_locations(&self, filter: GraduateFilter) -> PortResult<Vec<GraduateRow>> {
        let mut builder = query::graduate_locations(&filter);
        debug!(sql = builder.sql(), ?filter, "Querying graduate locations");
        let records = builder
            .build_query_as::<GraduateRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn location_distribution(
        &self,
        filter: GraduateFilter,
    ) -> PortResult<Vec<LocationCount>> {
        let mut builder = query::location_distribution(&filter);
        let records = builder
            .build_query_as::<LocationCountRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn industry_distribution(
        &self,
        filter: GraduateFilter,
    ) -> PortResult<Vec<IndustryCount>> {
        let mut builder = query::industry_distribution(&filter);
        let records = builder
            .build_query_as::<IndustryCountRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_club(&self, club: NewClub) -> PortResult<Club> {
        let record = sqlx::query_as::<_, ClubRecord>(
            "INSERT INTO club (name, category) VALUES ($1, $2) RETURNING club_id, name, category",
        )
        .bind(&club.name)
        .bind(&club.category)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.to_domain())
    }

    async fn create_location(&self, location: NewLocation) -> PortResult<Location> {
        let record = sqlx::query_as::<_, LocationRecord>(
            "INSERT INTO location (city, state, country) VALUES ($1, $2, $3) RETURNING loc_id, city, state, country",
        )
        .bind(&location.city)
        .bind(&location.state)
        .bind(&location.country)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.to_domain())
    }

    async fn create_industry(&self, name: &str) -> PortResult<Industry> {
        let record = sqlx::query_as::<_, IndustryRecord>(
            "INSERT INTO industry (name) VALUES ($1) RETURNING industry_id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.to_domain())
    }

    async fn create_student(&self, student: NewStudent) -> PortResult<Student> {
        // Dropping `tx` on any early return rolls back and hands the connection back to the pool.
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let record = sqlx::query_as::<_, StudentRecord>(
            "INSERT INTO student (first_name, last_name, email) VALUES ($1, $2, $3) \
             RETURNING student_id, first_name, last_name, email",
        )
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;
        let student_id = record.student_id;

        if let Some(loc_id) = student.location_id {
            sqlx::query(
                "INSERT INTO lives_in (student_id, loc_id, since_date) VALUES ($1, $2, CURRENT_DATE)",
            )
            .bind(student_id)
            .bind(loc_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        if let Some(industry_id) = student.industry_id {
            sqlx::query(
                "INSERT INTO works_in (student_id, industry_id, start_year) VALUES ($1, $2, $3)",
            )
            .bind(student_id)
            .bind(industry_id)
            .bind(Utc::now().year())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        if let Some(club_id) = student.club_id {
            sqlx::query(
                "INSERT INTO member_of (student_id, club_id, join_date) VALUES ($1, $2, CURRENT_DATE)",
            )
            .bind(student_id)
            .bind(club_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        if let Some((year, degree)) = student.graduation() {
            // graduated_in.year references year_dim.
            sqlx::query("INSERT INTO year_dim (year) VALUES ($1) ON CONFLICT (year) DO NOTHING")
                .bind(year)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;

            sqlx::query("INSERT INTO graduated_in (student_id, year, degree) VALUES ($1, $2, $3)")
                .bind(student_id)
                .bind(year)
                .bind(degree)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        info!(student_id, "Student created");
        Ok(record.to_domain())
    }
}
