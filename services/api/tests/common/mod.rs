//! Shared helpers for the HTTP-level tests: an in-memory `DatabaseService`
//! and small request/response utilities.

#![allow(dead_code)]

use alumni_map_core::domain::{
    Club, GraduateRow, Industry, IndustryCount, Location, LocationCount, NewClub, NewLocation,
    NewStudent, Student,
};
use alumni_map_core::filter::GraduateFilter;
use alumni_map_core::ports::{DatabaseService, PortError, PortResult};
use api_lib::adapters::InMemorySessionStore;
use api_lib::web::{build_router, state::AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
struct Tables {
    students: Vec<Student>,
    clubs: Vec<Club>,
    locations: Vec<Location>,
    industries: Vec<Industry>,
    graduates: Vec<GraduateRow>,
}

/// An in-memory stand-in for PostgreSQL.
///
/// Graduate rows are seeded directly; filters are applied the same way the
/// SQL predicates are. Student creation writes the student row first and
/// undoes it when a later reference fails, as the SQL transaction does.
#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
    failing: bool,
    pub last_filter: Mutex<Option<GraduateFilter>>,
    /// Student rows written, including ones later rolled back.
    pub student_writes: AtomicUsize,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the database were down.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_graduates(self, rows: Vec<GraduateRow>) -> Self {
        self.tables.lock().unwrap().graduates = rows;
        self
    }

    pub fn with_location(self, city: &str, state: &str) -> Self {
        {
            let mut tables = self.tables.lock().unwrap();
            let loc_id = tables.locations.len() as i32 + 1;
            tables.locations.push(Location {
                loc_id,
                city: city.to_string(),
                state: Some(state.to_string()),
                country: Some("USA".to_string()),
            });
        }
        self
    }

    fn check(&self) -> PortResult<()> {
        if self.failing {
            Err(PortError::Unexpected("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn matching(&self, filter: GraduateFilter) -> Vec<GraduateRow> {
        *self.last_filter.lock().unwrap() = Some(filter);
        self.tables
            .lock()
            .unwrap()
            .graduates
            .iter()
            .filter(|row| filter.club_id.is_none() || row.club_id == filter.club_id)
            .filter(|row| filter.year.is_none() || row.graduation_year == filter.year)
            .cloned()
            .collect()
    }
}

fn sorted_desc<K: Ord + Clone>(counts: BTreeMap<K, BTreeSet<i32>>) -> Vec<(K, i64)> {
    let mut counts: Vec<_> = counts
        .into_iter()
        .map(|(key, students)| (key, students.len() as i64))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn ping(&self) -> PortResult<()> {
        self.check()
    }

    async fn list_clubs(&self) -> PortResult<Vec<Club>> {
        self.check()?;
        let mut clubs = self.tables.lock().unwrap().clubs.clone();
        clubs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clubs)
    }

    async fn list_years(&self) -> PortResult<Vec<i32>> {
        self.check()?;
        let years: BTreeSet<i32> = self
            .tables
            .lock()
            .unwrap()
            .graduates
            .iter()
            .filter_map(|row| row.graduation_year)
            .collect();
        Ok(years.into_iter().rev().collect())
    }

    async fn list_locations(&self) -> PortResult<Vec<Location>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().locations.clone())
    }

    async fn list_industries(&self) -> PortResult<Vec<Industry>> {
        self.check()?;
        Ok(self.tables.lock().unwrap().industries.clone())
    }

    async fn list_students(&self) -> PortResult<Vec<Student>> {
        self.check()?;
        let mut students = self.tables.lock().unwrap().students.clone();
        students.sort_by(|a, b| {
            (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
        });
        Ok(students)
    }

    async fn graduate_locations(&self, filter: GraduateFilter) -> PortResult<Vec<GraduateRow>> {
        self.check()?;
        let mut rows = self.matching(filter);
        rows.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
        Ok(rows)
    }

    async fn location_distribution(
        &self,
        filter: GraduateFilter,
    ) -> PortResult<Vec<LocationCount>> {
        self.check()?;
        let mut counts: BTreeMap<(String, Option<String>), BTreeSet<i32>> = BTreeMap::new();
        for row in self.matching(filter) {
            counts
                .entry((row.city.clone(), row.state.clone()))
                .or_default()
                .insert(row.student_id);
        }
        Ok(sorted_desc(counts)
            .into_iter()
            .map(|((city, state), student_count)| LocationCount {
                city,
                state,
                student_count,
            })
            .collect())
    }

    async fn industry_distribution(
        &self,
        filter: GraduateFilter,
    ) -> PortResult<Vec<IndustryCount>> {
        self.check()?;
        let mut counts: BTreeMap<String, BTreeSet<i32>> = BTreeMap::new();
        for row in self.matching(filter) {
            if let Some(industry) = row.industry_name {
                counts.entry(industry).or_default().insert(row.student_id);
            }
        }
        Ok(sorted_desc(counts)
            .into_iter()
            .map(|(industry_name, student_count)| IndustryCount {
                industry_name,
                student_count,
            })
            .collect())
    }

    async fn create_club(&self, club: NewClub) -> PortResult<Club> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.clubs.iter().any(|c| c.name == club.name) {
            return Err(PortError::Conflict("club_name_key".to_string()));
        }
        let created = Club {
            club_id: tables.clubs.len() as i32 + 1,
            name: club.name,
            category: club.category,
        };
        tables.clubs.push(created.clone());
        Ok(created)
    }

    async fn create_location(&self, location: NewLocation) -> PortResult<Location> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let created = Location {
            loc_id: tables.locations.len() as i32 + 1,
            city: location.city,
            state: location.state,
            country: Some(location.country),
        };
        tables.locations.push(created.clone());
        Ok(created)
    }

    async fn create_industry(&self, name: &str) -> PortResult<Industry> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.industries.iter().any(|i| i.name == name) {
            return Err(PortError::Conflict("industry_name_key".to_string()));
        }
        let created = Industry {
            industry_id: tables.industries.len() as i32 + 1,
            name: name.to_string(),
        };
        tables.industries.push(created.clone());
        Ok(created)
    }

    async fn create_student(&self, student: NewStudent) -> PortResult<Student> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if student.email.is_some() && tables.students.iter().any(|s| s.email == student.email) {
            return Err(PortError::Conflict("student_email_key".to_string()));
        }
        let checkpoint = tables.students.len();
        let created = Student {
            student_id: checkpoint as i32 + 1,
            first_name: student.first_name,
            last_name: student.last_name,
            email: student.email,
        };
        tables.students.push(created.clone());
        self.student_writes.fetch_add(1, Ordering::SeqCst);

        if let Some(loc_id) = student.location_id {
            if !tables.locations.iter().any(|l| l.loc_id == loc_id) {
                // Same outcome as dropping an uncommitted transaction.
                tables.students.truncate(checkpoint);
                return Err(PortError::Unexpected(
                    "insert or update on table \"lives_in\" violates foreign key constraint"
                        .to_string(),
                ));
            }
        }
        Ok(created)
    }
}

/// A graduate row with the given location, industry and graduation year.
pub fn graduate(
    id: i32,
    name: (&str, &str),
    city: &str,
    state: &str,
    industry: Option<&str>,
    year: Option<i32>,
) -> GraduateRow {
    GraduateRow {
        student_id: id,
        first_name: name.0.to_string(),
        last_name: name.1.to_string(),
        email: Some(format!("{}@example.edu", name.0.to_lowercase())),
        loc_id: 1,
        city: city.to_string(),
        state: Some(state.to_string()),
        country: Some("USA".to_string()),
        graduation_year: year,
        degree: Some("BS".to_string()),
        honors: None,
        industry_id: industry.map(|_| 1),
        industry_name: industry.map(str::to_string),
        club_id: None,
        club_name: None,
        club_category: None,
    }
}

pub fn app(db: Arc<MemoryDb>) -> Router {
    let state = AppState::new(db, Arc::new(InMemorySessionStore::new()));
    build_router(Arc::new(state))
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}
