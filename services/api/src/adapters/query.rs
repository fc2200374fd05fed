//! services/api/src/adapters/query.rs
//!
//! Builds the filtered graduate and statistics queries.
//!
//! Each query is a fixed base statement followed by zero or more named
//! predicates. The predicates always reference the same join aliases:
//! `m` for the current `member_of` row and `g` for `graduated_in`.

use alumni_map_core::GraduateFilter;
use sqlx::{Postgres, QueryBuilder};

const GRADUATE_LOCATIONS_BASE: &str = "\
SELECT s.student_id, s.first_name, s.last_name, s.email, \
l.loc_id, l.city, l.state, l.country, \
g.year AS graduation_year, g.degree, g.honors, \
i.industry_id, i.name AS industry_name, \
c.club_id, c.name AS club_name, c.category AS club_category \
FROM student s \
LEFT JOIN graduated_in g ON s.student_id = g.student_id \
LEFT JOIN lives_in li ON s.student_id = li.student_id AND li.until_date IS NULL \
LEFT JOIN location l ON li.loc_id = l.loc_id \
LEFT JOIN works_in w ON s.student_id = w.student_id AND w.end_year IS NULL \
LEFT JOIN industry i ON w.industry_id = i.industry_id \
LEFT JOIN member_of m ON s.student_id = m.student_id AND m.leave_date IS NULL \
LEFT JOIN club c ON m.club_id = c.club_id \
WHERE l.loc_id IS NOT NULL";

const GRADUATE_LOCATIONS_ORDER: &str = " ORDER BY s.last_name, s.first_name, s.student_id";

const LOCATION_DISTRIBUTION_BASE: &str = "\
SELECT l.city, l.state, COUNT(DISTINCT s.student_id) AS student_count \
FROM student s \
JOIN lives_in li ON s.student_id = li.student_id AND li.until_date IS NULL \
JOIN location l ON li.loc_id = l.loc_id \
LEFT JOIN graduated_in g ON s.student_id = g.student_id \
LEFT JOIN member_of m ON s.student_id = m.student_id AND m.leave_date IS NULL \
WHERE TRUE";

const LOCATION_DISTRIBUTION_TAIL: &str =
    " GROUP BY l.city, l.state ORDER BY student_count DESC, l.city, l.state";

const INDUSTRY_DISTRIBUTION_BASE: &str = "\
SELECT i.name AS industry_name, COUNT(DISTINCT s.student_id) AS student_count \
FROM student s \
JOIN works_in w ON s.student_id = w.student_id AND w.end_year IS NULL \
JOIN industry i ON w.industry_id = i.industry_id \
LEFT JOIN graduated_in g ON s.student_id = g.student_id \
LEFT JOIN member_of m ON s.student_id = m.student_id AND m.leave_date IS NULL \
WHERE TRUE";

const INDUSTRY_DISTRIBUTION_TAIL: &str =
    " GROUP BY i.name ORDER BY student_count DESC, i.name";

/// An equality predicate appended to a query's `WHERE` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// The student's current club membership is this club.
    CurrentClub(i32),
    /// One of the student's graduation records is for this year.
    GraduationYear(i32),
}

impl Predicate {
    pub fn column(&self) -> &'static str {
        match self {
            Predicate::CurrentClub(_) => "m.club_id",
            Predicate::GraduationYear(_) => "g.year",
        }
    }

    fn value(&self) -> i32 {
        match *self {
            Predicate::CurrentClub(value) | Predicate::GraduationYear(value) => value,
        }
    }

    /// Appends ` AND <column> = $n` and binds the value.
    pub fn push_onto(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder
            .push(" AND ")
            .push(self.column())
            .push(" = ")
            .push_bind(self.value());
    }
}

/// The predicates a filter expands to, in a fixed order.
pub fn predicates(filter: &GraduateFilter) -> Vec<Predicate> {
    filter
        .club_id
        .map(Predicate::CurrentClub)
        .into_iter()
        .chain(filter.year.map(Predicate::GraduationYear))
        .collect()
}

fn filtered(base: &str, filter: &GraduateFilter, tail: &str) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(base);
    for predicate in predicates(filter) {
        predicate.push_onto(&mut builder);
    }
    builder.push(tail);
    builder
}

pub fn graduate_locations(filter: &GraduateFilter) -> QueryBuilder<'static, Postgres> {
    filtered(GRADUATE_LOCATIONS_BASE, filter, GRADUATE_LOCATIONS_ORDER)
}

pub fn location_distribution(filter: &GraduateFilter) -> QueryBuilder<'static, Postgres> {
    filtered(LOCATION_DISTRIBUTION_BASE, filter, LOCATION_DISTRIBUTION_TAIL)
}

pub fn industry_distribution(filter: &GraduateFilter) -> QueryBuilder<'static, Postgres> {
    filtered(INDUSTRY_DISTRIBUTION_BASE, filter, INDUSTRY_DISTRIBUTION_TAIL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(predicate: Predicate) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("WHERE TRUE");
        predicate.push_onto(&mut builder);
        builder.sql().to_string()
    }

    #[test]
    fn current_club_predicate_renders_on_membership_alias() {
        assert_eq!(render(Predicate::CurrentClub(7)), "WHERE TRUE AND m.club_id = $1");
    }

    #[test]
    fn graduation_year_predicate_renders_on_graduation_alias() {
        assert_eq!(render(Predicate::GraduationYear(2023)), "WHERE TRUE AND g.year = $1");
    }

    #[test]
    fn empty_filter_has_no_predicates() {
        assert!(predicates(&GraduateFilter::default()).is_empty());
    }

    #[test]
    fn club_precedes_year() {
        let filter = GraduateFilter {
            club_id: Some(2),
            year: Some(2021),
        };
        assert_eq!(
            predicates(&filter),
            [Predicate::CurrentClub(2), Predicate::GraduationYear(2021)]
        );
    }

    #[test]
    fn graduate_query_numbers_placeholders_and_orders_by_name() {
        let filter = GraduateFilter {
            club_id: Some(2),
            year: Some(2021),
        };
        let builder = graduate_locations(&filter);
        let sql = builder.sql();

        assert!(sql.contains("WHERE l.loc_id IS NOT NULL AND m.club_id = $1 AND g.year = $2"));
        assert!(sql.ends_with("ORDER BY s.last_name, s.first_name, s.student_id"));
    }

    #[test]
    fn year_only_filter_binds_first_placeholder() {
        let filter = GraduateFilter {
            club_id: None,
            year: Some(2023),
        };
        let builder = location_distribution(&filter);

        assert!(builder.sql().contains("WHERE TRUE AND g.year = $1 GROUP BY l.city, l.state"));
        assert!(!builder.sql().contains("$2"));
    }

    #[test]
    fn distributions_count_distinct_students() {
        let filter = GraduateFilter::default();
        for builder in [location_distribution(&filter), industry_distribution(&filter)] {
            let sql = builder.sql();
            assert!(sql.contains("COUNT(DISTINCT s.student_id) AS student_count"));
            assert!(sql.contains("ORDER BY student_count DESC"));
        }
    }
}
