pub mod domain;
pub mod filter;
pub mod geo;
pub mod grouping;
pub mod ports;

pub use domain::{
    Club, GraduateRow, Industry, IndustryCount, Location, LocationCount, NewClub, NewLocation,
    NewStudent, SessionUser, Statistics, Student,
};
pub use filter::{FilterError, GraduateFilter};
pub use grouping::{build_markers, group_by_location, LocationGroup, MapMarker, MarkerStyle};
pub use ports::{DatabaseService, PortError, PortResult, SessionStore};
