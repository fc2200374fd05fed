pub mod db;
pub mod query;
pub mod session_store;

pub use db::DbAdapter;
pub use session_store::InMemorySessionStore;
