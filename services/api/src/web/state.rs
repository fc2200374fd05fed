//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use alumni_map_core::ports::{DatabaseService, SessionStore};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(db: Arc<dyn DatabaseService>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { db, sessions }
    }
}
