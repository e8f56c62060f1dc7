//! Stacks Library Circulation Server
//!
//! A REST JSON API for a small library: a catalog of books with available
//! copy counts, member accounts, and checkout/return transactions that keep
//! the two consistent under concurrent requests.

use std::sync::Arc;

pub mod api;
pub mod circulation;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
