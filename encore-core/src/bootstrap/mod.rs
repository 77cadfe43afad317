//! Bootstrap module for initializing the encore server
//!
//! This module handles:
//! - Database initialization
//! - Service initialization and dependency injection

pub mod database;
pub mod services;

pub use database::init_database;
pub use services::{init_services, Services};
