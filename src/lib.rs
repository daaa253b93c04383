//! Biblioteca: library-management record backend over PostgreSQL.
//!
//! Six record types (authors, categories, persons, shelf locations, books,
//! loans) behind one generic CRUD surface: paginated searchable lists,
//! fetch-by-id, validated create/update, delete. The entity catalog drives
//! SQL building, validation, and routing; foreign keys restrict deletes of
//! referenced rows.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;

pub use catalog::{by_path, EntityDef, ENTITIES};
pub use config::AppConfig;
pub use error::AppError;
pub use routes::{app, entity_routes, ops_routes};
pub use schema::{apply_schema, ensure_database_exists};
pub use service::CrudService;
pub use state::AppState;
