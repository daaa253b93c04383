//! Generic CRUD service and request validation, driven by the entity catalog.

mod crud;
mod validation;

pub use crud::CrudService;
pub use validation::validate;
