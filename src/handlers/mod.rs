//! HTTP handlers for entity CRUD and operational endpoints.

pub mod entity;
pub mod ops;
