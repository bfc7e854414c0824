//! # Core Types
//!
//! The record model shared by the storage adapter and the HTTP layer: the
//! `Student` row, the validated payloads used to create or replace one, and the
//! sparse `StudentPatch` used for partial updates.

pub mod error;
pub mod patch;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::{FieldError, ValidationErrors};
pub use patch::{PatchField, PatchValue, StudentPatch};
pub use structs::{NewStudent, Student};
