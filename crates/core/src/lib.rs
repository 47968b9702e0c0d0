//! # Shapegen Core
//!
//! Core traits and error handling for Shapegen.
//!
//! This crate provides the foundational building blocks shared by the IR,
//! the code generators and the CLI:
//!
//! - **Traits**: `Validatable` for boundary checks on front-end input
//! - **Errors**: Unified error handling with `ShapeError` and `ShapeResult`
//!

pub mod error;
pub mod traits;

// Re-export commonly used items at crate root
pub use error::{ResultExt, ShapeError, ShapeResult};
pub use traits::Validatable;
