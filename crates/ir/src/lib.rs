//! # Shapegen IR (Intermediate Representation)
//!
//! This crate provides the intermediate representation shared by every
//! Shapegen backend. It is produced once by the type-introspection front end
//! and treated as immutable input afterwards.
//!
//! ## Core Concepts
//!
//! - **TypeNode**: A closed, tagged description of a type (primitive, literal,
//!   array, union, object, reference, ...)
//! - **Property**: A named, possibly optional field of an object type
//! - **Declaration**: A named top-level type plus export visibility and the
//!   sibling declarations it references
//! - **ParseResult**: The batch of declarations for one source location
//!

// Module declarations
pub mod declaration;
pub mod serialization;
pub mod type_node;

// Re-export commonly used types at crate root
pub use declaration::{Declaration, ParseResult};
pub use serialization::{
    IrDocument, load_parse_result, parse_result_from_str, parse_result_to_string,
    save_parse_result,
};
pub use type_node::{EnumMember, LiteralValue, Property, TypeNode};

// Re-export core types that are commonly used with IR
pub use shapegen_core::{ShapeError, ShapeResult, Validatable};

/// Current schema version for IR documents
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        Declaration, EnumMember, LiteralValue, ParseResult, Property, ShapeError, ShapeResult,
        TypeNode, Validatable, load_parse_result,
    };
}

// ============================================================================
// Tests
// ============================================================================
