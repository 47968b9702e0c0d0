//! Loading and saving IR documents
//!
//! The introspection front end writes its [`ParseResult`] as a JSON
//! document. This module reads it back, checks the schema version and
//! validates the batch before any generator runs. Every problem here is a
//! hard failure: a batch that cannot be read is never partially generated.

use crate::{ParseResult, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use shapegen_core::{ShapeError, ShapeResult, Validatable};
use std::path::Path;

// ============================================================================
// Constants
// ============================================================================

/// File extension for IR documents
pub const IR_EXTENSION: &str = "json";

// ============================================================================
// IR Document Wrapper
// ============================================================================

/// Wrapper for IR documents that includes version information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrDocument {
    /// Schema version of the document
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,

    /// Source location the front end introspected, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// The declarations
    #[serde(flatten)]
    pub result: ParseResult,
}

fn current_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl IrDocument {
    /// Wrap a parse result at the current schema version
    pub fn new(result: ParseResult) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            source: None,
            result,
        }
    }

    /// Record the source location
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Reject documents written by a newer front end
    pub fn check_version(&self) -> ShapeResult<()> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(ShapeError::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                found: self.schema_version,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Load Functions
// ============================================================================

/// Load a parse result from an IR document on disk
///
/// # Example
///
/// ```rust,ignore
/// use shapegen_ir::load_parse_result;
///
/// let batch = load_parse_result("order.ir.json")?;
/// println!("{} declarations", batch.len());
/// ```
pub fn load_parse_result(path: impl AsRef<Path>) -> ShapeResult<ParseResult> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ShapeError::IrNotFound(path.to_path_buf()));
    }

    let json = std::fs::read_to_string(path).map_err(|e| ShapeError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!("Loaded IR document {} ({} bytes)", path.display(), json.len());

    parse_result_from_str(&json)
}

/// Load a parse result from a JSON string
pub fn parse_result_from_str(json: &str) -> ShapeResult<ParseResult> {
    let doc: IrDocument = serde_json::from_str(json)
        .map_err(|e| ShapeError::invalid_ir(format!("Failed to parse IR document: {}", e)))?;

    doc.check_version()?;
    doc.result.validate()?;

    Ok(doc.result)
}

// ============================================================================
// Save Functions
// ============================================================================

/// Save a parse result as a pretty-printed IR document
pub fn save_parse_result(result: &ParseResult, path: impl AsRef<Path>) -> ShapeResult<()> {
    let path = path.as_ref();
    let json = parse_result_to_string(result)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ShapeError::DirectoryCreate {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| ShapeError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

/// Serialize a parse result to a pretty-printed IR document string
pub fn parse_result_to_string(result: &ParseResult) -> ShapeResult<String> {
    let doc = IrDocument::new(result.clone());
    Ok(serde_json::to_string_pretty(&doc)?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Declaration, Property, TypeNode};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn order_batch() -> ParseResult {
        ParseResult::new(vec![Declaration::new(
            "Order",
            TypeNode::object(vec![
                Property::new("id", TypeNode::string()),
                Property::new(
                    "status",
                    TypeNode::string_literals(["pending", "shipped", "cancelled"]),
                ),
                Property::new("tags", TypeNode::array(TypeNode::string())),
            ]),
        )])
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("order.json");

        save_parse_result(&order_batch(), &path).unwrap();
        let loaded = load_parse_result(&path).unwrap();

        assert_eq!(loaded, order_batch());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_parse_result(dir.path().join("nope.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_version_defaults_to_current() {
        let json = r#"{ "declarations": [] }"#;
        let batch = parse_result_from_str(json).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = r#"{ "schemaVersion": 99, "declarations": [] }"#;
        let err = parse_result_from_str(json).unwrap_err();
        assert!(matches!(
            err,
            ShapeError::SchemaVersionMismatch { found: 99, .. }
        ));
    }

    #[test]
    fn test_malformed_document() {
        let err = parse_result_from_str("{ not json").unwrap_err();
        assert!(matches!(err, ShapeError::InvalidIrFormat(_)));
    }

    #[test]
    fn test_duplicate_names_rejected_on_load() {
        let json = r#"{
            "declarations": [
                { "name": "A", "type": { "kind": "object", "properties": [] }, "isExported": true },
                { "name": "A", "type": { "kind": "object", "properties": [] }, "isExported": true }
            ]
        }"#;
        let err = parse_result_from_str(json).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_front_end_document_shape() {
        let json = r#"{
            "schemaVersion": 1,
            "source": "src/types/order.ts",
            "declarations": [
                {
                    "name": "Order",
                    "isExported": true,
                    "dependencies": ["Customer"],
                    "type": { "kind": "object", "properties": [
                        { "name": "customer", "type": { "kind": "reference", "name": "Customer" } },
                        { "name": "notes", "type": { "kind": "primitive", "name": "string" }, "isOptional": true }
                    ] }
                }
            ]
        }"#;
        let batch = parse_result_from_str(json).unwrap();
        let order = batch.find("Order").unwrap();
        assert!(order.dependencies.contains("Customer"));
        assert!(order.ty.properties().unwrap()[1].is_optional);
    }
}
