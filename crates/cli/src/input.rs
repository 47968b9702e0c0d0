//! Resolving command-line inputs into one declaration batch.
//!
//! An input is either a single IR document or a directory. Directories are
//! walked recursively and every `*.json` file is loaded in path order, so the
//! merged batch is the same on every run.

use shapegen_core::{ResultExt, ShapeError, ShapeResult, Validatable};
use shapegen_ir::{ParseResult, load_parse_result, serialization::IR_EXTENSION};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// IR documents found below `input`, sorted by path.
pub fn collect_documents(input: &Path) -> ShapeResult<Vec<PathBuf>> {
    if !input.exists() {
        return Err(ShapeError::IrNotFound(input.to_path_buf()));
    }
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(input).follow_links(true) {
        let entry = entry.map_err(|e| ShapeError::FileRead {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| input.to_path_buf()),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().and_then(|ext| ext.to_str()) == Some(IR_EXTENSION)
        {
            documents.push(path.to_path_buf());
        }
    }
    documents.sort();

    if documents.is_empty() {
        return Err(ShapeError::invalid_ir(format!(
            "no .{} documents found in {}",
            IR_EXTENSION,
            input.display()
        )));
    }

    Ok(documents)
}

/// Load every document below `input` and merge them into a single batch.
///
/// Declaration names must stay unique across documents.
pub fn load_batch(input: &Path) -> ShapeResult<ParseResult> {
    let mut merged = ParseResult::default();

    for path in collect_documents(input)? {
        let batch = load_parse_result(&path).with_context(path.display().to_string())?;
        tracing::debug!(
            path = %path.display(),
            declarations = batch.len(),
            "loaded IR document",
        );
        merged.declarations.extend(batch.declarations);
    }

    merged.validate()?;
    Ok(merged)
}
