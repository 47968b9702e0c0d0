//! # Shapegen Codegen
//!
//! Code generation engine for Shapegen.
//!
//! This crate turns the declarations of a [`ParseResult`](shapegen_ir::ParseResult)
//! into TypeScript artifacts that all agree on the same field set.
//!
//! ## Features
//!
//! - **Schema Generation**: zod validators (`FooSchema`), lazy for recursive types
//! - **Store Generation**: zustand stores (`useFooStore`) with typed setters and
//!   an extended array action set, optionally persisted to `localStorage`
//! - **Form Generation**: React form components (`FooForm`) bound to both
//! - **Traversal Utilities**: the shared unwrapping, detection and default
//!   rules every backend goes through
//!

// ============================================================================
// Modules
// ============================================================================

pub mod context;
pub mod form;
pub mod generator;
pub mod schema;
pub mod store;
pub mod traverse;

// ============================================================================
// Re-exports
// ============================================================================

pub use context::GenerationContext;
pub use form::{FormArtifact, FormOptions, build_form};
pub use generator::{GenerationSummary, Generator, generate, summarize};
pub use schema::build_schema;
pub use store::{StoreOptions, build_store};

use serde::{Deserialize, Serialize};
use shapegen_core::{ShapeError, ShapeResult, Validatable};
use std::path::{Path, PathBuf};

/// Default configuration file name looked up by the CLI
pub const CONFIG_FILE_NAME: &str = "shapegen.toml";

// ============================================================================
// Targets
// ============================================================================

/// A single backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Schema,
    Store,
    Form,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Schema, Target::Store, Target::Form];

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Schema => "schema",
            Target::Store => "store",
            Target::Form => "form",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Target {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "schema" | "schemas" | "zod" => Ok(Target::Schema),
            "store" | "stores" | "zustand" => Ok(Target::Store),
            "form" | "forms" => Ok(Target::Form),
            other => Err(ShapeError::InvalidConfig(format!(
                "unknown target '{}' (expected schema, store or form)",
                other
            ))),
        }
    }
}

/// Which backends run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Targets {
    pub schema: bool,
    pub store: bool,
    pub form: bool,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            schema: true,
            store: true,
            form: true,
        }
    }
}

impl Targets {
    /// Every backend disabled except the listed ones.
    pub fn only(targets: &[Target]) -> Self {
        Self {
            schema: targets.contains(&Target::Schema),
            store: targets.contains(&Target::Store),
            form: targets.contains(&Target::Form),
        }
    }

    pub fn is_enabled(&self, target: Target) -> bool {
        match target {
            Target::Schema => self.schema,
            Target::Store => self.store,
            Target::Form => self.form,
        }
    }

    pub fn enabled(&self) -> Vec<Target> {
        Target::ALL
            .into_iter()
            .filter(|t| self.is_enabled(*t))
            .collect()
    }
}

// ============================================================================
// GeneratorConfig
// ============================================================================

/// Configuration for the code generator
///
/// Loaded from `shapegen.toml`:
///
/// ```toml
/// output_dir = "src/generated"
/// overwrite = true
/// types_import = "@/types"
///
/// [targets]
/// form = false
///
/// [store]
/// persist = true
/// storage_key = "app-state"
///
/// [form]
/// submit_label = "Continue"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Output directory for generated code
    pub output_dir: PathBuf,

    /// Backends to run
    pub targets: Targets,

    /// Store options
    pub store: StoreOptions,

    /// Form options
    pub form: FormOptions,

    /// Module the user's declared types are imported from, if any
    pub types_import: Option<String>,

    /// Whether to overwrite existing files
    pub overwrite: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./generated"),
            targets: Targets::default(),
            store: StoreOptions::default(),
            form: FormOptions::default(),
            types_import: None,
            overwrite: false,
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> ShapeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ShapeError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!("Loaded config {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> ShapeResult<Self> {
        let config: GeneratorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Replace the target selection
    pub fn with_targets(mut self, targets: Targets) -> Self {
        self.targets = targets;
        self
    }

    /// Persist stores to `localStorage`
    pub fn persisted(mut self) -> Self {
        self.store.persist = true;
        self
    }

    /// Set the storage key used by persisted stores
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.store.storage_key = Some(key.into());
        self
    }

    /// Set the form options
    pub fn with_form(mut self, form: FormOptions) -> Self {
        self.form = form;
        self
    }

    /// Import declared types from `module` in generated files
    pub fn with_types_import(mut self, module: impl Into<String>) -> Self {
        self.types_import = Some(module.into());
        self
    }

    /// Allow overwriting existing files
    pub fn allow_overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }
}

impl Validatable for GeneratorConfig {
    fn validate(&self) -> ShapeResult<()> {
        if self.targets.enabled().is_empty() {
            return Err(ShapeError::InvalidConfig(
                "at least one target must be enabled".to_string(),
            ));
        }
        if let Some(key) = &self.store.storage_key {
            if key.trim().is_empty() {
                return Err(ShapeError::InvalidConfig(
                    "store.storage_key cannot be empty".to_string(),
                ));
            }
        }
        if self.form.submit_label.trim().is_empty() {
            return Err(ShapeError::InvalidConfig(
                "form.submit_label cannot be empty".to_string(),
            ));
        }
        if let Some(module) = &self.types_import {
            if module.trim().is_empty() {
                return Err(ShapeError::InvalidConfig(
                    "types_import cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// GeneratedFile
// ============================================================================

/// Represents a single generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Relative path from output directory
    pub path: PathBuf,

    /// File content
    pub content: String,

    /// File type for categorization
    pub file_type: FileType,

    /// Backend that produced the file
    pub target: Target,
}

impl GeneratedFile {
    /// Create a new generated file
    pub fn new(
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        file_type: FileType,
        target: Target,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            file_type,
            target,
        }
    }

    /// Create a TypeScript module
    pub fn typescript(path: impl Into<PathBuf>, content: impl Into<String>, target: Target) -> Self {
        Self::new(path, content, FileType::TypeScript, target)
    }

    /// Create a TSX component module
    pub fn tsx(path: impl Into<PathBuf>, content: impl Into<String>, target: Target) -> Self {
        Self::new(path, content, FileType::Tsx, target)
    }

    /// Get the file extension
    pub fn extension(&self) -> &str {
        self.file_type.extension()
    }
}

/// Type of generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    TypeScript,
    Tsx,
}

impl FileType {
    /// Get the file extension for this type
    pub fn extension(&self) -> &str {
        match self {
            FileType::TypeScript => "ts",
            FileType::Tsx => "tsx",
        }
    }
}

// ============================================================================
// GeneratedProject
// ============================================================================

/// Everything one generation run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedProject {
    /// All generated files, in emission order
    pub files: Vec<GeneratedFile>,

    /// Warnings raised during generation
    pub warnings: Vec<String>,
}

impl GeneratedProject {
    /// Create an empty project
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the project
    pub fn add_file(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Get the number of files
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Look up a file by relative path
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        let path = path.as_ref();
        self.files.iter().find(|f| f.path == path)
    }

    /// Get files produced by one backend
    pub fn files_for(&self, target: Target) -> Vec<&GeneratedFile> {
        self.files.iter().filter(|f| f.target == target).collect()
    }

    /// Write all files below `base_dir`.
    ///
    /// Without `overwrite`, nothing is written when any target path already
    /// exists. Returns the written paths.
    pub fn write_to_disk(
        &self,
        base_dir: impl AsRef<Path>,
        overwrite: bool,
    ) -> ShapeResult<Vec<PathBuf>> {
        let base_dir = base_dir.as_ref();

        if !overwrite {
            if let Some(existing) = self
                .files
                .iter()
                .map(|f| base_dir.join(&f.path))
                .find(|p| p.exists())
            {
                return Err(ShapeError::OutputExists(existing));
            }
        }

        let mut written = Vec::with_capacity(self.files.len());

        for file in &self.files {
            let full_path = base_dir.join(&file.path);

            // Create parent directories
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ShapeError::DirectoryCreate {
                    path: parent.to_path_buf(),
                    message: e.to_string(),
                })?;
            }

            std::fs::write(&full_path, &file.content).map_err(|e| ShapeError::FileWrite {
                path: full_path.clone(),
                message: e.to_string(),
            })?;

            tracing::debug!("Wrote {}", full_path.display());
            written.push(full_path);
        }

        Ok(written)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_generator_config_default() {
        let config = GeneratorConfig::default();
        assert_eq!(config.targets, Targets::default());
        assert!(!config.store.persist);
        assert_eq!(config.form.submit_label, "Save");
        assert!(!config.overwrite);
    }

    #[test]
    fn test_generator_config_builder() {
        let config = GeneratorConfig::new()
            .with_output_dir("/tmp/output")
            .persisted()
            .with_storage_key("app")
            .with_targets(Targets::only(&[Target::Schema, Target::Store]))
            .allow_overwrite();

        assert_eq!(config.output_dir, PathBuf::from("/tmp/output"));
        assert!(config.store.persist);
        assert_eq!(config.store.storage_key.as_deref(), Some("app"));
        assert!(!config.targets.form);
        assert!(config.overwrite);
    }

    #[test]
    fn test_config_from_toml() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            output_dir = "src/generated"
            types_import = "@/types"

            [targets]
            form = false

            [store]
            persist = true

            [form]
            title = "Edit"
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("src/generated"));
        assert_eq!(config.types_import.as_deref(), Some("@/types"));
        assert_eq!(config.targets.enabled(), vec![Target::Schema, Target::Store]);
        assert!(config.store.persist);
        assert_eq!(config.form.title.as_deref(), Some("Edit"));
        assert_eq!(config.form.reset_label, "Reset");
    }

    #[test]
    fn test_config_errors() {
        let err = GeneratorConfig::from_toml_str("output_dir = [").unwrap_err();
        assert!(matches!(err, ShapeError::ConfigParse(_)));

        let err = GeneratorConfig::from_toml_str(
            "[targets]\nschema = false\nstore = false\nform = false\n",
        )
        .unwrap_err();
        assert!(matches!(err, ShapeError::InvalidConfig(_)));

        let err = GeneratorConfig::from_toml_str("[store]\nstorage_key = \" \"\n").unwrap_err();
        assert!(matches!(err, ShapeError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = GeneratorConfig::load(dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_target_parsing() {
        assert_eq!("zod".parse::<Target>().unwrap(), Target::Schema);
        assert_eq!("Forms".parse::<Target>().unwrap(), Target::Form);
        assert!("graphql".parse::<Target>().is_err());
    }

    #[test]
    fn test_generated_file() {
        let file = GeneratedFile::tsx("forms/OrderForm.tsx", "", Target::Form);
        assert_eq!(file.extension(), "tsx");
        assert_eq!(file.file_type, FileType::Tsx);
    }

    #[test]
    fn test_write_to_disk_respects_overwrite() {
        let dir = tempdir().unwrap();
        let mut project = GeneratedProject::new();
        project.add_file(GeneratedFile::typescript(
            "stores/order.store.ts",
            "export {};\n",
            Target::Store,
        ));

        let written = project.write_to_disk(dir.path(), false).unwrap();
        assert_eq!(written.len(), 1);
        assert!(dir.path().join("stores/order.store.ts").exists());

        let err = project.write_to_disk(dir.path(), false).unwrap_err();
        assert!(matches!(err, ShapeError::OutputExists(_)));

        assert!(project.write_to_disk(dir.path(), true).is_ok());
        assert_eq!(project.files_for(Target::Store).len(), 1);
        assert!(project.file("stores/order.store.ts").is_some());
    }
}
