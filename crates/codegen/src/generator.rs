//! # Code Generator Orchestrator
//!
//! The `Generator` is the top-level entry point for code generation. It takes a
//! [`ParseResult`] and a [`GeneratorConfig`], builds a [`GenerationContext`],
//! and runs the enabled backends over every declaration to produce a
//! [`GeneratedProject`].
//!
//! ## Pipeline
//!
//! ```text
//! ParseResult + GeneratorConfig
//!         │
//!         ▼
//!   validate, GenerationContext::from_parse_result()
//!         │
//!         ├──► schema::build_schema() per declaration → schemas.ts
//!         ├──► store::build_store()   per declaration → stores/<name>.store.ts
//!         ├──► form::build_form()     per declaration → forms/<Name>Form.tsx
//!         │
//!         ▼
//!   GeneratedProject { files, warnings }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shapegen_codegen::{Generator, GeneratorConfig};
//! use shapegen_ir::load_parse_result;
//!
//! let batch = load_parse_result("order.ir.json")?;
//! let output = Generator::new(GeneratorConfig::default()).generate(&batch)?;
//!
//! println!("Generated {} files", output.file_count());
//! output.write_to_disk("src/generated", false)?;
//! ```

use shapegen_core::{ShapeResult, Validatable};
use shapegen_ir::{Declaration, ParseResult};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::context::GenerationContext;
use crate::form::build_form;
use crate::schema::build_schema;
use crate::store::build_store;
use crate::{GeneratedFile, GeneratedProject, GeneratorConfig, Target};

/// Path of the shared schema module, relative to the output directory
pub const SCHEMAS_FILE: &str = "schemas.ts";

// ============================================================================
// Generator
// ============================================================================

/// Top-level code generator that orchestrates the full generation pipeline.
///
/// The `Generator` is stateless aside from its configuration. Every call to
/// [`generate`](Generator::generate) builds a fresh context, so diagnostics
/// never leak between runs.
#[derive(Debug, Clone)]
pub struct Generator {
    /// Configuration controlling output behaviour (targets, options, etc.).
    config: GeneratorConfig,
}

impl Generator {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Create a new generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Create a generator with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(GeneratorConfig::default())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: GeneratorConfig) {
        self.config = config;
    }

    // ====================================================================
    // Generation
    // ====================================================================

    /// Run every enabled backend over the whole batch.
    ///
    /// Declarations are emitted so that referenced declarations come before
    /// the ones referencing them.
    ///
    /// # Errors
    ///
    /// Returns a `ShapeError` if the configuration or the batch is invalid
    /// (duplicate or empty declaration names). Ineligible declarations are
    /// skipped with a warning instead.
    pub fn generate(&self, batch: &ParseResult) -> ShapeResult<GeneratedProject> {
        self.prepare(batch)?;
        let selected = batch.dependency_sorted();
        Ok(self.emit(batch, &selected, &selected))
    }

    /// Run every enabled backend over a single declaration of the batch.
    ///
    /// Sibling declarations are still used to resolve references, and
    /// `schemas.ts` also carries the schemas of every declaration the
    /// requested one reaches, so each `<Ref>Schema` it uses is defined.
    ///
    /// # Errors
    ///
    /// Fails with `DeclarationNotFound` when `name` is not in the batch.
    pub fn generate_declaration(
        &self,
        batch: &ParseResult,
        name: &str,
    ) -> ShapeResult<GeneratedProject> {
        self.prepare(batch)?;
        let decl = batch.find(name)?;
        let reachable = reachable_from(batch, decl);
        let schema_selected: Vec<&Declaration> = batch
            .dependency_sorted()
            .into_iter()
            .filter(|d| reachable.contains(d.name.as_str()))
            .collect();
        Ok(self.emit(batch, &schema_selected, &[decl]))
    }

    /// Generate the whole batch and write it below `config.output_dir`.
    ///
    /// Honours `config.overwrite`: without it, existing files abort the write
    /// before anything is touched.
    pub fn generate_and_write(
        &self,
        batch: &ParseResult,
    ) -> ShapeResult<(GeneratedProject, Vec<PathBuf>)> {
        let output = self.generate(batch)?;
        let written = output.write_to_disk(&self.config.output_dir, self.config.overwrite)?;
        tracing::info!(
            dir = %self.config.output_dir.display(),
            files = written.len(),
            "wrote generated files",
        );
        Ok((output, written))
    }

    fn prepare(&self, batch: &ParseResult) -> ShapeResult<()> {
        self.config.validate()?;
        batch.validate()?;
        tracing::debug!(
            declarations = batch.len(),
            targets = ?self.config.targets.enabled(),
            "starting generation",
        );
        Ok(())
    }

    /// `schema_selected` feeds `schemas.ts`; `selected` feeds stores and forms.
    fn emit(
        &self,
        batch: &ParseResult,
        schema_selected: &[&Declaration],
        selected: &[&Declaration],
    ) -> GeneratedProject {
        let mut ctx = GenerationContext::from_parse_result(batch);
        let mut output = GeneratedProject::new();

        // ── 1. Schemas ───────────────────────────────────────────────────
        if self.config.targets.schema {
            let mut bodies = Vec::new();
            for decl in schema_selected {
                match build_schema(decl, &mut ctx) {
                    Some(body) => bodies.push(body),
                    None => skipped(Target::Schema, &decl.name),
                }
            }
            if !bodies.is_empty() {
                let content = self.schemas_module(&ctx, schema_selected, &bodies);
                tracing::debug!(path = SCHEMAS_FILE, schemas = bodies.len(), "rendered schemas");
                output.add_file(GeneratedFile::typescript(
                    SCHEMAS_FILE,
                    content,
                    Target::Schema,
                ));
            }
        }

        // ── 2. Stores ────────────────────────────────────────────────────
        if self.config.targets.store {
            for decl in selected {
                let Some(body) = build_store(decl, &self.config.store, &mut ctx) else {
                    skipped(Target::Store, &decl.name);
                    continue;
                };
                let path = store_path(&decl.name);
                let content = self.store_module(decl, &body);
                tracing::debug!(path = %path, "rendered store");
                output.add_file(GeneratedFile::typescript(path, content, Target::Store));
            }
        }

        // ── 3. Forms ─────────────────────────────────────────────────────
        if self.config.targets.form {
            for decl in selected {
                let Some(artifact) = build_form(decl, &self.config.form, &mut ctx) else {
                    skipped(Target::Form, &decl.name);
                    continue;
                };
                let path = form_path(&decl.name);
                let content = self.form_module(
                    decl,
                    &artifact.component,
                    &artifact.schema_name,
                    &artifact.store_name,
                );
                tracing::debug!(path = %path, "rendered form");
                output.add_file(GeneratedFile::tsx(path, content, Target::Form));
            }
        }

        // ── 4. Collect warnings ──────────────────────────────────────────
        for warning in ctx.take_warnings() {
            output.add_warning(warning);
        }

        tracing::info!(
            files = output.file_count(),
            warnings = output.warnings.len(),
            "code generation complete",
        );

        output
    }

    // ====================================================================
    // Module assembly
    // ====================================================================

    fn schemas_module(
        &self,
        ctx: &GenerationContext,
        selected: &[&Declaration],
        bodies: &[String],
    ) -> String {
        let mut content = String::with_capacity(bodies.iter().map(String::len).sum::<usize>() + 256);
        content.push_str(&file_header("Validation schemas."));
        content.push_str("import { z } from \"zod\";\n");

        let recursive: Vec<&str> = selected
            .iter()
            .filter(|d| ctx.is_recursive(&d.name))
            .map(|d| d.name.as_str())
            .collect();
        if let Some(import) = self.types_import(recursive) {
            content.push_str(&import);
        }

        for body in bodies {
            content.push('\n');
            content.push_str(body);
        }
        content
    }

    fn store_module(&self, decl: &Declaration, body: &str) -> String {
        let mut content = String::with_capacity(body.len() + 256);
        content.push_str(&file_header(&format!("State store for `{}`.", decl.name)));
        content.push_str("import { create } from \"zustand\";\n");
        if self.config.store.persist {
            content.push_str("import { createJSONStorage, persist } from \"zustand/middleware\";\n");
        }
        if let Some(import) = self.types_import(decl.ty.references().iter().map(String::as_str)) {
            content.push_str(&import);
        }
        content.push('\n');
        content.push_str(body);
        content
    }

    fn form_module(
        &self,
        decl: &Declaration,
        component: &str,
        schema_name: &str,
        store_name: &str,
    ) -> String {
        let mut content = String::with_capacity(component.len() + 512);
        content.push_str(&file_header(&format!("Form component for `{}`.", decl.name)));
        content.push_str("import { useState, type FormEvent } from \"react\";\n");
        content.push_str("import type { z } from \"zod\";\n");
        content.push_str(&format!(
            "import {{ {} }} from \"../schemas\";\n",
            schema_name
        ));
        content.push_str(&format!(
            "import {{ {}, type {} }} from \"../stores/{}.store\";\n",
            store_name,
            GenerationContext::state_name(&decl.name),
            GenerationContext::kebab(&decl.name)
        ));
        content.push('\n');
        content.push_str(component);
        content
    }

    /// `import type { A, B } from "<types_import>";` when configured and
    /// `names` is non-empty.
    fn types_import<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Option<String> {
        let module = self.config.types_import.as_deref()?;
        let names: BTreeSet<&str> = names.into_iter().collect();
        if names.is_empty() {
            return None;
        }
        let names: Vec<&str> = names.into_iter().collect();
        Some(format!(
            "import type {{ {} }} from \"{}\";\n",
            names.join(", "),
            module
        ))
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Names of `decl` and every declaration it reaches through references.
fn reachable_from<'a>(batch: &'a ParseResult, decl: &'a Declaration) -> BTreeSet<&'a str> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![decl];

    while let Some(current) = stack.pop() {
        if !seen.insert(current.name.as_str()) {
            continue;
        }
        for name in current.referenced_names() {
            if let Some(next) = batch.get(&name) {
                stack.push(next);
            }
        }
    }

    seen
}

fn skipped(target: Target, name: &str) {
    tracing::warn!(%target, declaration = name, "declaration skipped");
}

/// `OrderLine` → `stores/order-line.store.ts`
pub fn store_path(name: &str) -> String {
    format!("stores/{}.store.ts", GenerationContext::kebab(name))
}

/// `OrderLine` → `forms/OrderLineForm.tsx`
pub fn form_path(name: &str) -> String {
    format!("forms/{}.tsx", GenerationContext::form_name(name))
}

/// Leading comment of every generated module. Contains no timestamp so
/// repeated runs are byte-identical.
pub fn file_header(description: &str) -> String {
    format!(
        "// {}\n// Generated by shapegen. Do not edit by hand; changes will be overwritten.\n\n",
        description
    )
}

// ============================================================================
// Standalone convenience function
// ============================================================================

/// Generate code from a batch using default configuration.
///
/// This is a shorthand for `Generator::with_defaults().generate(batch)`.
pub fn generate(batch: &ParseResult) -> ShapeResult<GeneratedProject> {
    Generator::with_defaults().generate(batch)
}

// ============================================================================
// GenerationSummary
// ============================================================================

/// A human-readable summary of a completed generation run.
///
/// Use [`summarize`] to produce a `GenerationSummary` from a `GeneratedProject`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Total number of files generated.
    pub total_files: usize,
    /// Number of schema modules.
    pub schema_files: usize,
    /// Number of store modules.
    pub store_files: usize,
    /// Number of form components.
    pub form_files: usize,
    /// Number of warnings.
    pub warning_count: usize,
    /// Total bytes of generated content.
    pub total_bytes: usize,
}

impl GenerationSummary {
    /// Build a summary from a generated project.
    pub fn from_project(project: &GeneratedProject) -> Self {
        Self {
            total_files: project.file_count(),
            schema_files: project.files_for(Target::Schema).len(),
            store_files: project.files_for(Target::Store).len(),
            form_files: project.files_for(Target::Form).len(),
            warning_count: project.warnings.len(),
            total_bytes: project.files.iter().map(|f| f.content.len()).sum(),
        }
    }

    /// Format the summary as a human-readable string.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(512);

        out.push_str("╔══════════════════════════════════════════════════╗\n");
        out.push_str("║         Code Generation Complete                 ║\n");
        out.push_str("╠══════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║  Total Files: {:<35}║\n", self.total_files));
        out.push_str(&format!("║    Schemas:   {:<35}║\n", self.schema_files));
        out.push_str(&format!("║    Stores:    {:<35}║\n", self.store_files));
        out.push_str(&format!("║    Forms:     {:<35}║\n", self.form_files));
        out.push_str(&format!("║  Warnings:    {:<35}║\n", self.warning_count));

        let size_str = if self.total_bytes < 1024 {
            format!("{} B", self.total_bytes)
        } else {
            format!("{:.1} KB", self.total_bytes as f64 / 1024.0)
        };
        out.push_str(&format!("║  Total Size:  {:<35}║\n", size_str));
        out.push_str("╚══════════════════════════════════════════════════╝\n");

        out
    }
}

impl std::fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Produce a [`GenerationSummary`] from a [`GeneratedProject`].
pub fn summarize(project: &GeneratedProject) -> GenerationSummary {
    GenerationSummary::from_project(project)
}

// ============================================================================
// Tests
// ============================================================================
