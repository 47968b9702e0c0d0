//! # Generation Context
//!
//! The `GenerationContext` carries everything a backend needs besides the
//! declaration it is rendering:
//!
//! - the name-indexed arena of the batch's declarations (reference lookup)
//! - the set of recursive declarations, precomputed once per run
//! - the warning list every backend appends its diagnostics to
//! - naming conventions for generated identifiers
//!
//! A context is created fresh for each generation run and discarded after.
//! Nothing in it survives across runs.

use heck::{ToKebabCase, ToTitleCase};
use shapegen_ir::{Declaration, ParseResult};
use std::collections::{BTreeSet, HashMap};

// ============================================================================
// GenerationContext
// ============================================================================

/// Per-run state shared (by mutable reference) with every backend.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    // ── declarations ─────────────────────────────────────────────────────
    /// All declarations of the batch, in source order.
    declarations: Vec<Declaration>,

    /// Lookup: declaration name → index into `declarations`
    index: HashMap<String, usize>,

    // ── derived ──────────────────────────────────────────────────────────
    /// Declarations whose name is in their own transitive reference set.
    recursive_types: BTreeSet<String>,

    // ── diagnostics ──────────────────────────────────────────────────────
    /// Non-fatal diagnostics, in the order they were raised.
    warnings: Vec<String>,
}

impl GenerationContext {
    // ====================================================================
    // Construction
    // ====================================================================

    /// An empty context with no sibling declarations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context for one batch, precomputing the recursive set.
    pub fn from_parse_result(batch: &ParseResult) -> Self {
        let declarations = batch.declarations.clone();
        let index = declarations
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();

        Self {
            declarations,
            index,
            recursive_types: batch.recursive_types(),
            warnings: Vec::new(),
        }
    }

    /// Replace the recursive set with one computed by the caller.
    pub fn with_recursive_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recursive_types = names.into_iter().map(Into::into).collect();
        self
    }

    // ====================================================================
    // Declaration accessors
    // ====================================================================

    /// All declarations of the batch.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Look up a sibling declaration by name.
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.index.get(name).map(|&i| &self.declarations[i])
    }

    /// Whether another declaration of the batch references `name`.
    pub fn is_depended_upon(&self, name: &str) -> bool {
        self.declarations
            .iter()
            .filter(|d| d.name != name)
            .any(|d| d.referenced_names().contains(name))
    }

    /// Whether `name` was classified as recursive for this run.
    pub fn is_recursive(&self, name: &str) -> bool {
        self.recursive_types.contains(name)
    }

    /// The recursive set for this run.
    pub fn recursive_types(&self) -> &BTreeSet<String> {
        &self.recursive_types
    }

    // ====================================================================
    // Diagnostics
    // ====================================================================

    /// Record a non-fatal diagnostic.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("generation warning: {}", message);
        self.warnings.push(message);
    }

    /// Diagnostics raised so far.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Whether any diagnostic was raised.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Drain the diagnostics raised so far.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    // ====================================================================
    // Naming helpers
    // ====================================================================

    /// `Order` → `OrderSchema`
    pub fn schema_name(name: &str) -> String {
        format!("{}Schema", name)
    }

    /// `Order` → `OrderState`
    pub fn state_name(name: &str) -> String {
        format!("{}State", name)
    }

    /// `Order` → `OrderActions`
    pub fn actions_name(name: &str) -> String {
        format!("{}Actions", name)
    }

    /// `Order` → `OrderStore`
    pub fn store_type_name(name: &str) -> String {
        format!("{}Store", name)
    }

    /// `Order` → `useOrderStore`
    pub fn store_hook_name(name: &str) -> String {
        format!("use{}Store", name)
    }

    /// `Order` → `defaultOrderState`
    pub fn default_state_name(name: &str) -> String {
        format!("default{}State", name)
    }

    /// `Order` → `OrderForm`
    pub fn form_name(name: &str) -> String {
        format!("{}Form", name)
    }

    /// `Order` → `OrderFormProps`
    pub fn form_props_name(name: &str) -> String {
        format!("{}FormProps", name)
    }

    /// `Order` → `order-storage`
    pub fn default_storage_key(name: &str) -> String {
        format!("{}-storage", name.to_lowercase())
    }

    /// `LineItem` → `line-item` (file names, element ids)
    pub fn kebab(name: &str) -> String {
        name.to_kebab_case()
    }

    /// `lineItem` → `Line Item` (labels)
    pub fn title(name: &str) -> String {
        name.to_title_case()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shapegen_ir::{Property, TypeNode};

    fn batch() -> ParseResult {
        ParseResult::new(vec![
            Declaration::new(
                "Category",
                TypeNode::object(vec![
                    Property::new("name", TypeNode::string()),
                    Property::new(
                        "children",
                        TypeNode::array(TypeNode::reference("Category")),
                    ),
                ]),
            ),
            Declaration::new("Address", TypeNode::object(vec![])).private(),
            Declaration::new(
                "User",
                TypeNode::object(vec![Property::new(
                    "address",
                    TypeNode::reference("Address"),
                )]),
            ),
        ])
    }

    #[test]
    fn test_from_parse_result() {
        let ctx = GenerationContext::from_parse_result(&batch());
        assert_eq!(ctx.declarations().len(), 3);
        assert!(ctx.declaration("User").is_some());
        assert!(ctx.declaration("Missing").is_none());
        assert!(ctx.is_recursive("Category"));
        assert!(!ctx.is_recursive("User"));
        assert!(ctx.is_depended_upon("Address"));
    }

    #[test]
    fn test_recursive_override() {
        let ctx = GenerationContext::from_parse_result(&batch()).with_recursive_types(["User"]);
        assert!(ctx.is_recursive("User"));
        assert!(!ctx.is_recursive("Category"));
    }

    #[test]
    fn test_warnings_are_per_context() {
        let mut first = GenerationContext::new();
        first.warn("one");
        let second = GenerationContext::new();

        assert!(first.has_warnings());
        assert!(!second.has_warnings());
        assert_eq!(first.take_warnings(), vec!["one".to_string()]);
        assert!(!first.has_warnings());
    }

    #[test]
    fn test_naming_conventions() {
        assert_eq!(GenerationContext::schema_name("Foo"), "FooSchema");
        assert_eq!(GenerationContext::store_hook_name("Foo"), "useFooStore");
        assert_eq!(GenerationContext::actions_name("Foo"), "FooActions");
        assert_eq!(GenerationContext::default_state_name("Foo"), "defaultFooState");
        assert_eq!(GenerationContext::form_name("Foo"), "FooForm");
        assert_eq!(GenerationContext::form_props_name("Foo"), "FooFormProps");
        assert_eq!(GenerationContext::default_storage_key("UserProfile"), "userprofile-storage");
        assert_eq!(GenerationContext::kebab("LineItem"), "line-item");
        assert_eq!(GenerationContext::title("createdAt"), "Created At");
    }
}
