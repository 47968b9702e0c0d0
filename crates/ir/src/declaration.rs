//! Declarations and the front-end parse result
//!
//! A [`Declaration`] is a named top-level type (interface, alias or
//! enumeration). A [`ParseResult`] is the batch the introspection front end
//! hands to the generators, and doubles as the name-indexed arena used to
//! resolve `reference` nodes and classify recursive declarations.

use crate::type_node::TypeNode;
use serde::{Deserialize, Serialize};
use shapegen_core::{ShapeError, ShapeResult, Validatable};
use std::collections::{BTreeSet, HashMap, HashSet};

// ============================================================================
// Declaration
// ============================================================================

/// A named, top-level type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    /// Declared name (`Order`, `Status`, ...)
    pub name: String,

    /// The declared type
    #[serde(rename = "type")]
    pub ty: TypeNode,

    /// Sibling declarations referenced by `ty`
    #[serde(default)]
    pub dependencies: BTreeSet<String>,

    /// Whether the declaration is exported from its source module
    #[serde(default)]
    pub is_exported: bool,
}

impl Declaration {
    /// Create an exported declaration. Dependencies are collected from the
    /// type's `reference` nodes.
    pub fn new(name: impl Into<String>, ty: TypeNode) -> Self {
        let dependencies = ty.references();
        Self {
            name: name.into(),
            ty,
            dependencies,
            is_exported: true,
        }
    }

    /// Mark the declaration as not exported.
    pub fn private(mut self) -> Self {
        self.is_exported = false;
        self
    }

    /// Every name this declaration points at: the recorded dependencies plus
    /// any reference found in the type itself.
    pub fn referenced_names(&self) -> BTreeSet<String> {
        let mut names = self.ty.references();
        names.extend(self.dependencies.iter().cloned());
        names
    }

    /// Whether the root type is an object shape.
    pub fn is_object(&self) -> bool {
        self.ty.is_object()
    }
}

// ============================================================================
// ParseResult
// ============================================================================

/// The batch of declarations produced by the introspection front end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl ParseResult {
    /// Create a batch from declarations in source order.
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Self { declarations }
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Look up a declaration by exact name.
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Look up a declaration that must exist.
    ///
    /// A missing declaration is malformed input at the boundary and is
    /// reported as [`ShapeError::DeclarationNotFound`].
    pub fn find(&self, name: &str) -> ShapeResult<&Declaration> {
        self.get(name)
            .ok_or_else(|| ShapeError::declaration_not_found(name))
    }

    /// Whether any *other* declaration references `name`.
    pub fn is_depended_upon(&self, name: &str) -> bool {
        self.declarations
            .iter()
            .filter(|d| d.name != name)
            .any(|d| d.referenced_names().contains(name))
    }

    /// Names of declarations whose own name appears in their transitive
    /// reference set.
    pub fn recursive_types(&self) -> BTreeSet<String> {
        let edges: HashMap<&str, BTreeSet<String>> = self
            .declarations
            .iter()
            .map(|d| (d.name.as_str(), d.referenced_names()))
            .collect();

        self.declarations
            .iter()
            .filter(|d| reaches(&edges, &d.name, &d.name))
            .map(|d| d.name.clone())
            .collect()
    }

    /// Declarations ordered so that a referenced declaration precedes the
    /// ones that reference it. Source order is kept otherwise, and members
    /// of a cycle stay in source order.
    pub fn dependency_sorted(&self) -> Vec<&Declaration> {
        let index: HashMap<&str, &Declaration> = self
            .declarations
            .iter()
            .map(|d| (d.name.as_str(), d))
            .collect();

        let mut ordered: Vec<&Declaration> = Vec::with_capacity(self.declarations.len());
        let mut done: HashSet<&str> = HashSet::new();
        let mut visiting: HashSet<&str> = HashSet::new();

        fn visit<'a>(
            decl: &'a Declaration,
            index: &HashMap<&str, &'a Declaration>,
            done: &mut HashSet<&'a str>,
            visiting: &mut HashSet<&'a str>,
            ordered: &mut Vec<&'a Declaration>,
        ) {
            if done.contains(decl.name.as_str()) || !visiting.insert(decl.name.as_str()) {
                return;
            }
            for dep in decl.referenced_names() {
                if let Some(&next) = index.get(dep.as_str()) {
                    visit(next, index, done, visiting, ordered);
                }
            }
            visiting.remove(decl.name.as_str());
            done.insert(decl.name.as_str());
            ordered.push(decl);
        }

        for decl in &self.declarations {
            visit(decl, &index, &mut done, &mut visiting, &mut ordered);
        }

        ordered
    }
}

/// Depth-first search: can `target` be reached from `start` in one or more
/// steps?
fn reaches(edges: &HashMap<&str, BTreeSet<String>>, start: &str, target: &str) -> bool {
    let mut stack: Vec<&str> = vec![start];
    let mut seen: HashSet<&str> = HashSet::new();

    while let Some(current) = stack.pop() {
        let Some(next) = edges.get(current) else {
            continue;
        };
        for name in next {
            if name == target {
                return true;
            }
            if seen.insert(name.as_str()) {
                stack.push(name.as_str());
            }
        }
    }

    false
}

impl Validatable for ParseResult {
    fn validate(&self) -> ShapeResult<()> {
        let mut seen = HashSet::new();
        for decl in &self.declarations {
            if decl.name.trim().is_empty() {
                return Err(ShapeError::validation("Declaration names cannot be empty"));
            }
            if !seen.insert(decl.name.as_str()) {
                return Err(ShapeError::DuplicateDeclaration(decl.name.clone()));
            }
            if let Some(props) = decl.ty.properties() {
                let mut fields = HashSet::new();
                for prop in props {
                    if !fields.insert(prop.name.as_str()) {
                        return Err(ShapeError::declaration_validation(
                            &decl.name,
                            format!("field '{}' is declared twice", prop.name),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_node::Property;
    use pretty_assertions::assert_eq;

    fn tree() -> Declaration {
        Declaration::new(
            "Tree",
            TypeNode::object(vec![
                Property::new("label", TypeNode::string()),
                Property::new("children", TypeNode::array(TypeNode::reference("Tree"))),
            ]),
        )
    }

    #[test]
    fn test_new_collects_dependencies() {
        let decl = tree();
        assert!(decl.dependencies.contains("Tree"));
        assert!(decl.is_exported);
        assert!(!decl.clone().private().is_exported);
    }

    #[test]
    fn test_find_missing_declaration_is_hard_failure() {
        let batch = ParseResult::new(vec![tree()]);
        assert!(batch.find("Tree").is_ok());
        let err = batch.find("Forest").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_self_recursive_type() {
        let batch = ParseResult::new(vec![
            tree(),
            Declaration::new("Leaf", TypeNode::object(vec![])),
        ]);
        let recursive: Vec<String> = batch.recursive_types().into_iter().collect();
        assert_eq!(recursive, vec!["Tree"]);
    }

    #[test]
    fn test_mutually_recursive_types() {
        let a = Declaration::new(
            "A",
            TypeNode::object(vec![Property::optional("b", TypeNode::reference("B"))]),
        );
        let b = Declaration::new(
            "B",
            TypeNode::object(vec![Property::optional("a", TypeNode::reference("A"))]),
        );
        let c = Declaration::new(
            "C",
            TypeNode::object(vec![Property::new("a", TypeNode::reference("A"))]),
        );
        let batch = ParseResult::new(vec![a, b, c]);
        let recursive: Vec<String> = batch.recursive_types().into_iter().collect();
        assert_eq!(recursive, vec!["A", "B"]);
    }

    #[test]
    fn test_dependency_sorted_puts_references_first() {
        let order = Declaration::new(
            "Order",
            TypeNode::object(vec![
                Property::new("customer", TypeNode::reference("Customer")),
                Property::new("lines", TypeNode::array(TypeNode::reference("Line"))),
            ]),
        );
        let customer = Declaration::new("Customer", TypeNode::object(vec![]));
        let line = Declaration::new(
            "Line",
            TypeNode::object(vec![Property::new("sku", TypeNode::string())]),
        );
        let batch = ParseResult::new(vec![order, customer, line]);

        let names: Vec<&str> = batch
            .dependency_sorted()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["Customer", "Line", "Order"]);
    }

    #[test]
    fn test_dependency_sorted_terminates_on_cycles() {
        let batch = ParseResult::new(vec![tree()]);
        assert_eq!(batch.dependency_sorted().len(), 1);
    }

    #[test]
    fn test_is_depended_upon() {
        let hidden = Declaration::new("Address", TypeNode::object(vec![])).private();
        let user = Declaration::new(
            "User",
            TypeNode::object(vec![Property::new("address", TypeNode::reference("Address"))]),
        );
        let batch = ParseResult::new(vec![hidden, user]);
        assert!(batch.is_depended_upon("Address"));
        assert!(!batch.is_depended_upon("User"));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let batch = ParseResult::new(vec![tree(), tree()]);
        let err = batch.validate().unwrap_err();
        assert!(matches!(err, ShapeError::DuplicateDeclaration(ref n) if n == "Tree"));
    }

    #[test]
    fn test_validate_rejects_duplicate_fields() {
        let decl = Declaration::new(
            "Dup",
            TypeNode::object(vec![
                Property::new("x", TypeNode::string()),
                Property::new("x", TypeNode::number()),
            ]),
        );
        assert!(!ParseResult::new(vec![decl]).is_valid());
    }
}
