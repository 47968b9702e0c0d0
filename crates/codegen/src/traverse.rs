//! # Traversal Utilities
//!
//! Pure functions over the IR that every backend calls identically:
//!
//! - optional / nullable unwrapping of unions
//! - string-literal enum and discriminated-union detection
//! - default-value synthesis
//! - reference resolution and object-shape queries
//! - TypeScript type printing and identifier helpers
//!
//! The three generated artifacts agree on which fields are optional, what an
//! empty value looks like and how an array element is updated only because
//! they all go through this module.

use crate::context::GenerationContext;
use heck::{ToTitleCase, ToUpperCamelCase};
use shapegen_ir::{LiteralValue, Property, TypeNode};
use std::borrow::Cow;
use std::collections::HashSet;

// ============================================================================
// Optional / nullable unwrapping
// ============================================================================

/// How a value may be absent after unwrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    Nullable,
}

/// A node with its outer `undefined` / `null` member stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct Unwrapped<'a> {
    pub node: Cow<'a, TypeNode>,
    pub presence: Presence,
}

impl<'a> Unwrapped<'a> {
    fn required(node: &'a TypeNode) -> Self {
        Self {
            node: Cow::Borrowed(node),
            presence: Presence::Required,
        }
    }

    pub fn is_optional(&self) -> bool {
        self.presence == Presence::Optional
    }

    pub fn is_nullable(&self) -> bool {
        self.presence == Presence::Nullable
    }
}

/// `T | undefined` ⇒ optional `T`.
///
/// Applies when the union has exactly one `undefined` member and at least
/// one other member. With several other members the remainder is returned
/// as a union, so `T | null | undefined` becomes optional `T | null`.
pub fn unwrap_optional_union(node: &TypeNode) -> Unwrapped<'_> {
    strip_marker(node, "undefined", Presence::Optional)
}

/// `T | null` ⇒ nullable `T`.
///
/// Only applies when no `undefined` member is present; the optional rule
/// always runs first.
pub fn unwrap_nullable_union(node: &TypeNode) -> Unwrapped<'_> {
    if let TypeNode::Union { members } = node {
        if members.iter().any(|m| m.is_primitive_named("undefined")) {
            return Unwrapped::required(node);
        }
    }
    strip_marker(node, "null", Presence::Nullable)
}

fn strip_marker<'a>(node: &'a TypeNode, marker: &str, presence: Presence) -> Unwrapped<'a> {
    let TypeNode::Union { members } = node else {
        return Unwrapped::required(node);
    };

    let markers = members
        .iter()
        .filter(|m| m.is_primitive_named(marker))
        .count();
    if markers != 1 || members.len() < 2 {
        return Unwrapped::required(node);
    }

    let rest: Vec<&TypeNode> = members
        .iter()
        .filter(|m| !m.is_primitive_named(marker))
        .collect();

    let inner = match rest.as_slice() {
        [only] => Cow::Borrowed(*only),
        _ => Cow::Owned(TypeNode::union(rest.into_iter().cloned().collect())),
    };

    Unwrapped {
        node: inner,
        presence,
    }
}

/// The resolved shape of a property as every backend sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape<'a> {
    /// Type with `undefined` and `null` members stripped
    pub node: Cow<'a, TypeNode>,
    /// `name?: T` or `T | undefined`
    pub optional: bool,
    /// `T | null`
    pub nullable: bool,
}

impl FieldShape<'_> {
    /// Neither optional nor nullable.
    pub fn is_required(&self) -> bool {
        !self.optional && !self.nullable
    }
}

/// Optional-unwrap then nullable-unwrap a property's type.
pub fn field_shape(prop: &Property) -> FieldShape<'_> {
    let optional = unwrap_optional_union(&prop.ty);
    let is_optional = prop.is_optional || optional.is_optional();

    let (node, nullable) = match optional.node {
        Cow::Borrowed(inner) => {
            let n = unwrap_nullable_union(inner);
            let nullable = n.is_nullable();
            (n.node, nullable)
        }
        Cow::Owned(inner) => {
            let n = unwrap_nullable_union(&inner);
            let nullable = n.is_nullable();
            (Cow::Owned(n.node.into_owned()), nullable)
        }
    };

    FieldShape {
        node,
        optional: is_optional,
        nullable,
    }
}

// ============================================================================
// Enum and discriminator detection
// ============================================================================

/// True when `node` is a non-empty union whose every member is a text
/// literal.
pub fn is_string_literal_enum(node: &TypeNode) -> bool {
    string_literal_values(node).is_some()
}

/// The literal values of a string-literal union, in member order.
pub fn string_literal_values(node: &TypeNode) -> Option<Vec<&str>> {
    let TypeNode::Union { members } = node else {
        return None;
    };
    if members.is_empty() {
        return None;
    }
    members
        .iter()
        .map(|m| match m {
            TypeNode::Literal { value } => value.as_text(),
            _ => None,
        })
        .collect()
}

/// The values of an enumeration whose members are all textual.
pub fn string_enum_values(node: &TypeNode) -> Option<Vec<&str>> {
    let TypeNode::EnumType { values } = node else {
        return None;
    };
    if values.is_empty() {
        return None;
    }
    values.iter().map(|v| v.value.as_text()).collect()
}

/// The common tag field of a union of object members.
///
/// Walks the first member's properties in order and returns the first one
/// that has a literal type in that member and in every other member. Later
/// qualifying properties are never considered, even if they distinguish the
/// variants better.
pub fn detect_discriminator(members: &[TypeNode]) -> Option<&str> {
    let objects: Vec<&[Property]> = members
        .iter()
        .map(TypeNode::properties)
        .collect::<Option<Vec<_>>>()?;

    let (&first, rest) = objects.split_first()?;

    first
        .iter()
        .filter(|p| matches!(p.ty, TypeNode::Literal { .. }))
        .find(|candidate| {
            rest.iter().all(|props| {
                props.iter().any(|p| {
                    p.name == candidate.name && matches!(p.ty, TypeNode::Literal { .. })
                })
            })
        })
        .map(|p| p.name.as_str())
}

// ============================================================================
// Reference resolution and object shapes
// ============================================================================

/// Follow `reference` nodes through the batch until a non-reference node is
/// reached. Unresolvable or cyclic chains return the last reference.
pub fn resolve_reference(node: &TypeNode, ctx: &GenerationContext) -> TypeNode {
    let mut current = node.clone();
    let mut seen = HashSet::new();

    while let TypeNode::Reference { name } = &current {
        if !seen.insert(name.clone()) {
            break;
        }
        match ctx.declaration(name) {
            Some(decl) => current = decl.ty.clone(),
            None => break,
        }
    }

    current
}

/// Properties of an object-like node: objects, intersections of objects,
/// and references resolving to either. `None` for every other shape.
pub fn object_properties(node: &TypeNode, ctx: &GenerationContext) -> Option<Vec<Property>> {
    match resolve_reference(node, ctx) {
        TypeNode::Object { properties } => Some(properties),
        TypeNode::Intersection { members } if !members.is_empty() => {
            let mut merged: Vec<Property> = Vec::new();
            for member in &members {
                for prop in object_properties(member, ctx)? {
                    if !merged.iter().any(|p| p.name == prop.name) {
                        merged.push(prop);
                    }
                }
            }
            Some(merged)
        }
        _ => None,
    }
}

/// How an array's elements are updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Primitives, literals and anything that is not object-like: replaced
    Scalar,
    /// Object-like elements: merged with the supplied partial
    Object,
}

/// Classify an array element.
pub fn element_kind(element: &TypeNode, ctx: &GenerationContext) -> ElementKind {
    if object_properties(element, ctx).is_some() {
        ElementKind::Object
    } else {
        ElementKind::Scalar
    }
}

/// Element type of an array-valued node, following references. Untyped
/// arrays yield an `unknown` element; non-arrays yield `None`.
pub fn array_element(node: &TypeNode, ctx: &GenerationContext) -> Option<TypeNode> {
    match resolve_reference(node, ctx) {
        TypeNode::Array {
            element: Some(element),
        } => Some(*element),
        TypeNode::Array { element: None } => Some(TypeNode::unknown(None)),
        _ => None,
    }
}

// ============================================================================
// Default-value synthesis
// ============================================================================

/// Initial value for a type/optionality pair, renderable as JavaScript.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Undefined,
    Null,
    Literal(LiteralValue),
    BigIntZero,
    Now,
    Array(Vec<DefaultValue>),
    EmptyRecord,
    Object(Vec<(String, DefaultValue)>),
}

impl DefaultValue {
    /// Render as a single-line JavaScript expression.
    pub fn to_js(&self) -> String {
        match self {
            DefaultValue::Undefined => "undefined".to_string(),
            DefaultValue::Null => "null".to_string(),
            DefaultValue::Literal(value) => value.to_js(),
            DefaultValue::BigIntZero => "BigInt(0)".to_string(),
            DefaultValue::Now => "new Date()".to_string(),
            DefaultValue::Array(items) => {
                let items: Vec<String> = items.iter().map(DefaultValue::to_js).collect();
                format!("[{}]", items.join(", "))
            }
            DefaultValue::EmptyRecord => "{}".to_string(),
            DefaultValue::Object(fields) if fields.is_empty() => "{}".to_string(),
            DefaultValue::Object(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("{}: {}", property_key(k), v.to_js()))
                    .collect();
                format!("{{ {} }}", fields.join(", "))
            }
        }
    }

    /// Render with the top-level object fields one per line, each at
    /// `indent` spaces. Nested values stay on one line.
    pub fn to_js_block(&self, indent: usize) -> String {
        match self {
            DefaultValue::Object(fields) if !fields.is_empty() => {
                let pad = " ".repeat(indent);
                let close = " ".repeat(indent.saturating_sub(2));
                let mut out = String::from("{\n");
                for (k, v) in fields {
                    out.push_str(&format!("{}{}: {},\n", pad, property_key(k), v.to_js()));
                }
                out.push_str(&close);
                out.push('}');
                out
            }
            other => other.to_js(),
        }
    }
}

/// Default value for `node`.
///
/// Optional values default to `undefined`. Required values default per kind:
/// `""`, `0`, `false`, `new Date()`, `[]`, `{}`, the first literal of a
/// literal union or enumeration, a recursively built object, or the
/// referenced declaration's own default.
pub fn default_value_for(
    node: &TypeNode,
    is_optional: bool,
    ctx: &mut GenerationContext,
) -> DefaultValue {
    let mut stack = Vec::new();
    synthesize(node, is_optional, ctx, &mut stack)
}

/// Default value of one property of the declaration named `owner`. The
/// owner counts as already being expanded, so a required self-reference
/// terminates.
pub fn default_for_property(
    owner: &str,
    prop: &Property,
    ctx: &mut GenerationContext,
) -> DefaultValue {
    let mut stack = vec![owner.to_string()];
    synthesize(&prop.ty, prop.is_optional, ctx, &mut stack)
}

fn synthesize(
    node: &TypeNode,
    is_optional: bool,
    ctx: &mut GenerationContext,
    stack: &mut Vec<String>,
) -> DefaultValue {
    if is_optional || unwrap_optional_union(node).is_optional() {
        return DefaultValue::Undefined;
    }

    match node {
        TypeNode::Primitive { name } => match name.as_str() {
            "string" => DefaultValue::Literal(LiteralValue::Text(String::new())),
            "number" => DefaultValue::Literal(LiteralValue::Number(0.0)),
            "boolean" => DefaultValue::Literal(LiteralValue::Boolean(false)),
            "bigint" => DefaultValue::BigIntZero,
            "Date" | "date" => DefaultValue::Now,
            "null" => DefaultValue::Null,
            _ => DefaultValue::Undefined,
        },
        TypeNode::Literal { value } => DefaultValue::Literal(value.clone()),
        TypeNode::Array { .. } => DefaultValue::Array(Vec::new()),
        TypeNode::Tuple { elements } => DefaultValue::Array(
            elements
                .iter()
                .map(|e| synthesize(e, false, ctx, stack))
                .collect(),
        ),
        TypeNode::Union { members } => {
            if unwrap_nullable_union(node).is_nullable() {
                return DefaultValue::Null;
            }
            match members.first() {
                Some(first) => synthesize(first, false, ctx, stack),
                None => DefaultValue::Undefined,
            }
        }
        TypeNode::Intersection { members } => {
            let mut merged: Vec<(String, DefaultValue)> = Vec::new();
            for member in members {
                if let DefaultValue::Object(fields) = synthesize(member, false, ctx, stack) {
                    for (k, v) in fields {
                        if !merged.iter().any(|(existing, _)| *existing == k) {
                            merged.push((k, v));
                        }
                    }
                }
            }
            DefaultValue::Object(merged)
        }
        TypeNode::Object { properties } => DefaultValue::Object(
            properties
                .iter()
                .filter(|p| !p.ty.is_function())
                .map(|p| (p.name.clone(), synthesize(&p.ty, p.is_optional, ctx, stack)))
                .collect(),
        ),
        TypeNode::Reference { name } => {
            if stack.iter().any(|n| n == name) {
                ctx.warn(format!(
                    "Default for recursive reference '{}' cannot be expanded; using null",
                    name
                ));
                return DefaultValue::Null;
            }
            let Some(target) = ctx.declaration(name).map(|d| d.ty.clone()) else {
                ctx.warn(format!(
                    "Reference '{}' is not part of this batch; its default is null",
                    name
                ));
                return DefaultValue::Null;
            };
            stack.push(name.clone());
            let value = synthesize(&target, false, ctx, stack);
            stack.pop();
            value
        }
        TypeNode::EnumType { values } => values
            .first()
            .map(|v| DefaultValue::Literal(v.value.clone()))
            .unwrap_or(DefaultValue::Undefined),
        TypeNode::Record { .. } => DefaultValue::EmptyRecord,
        TypeNode::FunctionType | TypeNode::Unknown { .. } => DefaultValue::Undefined,
    }
}

// ============================================================================
// TypeScript type printing
// ============================================================================

/// Print a node as TypeScript type text.
pub fn ts_type(node: &TypeNode) -> String {
    match node {
        TypeNode::Primitive { name } => name.clone(),
        TypeNode::Literal { value } => value.to_js(),
        TypeNode::Array { element: None } => "unknown[]".to_string(),
        TypeNode::Array {
            element: Some(element),
        } => match element.as_ref() {
            TypeNode::Union { .. } | TypeNode::Intersection { .. } | TypeNode::FunctionType => {
                format!("({})[]", ts_type(element))
            }
            TypeNode::EnumType { values } if values.len() > 1 => {
                format!("({})[]", ts_type(element))
            }
            _ => format!("{}[]", ts_type(element)),
        },
        TypeNode::Tuple { elements } => {
            let parts: Vec<String> = elements.iter().map(ts_type).collect();
            format!("[{}]", parts.join(", "))
        }
        TypeNode::Union { members } if members.is_empty() => "never".to_string(),
        TypeNode::Union { members } => members
            .iter()
            .map(|m| match m {
                TypeNode::FunctionType => format!("({})", ts_type(m)),
                _ => ts_type(m),
            })
            .collect::<Vec<_>>()
            .join(" | "),
        TypeNode::Intersection { members } if members.is_empty() => "{}".to_string(),
        TypeNode::Intersection { members } => members
            .iter()
            .map(|m| match m {
                TypeNode::Union { .. } | TypeNode::FunctionType => format!("({})", ts_type(m)),
                _ => ts_type(m),
            })
            .collect::<Vec<_>>()
            .join(" & "),
        TypeNode::Object { properties } if properties.is_empty() => "{}".to_string(),
        TypeNode::Object { properties } => {
            let fields: Vec<String> = properties
                .iter()
                .map(|p| {
                    format!(
                        "{}{}: {}",
                        property_key(&p.name),
                        if p.is_optional { "?" } else { "" },
                        ts_type(&p.ty)
                    )
                })
                .collect();
            format!("{{ {} }}", fields.join("; "))
        }
        TypeNode::Reference { name } => name.clone(),
        TypeNode::EnumType { values } if values.is_empty() => "never".to_string(),
        TypeNode::EnumType { values } => values
            .iter()
            .map(|v| v.value.to_js())
            .collect::<Vec<_>>()
            .join(" | "),
        TypeNode::Record { key, value } => format!(
            "Record<{}, {}>",
            key.as_deref().map(ts_type).unwrap_or_else(|| "string".to_string()),
            value.as_deref().map(ts_type).unwrap_or_else(|| "unknown".to_string()),
        ),
        TypeNode::FunctionType => "(...args: any[]) => any".to_string(),
        TypeNode::Unknown { .. } => "unknown".to_string(),
    }
}

// ============================================================================
// Identifier helpers
// ============================================================================

/// Upper-case the first letter: `field` → `Field`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `camelCase` → `Camel Case`, `in_progress` → `In Progress`.
pub fn camel_to_title(s: &str) -> String {
    s.to_title_case()
}

/// Whether `s` can be used as a bare JavaScript identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// A JavaScript string literal for `s`.
pub fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

/// Object-literal key: bare when possible, quoted otherwise.
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        js_string(name)
    }
}

/// Member access: `state.id` or `state["x-id"]`.
pub fn member_access(object: &str, name: &str) -> String {
    if is_identifier(name) {
        format!("{}.{}", object, name)
    } else {
        format!("{}[{}]", object, js_string(name))
    }
}

/// Suffix used to build action names: `tags` → `Tags`, `line-items` →
/// `LineItems`.
pub fn action_suffix(field: &str) -> String {
    if is_identifier(field) {
        capitalize(field)
    } else {
        field.to_upper_camel_case()
    }
}

/// Scalar setter action name for a field. A field called `state` would
/// shadow the bulk `setState` action and gets `setStateField` instead.
pub fn setter_name(field: &str) -> String {
    let name = format!("set{}", action_suffix(field));
    if name == "setState" {
        "setStateField".to_string()
    } else {
        name
    }
}

// ============================================================================
// Tests
// ============================================================================
