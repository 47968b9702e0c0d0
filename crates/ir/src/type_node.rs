//! Type node definitions
//!
//! [`TypeNode`] is the atom of the IR: a closed set of tagged shapes that
//! describes the type of a declaration or a property. Every backend matches
//! on it exhaustively.
//!
//! Cycles never appear inside a node. A type that refers back to itself (or
//! to a sibling) does so through [`TypeNode::Reference`], and recursion is
//! classified at the declaration level.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// LiteralValue
// ============================================================================

/// The value carried by a literal type or an enumeration member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl LiteralValue {
    /// Returns the text if this is a textual literal.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LiteralValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the literal is textual.
    pub fn is_text(&self) -> bool {
        matches!(self, LiteralValue::Text(_))
    }

    /// Render the literal as a JavaScript expression.
    ///
    /// Text literals are emitted as JSON strings, which are valid JS string
    /// literals for every input.
    pub fn to_js(&self) -> String {
        match self {
            LiteralValue::Text(s) => {
                serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
            }
            LiteralValue::Number(n) => format_number(*n),
            LiteralValue::Boolean(b) => b.to_string(),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Text(s) => write!(f, "{}", s),
            LiteralValue::Number(n) => write!(f, "{}", format_number(*n)),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        LiteralValue::Text(s.to_string())
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        LiteralValue::Number(n)
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        LiteralValue::Boolean(b)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ============================================================================
// EnumMember
// ============================================================================

/// A single member of an enumeration declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: LiteralValue,
}

impl EnumMember {
    pub fn new(name: impl Into<String>, value: impl Into<LiteralValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// Property
// ============================================================================

/// A named field of an object type.
///
/// Field order is significant: generators enumerate properties in the order
/// they appear in the source declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeNode,

    #[serde(default)]
    pub is_optional: bool,
}

impl Property {
    /// Create a required property.
    pub fn new(name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            name: name.into(),
            ty,
            is_optional: false,
        }
    }

    /// Create an optional (`name?: T`) property.
    pub fn optional(name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            name: name.into(),
            ty,
            is_optional: true,
        }
    }
}

// ============================================================================
// TypeNode
// ============================================================================

/// Tagged type representation shared by every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeNode {
    /// Named scalar: `string`, `number`, `boolean`, `Date`, `null`, ...
    Primitive { name: String },

    /// Exact value type (`'pending'`, `42`, `true`)
    Literal { value: LiteralValue },

    /// Homogeneous list; the element may be missing for untyped arrays
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<Box<TypeNode>>,
    },

    /// Fixed-length positional list
    Tuple {
        #[serde(default)]
        elements: Vec<TypeNode>,
    },

    /// `A | B | ...`
    Union {
        #[serde(default)]
        members: Vec<TypeNode>,
    },

    /// `A & B & ...`
    Intersection {
        #[serde(default)]
        members: Vec<TypeNode>,
    },

    /// Inline object shape
    Object {
        #[serde(default)]
        properties: Vec<Property>,
    },

    /// By-name reference to another declaration of the batch
    Reference { name: String },

    /// Enumeration with named members
    EnumType {
        #[serde(default)]
        values: Vec<EnumMember>,
    },

    /// Keyed map; key or value may be missing
    Record {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<Box<TypeNode>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Box<TypeNode>>,
    },

    /// Callable type
    FunctionType,

    /// Anything the front end could not represent precisely
    Unknown {
        #[serde(
            default,
            rename = "rawText",
            skip_serializing_if = "Option::is_none"
        )]
        raw_text: Option<String>,
    },
}

impl TypeNode {
    // ====================================================================
    // Constructors
    // ====================================================================

    pub fn primitive(name: impl Into<String>) -> Self {
        TypeNode::Primitive { name: name.into() }
    }

    pub fn string() -> Self {
        Self::primitive("string")
    }

    pub fn number() -> Self {
        Self::primitive("number")
    }

    pub fn boolean() -> Self {
        Self::primitive("boolean")
    }

    pub fn date() -> Self {
        Self::primitive("Date")
    }

    pub fn undefined() -> Self {
        Self::primitive("undefined")
    }

    pub fn null() -> Self {
        Self::primitive("null")
    }

    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        TypeNode::Literal {
            value: value.into(),
        }
    }

    pub fn array(element: TypeNode) -> Self {
        TypeNode::Array {
            element: Some(Box::new(element)),
        }
    }

    /// Array whose element type is unknown.
    pub fn untyped_array() -> Self {
        TypeNode::Array { element: None }
    }

    pub fn tuple(elements: Vec<TypeNode>) -> Self {
        TypeNode::Tuple { elements }
    }

    pub fn union(members: Vec<TypeNode>) -> Self {
        TypeNode::Union { members }
    }

    /// Union of text literals, e.g. `'a' | 'b'`.
    pub fn string_literals<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TypeNode::Union {
            members: values
                .into_iter()
                .map(|v| TypeNode::literal(v.as_ref()))
                .collect(),
        }
    }

    /// `T | undefined`
    pub fn optional_of(inner: TypeNode) -> Self {
        TypeNode::Union {
            members: vec![inner, TypeNode::undefined()],
        }
    }

    /// `T | null`
    pub fn nullable_of(inner: TypeNode) -> Self {
        TypeNode::Union {
            members: vec![inner, TypeNode::null()],
        }
    }

    pub fn intersection(members: Vec<TypeNode>) -> Self {
        TypeNode::Intersection { members }
    }

    pub fn object(properties: Vec<Property>) -> Self {
        TypeNode::Object { properties }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        TypeNode::Reference { name: name.into() }
    }

    pub fn enumeration(values: Vec<EnumMember>) -> Self {
        TypeNode::EnumType { values }
    }

    pub fn record(key: TypeNode, value: TypeNode) -> Self {
        TypeNode::Record {
            key: Some(Box::new(key)),
            value: Some(Box::new(value)),
        }
    }

    pub fn unknown(raw_text: Option<&str>) -> Self {
        TypeNode::Unknown {
            raw_text: raw_text.map(str::to_string),
        }
    }

    // ====================================================================
    // Queries
    // ====================================================================

    /// Short kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeNode::Primitive { .. } => "primitive",
            TypeNode::Literal { .. } => "literal",
            TypeNode::Array { .. } => "array",
            TypeNode::Tuple { .. } => "tuple",
            TypeNode::Union { .. } => "union",
            TypeNode::Intersection { .. } => "intersection",
            TypeNode::Object { .. } => "object",
            TypeNode::Reference { .. } => "reference",
            TypeNode::EnumType { .. } => "enum",
            TypeNode::Record { .. } => "record",
            TypeNode::FunctionType => "function",
            TypeNode::Unknown { .. } => "unknown",
        }
    }

    /// True for `primitive(name)` with exactly this name.
    pub fn is_primitive_named(&self, expected: &str) -> bool {
        matches!(self, TypeNode::Primitive { name } if name == expected)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, TypeNode::FunctionType)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeNode::Object { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeNode::Array { .. })
    }

    /// Properties of an object node, `None` for every other kind.
    pub fn properties(&self) -> Option<&[Property]> {
        match self {
            TypeNode::Object { properties } => Some(properties),
            _ => None,
        }
    }

    /// Names of every declaration this node references, at any depth.
    pub fn references(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut BTreeSet<String>) {
        match self {
            TypeNode::Reference { name } => {
                out.insert(name.clone());
            }
            TypeNode::Array { element } => {
                if let Some(element) = element {
                    element.collect_references(out);
                }
            }
            TypeNode::Tuple { elements: nodes }
            | TypeNode::Union { members: nodes }
            | TypeNode::Intersection { members: nodes } => {
                for node in nodes {
                    node.collect_references(out);
                }
            }
            TypeNode::Object { properties } => {
                for prop in properties {
                    prop.ty.collect_references(out);
                }
            }
            TypeNode::Record { key, value } => {
                if let Some(key) = key {
                    key.collect_references(out);
                }
                if let Some(value) = value {
                    value.collect_references(out);
                }
            }
            TypeNode::Primitive { .. }
            | TypeNode::Literal { .. }
            | TypeNode::EnumType { .. }
            | TypeNode::FunctionType
            | TypeNode::Unknown { .. } => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
