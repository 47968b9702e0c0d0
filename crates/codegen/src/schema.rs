//! # Validation Schema Generator
//!
//! Renders one declaration as a zod validator named `<Name>Schema`.
//!
//! ```text
//! export const OrderSchema = z.object({
//!   id: z.string(),
//!   status: z.enum(["pending", "shipped", "cancelled"]),
//!   notes: z.string().optional(),
//! });
//! ```
//!
//! Recursive declarations are wrapped in `z.lazy` with an explicit
//! `z.ZodType<Name>` annotation. Objects are laid out one field per line,
//! everything else inline.

use crate::context::GenerationContext;
use crate::store::RESERVED_MEMBERS;
use crate::traverse::{
    detect_discriminator, field_shape, js_string, property_key, string_enum_values,
    string_literal_values, unwrap_nullable_union, unwrap_optional_union,
};
use shapegen_ir::{Declaration, Property, TypeNode};
use std::borrow::Cow;

const INDENT: &str = "  ";

// ============================================================================
// Public API
// ============================================================================

/// Build the validator declaration for `decl`.
///
/// Returns `None` (with a warning) for declarations that are not exported
/// and not referenced by any sibling, and for function-typed roots.
pub fn build_schema(decl: &Declaration, ctx: &mut GenerationContext) -> Option<String> {
    let name = &decl.name;

    if !decl.is_exported && !ctx.is_depended_upon(name) {
        ctx.warn(format!(
            "Skipping schema for '{}': not exported and not referenced",
            name
        ));
        return None;
    }

    if decl.ty.is_function() {
        ctx.warn(format!(
            "Skipping schema for '{}': function types cannot be validated",
            name
        ));
        return None;
    }

    let keyword = if decl.is_exported {
        "export const"
    } else {
        "const"
    };
    let schema_name = GenerationContext::schema_name(name);

    let root = root_type(decl, ctx);
    let output = if ctx.is_recursive(name) {
        let expr = zod_expr(&root, ctx, 1);
        format!(
            "{keyword} {schema_name}: z.ZodType<{name}> = z.lazy(() =>\n{INDENT}{expr}\n);\n"
        )
    } else {
        let expr = zod_expr(&root, ctx, 0);
        format!("{keyword} {schema_name} = {expr};\n")
    };

    Some(output)
}

/// The declared type with top-level fields named after store actions removed,
/// so the schema, store and form share one field set.
fn root_type<'a>(decl: &'a Declaration, ctx: &mut GenerationContext) -> Cow<'a, TypeNode> {
    let Some(properties) = decl.ty.properties() else {
        return Cow::Borrowed(&decl.ty);
    };
    if !properties
        .iter()
        .any(|p| RESERVED_MEMBERS.contains(&p.name.as_str()))
    {
        return Cow::Borrowed(&decl.ty);
    }

    let mut kept = Vec::with_capacity(properties.len());
    for prop in properties {
        if RESERVED_MEMBERS.contains(&prop.name.as_str()) {
            ctx.warn(format!(
                "Skipping field '{}.{}' in schema: the name is used by a store action",
                decl.name, prop.name
            ));
        } else {
            kept.push(prop.clone());
        }
    }
    Cow::Owned(TypeNode::object(kept))
}

// ============================================================================
// Expression rendering
// ============================================================================

/// Render a node as a zod expression. `depth` is the indentation level of
/// the line the expression starts on.
fn zod_expr(node: &TypeNode, ctx: &mut GenerationContext, depth: usize) -> String {
    match node {
        TypeNode::Primitive { name } => primitive_expr(name, ctx),
        TypeNode::Literal { value } => format!("z.literal({})", value.to_js()),
        TypeNode::Array { element: None } => "z.array(z.unknown())".to_string(),
        TypeNode::Array {
            element: Some(element),
        } => format!("z.array({})", zod_expr(element, ctx, depth)),
        TypeNode::Tuple { elements } => {
            let items = join_exprs(elements, ctx, depth);
            format!("z.tuple([{}])", items)
        }
        TypeNode::Union { members } => union_expr(node, members, ctx, depth),
        TypeNode::Intersection { members } => intersection_expr(members, ctx, depth),
        TypeNode::Object { properties } => object_expr(properties, ctx, depth),
        TypeNode::Reference { name } => {
            if ctx.declaration(name).is_none() {
                ctx.warn(format!(
                    "Reference '{}' is not declared in this batch; assuming {} exists",
                    name,
                    GenerationContext::schema_name(name)
                ));
            }
            GenerationContext::schema_name(name)
        }
        TypeNode::EnumType { values } => {
            if let Some(texts) = string_enum_values(node) {
                return enum_expr(&texts);
            }
            match values.as_slice() {
                [] => "z.never()".to_string(),
                [only] => format!("z.literal({})", only.value.to_js()),
                _ => {
                    let literals: Vec<String> = values
                        .iter()
                        .map(|v| format!("z.literal({})", v.value.to_js()))
                        .collect();
                    format!("z.union([{}])", literals.join(", "))
                }
            }
        }
        TypeNode::Record {
            key: Some(key),
            value: Some(value),
        } => format!(
            "z.record({}, {})",
            zod_expr(key, ctx, depth),
            zod_expr(value, ctx, depth)
        ),
        TypeNode::Record { key, value } => {
            let key = match key {
                Some(key) => zod_expr(key, ctx, depth),
                None => "z.string()".to_string(),
            };
            let value = match value {
                Some(value) => zod_expr(value, ctx, depth),
                None => "z.unknown()".to_string(),
            };
            format!("z.record({}, {})", key, value)
        }
        TypeNode::FunctionType => {
            ctx.warn("Function types are not validated; emitting z.any()");
            "z.any() /* unsupported: function type */".to_string()
        }
        TypeNode::Unknown { raw_text } => {
            ctx.warn(format!(
                "Unsupported type '{}' rendered as z.unknown()",
                raw_text.as_deref().unwrap_or("<unknown>")
            ));
            "z.unknown()".to_string()
        }
    }
}

fn primitive_expr(name: &str, ctx: &mut GenerationContext) -> String {
    let expr = match name {
        "string" => "z.string()",
        "number" => "z.number()",
        "boolean" => "z.boolean()",
        "Date" | "date" => "z.date()",
        "bigint" => "z.bigint()",
        "any" => "z.any()",
        "unknown" => "z.unknown()",
        "never" => "z.never()",
        "void" => "z.void()",
        "null" => "z.null()",
        "undefined" => "z.undefined()",
        other => {
            ctx.warn(format!(
                "Unrecognized primitive '{}' rendered as z.unknown()",
                other
            ));
            "z.unknown()"
        }
    };
    expr.to_string()
}

fn union_expr(
    node: &TypeNode,
    members: &[TypeNode],
    ctx: &mut GenerationContext,
    depth: usize,
) -> String {
    let optional = unwrap_optional_union(node);
    if optional.is_optional() {
        return format!("{}.optional()", zod_expr(&optional.node, ctx, depth));
    }

    let nullable = unwrap_nullable_union(node);
    if nullable.is_nullable() {
        return format!("{}.nullable()", zod_expr(&nullable.node, ctx, depth));
    }

    match members {
        [] => return "z.never()".to_string(),
        [only] => return zod_expr(only, ctx, depth),
        _ => {}
    }

    if let Some(values) = string_literal_values(node) {
        return enum_expr(&values);
    }

    let items = join_exprs(members, ctx, depth);
    match detect_discriminator(members) {
        Some(tag) => format!("z.discriminatedUnion({}, [{}])", js_string(tag), items),
        None => format!("z.union([{}])", items),
    }
}

fn intersection_expr(members: &[TypeNode], ctx: &mut GenerationContext, depth: usize) -> String {
    let mut iter = members.iter();
    let Some(first) = iter.next() else {
        return "z.object({})".to_string();
    };

    let mut acc = zod_expr(first, ctx, depth);
    for member in iter {
        acc = format!("z.intersection({}, {})", acc, zod_expr(member, ctx, depth));
    }
    acc
}

fn object_expr(properties: &[Property], ctx: &mut GenerationContext, depth: usize) -> String {
    if properties.is_empty() {
        return "z.object({})".to_string();
    }

    let inner = INDENT.repeat(depth + 1);
    let mut out = String::from("z.object({\n");

    for prop in properties {
        let shape = field_shape(prop);
        let mut expr = zod_expr(&shape.node, ctx, depth + 1);
        if shape.nullable {
            expr.push_str(".nullable()");
        }
        if shape.optional {
            expr.push_str(".optional()");
        }
        out.push_str(&format!("{}{}: {},\n", inner, property_key(&prop.name), expr));
    }

    out.push_str(&INDENT.repeat(depth));
    out.push_str("})");
    out
}

fn enum_expr(values: &[&str]) -> String {
    let items: Vec<String> = values.iter().map(|v| js_string(v)).collect();
    format!("z.enum([{}])", items.join(", "))
}

fn join_exprs(nodes: &[TypeNode], ctx: &mut GenerationContext, depth: usize) -> String {
    nodes
        .iter()
        .map(|n| zod_expr(n, ctx, depth))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shapegen_ir::{EnumMember, ParseResult};

    fn render(decl: Declaration) -> (Option<String>, Vec<String>) {
        let batch = ParseResult::new(vec![decl.clone()]);
        let mut ctx = GenerationContext::from_parse_result(&batch);
        let out = build_schema(&decl, &mut ctx);
        (out, ctx.take_warnings())
    }

    fn order() -> Declaration {
        Declaration::new(
            "Order",
            TypeNode::object(vec![
                Property::new("id", TypeNode::string()),
                Property::new(
                    "status",
                    TypeNode::string_literals(["pending", "shipped", "cancelled"]),
                ),
                Property::new("tags", TypeNode::array(TypeNode::string())),
            ]),
        )
    }

    #[test]
    fn test_order_schema() {
        let (out, warnings) = render(order());
        assert_eq!(
            out.unwrap(),
            r#"export const OrderSchema = z.object({
  id: z.string(),
  status: z.enum(["pending", "shipped", "cancelled"]),
  tags: z.array(z.string()),
});
"#
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_action_named_fields_are_skipped() {
        let decl = Declaration::new(
            "Toggle",
            TypeNode::object(vec![
                Property::new("label", TypeNode::string()),
                Property::new("reset", TypeNode::boolean()),
                Property::new("setState", TypeNode::string()),
            ]),
        );
        let (out, warnings) = render(decl);
        assert_eq!(
            out.unwrap(),
            "export const ToggleSchema = z.object({\n  label: z.string(),\n});\n"
        );
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Toggle.reset"));
    }

    #[test]
    fn test_action_names_allowed_below_the_root() {
        let decl = Declaration::new(
            "Panel",
            TypeNode::object(vec![Property::new(
                "toggle",
                TypeNode::object(vec![Property::new("reset", TypeNode::boolean())]),
            )]),
        );
        let (out, warnings) = render(decl);
        assert!(out.unwrap().contains("    reset: z.boolean(),\n"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_optional_suffix_appears_once() {
        let decl = Declaration::new(
            "Note",
            TypeNode::object(vec![
                Property::optional("notes", TypeNode::string()),
                Property::optional("flag", TypeNode::optional_of(TypeNode::boolean())),
                Property::new("extra", TypeNode::optional_of(TypeNode::number())),
            ]),
        );
        let out = render(decl).0.unwrap();
        assert!(out.contains("notes: z.string().optional(),"));
        assert!(out.contains("flag: z.boolean().optional(),"));
        assert!(out.contains("extra: z.number().optional(),"));
        assert_eq!(out.matches(".optional()").count(), 3);
    }

    #[test]
    fn test_nullable_and_optional() {
        let decl = Declaration::new(
            "Profile",
            TypeNode::object(vec![
                Property::new("bio", TypeNode::nullable_of(TypeNode::string())),
                Property::new(
                    "avatar",
                    TypeNode::union(vec![
                        TypeNode::string(),
                        TypeNode::null(),
                        TypeNode::undefined(),
                    ]),
                ),
            ]),
        );
        let out = render(decl).0.unwrap();
        assert!(out.contains("bio: z.string().nullable(),"));
        assert!(out.contains("avatar: z.string().nullable().optional(),"));
    }

    #[test]
    fn test_discriminated_union() {
        let shape = TypeNode::union(vec![
            TypeNode::object(vec![
                Property::new("kind", TypeNode::literal("circle")),
                Property::new("radius", TypeNode::number()),
            ]),
            TypeNode::object(vec![
                Property::new("kind", TypeNode::literal("square")),
                Property::new("size", TypeNode::number()),
            ]),
        ]);
        let out = render(Declaration::new("Shape", shape)).0.unwrap();
        assert!(out.starts_with("export const ShapeSchema = z.discriminatedUnion(\"kind\", ["));
        assert!(out.contains("kind: z.literal(\"circle\"),"));
    }

    #[test]
    fn test_plain_union_and_degenerate_unions() {
        let (out, _) = render(Declaration::new(
            "Id",
            TypeNode::union(vec![TypeNode::string(), TypeNode::number()]),
        ));
        assert_eq!(out.unwrap(), "export const IdSchema = z.union([z.string(), z.number()]);\n");

        let (out, _) = render(Declaration::new("Nothing", TypeNode::union(vec![])));
        assert_eq!(out.unwrap(), "export const NothingSchema = z.never();\n");

        let (out, _) = render(Declaration::new(
            "Single",
            TypeNode::union(vec![TypeNode::boolean()]),
        ));
        assert_eq!(out.unwrap(), "export const SingleSchema = z.boolean();\n");
    }

    #[test]
    fn test_recursive_declaration_is_lazy() {
        let tree = Declaration::new(
            "Tree",
            TypeNode::object(vec![
                Property::new("label", TypeNode::string()),
                Property::new("children", TypeNode::array(TypeNode::reference("Tree"))),
            ]),
        );
        let (out, _) = render(tree);
        assert_eq!(
            out.unwrap(),
            r#"export const TreeSchema: z.ZodType<Tree> = z.lazy(() =>
  z.object({
    label: z.string(),
    children: z.array(TreeSchema),
  })
);
"#
        );
    }

    #[test]
    fn test_private_declarations() {
        let hidden = Declaration::new(
            "Address",
            TypeNode::object(vec![Property::new("city", TypeNode::string())]),
        )
        .private();
        let (out, warnings) = render(hidden.clone());
        assert!(out.is_none());
        assert_eq!(warnings.len(), 1);

        let user = Declaration::new(
            "User",
            TypeNode::object(vec![Property::new("address", TypeNode::reference("Address"))]),
        );
        let batch = ParseResult::new(vec![hidden.clone(), user]);
        let mut ctx = GenerationContext::from_parse_result(&batch);
        let out = build_schema(&hidden, &mut ctx).unwrap();
        assert!(out.starts_with("const AddressSchema = z.object({"));
    }

    #[test]
    fn test_function_root_and_field() {
        let (out, warnings) = render(Declaration::new("Callback", TypeNode::FunctionType));
        assert!(out.is_none());
        assert_eq!(warnings.len(), 1);

        let (out, warnings) = render(Declaration::new(
            "Button",
            TypeNode::object(vec![Property::new("onClick", TypeNode::FunctionType)]),
        ));
        assert!(out.unwrap().contains("onClick: z.any() /* unsupported: function type */,"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_enums_records_and_intersections() {
        let (out, _) = render(Declaration::new(
            "Color",
            TypeNode::enumeration(vec![EnumMember::new("Red", "red"), EnumMember::new("Blue", "blue")]),
        ));
        assert_eq!(out.unwrap(), "export const ColorSchema = z.enum([\"red\", \"blue\"]);\n");

        let (out, _) = render(Declaration::new(
            "Level",
            TypeNode::enumeration(vec![EnumMember::new("Low", 0.0), EnumMember::new("High", 1.0)]),
        ));
        assert_eq!(
            out.unwrap(),
            "export const LevelSchema = z.union([z.literal(0), z.literal(1)]);\n"
        );

        let (out, _) = render(Declaration::new(
            "Scores",
            TypeNode::record(TypeNode::string(), TypeNode::number()),
        ));
        assert_eq!(out.unwrap(), "export const ScoresSchema = z.record(z.string(), z.number());\n");

        let (out, _) = render(Declaration::new(
            "Bag",
            TypeNode::Record { key: None, value: None },
        ));
        assert_eq!(out.unwrap(), "export const BagSchema = z.record(z.string(), z.unknown());\n");

        let (out, _) = render(Declaration::new(
            "Mixed",
            TypeNode::intersection(vec![
                TypeNode::reference("A"),
                TypeNode::reference("B"),
                TypeNode::reference("C"),
            ]),
        ));
        assert_eq!(
            out.unwrap(),
            "export const MixedSchema = z.intersection(z.intersection(ASchema, BSchema), CSchema);\n"
        );

        let (out, _) = render(Declaration::new("Empty", TypeNode::intersection(vec![])));
        assert_eq!(out.unwrap(), "export const EmptySchema = z.object({});\n");
    }

    #[test]
    fn test_unknowns_warn() {
        let (out, warnings) = render(Declaration::new(
            "Odd",
            TypeNode::object(vec![
                Property::new("a", TypeNode::primitive("symbol")),
                Property::new("b", TypeNode::unknown(Some("Partial<T>"))),
                Property::new("c", TypeNode::untyped_array()),
                Property::new("d", TypeNode::tuple(vec![TypeNode::string(), TypeNode::number()])),
            ]),
        ));
        let out = out.unwrap();
        assert!(out.contains("a: z.unknown(),"));
        assert!(out.contains("b: z.unknown(),"));
        assert!(out.contains("c: z.array(z.unknown()),"));
        assert!(out.contains("d: z.tuple([z.string(), z.number()]),"));
        assert_eq!(warnings.len(), 2);
        assert!(warnings[1].contains("Partial<T>"));
    }

    #[test]
    fn test_output_is_deterministic() {
        assert_eq!(render(order()).0, render(order()).0);
    }
}
