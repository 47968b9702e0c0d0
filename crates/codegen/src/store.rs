//! # State Store Generator
//!
//! Renders an object declaration as a zustand store module:
//!
//! - `export interface FooState`: the state shape
//! - `export interface FooActions`: one setter per field, the extended
//!   array action set per array field, plus `setState` and `reset`
//! - `export type FooStore = FooState & FooActions`
//! - `export const defaultFooState`: synthesized defaults
//! - `export const useFooStore`: the hook, optionally wrapped in `persist`
//!
//! Every action applies its change through a single `set` call.

use crate::context::GenerationContext;
use crate::traverse::{
    DefaultValue, ElementKind, FieldShape, action_suffix, array_element, default_for_property,
    element_kind, field_shape, js_string, member_access, property_key, resolve_reference,
    setter_name, ts_type,
};
use serde::{Deserialize, Serialize};
use shapegen_ir::{Declaration, Property, TypeNode};

/// Store member names a state field may not use.
pub(crate) const RESERVED_MEMBERS: &[&str] = &["setState", "reset"];

// ============================================================================
// StoreOptions
// ============================================================================

/// Options controlling store emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Wrap the store in zustand `persist` backed by `localStorage`
    pub persist: bool,

    /// Storage key for persisted stores; defaults to `<name>-storage`
    pub storage_key: Option<String>,
}

impl StoreOptions {
    /// Persisted store under the default key.
    pub fn persisted() -> Self {
        Self {
            persist: true,
            storage_key: None,
        }
    }

    /// Override the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    /// The key used for `name` in the `persist` options.
    pub fn resolved_storage_key(&self, declaration: &str) -> String {
        self.storage_key
            .clone()
            .unwrap_or_else(|| GenerationContext::default_storage_key(declaration))
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Build the store module body for `decl`.
///
/// Returns `None` (with a warning) for non-exported declarations and for
/// declarations whose root is not an object.
pub fn build_store(
    decl: &Declaration,
    options: &StoreOptions,
    ctx: &mut GenerationContext,
) -> Option<String> {
    let name = &decl.name;

    if !decl.is_exported {
        ctx.warn(format!("Skipping store for '{}': not exported", name));
        return None;
    }

    let Some(properties) = decl.ty.properties() else {
        ctx.warn(format!(
            "Skipping store for '{}': root type is {}, not an object",
            name,
            decl.ty.kind_name()
        ));
        return None;
    };

    let fields = store_fields(name, properties, ctx);

    let state_name = GenerationContext::state_name(name);
    let actions_name = GenerationContext::actions_name(name);
    let store_type = GenerationContext::store_type_name(name);
    let default_name = GenerationContext::default_state_name(name);
    let hook = GenerationContext::store_hook_name(name);

    let mut content = String::with_capacity(4096);

    // ── State interface ──────────────────────────────────────────────────
    content.push_str(&format!("export interface {} {{\n", state_name));
    for field in &fields {
        content.push_str(&format!(
            "  {}{}: {};\n",
            property_key(&field.prop.name),
            if field.shape.optional { "?" } else { "" },
            field.state_type()
        ));
    }
    content.push_str("}\n\n");

    // ── Actions interface ────────────────────────────────────────────────
    content.push_str(&format!("export interface {} {{\n", actions_name));
    for field in &fields {
        content.push_str(&format!(
            "  {}: (value: {}[{}]) => void;\n",
            field.setter,
            state_name,
            js_string(&field.prop.name)
        ));
        if let Some(array) = &field.array {
            content.push_str(&array_signatures(&field.suffix, array));
        }
    }
    content.push_str(&format!(
        "  setState: (partial: Partial<{}>) => void;\n",
        state_name
    ));
    content.push_str("  reset: () => void;\n");
    content.push_str("}\n\n");

    content.push_str(&format!(
        "export type {} = {} & {};\n\n",
        store_type, state_name, actions_name
    ));

    // ── Defaults ─────────────────────────────────────────────────────────
    let defaults = DefaultValue::Object(
        fields
            .iter()
            .map(|f| (f.prop.name.clone(), default_for_property(name, f.prop, ctx)))
            .collect(),
    );
    content.push_str(&format!(
        "export const {}: {} = {};\n\n",
        default_name,
        state_name,
        defaults.to_js_block(2)
    ));

    // ── Hook ─────────────────────────────────────────────────────────────
    let mut members = String::new();
    members.push_str(&format!("  ...{},\n", default_name));
    for field in &fields {
        let key = property_key(&field.prop.name);
        members.push_str(&format!(
            "  {}: (value) => set({{ {}: value }}),\n",
            field.setter, key
        ));
        if let Some(array) = &field.array {
            members.push_str(&array_actions(field, array));
        }
    }
    members.push_str("  setState: (partial) => set(partial),\n");
    members.push_str(&format!("  reset: () => set({{ ...{} }}),\n", default_name));

    if options.persist {
        let storage_key = options.resolved_storage_key(name);
        content.push_str(&format!(
            "export const {hook} = create<{store_type}>()(\n  persist(\n    (set) => ({{\n{body}    }}),\n    {{\n      name: {key},\n      storage: createJSONStorage(() => localStorage),\n{merge}    }}\n  )\n);\n",
            body = reindent(&members, 4),
            key = js_string(&storage_key),
            merge = date_merge(&fields, &store_type),
        ));
    } else {
        content.push_str(&format!(
            "export const {hook} = create<{store_type}>()((set) => ({{\n{members}}}));\n"
        ));
    }

    Some(content)
}

// ============================================================================
// Field classification
// ============================================================================

/// A state field with everything the emitters need precomputed.
struct StoreField<'a> {
    prop: &'a Property,
    shape: FieldShape<'a>,
    setter: String,
    suffix: String,
    array: Option<ArrayField>,
    is_date: bool,
}

impl StoreField<'_> {
    fn state_type(&self) -> String {
        let ty = ts_type(&self.shape.node);
        if self.shape.nullable {
            format!("{} | null", ty)
        } else {
            ty
        }
    }

    /// `state.tags` or `(state.tags ?? [])` for slots that may be absent.
    fn current_list(&self) -> String {
        let access = member_access("state", &self.prop.name);
        if self.shape.is_required() {
            access
        } else {
            format!("({} ?? [])", access)
        }
    }
}

struct ArrayField {
    element_type: String,
    kind: ElementKind,
}

fn store_fields<'a>(
    name: &str,
    properties: &'a [Property],
    ctx: &mut GenerationContext,
) -> Vec<StoreField<'a>> {
    let mut fields = Vec::with_capacity(properties.len());

    for prop in properties {
        if prop.ty.is_function() {
            ctx.warn(format!(
                "Skipping function field '{}.{}' in store",
                name, prop.name
            ));
            continue;
        }
        if RESERVED_MEMBERS.contains(&prop.name.as_str()) {
            ctx.warn(format!(
                "Skipping field '{}.{}': the name is used by a store action",
                name, prop.name
            ));
            continue;
        }

        let shape = field_shape(prop);
        let is_date = matches!(
            resolve_reference(&shape.node, ctx),
            TypeNode::Primitive { ref name } if name == "Date" || name == "date"
        );
        let array = array_element(&shape.node, ctx).map(|element| ArrayField {
            element_type: ts_type(&element),
            kind: element_kind(&element, ctx),
        });

        fields.push(StoreField {
            prop,
            setter: setter_name(&prop.name),
            suffix: action_suffix(&prop.name),
            shape,
            array,
            is_date,
        });
    }

    fields
}

/// `merge` option for persisted stores. JSON storage turns `Date` values into
/// strings, so date slots are rebuilt on rehydration. Empty when the state
/// has no date slot.
fn date_merge(fields: &[StoreField<'_>], store_type: &str) -> String {
    let dates: Vec<&StoreField<'_>> = fields.iter().filter(|f| f.is_date).collect();
    if dates.is_empty() {
        return String::new();
    }

    let mut out = String::from("      merge: (persisted, current) => {\n");
    out.push_str(&format!(
        "        const saved = (persisted ?? {{}}) as Partial<{}>;\n",
        store_type
    ));
    out.push_str("        return {\n          ...current,\n          ...saved,\n");
    for field in dates {
        let saved = member_access("saved", &field.prop.name);
        out.push_str(&format!(
            "          {}: {} != null ? new Date({}) : {},\n",
            property_key(&field.prop.name),
            saved,
            saved,
            member_access("current", &field.prop.name)
        ));
    }
    out.push_str("        };\n      },\n");
    out
}

// ============================================================================
// Array action set
// ============================================================================

fn array_signatures(suffix: &str, array: &ArrayField) -> String {
    let item = &array.element_type;
    let patch = match array.kind {
        ElementKind::Scalar => item.clone(),
        ElementKind::Object => format!("Partial<{}>", item),
    };

    let mut out = String::new();
    out.push_str(&format!("  prepend{}: (item: {}) => void;\n", suffix, item));
    out.push_str(&format!("  append{}: (item: {}) => void;\n", suffix, item));
    out.push_str(&format!(
        "  insert{}At: (index: number, item: {}) => void;\n",
        suffix, item
    ));
    out.push_str(&format!("  remove{}At: (index: number) => void;\n", suffix));
    out.push_str(&format!(
        "  remove{}: (predicate: (item: {}, index: number) => boolean) => void;\n",
        suffix, item
    ));
    out.push_str(&format!("  move{}: (from: number, to: number) => void;\n", suffix));
    out.push_str(&format!(
        "  update{}At: (index: number, value: {} | ((item: {}) => {})) => void;\n",
        suffix, patch, item, patch
    ));
    out.push_str(&format!("  clear{}: () => void;\n", suffix));
    out
}

fn array_actions(field: &StoreField<'_>, array: &ArrayField) -> String {
    let suffix = &field.suffix;
    let key = property_key(&field.prop.name);
    let list = field.current_list();

    let replacement = match array.kind {
        ElementKind::Scalar => {
            "(typeof value === \"function\" ? value(item) : value)".to_string()
        }
        ElementKind::Object => {
            "{ ...item, ...(typeof value === \"function\" ? value(item) : value) }".to_string()
        }
    };

    format!(
        r#"  prepend{suffix}: (item) => set((state) => ({{ {key}: [item, ...{list}] }})),
  append{suffix}: (item) => set((state) => ({{ {key}: [...{list}, item] }})),
  insert{suffix}At: (index, item) =>
    set((state) => {{
      const list = {list};
      if (index < 0 || index > list.length) return {{}};
      return {{ {key}: [...list.slice(0, index), item, ...list.slice(index)] }};
    }}),
  remove{suffix}At: (index) =>
    set((state) => ({{ {key}: {list}.filter((_, i) => i !== index) }})),
  remove{suffix}: (predicate) =>
    set((state) => ({{ {key}: {list}.filter((item, i) => !predicate(item, i)) }})),
  move{suffix}: (from, to) =>
    set((state) => {{
      const list = {list};
      if (from < 0 || from >= list.length || to < 0 || to >= list.length) return {{}};
      const next = [...list];
      const [moved] = next.splice(from, 1);
      next.splice(to, 0, moved);
      return {{ {key}: next }};
    }}),
  update{suffix}At: (index, value) =>
    set((state) => {{
      const list = {list};
      if (index < 0 || index >= list.length) return {{}};
      return {{
        {key}: list.map((item, i) =>
          i === index ? {replacement} : item
        ),
      }};
    }}),
  clear{suffix}: () => set({{ {key}: [] }}),
"#
    )
}

/// Prefix every non-empty line with `extra` spaces.
fn reindent(text: &str, extra: usize) -> String {
    let pad = " ".repeat(extra);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                "\n".to_string()
            } else {
                format!("{}{}\n", pad, line)
            }
        })
        .collect()
}

/// Whether `node` is bound through the array action set rather than a
/// scalar setter.
pub fn is_array_field(node: &TypeNode, ctx: &GenerationContext) -> bool {
    array_element(node, ctx).is_some()
}

// ============================================================================
// Tests
// ============================================================================
