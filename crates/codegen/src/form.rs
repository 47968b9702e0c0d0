//! # Form Component Generator
//!
//! Renders an object declaration as a React form component bound to its
//! zustand store (`useFooStore`) and validated with its zod schema
//! (`FooSchema`).
//!
//! ## Field widgets
//!
//! | Field type (after unwrapping)          | Widget                         |
//! |----------------------------------------|--------------------------------|
//! | `string`                               | text input                     |
//! | `number`                               | number input                   |
//! | `boolean`                              | checkbox                       |
//! | `Date`                                 | date input (`YYYY-MM-DD`)      |
//! | string-literal union, string enum      | `<select>`                     |
//! | array of the above                     | repeatable rows                |
//! | array of objects                       | one card per element           |
//! | anything else                          | JSON textarea (with a warning) |
//!
//! Scalar fields go through the store's setters; array fields go through
//! their action set (`appendX`, `removeXAt`, `updateXAt`).

use crate::context::GenerationContext;
use crate::store::RESERVED_MEMBERS;
use crate::traverse::{
    FieldShape, array_element, camel_to_title, default_value_for, field_shape, js_string,
    member_access, object_properties, property_key, resolve_reference, setter_name,
    action_suffix, string_enum_values, string_literal_values, ts_type,
};
use serde::{Deserialize, Serialize};
use shapegen_ir::{Declaration, LiteralValue, Property, TypeNode};

// ============================================================================
// Options and output
// ============================================================================

/// Options controlling form emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Heading; defaults to the title-cased declaration name
    pub title: Option<String>,

    /// Submit button label
    pub submit_label: String,

    /// Reset button label
    pub reset_label: String,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            title: None,
            submit_label: "Save".to_string(),
            reset_label: "Reset".to_string(),
        }
    }
}

/// A rendered form component plus the identifiers it imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormArtifact {
    /// Component source (props interface and function component)
    pub component: String,

    /// Validator the component imports, e.g. `OrderSchema`
    pub schema_name: String,

    /// Store hook the component imports, e.g. `useOrderStore`
    pub store_name: String,
}

// ============================================================================
// Public API
// ============================================================================

/// Build the form component for `decl`.
///
/// Returns `None` (with a warning) for non-exported declarations and for
/// declarations whose root is not an object.
pub fn build_form(
    decl: &Declaration,
    options: &FormOptions,
    ctx: &mut GenerationContext,
) -> Option<FormArtifact> {
    let name = &decl.name;

    if !decl.is_exported {
        ctx.warn(format!("Skipping form for '{}': not exported", name));
        return None;
    }

    let Some(properties) = decl.ty.properties() else {
        ctx.warn(format!(
            "Skipping form for '{}': root type is {}, not an object",
            name,
            decl.ty.kind_name()
        ));
        return None;
    };

    let fields = form_fields(name, properties, ctx);

    let schema_name = GenerationContext::schema_name(name);
    let store_name = GenerationContext::store_hook_name(name);
    let state_name = GenerationContext::state_name(name);
    let form_name = GenerationContext::form_name(name);
    let props_name = GenerationContext::form_props_name(name);
    let title = options
        .title
        .clone()
        .unwrap_or_else(|| GenerationContext::title(name));

    let mut content = String::with_capacity(8192);

    content.push_str(&format!(
        r#"export interface {props_name} {{
  onSubmit: (values: z.infer<typeof {schema_name}>) => void | Promise<void>;
  className?: string;
}}

export function {form_name}({{ onSubmit, className }}: {props_name}) {{
  const state = {store_name}();
  const [errors, setErrors] = useState<Record<string, string>>({{}});
  const [touched, setTouched] = useState<Record<string, boolean>>({{}});
  const [submitError, setSubmitError] = useState<string | null>(null);
  const [isSubmitting, setIsSubmitting] = useState(false);

"#
    ));

    // ── Scalar setter bindings ───────────────────────────────────────────
    let scalar_setters: Vec<String> = fields
        .iter()
        .filter(|f| !f.kind.is_array())
        .map(|f| {
            format!(
                "    {}: state.{},\n",
                property_key(&f.prop.name),
                setter_name(&f.prop.name)
            )
        })
        .collect();
    if scalar_setters.is_empty() {
        content.push_str(&format!(
            "  const setters: Partial<Record<keyof {state_name}, (value: any) => void>> = {{}};\n\n"
        ));
    } else {
        content.push_str(&format!(
            "  const setters: Partial<Record<keyof {state_name}, (value: any) => void>> = {{\n{}  }};\n\n",
            scalar_setters.concat()
        ));
    }

    // ── Current values snapshot ──────────────────────────────────────────
    content.push_str(&format!(
        "  const currentValues = (): {state_name} => {{\n    const current = {store_name}.getState();\n    return {{\n"
    ));
    for field in &fields {
        content.push_str(&format!(
            "      {}: {},\n",
            property_key(&field.prop.name),
            member_access("current", &field.prop.name)
        ));
    }
    content.push_str("    };\n  };\n\n");

    content.push_str(
        r#"  const setFieldError = (name: string, message: string | undefined) => {
    setErrors((prev) => {
      const next = { ...prev };
      if (message === undefined) {
        delete next[name];
      } else {
        next[name] = message;
      }
      return next;
    });
  };

"#,
    );

    // ── Field validation ─────────────────────────────────────────────────
    if ctx.is_recursive(name) {
        content.push_str(&format!(
            r#"  const validateField = (name: keyof {state_name}, _value: unknown) => {{
    const result = {schema_name}.safeParse(currentValues());
    const issue = result.success
      ? undefined
      : result.error.issues.find((i) => i.path[0] === name);
    setFieldError(name, issue?.message);
  }};

"#
        ));
    } else {
        content.push_str(&format!(
            r#"  const validateField = (name: keyof {state_name}, value: unknown) => {{
    const result = {schema_name}.shape[name].safeParse(value);
    setFieldError(
      name,
      result.success ? undefined : result.error.issues[0]?.message ?? "Invalid value"
    );
  }};

"#
        ));
    }

    content.push_str(&format!(
        r#"  const handleChange = (name: keyof {state_name}, value: unknown) => {{
    setters[name]?.(value);
    if (touched[name]) {{
      validateField(name, value);
    }}
  }};

  const handleBlur = (name: keyof {state_name}) => {{
    setTouched((prev) => ({{ ...prev, [name]: true }}));
    validateField(name, {store_name}.getState()[name]);
  }};

  const revalidate = (name: keyof {state_name}) => {{
    if (touched[name]) {{
      validateField(name, {store_name}.getState()[name]);
    }}
  }};

  const hasErrors = Object.keys(errors).length > 0;

  const handleSubmit = async (event: FormEvent<HTMLFormElement>) => {{
    event.preventDefault();
    if (isSubmitting || hasErrors) {{
      return;
    }}
    setSubmitError(null);

    const result = {schema_name}.safeParse(currentValues());
    if (!result.success) {{
      const next: Record<string, string> = {{}};
      for (const issue of result.error.issues) {{
        const key = String(issue.path[0] ?? "");
        if (!(key in next)) {{
          next[key] = issue.message;
        }}
      }}
      setErrors(next);
      setTouched(Object.fromEntries(Object.keys(next).map((key) => [key, true])));
      return;
    }}

    setIsSubmitting(true);
    try {{
      await onSubmit(result.data);
    }} catch (error) {{
      setSubmitError(error instanceof Error ? error.message : String(error));
    }} finally {{
      setIsSubmitting(false);
    }}
  }};

  const handleReset = () => {{
    state.reset();
    setErrors({{}});
    setTouched({{}});
    setSubmitError(null);
  }};

  return (
    <form className={{className}} onSubmit={{handleSubmit}} noValidate>
      <h2>{title}</h2>
"#,
        title = jsx_text(&title),
    ));

    // ── Fields ───────────────────────────────────────────────────────────
    for field in &fields {
        content.push_str(&render_field(name, field, ctx));
    }

    content.push_str(&format!(
        r#"      {{submitError && (
        <p className="form-error" role="alert">
          {{submitError}}
        </p>
      )}}
      <div className="form-actions">
        <button type="submit" disabled={{isSubmitting || hasErrors}}>
          {submit}
        </button>
        <button type="button" onClick={{handleReset}} disabled={{isSubmitting}}>
          {reset}
        </button>
      </div>
    </form>
  );
}}
"#,
        submit = jsx_text(&options.submit_label),
        reset = jsx_text(&options.reset_label),
    ));

    Some(FormArtifact {
        component: content,
        schema_name,
        store_name,
    })
}

// ============================================================================
// Field classification
// ============================================================================

/// Control used for a single value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Widget {
    Text,
    Number,
    Checkbox,
    Date,
    Select(Vec<String>),
    Json,
}

/// How a top-level field is rendered.
#[derive(Debug, Clone, PartialEq)]
enum FieldKind {
    Scalar(Widget),
    Rows { element: TypeNode, widget: Widget },
    Cards { element: TypeNode, properties: Vec<Property> },
    ArrayJson,
}

impl FieldKind {
    fn is_array(&self) -> bool {
        !matches!(self, FieldKind::Scalar(_))
    }
}

struct FormField<'a> {
    prop: &'a Property,
    shape: FieldShape<'a>,
    kind: FieldKind,
}

fn form_fields<'a>(
    owner: &str,
    properties: &'a [Property],
    ctx: &mut GenerationContext,
) -> Vec<FormField<'a>> {
    let mut fields = Vec::with_capacity(properties.len());

    for prop in properties {
        if prop.ty.is_function() {
            ctx.warn(format!(
                "Skipping function field '{}.{}' in form",
                owner, prop.name
            ));
            continue;
        }
        if RESERVED_MEMBERS.contains(&prop.name.as_str()) {
            ctx.warn(format!(
                "Skipping field '{}.{}' in form: the name is used by a store action",
                owner, prop.name
            ));
            continue;
        }

        let shape = field_shape(prop);
        let kind = classify_field(owner, prop, &shape, ctx);
        fields.push(FormField { prop, shape, kind });
    }

    fields
}

fn classify_field(
    owner: &str,
    prop: &Property,
    shape: &FieldShape<'_>,
    ctx: &mut GenerationContext,
) -> FieldKind {
    if let Some(element) = array_element(&shape.node, ctx) {
        if let Some(properties) = object_properties(&element, ctx) {
            return FieldKind::Cards {
                element,
                properties,
            };
        }
        return match classify(&element, ctx) {
            Widget::Json => {
                json_warning(ctx, owner, &prop.name);
                FieldKind::ArrayJson
            }
            widget => FieldKind::Rows { element, widget },
        };
    }

    let widget = classify(&shape.node, ctx);
    if widget == Widget::Json {
        json_warning(ctx, owner, &prop.name);
    }
    FieldKind::Scalar(widget)
}

/// Pick a widget for a value, following references to aliases first.
fn classify(node: &TypeNode, ctx: &GenerationContext) -> Widget {
    let resolved = resolve_reference(node, ctx);
    match &resolved {
        TypeNode::Primitive { name } => match name.as_str() {
            "string" => Widget::Text,
            "number" => Widget::Number,
            "boolean" => Widget::Checkbox,
            "Date" | "date" => Widget::Date,
            _ => Widget::Json,
        },
        TypeNode::Literal {
            value: LiteralValue::Text(text),
        } => Widget::Select(vec![text.clone()]),
        TypeNode::Union { .. } => string_literal_values(&resolved)
            .map(|values| Widget::Select(values.into_iter().map(str::to_string).collect()))
            .unwrap_or(Widget::Json),
        TypeNode::EnumType { .. } => string_enum_values(&resolved)
            .map(|values| Widget::Select(values.into_iter().map(str::to_string).collect()))
            .unwrap_or(Widget::Json),
        _ => Widget::Json,
    }
}

fn json_warning(ctx: &mut GenerationContext, owner: &str, path: &str) {
    ctx.warn(format!(
        "Field '{}.{}' has no dedicated widget; rendering a JSON editor",
        owner, path
    ));
}

// ============================================================================
// Bindings
// ============================================================================

/// What happens when the user leaves an empty input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Absent {
    Required,
    Optional,
    Nullable,
}

impl Absent {
    fn of(shape: &FieldShape<'_>) -> Self {
        if shape.optional {
            Absent::Optional
        } else if shape.nullable {
            Absent::Nullable
        } else {
            Absent::Required
        }
    }

    fn blank(self) -> &'static str {
        match self {
            Absent::Required => "0",
            Absent::Optional => "undefined",
            Absent::Nullable => "null",
        }
    }
}

/// How a control reads its value and writes changes back.
struct Binding {
    /// Top-level field owning the error and touched state
    field: String,
    /// Expression reading the current value
    read: String,
    commit_prefix: String,
    commit_suffix: String,
    /// Type assertion for select values passed to typed actions
    cast: Option<String>,
    /// `id` for top-level controls
    id: Option<String>,
    /// Accessible label for controls without a `<label htmlFor>`
    label: String,
    absent: Absent,
}

impl Binding {
    fn commit(&self, value: &str) -> String {
        format!("{}{}{}", self.commit_prefix, value, self.commit_suffix)
    }

    fn target_attr(&self) -> String {
        match &self.id {
            Some(id) => format!("id={}", jsx_attr(id)),
            None => format!("aria-label={}", jsx_attr(&self.label)),
        }
    }

    fn field_js(&self) -> String {
        js_string(&self.field)
    }

    fn cast(&self, value: &str) -> String {
        match &self.cast {
            Some(ty) => format!("{} as {}", value, ty),
            None => value.to_string(),
        }
    }
}

// ============================================================================
// Field rendering
// ============================================================================

fn render_field(owner: &str, field: &FormField<'_>, ctx: &mut GenerationContext) -> String {
    let name = &field.prop.name;
    let label = camel_to_title(name);
    let id = format!(
        "{}-{}",
        GenerationContext::kebab(owner),
        GenerationContext::kebab(name)
    );
    let list = if field.shape.is_required() {
        member_access("state", name)
    } else {
        format!("({} ?? [])", member_access("state", name))
    };
    let suffix = action_suffix(name);
    let field_js = js_string(name);

    let mut out = String::new();

    match &field.kind {
        FieldKind::Scalar(widget) => {
            let binding = Binding {
                field: name.clone(),
                read: member_access("state", name),
                commit_prefix: format!("handleChange({}, ", field_js),
                commit_suffix: ")".to_string(),
                cast: None,
                id: Some(id.clone()),
                label: label.clone(),
                absent: Absent::of(&field.shape),
            };
            out.push_str("      <div className=\"form-field\">\n");
            out.push_str(&format!(
                "        <label htmlFor={}>{}</label>\n",
                jsx_attr(&id),
                jsx_text(&label)
            ));
            out.push_str(&render_control(widget, &binding, 8));
            out.push_str(&error_display(name, 8));
            out.push_str("      </div>\n");
        }

        FieldKind::ArrayJson => {
            let binding = Binding {
                field: name.clone(),
                read: member_access("state", name),
                commit_prefix: format!("{{ state.{}(", setter_name(name)),
                commit_suffix: format!("); revalidate({}); }}", field_js),
                cast: None,
                id: Some(id.clone()),
                label: label.clone(),
                absent: Absent::of(&field.shape),
            };
            out.push_str("      <div className=\"form-field\">\n");
            out.push_str(&format!(
                "        <label htmlFor={}>{}</label>\n",
                jsx_attr(&id),
                jsx_text(&label)
            ));
            out.push_str(&render_control(&Widget::Json, &binding, 8));
            out.push_str(&error_display(name, 8));
            out.push_str("      </div>\n");
        }

        FieldKind::Rows { element, widget } => {
            let binding = Binding {
                field: name.clone(),
                read: "item".to_string(),
                commit_prefix: format!("{{ state.update{}At(index, ", suffix),
                commit_suffix: format!("); revalidate({}); }}", field_js),
                cast: Some(ts_type(element)),
                id: None,
                label: label.clone(),
                absent: Absent::Required,
            };
            let new_item = default_value_for(element, false, ctx).to_js();

            out.push_str("      <fieldset className=\"form-field\">\n");
            out.push_str(&format!("        <legend>{}</legend>\n", jsx_text(&label)));
            out.push_str(&format!("        {{{}.map((item, index) => (\n", list));
            out.push_str("          <div key={index} className=\"form-row\">\n");
            out.push_str(&render_control(widget, &binding, 12));
            out.push_str(&remove_button(&suffix, &field_js, 12));
            out.push_str("          </div>\n");
            out.push_str("        ))}\n");
            out.push_str(&add_button(&suffix, &field_js, &new_item, 8));
            out.push_str(&error_display(name, 8));
            out.push_str("      </fieldset>\n");
        }

        FieldKind::Cards {
            element,
            properties,
        } => {
            let new_item = default_value_for(element, false, ctx).to_js();

            out.push_str("      <fieldset className=\"form-field\">\n");
            out.push_str(&format!("        <legend>{}</legend>\n", jsx_text(&label)));
            out.push_str(&format!("        {{{}.map((item, index) => (\n", list));
            out.push_str("          <div key={index} className=\"form-card\">\n");
            for sub in properties {
                out.push_str(&render_card_field(owner, name, sub, ctx));
            }
            out.push_str(&remove_button(&suffix, &field_js, 12));
            out.push_str("          </div>\n");
            out.push_str("        ))}\n");
            out.push_str(&add_button(&suffix, &field_js, &new_item, 8));
            out.push_str(&error_display(name, 8));
            out.push_str("      </fieldset>\n");
        }
    }

    out
}

/// One property of an array element, rendered inside its card. A nested
/// object gets one level of sub-fields; anything deeper is edited as JSON.
fn render_card_field(
    owner: &str,
    field: &str,
    sub: &Property,
    ctx: &mut GenerationContext,
) -> String {
    if sub.ty.is_function() {
        return String::new();
    }

    let suffix = action_suffix(field);
    let field_js = js_string(field);
    let shape = field_shape(sub);
    let key = property_key(&sub.name);
    let label = camel_to_title(&sub.name);
    let path = format!("{}.{}", field, sub.name);

    let mut out = String::new();

    let nested = if array_element(&shape.node, ctx).is_some() {
        None
    } else {
        object_properties(&shape.node, ctx)
    };

    if let Some(nested) = nested {
        out.push_str("            <fieldset className=\"form-nested\">\n");
        out.push_str(&format!("              <legend>{}</legend>\n", jsx_text(&label)));
        for inner in &nested {
            if inner.ty.is_function() {
                continue;
            }
            let inner_shape = field_shape(inner);
            let inner_path = format!("{}.{}", path, inner.name);
            let widget = if array_element(&inner_shape.node, ctx).is_some() {
                Widget::Json
            } else {
                classify(&inner_shape.node, ctx)
            };
            if widget == Widget::Json {
                json_warning(ctx, owner, &inner_path);
            }
            let binding = Binding {
                field: field.to_string(),
                read: format!(
                    "{}?.{}",
                    member_access("item", &sub.name),
                    optional_member(&inner.name)
                ),
                commit_prefix: format!(
                    "{{ state.update{}At(index, (current) => ({{ {}: {{ ...{}, {}: ",
                    suffix,
                    key,
                    member_access("current", &sub.name),
                    property_key(&inner.name)
                ),
                commit_suffix: format!(" }} }})); revalidate({}); }}", field_js),
                cast: Some(ts_type(&inner_shape.node)),
                id: None,
                label: camel_to_title(&inner.name),
                absent: Absent::of(&inner_shape),
            };
            out.push_str(&labelled(&binding.label, &render_control(&widget, &binding, 16), 14));
        }
        out.push_str("            </fieldset>\n");
        return out;
    }

    let widget = if array_element(&shape.node, ctx).is_some() {
        Widget::Json
    } else {
        classify(&shape.node, ctx)
    };
    if widget == Widget::Json {
        json_warning(ctx, owner, &path);
    }

    let binding = Binding {
        field: field.to_string(),
        read: member_access("item", &sub.name),
        commit_prefix: format!("{{ state.update{}At(index, {{ {}: ", suffix, key),
        commit_suffix: format!(" }}); revalidate({}); }}", field_js),
        cast: Some(ts_type(&shape.node)),
        id: None,
        label: label.clone(),
        absent: Absent::of(&shape),
    };
    out.push_str(&labelled(&label, &render_control(&widget, &binding, 14), 12));
    out
}

/// `name` or `["x-id"]` for use after `?.`
fn optional_member(name: &str) -> String {
    let access = member_access("", name);
    access.strip_prefix('.').map(str::to_string).unwrap_or(access)
}

fn labelled(label: &str, control: &str, pad: usize) -> String {
    let p = " ".repeat(pad);
    format!(
        "{p}<div className=\"form-field\">\n{p}  <span className=\"form-label\">{}</span>\n{}{p}</div>\n",
        jsx_text(label),
        control
    )
}

fn remove_button(suffix: &str, field_js: &str, pad: usize) -> String {
    let p = " ".repeat(pad);
    format!(
        "{p}<button type=\"button\" onClick={{() => {{ state.remove{suffix}At(index); revalidate({field_js}); }}}}>\n{p}  Remove\n{p}</button>\n"
    )
}

fn add_button(suffix: &str, field_js: &str, new_item: &str, pad: usize) -> String {
    let p = " ".repeat(pad);
    format!(
        "{p}<button type=\"button\" onClick={{() => {{ state.append{suffix}({new_item}); revalidate({field_js}); }}}}>\n{p}  Add\n{p}</button>\n"
    )
}

fn error_display(field: &str, pad: usize) -> String {
    let p = " ".repeat(pad);
    let touched = member_access("touched", field);
    let error = member_access("errors", field);
    format!(
        "{p}{{{touched} && {error} && (\n{p}  <span className=\"field-error\">{{{error}}}</span>\n{p})}}\n"
    )
}

// ============================================================================
// Controls
// ============================================================================

fn render_control(widget: &Widget, binding: &Binding, pad: usize) -> String {
    let p = " ".repeat(pad);
    let read = &binding.read;
    let target = binding.target_attr();
    let blur = format!("handleBlur({})", binding.field_js());

    match widget {
        Widget::Text => format!(
            "{p}<input\n{p}  {target}\n{p}  type=\"text\"\n{p}  value={{{read} ?? \"\"}}\n{p}  onChange={{(e) => {}}}\n{p}  onBlur={{() => {blur}}}\n{p}/>\n",
            binding.commit("e.target.value"),
        ),

        Widget::Number => {
            let value = format!(
                "e.target.value === \"\" ? {} : Number(e.target.value)",
                binding.absent.blank()
            );
            format!(
                "{p}<input\n{p}  {target}\n{p}  type=\"number\"\n{p}  value={{{read} ?? \"\"}}\n{p}  onChange={{(e) => {}}}\n{p}  onBlur={{() => {blur}}}\n{p}/>\n",
                binding.commit(&value),
            )
        }

        Widget::Checkbox => format!(
            "{p}<input\n{p}  {target}\n{p}  type=\"checkbox\"\n{p}  checked={{{read} ?? false}}\n{p}  onChange={{(e) => {}}}\n{p}  onBlur={{() => {blur}}}\n{p}/>\n",
            binding.commit("e.target.checked"),
        ),

        Widget::Date => {
            let value = match binding.absent {
                Absent::Required => "new Date(e.target.value)".to_string(),
                absent => format!(
                    "e.target.value === \"\" ? {} : new Date(e.target.value)",
                    absent.blank()
                ),
            };
            format!(
                "{p}<input\n{p}  {target}\n{p}  type=\"date\"\n{p}  value={{{read} && !isNaN(new Date({read}).getTime()) ? new Date({read}).toISOString().slice(0, 10) : \"\"}}\n{p}  onChange={{(e) => {}}}\n{p}  onBlur={{() => {blur}}}\n{p}/>\n",
                binding.commit(&value),
            )
        }

        Widget::Select(options) => {
            let value = match binding.absent {
                Absent::Required => binding.cast("e.target.value"),
                absent => format!(
                    "e.target.value === \"\" ? {} : {}",
                    absent.blank(),
                    binding.cast("e.target.value")
                ),
            };
            let mut out = format!(
                "{p}<select\n{p}  {target}\n{p}  value={{{read} ?? \"\"}}\n{p}  onChange={{(e) => {}}}\n{p}  onBlur={{() => {blur}}}\n{p}>\n",
                binding.commit(&value),
            );
            if binding.absent != Absent::Required {
                out.push_str(&format!("{p}  <option value=\"\">Select...</option>\n"));
            }
            for option in options {
                out.push_str(&format!(
                    "{p}  <option value={}>{}</option>\n",
                    jsx_attr(option),
                    jsx_text(&camel_to_title(option))
                ));
            }
            out.push_str(&format!("{p}</select>\n"));
            out
        }

        Widget::Json => format!(
            r#"{p}<textarea
{p}  {target}
{p}  key={{JSON.stringify({read} ?? null)}}
{p}  defaultValue={{JSON.stringify({read} ?? null, null, 2)}}
{p}  onBlur={{(e) => {{
{p}    try {{
{p}      const parsed = JSON.parse(e.target.value);
{p}      {};
{p}      {blur};
{p}    }} catch {{
{p}      setTouched((prev) => ({{ ...prev, [{field}]: true }}));
{p}      setFieldError({field}, "Invalid JSON");
{p}    }}
{p}  }}}}
{p}/>
"#,
            binding.commit("parsed"),
            field = binding.field_js(),
        ),
    }
}

// ============================================================================
// JSX escaping
// ============================================================================

fn needs_expression(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, '"' | '\'' | '{' | '}' | '<' | '>' | '&' | '\\' | '\n'))
}

/// JSX attribute value: `"plain"` or `{"escaped"}`.
fn jsx_attr(s: &str) -> String {
    if needs_expression(s) {
        format!("{{{}}}", js_string(s))
    } else {
        format!("\"{}\"", s)
    }
}

/// JSX text child: raw when safe, `{"escaped"}` otherwise.
fn jsx_text(s: &str) -> String {
    if needs_expression(s) {
        format!("{{{}}}", js_string(s))
    } else {
        s.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shapegen_ir::{EnumMember, ParseResult};

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

    fn render_in(batch: &ParseResult, name: &str) -> (Option<FormArtifact>, Vec<String>) {
        let decl = batch.find(name).unwrap();
        let mut ctx = GenerationContext::from_parse_result(batch);
        let out = build_form(decl, &FormOptions::default(), &mut ctx);
        (out, ctx.take_warnings())
    }

    fn render(decl: Declaration) -> (Option<FormArtifact>, Vec<String>) {
        let name = decl.name.clone();
        render_in(&ParseResult::new(vec![decl]), &name)
    }

    #[test]
    fn test_order_form() {
        let (artifact, warnings) = render(order());
        let artifact = artifact.unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(artifact.schema_name, "OrderSchema");
        assert_eq!(artifact.store_name, "useOrderStore");

        let out = &artifact.component;
        assert!(out.contains("export interface OrderFormProps {"));
        assert!(out.contains("export function OrderForm({ onSubmit, className }: OrderFormProps) {"));
        assert!(out.contains("  const state = useOrderStore();"));

        // Scalar setters exclude the array field
        assert!(out.contains("    id: state.setId,\n    status: state.setStatus,\n  };"));
        assert!(!out.contains("tags: state.setTags"));

        // Select for the literal union
        assert!(out.contains("<select\n          id=\"order-status\""));
        assert!(out.contains("<option value=\"pending\">Pending</option>"));
        assert!(out.contains("<option value=\"cancelled\">Cancelled</option>"));
        assert!(!out.contains("Select..."));

        // Repeatable text rows for tags
        assert!(out.contains("        {state.tags.map((item, index) => ("));
        assert!(out.contains("onChange={(e) => { state.updateTagsAt(index, e.target.value); revalidate(\"tags\"); }}"));
        assert!(out.contains("state.removeTagsAt(index); revalidate(\"tags\");"));
        assert!(out.contains("state.appendTags(\"\"); revalidate(\"tags\");"));

        // Field validation uses the object shape
        assert!(out.contains("OrderSchema.shape[name].safeParse(value)"));
        assert!(out.contains("if (isSubmitting || hasErrors) {"));
        assert!(out.contains("<button type=\"submit\" disabled={isSubmitting || hasErrors}>\n          Save\n"));
    }

    #[test]
    fn test_widgets_per_type() {
        let decl = Declaration::new(
            "Profile",
            TypeNode::object(vec![
                Property::new("age", TypeNode::number()),
                Property::optional("score", TypeNode::number()),
                Property::new("rating", TypeNode::nullable_of(TypeNode::number())),
                Property::new("active", TypeNode::boolean()),
                Property::new("birthday", TypeNode::date()),
                Property::optional("notes", TypeNode::string()),
            ]),
        );
        let out = render(decl).0.unwrap().component;

        assert!(out.contains("handleChange(\"age\", e.target.value === \"\" ? 0 : Number(e.target.value))"));
        assert!(out.contains("handleChange(\"score\", e.target.value === \"\" ? undefined : Number(e.target.value))"));
        assert!(out.contains("handleChange(\"rating\", e.target.value === \"\" ? null : Number(e.target.value))"));
        assert!(out.contains("type=\"checkbox\""));
        assert!(out.contains("checked={state.active ?? false}"));
        assert!(out.contains("value={state.birthday && !isNaN(new Date(state.birthday).getTime()) ? new Date(state.birthday).toISOString().slice(0, 10) : \"\"}"));
        assert!(out.contains("handleChange(\"notes\", e.target.value)"));
    }

    #[test]
    fn test_cleared_date_never_reaches_to_iso_string() {
        let decl = Declaration::new(
            "Trip",
            TypeNode::object(vec![
                Property::new("startsOn", TypeNode::date()),
                Property::new(
                    "stops",
                    TypeNode::array(TypeNode::object(vec![Property::new(
                        "arrivesOn",
                        TypeNode::date(),
                    )])),
                ),
            ]),
        );
        let out = render(decl).0.unwrap().component;

        // A cleared required input commits an Invalid Date; the read must
        // fall back to "" instead of formatting it.
        assert!(out.contains("handleChange(\"startsOn\", new Date(e.target.value))"));
        assert!(out.contains(
            "value={state.startsOn && !isNaN(new Date(state.startsOn).getTime()) ? new Date(state.startsOn).toISOString().slice(0, 10) : \"\"}"
        ));
        assert!(out.contains(
            "value={item.arrivesOn && !isNaN(new Date(item.arrivesOn).getTime()) ? new Date(item.arrivesOn).toISOString().slice(0, 10) : \"\"}"
        ));
        assert!(!out.contains("value={state.startsOn ? "));
    }

    #[test]
    fn test_optional_select_has_placeholder() {
        let decl = Declaration::new(
            "Filter",
            TypeNode::object(vec![Property::new(
                "level",
                TypeNode::optional_of(TypeNode::string_literals(["low", "high"])),
            )]),
        );
        let out = render(decl).0.unwrap().component;
        assert!(out.contains("<option value=\"\">Select...</option>"));
        assert!(out.contains("handleChange(\"level\", e.target.value === \"\" ? undefined : e.target.value)"));
    }

    #[test]
    fn test_alias_references_resolve_to_select() {
        let batch = ParseResult::new(vec![
            Declaration::new("Status", TypeNode::string_literals(["open", "closed"])),
            Declaration::new(
                "Priority",
                TypeNode::enumeration(vec![
                    EnumMember::new("Low", "low"),
                    EnumMember::new("High", "high"),
                ]),
            ),
            Declaration::new(
                "Ticket",
                TypeNode::object(vec![
                    Property::new("status", TypeNode::reference("Status")),
                    Property::new("priority", TypeNode::reference("Priority")),
                ]),
            ),
        ]);
        let (artifact, warnings) = render_in(&batch, "Ticket");
        let out = artifact.unwrap().component;
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert!(out.contains("<option value=\"open\">Open</option>"));
        assert!(out.contains("<option value=\"high\">High</option>"));
    }

    #[test]
    fn test_object_array_cards() {
        let batch = ParseResult::new(vec![
            Declaration::new(
                "LineItem",
                TypeNode::object(vec![
                    Property::new("sku", TypeNode::string()),
                    Property::new("qty", TypeNode::number()),
                    Property::new(
                        "dimensions",
                        TypeNode::object(vec![Property::new("width", TypeNode::number())]),
                    ),
                    Property::new("history", TypeNode::array(TypeNode::string())),
                ]),
            ),
            Declaration::new(
                "Cart",
                TypeNode::object(vec![Property::new(
                    "items",
                    TypeNode::array(TypeNode::reference("LineItem")),
                )]),
            ),
        ]);
        let (artifact, warnings) = render_in(&batch, "Cart");
        let out = artifact.unwrap().component;

        assert!(out.contains("<div key={index} className=\"form-card\">"));
        assert!(out.contains("{ state.updateItemsAt(index, { sku: e.target.value }); revalidate(\"items\"); }"));
        assert!(out.contains(
            "{ state.updateItemsAt(index, (current) => ({ dimensions: { ...current.dimensions, width: e.target.value === \"\" ? 0 : Number(e.target.value) } })); revalidate(\"items\"); }"
        ));
        assert!(out.contains("value={item.dimensions?.width ?? \"\"}"));
        assert!(out.contains(
            "state.appendItems({ sku: \"\", qty: 0, dimensions: { width: 0 }, history: [] }); revalidate(\"items\");"
        ));

        // Nested arrays inside a card fall back to JSON
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("items.history"));
        assert!(out.contains("JSON.stringify(item.history ?? null, null, 2)"));
    }

    #[test]
    fn test_unsupported_fields_use_json() {
        let decl = Declaration::new(
            "Settings",
            TypeNode::object(vec![
                Property::new("meta", TypeNode::record(TypeNode::string(), TypeNode::number())),
                Property::new("matrix", TypeNode::array(TypeNode::array(TypeNode::number()))),
                Property::new("onSave", TypeNode::FunctionType),
            ]),
        );
        let (artifact, warnings) = render(decl);
        let out = artifact.unwrap().component;
        assert_eq!(warnings.len(), 3);
        assert!(out.contains("handleChange(\"meta\", parsed);"));
        assert!(out.contains("{ state.setMatrix(parsed); revalidate(\"matrix\"); };"));
        assert!(!out.contains("onSave"));
    }

    #[test]
    fn test_json_array_field_named_state_uses_field_setter() {
        let decl = Declaration::new(
            "Grid",
            TypeNode::object(vec![Property::new(
                "state",
                TypeNode::array(TypeNode::array(TypeNode::number())),
            )]),
        );
        let out = render(decl).0.unwrap().component;
        assert!(out.contains("{ state.setStateField(parsed); revalidate(\"state\"); };"));
        assert!(!out.contains("state.setState(parsed)"));
    }

    #[test]
    fn test_recursive_validation_filters_issues() {
        let tree = Declaration::new(
            "Category",
            TypeNode::object(vec![
                Property::new("name", TypeNode::string()),
                Property::new("children", TypeNode::array(TypeNode::reference("Category"))),
            ]),
        );
        let (artifact, _) = render(tree);
        let out = artifact.unwrap().component;
        assert!(out.contains("const result = CategorySchema.safeParse(currentValues());"));
        assert!(out.contains("result.error.issues.find((i) => i.path[0] === name)"));
        assert!(!out.contains(".shape[name]"));
    }

    #[test]
    fn test_options_and_skips() {
        let batch = ParseResult::new(vec![order()]);
        let decl = batch.find("Order").unwrap();
        let mut ctx = GenerationContext::from_parse_result(&batch);
        let options = FormOptions {
            title: Some("New <Order>".to_string()),
            submit_label: "Place order".to_string(),
            reset_label: "Clear".to_string(),
        };
        let out = build_form(decl, &options, &mut ctx).unwrap().component;
        assert!(out.contains("<h2>{\"New <Order>\"}</h2>"));
        assert!(out.contains("          Place order\n"));
        assert!(out.contains("          Clear\n"));

        let (artifact, warnings) = render(order().private());
        assert!(artifact.is_none());
        assert_eq!(warnings.len(), 1);

        let (artifact, _) = render(Declaration::new("Id", TypeNode::string()));
        assert!(artifact.is_none());
    }

    #[test]
    fn test_form_output_is_deterministic() {
        assert_eq!(render(order()).0, render(order()).0);
    }
}
