//! Named-placeholder interpolation for comment bodies.
//!
//! Templates only support `{name}` substitution; anything not in the
//! value table is left untouched. This is deliberately not a template
//! engine.

/// Replaces each `{key}` occurrence with its value.
pub fn render_template(template: &str, values: &[(&str, String)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in values {
        rendered = rendered.replace(&format!("{{{key}}}"), value);
    }
    rendered
}

/// Renders a branch list as back-quoted, comma-separated names.
pub fn format_branch_list(branches: &[String]) -> String {
    branches
        .iter()
        .map(|branch| format!("`{branch}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
