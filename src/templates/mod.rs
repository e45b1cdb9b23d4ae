//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded directly in the binary.

use std::collections::HashMap;
use tera::{Context, Tera};

use crate::content::html_escape;
use crate::error::Result;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Attribute-safe escaping that leaves URL slashes alone
        tera.set_escape_fn(escape_html);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("works.html", include_str!("site/works.html")),
            ("works_mount.html", include_str!("site/works_mount.html")),
            ("post.html", include_str!("site/post.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("error.html", include_str!("site/error.html")),
            // Partials
            (
                "partials/works_grid.html",
                include_str!("site/partials/works_grid.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

fn escape_html(input: &str) -> String {
    html_escape(input)
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "…".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_parse() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(3));
        let out = truncate_chars_filter(&tera::Value::from("ポートフォリオ"), &args).unwrap();
        assert_eq!(out, tera::Value::from("ポート…"));

        let out = truncate_chars_filter(&tera::Value::from("abc"), &args).unwrap();
        assert_eq!(out, tera::Value::from("abc"));
    }

    #[test]
    fn test_escape_keeps_urls_readable() {
        assert_eq!(
            escape_html(r#"/images/a.png?x=1&y="2""#),
            "/images/a.png?x=1&amp;y=&quot;2&quot;"
        );
    }
}
