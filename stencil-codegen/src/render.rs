use handlebars::{Handlebars, handlebars_helper};
use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde_json::Value;

use stencil_core::{Error, Result};

handlebars_helper!(camel_case: |s: String| s.to_lower_camel_case());
handlebars_helper!(pascal_case: |s: String| s.to_upper_camel_case());
handlebars_helper!(snake_case: |s: String| s.to_snake_case());
handlebars_helper!(kebab_case: |s: String| s.to_kebab_case());
handlebars_helper!(lowercase: |s: String| s.to_lowercase());
handlebars_helper!(uppercase: |s: String| s.to_uppercase());

/// Handlebars wrapper with the stencil helper bindings registered.
///
/// Escaping is disabled: rendered artifacts are plain text, not HTML.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("camelCase", Box::new(camel_case));
        registry.register_helper("pascalCase", Box::new(pascal_case));
        registry.register_helper("snakeCase", Box::new(snake_case));
        registry.register_helper("kebabCase", Box::new(kebab_case));
        registry.register_helper("lowercase", Box::new(lowercase));
        registry.register_helper("uppercase", Box::new(uppercase));
        Self { registry }
    }

    /// Render a template string against a context; `name` is used for
    /// error reporting only.
    pub fn render(&self, name: &str, template: &str, context: &Value) -> Result<String> {
        self.registry.render_template(template, context).map_err(|e| {
            Box::new(Error::Render {
                name: name.to_string(),
                message: e.to_string(),
            })
        })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_with_case_helpers() {
        let renderer = Renderer::new();
        let context = json!({ "name": "person_record" });

        let out = renderer
            .render(
                "t",
                "{{pascalCase name}}/{{camelCase name}}/{{kebabCase name}}/{{uppercase name}}",
                &context,
            )
            .unwrap();
        assert_eq!(out, "PersonRecord/personRecord/person-record/PERSON_RECORD");
    }

    #[test]
    fn does_not_escape_rendered_text() {
        let renderer = Renderer::new();
        let context = json!({ "generic": "Vec<&'a str>" });
        let out = renderer.render("t", "{{generic}}", &context).unwrap();
        assert_eq!(out, "Vec<&'a str>");
    }

    #[test]
    fn render_failures_name_the_template() {
        let renderer = Renderer::new();
        let err = renderer
            .render("entity.hbs", "{{#if}}broken", &json!({}))
            .unwrap_err();
        assert!(matches!(*err, Error::Render { .. }));
        assert!(err.to_string().starts_with("template 'entity.hbs' failed to render"));
    }
}
