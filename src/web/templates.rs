//! Page templates
//!
//! Handlebars templates compiled into the binary. Every page renders
//! inside the `layout` partial.

use handlebars::{handlebars_helper, Handlebars, TemplateError};
use serde::Serialize;

// Missing values encode to an empty string
handlebars_helper!(urlencode: |value: Json| value
    .as_str()
    .map(|s| urlencoding::encode(s).into_owned())
    .unwrap_or_default());

const PAGES: &[(&str, &str)] = &[
    ("landing", include_str!("../../templates/landing.hbs")),
    ("doc", include_str!("../../templates/doc.hbs")),
    ("terms", include_str!("../../templates/terms.hbs")),
    ("login", include_str!("../../templates/login.hbs")),
    ("forgot_password", include_str!("../../templates/forgot_password.hbs")),
    ("dashboard", include_str!("../../templates/dashboard.hbs")),
    ("analytics", include_str!("../../templates/analytics.hbs")),
    ("loading", include_str!("../../templates/loading.hbs")),
];

/// Compiled page templates
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_helper("urlencode", Box::new(urlencode));
        registry.register_partial("layout", include_str!("../../templates/layout.hbs"))?;

        for (name, source) in PAGES {
            registry.register_template_string(name, *source)?;
        }

        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, handlebars::RenderError> {
        self.registry.render(name, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_pages_compile() {
        let templates = Templates::new().unwrap();
        for (name, _) in PAGES {
            let html = templates
                .render(name, &json!({ "title": "Test" }))
                .unwrap();
            assert!(html.contains("<title>Test · Visit Logger</title>"), "{}", name);
        }
    }

    #[test]
    fn test_layout_shows_flash_and_escapes() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render(
                "loading",
                &json!({
                    "title": "Loading",
                    "refresh": 1,
                    "flash": [{ "kind": "error", "text": "<b>nope</b>" }],
                }),
            )
            .unwrap();

        assert!(html.contains(r#"<meta http-equiv="refresh" content="1">"#));
        assert!(html.contains("&lt;b&gt;nope&lt;/b&gt;"));
    }

    #[test]
    fn test_zero_coordinates_render() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render(
                "analytics",
                &json!({
                    "title": "Analytics",
                    "script_id": "s-1",
                    "table": {
                        "page": 1,
                        "total_pages": 1,
                        "records": [{
                            "ip_address": "198.51.100.1",
                            "local_time": "now",
                            "user_agent": "curl/8.0",
                            "city": "N/A",
                            "latitude": "0",
                            "longitude": "0",
                            "page_views": "0",
                        }],
                    },
                }),
            )
            .unwrap();

        assert_eq!(html.matches("<td>0</td>").count(), 3);
    }

    #[test]
    fn test_urlencode_helper() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render(
                "dashboard",
                &json!({
                    "title": "Dashboard",
                    "registry": {
                        "loading": false,
                        "scripts": [{
                            "script_id": "s 1",
                            "name": "My Blog",
                            "embed_code": "<script></script>",
                            "expanded": true,
                            "copied": false,
                        }],
                    },
                }),
            )
            .unwrap();

        assert!(html.contains("/analytics/s%201?name=My%20Blog"));
        assert!(html.contains("&lt;script&gt;&lt;/script&gt;"));
    }
}
