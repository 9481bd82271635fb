use crate::builder::{DocContext, SwaggerConfig};
use serde_json::Value;

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>{{title}}</title>
  <link rel="stylesheet" type="text/css" href="{{static}}/swagger-ui.css">
  <style>
    html { box-sizing: border-box; overflow-y: scroll; }
    *, *:before, *:after { box-sizing: inherit; }
    body { margin: 0; background: #fafafa; }
  </style>
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="{{static}}/swagger-ui-bundle.js"></script>
  <script src="{{static}}/swagger-ui-standalone-preset.js"></script>
  <script type="text/javascript">
    window.onload = function() {
      window.ui = SwaggerUIBundle({
        url: {{specs_url}},
        validatorUrl: {{validator_url}},
        docExpansion: {{doc_expansion}},
        displayOperationId: {{display_operation_id}},
        displayRequestDuration: {{display_request_duration}},
        dom_id: "#swagger-ui",
        deepLinking: true,
        presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
        plugins: [SwaggerUIBundle.plugins.DownloadUrl],
        layout: "StandaloneLayout"
      });
    };
  </script>
</body>
</html>
"##;

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON-encode a value for embedding in a script block.
fn js(value: Value) -> String {
    serde_json::to_string(&value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

/// Render the bundled Swagger UI page.
///
/// Placeholders are filled in one pass, so substituted values are never
/// scanned for further placeholders.
pub fn render_swagger_ui(config: &SwaggerConfig, ctx: &DocContext) -> String {
    let validator = match &config.validator_url {
        Some(url) => Value::String(url.clone()),
        None => Value::Null,
    };
    let value_of = |name: &str| -> Option<String> {
        Some(match name {
            "title" => escape_html(&ctx.title),
            "static" => escape_html(&ctx.static_url),
            "specs_url" => js(Value::String(ctx.specs_url.clone())),
            "validator_url" => js(validator.clone()),
            "doc_expansion" => js(Value::String(config.doc_expansion.clone())),
            "display_operation_id" => js(Value::Bool(config.display_operation_id)),
            "display_request_duration" => js(Value::Bool(config.display_request_duration)),
            _ => return None,
        })
    };

    let mut out = String::with_capacity(TEMPLATE.len() + 256);
    let mut rest = TEMPLATE;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}").and_then(|end| Some((end, value_of(&after[..end])?))) {
            Some((end, value)) => {
                out.push_str(&value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(title: &str) -> DocContext {
        DocContext {
            title: title.to_string(),
            specs_url: "/api/swagger.json".to_string(),
            static_url: "/static".to_string(),
        }
    }

    #[test]
    fn title_is_escaped() {
        let page = render_swagger_ui(&SwaggerConfig::default(), &ctx("<Todo & Co>"));
        assert!(page.contains("<title>&lt;Todo &amp; Co&gt;</title>"));
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let page = render_swagger_ui(&SwaggerConfig::default(), &ctx("Docs {{specs_url}}"));
        assert!(page.contains("<title>Docs {{specs_url}}</title>"));
        assert_eq!(page.matches("/api/swagger.json").count(), 1);
    }

    #[test]
    fn ui_flags_are_rendered() {
        let config = SwaggerConfig::default()
            .doc_expansion("list")
            .display_operation_id(true)
            .validator_url("http://validator.local");
        let page = render_swagger_ui(&config, &ctx("API"));
        assert!(page.contains(r#"url: "/api/swagger.json""#));
        assert!(page.contains(r#"docExpansion: "list""#));
        assert!(page.contains("displayOperationId: true"));
        assert!(page.contains("displayRequestDuration: false"));
        assert!(page.contains(r#"validatorUrl: "http://validator.local""#));
    }

    #[test]
    fn validator_defaults_to_null() {
        let page = render_swagger_ui(&SwaggerConfig::default(), &ctx("API"));
        assert!(page.contains("validatorUrl: null"));
    }
}
