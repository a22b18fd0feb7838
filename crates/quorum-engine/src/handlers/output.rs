use chrono::Utc;
use minijinja::{Environment, context};
use quorum_config::OutputFormat;
use serde_json::{Value, json};

use crate::error::HandlerError;
use crate::inputs::{NodeInputs, render_text};

const MARKDOWN_TEMPLATE: &str = r#"# Workflow Output
{% if responses %}{% for r in responses %}
## {{ r.model }}

{% if r.success %}{{ r.response }}{% else %}_Error: {{ r.error }}_{% endif %}
{% endfor %}{% else %}
{{ body }}
{% endif %}"#;

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Workflow Output</title></head>
<body>
{% if responses %}{% for r in responses %}<section>
<h2>{{ r.model }}</h2>
{% if r.success %}<pre>{{ r.response }}</pre>{% else %}<p class="error">{{ r.error }}</p>{% endif %}
</section>
{% endfor %}{% else %}<pre>{{ body }}</pre>
{% endif %}</body>
</html>
"#;

/// Serialize the first available input in the requested format.
pub(super) fn run(
  node_id: &str,
  format: Option<OutputFormat>,
  include_metadata: bool,
  inputs: &NodeInputs,
) -> Result<Value, HandlerError> {
  let format = format.ok_or_else(|| HandlerError::MissingOutputFormat {
    node_id: node_id.to_string(),
  })?;
  let payload = inputs.first().map(|i| i.data.clone()).unwrap_or(Value::Null);

  let content = match format {
    OutputFormat::Json => serde_json::to_string_pretty(&payload).map_err(|e| render_error(format, e))?,
    OutputFormat::Markdown => render_template("output.md", MARKDOWN_TEMPLATE, &payload)
      .map_err(|e| render_error(format, e))?,
    OutputFormat::Html => render_template("output.html", HTML_TEMPLATE, &payload)
      .map_err(|e| render_error(format, e))?,
    OutputFormat::Text | OutputFormat::Other => render_text(&payload),
  };

  if !include_metadata {
    return Ok(Value::String(content));
  }

  Ok(json!({
    "content": content,
    "format": format.as_str(),
    "metadata": {
      "timestamp": Utc::now().to_rfc3339(),
      "size": content.len(),
    },
  }))
}

// The `.html` name turns on minijinja's HTML auto-escaping.
fn render_template(name: &str, source: &str, payload: &Value) -> Result<String, minijinja::Error> {
  let mut env = Environment::new();
  env.add_template(name, source)?;
  let responses = payload.get("responses").and_then(Value::as_array);
  env.get_template(name)?.render(context! {
    responses => responses,
    body => render_text(payload),
  })
}

fn render_error(format: OutputFormat, e: impl std::fmt::Display) -> HandlerError {
  HandlerError::Render {
    format: format.as_str().to_string(),
    message: e.to_string(),
  }
}
