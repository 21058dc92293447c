//! OpenAI-compatible chat completions client for the reasoning model.

use serde_json::Value;

use crate::{Error, Result};

const PROVIDER: &str = "LLM";

/// Sends a single user prompt and returns the free-text reply.
pub async fn complete(cfg: &ctrlf_config::LlmProviderConfig, prompt: &str) -> Result<String> {
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [{ "role": "user", "content": prompt }],
	});
	let json = post(cfg, &body).await?;

	parse_completion_text(&json)
}

/// Sends a prompt constrained to `schema` and returns the decoded JSON object.
///
/// There is no retry: a reply that is not a JSON object is an error for the caller to surface.
pub async fn structured(
	cfg: &ctrlf_config::LlmProviderConfig,
	prompt: &str,
	schema_name: &str,
	schema: &Value,
) -> Result<Value> {
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [{ "role": "user", "content": prompt }],
		"response_format": {
			"type": "json_schema",
			"json_schema": { "name": schema_name, "schema": schema, "strict": true },
		},
	});
	let json = post(cfg, &body).await?;

	parse_structured_json(&json)
}

async fn post(cfg: &ctrlf_config::LlmProviderConfig, body: &Value) -> Result<Value> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(body)
		.send()
		.await?;

	Ok(res.error_for_status()?.json().await?)
}

fn parse_completion_text(json: &Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(str::to_string)
		.ok_or_else(|| Error::invalid_response(PROVIDER, "missing choices[0].message.content"))
}

fn parse_structured_json(json: &Value) -> Result<Value> {
	let content = parse_completion_text(json)?;
	let parsed: Value = serde_json::from_str(strip_code_fence(&content))
		.map_err(|err| Error::invalid_response(PROVIDER, format!("content is not JSON: {err}")))?;

	if !parsed.is_object() {
		return Err(Error::invalid_response(PROVIDER, "content is not a JSON object"));
	}

	Ok(parsed)
}

// Some gateways wrap JSON replies in a markdown fence even in structured mode.
fn strip_code_fence(content: &str) -> &str {
	let trimmed = content.trim();
	let Some(inner) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	let inner = inner.strip_prefix("json").unwrap_or(inner);

	inner.strip_suffix("```").unwrap_or(inner).trim()
}
