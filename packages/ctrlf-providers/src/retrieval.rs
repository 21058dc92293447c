//! Client for the vector-store retrieval endpoint.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

const PROVIDER: &str = "Retrieval";

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalRequest<'a> {
	pub query: &'a str,
	pub retrieval_mode: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub files_top_k: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rerank_top_n: Option<u32>,
}

/// One scored node as returned by the store. `text` and `metadata` are both absent when the
/// entry carried no node.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedNode {
	pub score: Option<f64>,
	pub text: Option<String>,
	pub metadata: Option<Map<String, Value>>,
}

pub async fn retrieve(
	cfg: &ctrlf_config::RetrievalProviderConfig,
	request: &RetrievalRequest<'_>,
) -> Result<Vec<RetrievedNode>> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(request)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_retrieval_response(json)
}

fn parse_retrieval_response(json: Value) -> Result<Vec<RetrievedNode>> {
	let items = json
		.get("nodes")
		.or_else(|| json.get("retrieval_nodes"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::invalid_response(PROVIDER, "missing nodes array"))?;
	let mut nodes = Vec::with_capacity(items.len());

	for item in items {
		let score = item.get("score").and_then(Value::as_f64);
		let node = item.get("node").filter(|node| !node.is_null());
		let text = node
			.map(|n| n.get("text").and_then(Value::as_str).unwrap_or_default().to_string());
		let metadata = match node.and_then(|n| n.get("metadata")) {
			None | Some(Value::Null) => None,
			Some(Value::Object(map)) => Some(map.clone()),
			Some(_) => {
				return Err(Error::invalid_response(PROVIDER, "node metadata must be an object"));
			},
		};

		nodes.push(RetrievedNode { score, text, metadata });
	}

	Ok(nodes)
}
