use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use ctrlf_providers::retrieval::RetrievedNode;

/// What an engine returns for one query: its own answer text plus the evidence behind it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineResponse {
	pub text: String,
	pub source_nodes: Vec<SourceNode>,
}
impl fmt::Display for EngineResponse {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

/// One evidence unit. Lower scores are more relevant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceNode {
	pub score: Option<f64>,
	pub node: Option<Node>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
	pub text: String,
	pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub title: String,
	pub url: String,
	pub page: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expert {
	pub name: String,
	pub email: String,
	pub image: String,
	pub documents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAnswer {
	pub text: String,
	pub documents: Vec<Document>,
	pub experts: Vec<Expert>,
}

impl From<RetrievedNode> for SourceNode {
	fn from(retrieved: RetrievedNode) -> Self {
		let RetrievedNode { score, text, metadata } = retrieved;
		let node = match (text, metadata) {
			(None, None) => None,
			(text, metadata) => Some(Node { text: text.unwrap_or_default(), metadata }),
		};

		Self { score, node }
	}
}
