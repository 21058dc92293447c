use serde::Deserialize;
use serde_json::{Map, Value};

pub const RETRIEVAL_MODE_FILES_VIA_CONTENT: &str = "files_via_content";
pub const RETRIEVAL_MODE_CHUNKS: &str = "chunks";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	#[serde(default)]
	pub workflow: Workflow,
	#[serde(default = "default_engines")]
	pub engines: Vec<Engine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub llm: LlmProviderConfig,
	pub retrieval: RetrievalProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	#[serde(default)]
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Workflow {
	/// Wall-clock budget for one whole run, from routing to the final answer.
	pub timeout_secs: u64,
	pub verbose: bool,
	/// Optional. Must contain `{context_list}` and `{query_str}`; `{num_choices}` and
	/// `{max_outputs}` are filled in when present.
	pub router_prompt: Option<String>,
	/// Optional. One description per engine, in engine order.
	pub choice_descriptions: Option<Vec<String>>,
	/// Evidence is kept only when its score is strictly below this value. Lower is better.
	pub relevance_threshold: f64,
	/// Context budget per summarization prompt, in characters.
	pub summary_chunk_chars: usize,
}
impl Default for Workflow {
	fn default() -> Self {
		Self {
			timeout_secs: 60,
			verbose: false,
			router_prompt: None,
			choice_descriptions: None,
			relevance_threshold: 0.2,
			summary_chunk_chars: 12_000,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Engine {
	pub name: String,
	pub retrieval_mode: String,
	pub files_top_k: Option<u32>,
	pub rerank_top_n: Option<u32>,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_engines() -> Vec<Engine> {
	vec![
		Engine {
			name: "doc".to_string(),
			retrieval_mode: RETRIEVAL_MODE_FILES_VIA_CONTENT.to_string(),
			files_top_k: Some(5),
			rerank_top_n: None,
		},
		Engine {
			name: "chunk".to_string(),
			retrieval_mode: RETRIEVAL_MODE_CHUNKS.to_string(),
			files_top_k: None,
			rerank_top_n: Some(10),
		},
	]
}
