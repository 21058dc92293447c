//! Query routing and answer synthesis over a pool of retrieval engines.
//!
//! A run asks the reasoning model which engines fit the question, queries those engines
//! concurrently, then folds their answers into one [`FinalAnswer`] with the supporting
//! documents and the experts attached to them.

pub mod dispatch;
pub mod engine;
pub mod evidence;
pub mod prompts;
pub mod routing;
pub mod session;
pub mod summarize;
pub mod synthesis;
pub mod workflow;

mod error;

pub use dispatch::NamedEngine;
pub use engine::{HttpRetriever, RetrieverQueryEngine};
pub use error::{Error, Result};
pub use evidence::{Document, EngineResponse, Expert, FinalAnswer, Node, SourceNode};
pub use routing::{Router, RoutingAnswer, RoutingDecision};
pub use session::Session;
pub use summarize::TreeSummarizer;
pub use synthesis::Synthesizer;
pub use workflow::{RouterQueryWorkflow, WorkflowOptions};

use std::{future::Future, pin::Pin};

use serde_json::Value;

use ctrlf_config::LlmProviderConfig;
use ctrlf_providers::llm;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The reasoning model. Implementations must not keep per-call state: one handle serves
/// every concurrent run.
pub trait ReasoningModel
where
	Self: Send + Sync,
{
	fn structured_predict<'a>(
		&'a self,
		prompt: &'a str,
		schema_name: &'a str,
		schema: &'a Value,
	) -> BoxFuture<'a, color_eyre::Result<Value>>;

	fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, color_eyre::Result<String>>;
}

/// A configured retrieval strategy that answers a query and exposes its evidence.
pub trait QueryEngine
where
	Self: Send + Sync,
{
	fn answer<'a>(&'a self, query: &'a str) -> BoxFuture<'a, color_eyre::Result<EngineResponse>>;
}

/// A retrieval-mode-configured handle on the index.
pub trait Retriever
where
	Self: Send + Sync,
{
	fn retrieve<'a>(
		&'a self,
		query: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SourceNode>>>;
}

/// Reasoning model backed by an OpenAI-compatible chat completions endpoint.
pub struct ChatModel {
	cfg: LlmProviderConfig,
}
impl ChatModel {
	pub fn new(cfg: LlmProviderConfig) -> Self {
		Self { cfg }
	}
}
impl ReasoningModel for ChatModel {
	fn structured_predict<'a>(
		&'a self,
		prompt: &'a str,
		schema_name: &'a str,
		schema: &'a Value,
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(async move { Ok(llm::structured(&self.cfg, prompt, schema_name, schema).await?) })
	}

	fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(async move { Ok(llm::complete(&self.cfg, prompt).await?) })
	}
}
