use std::sync::Arc;

use ctrlf_config::{Engine, RetrievalProviderConfig};
use ctrlf_providers::retrieval::{self, RetrievalRequest};

use crate::{BoxFuture, EngineResponse, QueryEngine, Retriever, SourceNode, TreeSummarizer};

pub const EMPTY_RESPONSE: &str = "Empty Response";

/// Retrieves scored nodes, then tree-summarizes their text against the query.
pub struct RetrieverQueryEngine {
	retriever: Arc<dyn Retriever>,
	summarizer: TreeSummarizer,
}
impl RetrieverQueryEngine {
	pub fn new(retriever: Arc<dyn Retriever>, summarizer: TreeSummarizer) -> Self {
		Self { retriever, summarizer }
	}

	async fn run(&self, query: &str) -> color_eyre::Result<EngineResponse> {
		let source_nodes = self.retriever.retrieve(query).await?;
		let texts: Vec<String> = source_nodes
			.iter()
			.filter_map(|source| source.node.as_ref())
			.map(|node| node.text.clone())
			.collect();
		let text = if texts.is_empty() {
			EMPTY_RESPONSE.to_string()
		} else {
			self.summarizer.summarize(query, &texts).await?
		};

		Ok(EngineResponse { text, source_nodes })
	}
}
impl QueryEngine for RetrieverQueryEngine {
	fn answer<'a>(&'a self, query: &'a str) -> BoxFuture<'a, color_eyre::Result<EngineResponse>> {
		Box::pin(self.run(query))
	}
}

/// Retriever over the HTTP retrieval endpoint, pinned to one engine's retrieval mode.
pub struct HttpRetriever {
	cfg: RetrievalProviderConfig,
	engine: Engine,
}
impl HttpRetriever {
	pub fn new(cfg: RetrievalProviderConfig, engine: Engine) -> Self {
		Self { cfg, engine }
	}

	async fn run(&self, query: &str) -> color_eyre::Result<Vec<SourceNode>> {
		let request = RetrievalRequest {
			query,
			retrieval_mode: &self.engine.retrieval_mode,
			files_top_k: self.engine.files_top_k,
			rerank_top_n: self.engine.rerank_top_n,
		};
		let nodes = retrieval::retrieve(&self.cfg, &request).await?;

		tracing::debug!(engine = %self.engine.name, nodes = nodes.len(), "Retrieved nodes.");

		Ok(nodes.into_iter().map(SourceNode::from).collect())
	}
}
impl Retriever for HttpRetriever {
	fn retrieve<'a>(
		&'a self,
		query: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SourceNode>>> {
		Box::pin(self.run(query))
	}
}
