use std::sync::Arc;

use ctrlf_config::Config;

use crate::{
	ChatModel, FinalAnswer, HttpRetriever, NamedEngine, ReasoningModel, Result,
	RetrieverQueryEngine, RouterQueryWorkflow, TreeSummarizer, WorkflowOptions,
};

/// Caller-owned handle on a built workflow and its engine pool.
///
/// Build it once, clone it into whatever serves queries, and drop the last clone to tear it
/// down. Clones share the same read-only workflow.
#[derive(Clone)]
pub struct Session {
	workflow: Arc<RouterQueryWorkflow>,
}
impl Session {
	pub fn new(workflow: RouterQueryWorkflow) -> Self {
		Self { workflow: Arc::new(workflow) }
	}

	/// Wires the chat model and one retriever-backed engine per configured engine.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let model: Arc<dyn ReasoningModel> = Arc::new(ChatModel::new(cfg.providers.llm.clone()));
		let summarizer = TreeSummarizer::new(model.clone(), cfg.workflow.summary_chunk_chars);
		let engines = cfg
			.engines
			.iter()
			.map(|engine| {
				let retriever = HttpRetriever::new(cfg.providers.retrieval.clone(), engine.clone());
				let query_engine =
					RetrieverQueryEngine::new(Arc::new(retriever), summarizer.clone());

				NamedEngine::new(engine.name.clone(), Arc::new(query_engine))
			})
			.collect();
		let workflow =
			RouterQueryWorkflow::new(engines, model, WorkflowOptions::from_config(&cfg.workflow))?;

		tracing::info!(
			engines = cfg.engines.len(),
			model = %cfg.providers.llm.model,
			"Session ready."
		);

		Ok(Self::new(workflow))
	}

	pub fn workflow(&self) -> &RouterQueryWorkflow {
		&self.workflow
	}

	pub async fn query(&self, query_str: &str) -> Result<FinalAnswer> {
		self.workflow.run(query_str).await
	}
}
