use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use crate::{
	EngineResponse, Error, FinalAnswer, NamedEngine, ReasoningModel, Result, Router,
	RoutingDecision, Synthesizer, TreeSummarizer, dispatch, prompts,
	synthesis::DEFAULT_RELEVANCE_THRESHOLD,
};

#[derive(Debug, Clone)]
pub struct WorkflowOptions {
	/// One per engine, in pool order. Defaults to the built-in document and chunk descriptions.
	pub choice_descriptions: Option<Vec<String>>,
	pub router_prompt: Option<String>,
	pub timeout: Duration,
	pub verbose: bool,
	pub relevance_threshold: f64,
	pub summary_chunk_chars: usize,
}
impl WorkflowOptions {
	pub fn from_config(cfg: &ctrlf_config::Workflow) -> Self {
		Self {
			choice_descriptions: cfg.choice_descriptions.clone(),
			router_prompt: cfg.router_prompt.clone(),
			timeout: Duration::from_secs(cfg.timeout_secs),
			verbose: cfg.verbose,
			relevance_threshold: cfg.relevance_threshold,
			summary_chunk_chars: cfg.summary_chunk_chars,
		}
	}
}
impl Default for WorkflowOptions {
	fn default() -> Self {
		Self {
			choice_descriptions: None,
			router_prompt: None,
			timeout: Duration::from_secs(60),
			verbose: false,
			relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
			summary_chunk_chars: 12_000,
		}
	}
}

#[derive(Debug, Clone)]
pub struct StartEvent {
	pub query_str: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChooseQueryEngineEvent {
	pub answers: RoutingDecision,
	pub query_str: String,
}

#[derive(Debug, Clone)]
pub struct SynthesizeAnswersEvent {
	pub responses: Vec<EngineResponse>,
	pub query_str: String,
}

#[derive(Debug, Clone)]
pub struct StopEvent {
	pub result: FinalAnswer,
}

/// START -> ROUTED -> DISPATCHED -> STOP, each state carrying the event that entered it.
#[derive(Debug)]
enum Stage {
	Start(StartEvent),
	Routed(ChooseQueryEngineEvent),
	Dispatched(SynthesizeAnswersEvent),
	Stop(StopEvent),
}

pub struct RouterQueryWorkflow {
	engines: Vec<NamedEngine>,
	router: Router,
	synthesizer: Synthesizer,
	timeout: Duration,
	verbose: bool,
}
impl RouterQueryWorkflow {
	pub fn new(
		engines: Vec<NamedEngine>,
		model: Arc<dyn ReasoningModel>,
		options: WorkflowOptions,
	) -> Result<Self> {
		let WorkflowOptions {
			choice_descriptions,
			router_prompt,
			timeout,
			verbose,
			relevance_threshold,
			summary_chunk_chars,
		} = options;

		if engines.is_empty() {
			return Err(Error::InvalidConfig {
				message: "The engine pool must not be empty.".to_string(),
			});
		}

		let descriptions = choice_descriptions.unwrap_or_else(prompts::default_choice_descriptions);

		if descriptions.len() != engines.len() {
			return Err(Error::InvalidConfig {
				message: format!(
					"{} choice descriptions for {} engines.",
					descriptions.len(),
					engines.len()
				),
			});
		}
		if timeout.is_zero() {
			return Err(Error::InvalidConfig {
				message: "The workflow timeout must be greater than zero.".to_string(),
			});
		}

		let prompt = router_prompt.unwrap_or_else(|| prompts::DEFAULT_ROUTER_PROMPT.to_string());
		let router = Router::new(model.clone(), prompt, descriptions);
		let summarizer = TreeSummarizer::new(model, summary_chunk_chars);
		let synthesizer = Synthesizer::new(summarizer, relevance_threshold, verbose);

		Ok(Self { engines, router, synthesizer, timeout, verbose })
	}

	pub fn engines(&self) -> &[NamedEngine] {
		&self.engines
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Runs one query to completion or fails as a whole; nothing partial is returned.
	pub async fn run(&self, query_str: &str) -> Result<FinalAnswer> {
		let run_id = Uuid::new_v4();
		let start = StartEvent { query_str: Some(query_str.to_string()) };

		match tokio::time::timeout(self.timeout, self.drive(run_id, start)).await {
			Ok(result) => {
				if let Err(err) = &result {
					tracing::warn!(
						%run_id,
						stage = err.stage(),
						error = %err,
						"Workflow run failed."
					);
				}

				result
			},
			Err(_) => {
				tracing::warn!(
					%run_id,
					timeout_secs = self.timeout.as_secs_f64(),
					"Workflow run timed out."
				);

				Err(Error::WorkflowTimeout { timeout: self.timeout })
			},
		}
	}

	async fn drive(&self, run_id: Uuid, start: StartEvent) -> Result<FinalAnswer> {
		let mut stage = Stage::Start(start);

		loop {
			stage = match stage {
				Stage::Start(ev) => Stage::Routed(self.choose_query_engine(run_id, ev).await?),
				Stage::Routed(ev) => Stage::Dispatched(self.query_each_engine(run_id, ev).await?),
				Stage::Dispatched(ev) => Stage::Stop(self.synthesize_response(run_id, ev).await?),
				Stage::Stop(StopEvent { result }) => return Ok(result),
			};
		}
	}

	async fn choose_query_engine(
		&self,
		run_id: Uuid,
		ev: StartEvent,
	) -> Result<ChooseQueryEngineEvent> {
		let Some(query_str) = ev.query_str.filter(|query| !query.trim().is_empty()) else {
			return Err(Error::Routing { message: "'query_str' is required.".to_string() });
		};
		let answers = self.router.route(&query_str).await?;

		for answer in &answers.answers {
			let engine = self.engines[answer.choice - 1].name.as_str();

			if self.verbose {
				tracing::info!(
					%run_id,
					choice = answer.choice,
					engine,
					reason = %answer.reason,
					"Selected choice."
				);
			} else {
				tracing::debug!(
					%run_id,
					choice = answer.choice,
					engine,
					reason = %answer.reason,
					"Selected choice."
				);
			}
		}

		Ok(ChooseQueryEngineEvent { answers, query_str })
	}

	async fn query_each_engine(
		&self,
		run_id: Uuid,
		ev: ChooseQueryEngineEvent,
	) -> Result<SynthesizeAnswersEvent> {
		let ChooseQueryEngineEvent { answers, query_str } = ev;
		let responses = dispatch::dispatch(&answers, &query_str, &self.engines).await?;

		if self.verbose {
			tracing::info!(%run_id, responses = responses.len(), "Engines answered.");
		} else {
			tracing::debug!(%run_id, responses = responses.len(), "Engines answered.");
		}

		Ok(SynthesizeAnswersEvent { responses, query_str })
	}

	async fn synthesize_response(
		&self,
		run_id: Uuid,
		ev: SynthesizeAnswersEvent,
	) -> Result<StopEvent> {
		let result = self.synthesizer.synthesize(&ev.query_str, &ev.responses).await?;

		if self.verbose {
			tracing::info!(
				%run_id,
				documents = result.documents.len(),
				experts = result.experts.len(),
				"Synthesized answer."
			);
		}

		Ok(StopEvent { result })
	}
}
