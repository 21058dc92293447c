use std::sync::Arc;

use futures::future;

use crate::{EngineResponse, Error, QueryEngine, Result, RoutingDecision};

/// A pool entry. The name only labels logs and errors.
#[derive(Clone)]
pub struct NamedEngine {
	pub name: String,
	pub engine: Arc<dyn QueryEngine>,
}
impl NamedEngine {
	pub fn new(name: impl Into<String>, engine: Arc<dyn QueryEngine>) -> Self {
		Self { name: name.into(), engine }
	}
}

/// Queries every chosen engine concurrently and returns the responses in decision order.
///
/// Duplicate choices are queried once per occurrence. The first failure drops the calls still
/// in flight and fails the whole dispatch.
pub async fn dispatch(
	decision: &RoutingDecision,
	query: &str,
	pool: &[NamedEngine],
) -> Result<Vec<EngineResponse>> {
	decision.validate(pool.len())?;

	let calls = decision.answers.iter().map(|answer| {
		let slot = &pool[answer.choice - 1];

		async move {
			tracing::debug!(engine = %slot.name, choice = answer.choice, "Querying engine.");

			slot.engine.answer(query).await.map_err(|err| Error::EngineQuery {
				engine: answer.choice,
				name: slot.name.clone(),
				message: crate::error::describe(&err),
			})
		}
	});

	future::try_join_all(calls).await
}
