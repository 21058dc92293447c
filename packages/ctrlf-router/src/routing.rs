use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, ReasoningModel, Result, prompts};

pub const ROUTING_SCHEMA_NAME: &str = "routing_decision";

/// One selected engine. `choice` is 1-based into the description list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingAnswer {
	pub choice: usize,
	pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingDecision {
	pub answers: Vec<RoutingAnswer>,
}
impl RoutingDecision {
	/// Rejects an empty decision and any choice outside `1..=num_choices`.
	pub fn validate(&self, num_choices: usize) -> Result<()> {
		if self.answers.is_empty() {
			return Err(Error::routing("Routing decision selected no engine."));
		}

		for answer in &self.answers {
			if answer.choice == 0 || answer.choice > num_choices {
				return Err(Error::routing(format!(
					"Choice {} is outside 1..={num_choices}.",
					answer.choice
				)));
			}
		}

		Ok(())
	}
}

pub struct Router {
	model: Arc<dyn ReasoningModel>,
	prompt_template: String,
	descriptions: Vec<String>,
}
impl Router {
	pub fn new(
		model: Arc<dyn ReasoningModel>,
		prompt_template: String,
		descriptions: Vec<String>,
	) -> Self {
		Self { model, prompt_template, descriptions }
	}

	pub async fn route(&self, query: &str) -> Result<RoutingDecision> {
		if query.trim().is_empty() {
			return Err(Error::routing("'query_str' is required."));
		}

		let prompt = self.prompt(query);
		let schema = routing_schema();
		let raw = self
			.model
			.structured_predict(&prompt, ROUTING_SCHEMA_NAME, &schema)
			.await
			.map_err(|err| {
				Error::routing(format!("Model call failed: {}", crate::error::describe(&err)))
			})?;

		decode_decision(raw, self.descriptions.len())
	}

	pub(crate) fn prompt(&self, query: &str) -> String {
		let count = self.descriptions.len().to_string();
		let context_list = prompts::choice_list(&self.descriptions);

		prompts::render(
			&self.prompt_template,
			&[
				("num_choices", count.as_str()),
				("max_outputs", count.as_str()),
				("context_list", context_list.as_str()),
				("query_str", query),
			],
		)
	}
}

/// JSON schema handed to the model's structured-output mode.
pub fn routing_schema() -> Value {
	serde_json::json!({
		"type": "object",
		"properties": {
			"answers": {
				"type": "array",
				"items": {
					"type": "object",
					"properties": {
						"choice": { "type": "integer", "minimum": 1 },
						"reason": { "type": "string" }
					},
					"required": ["choice", "reason"],
					"additionalProperties": false
				}
			}
		},
		"required": ["answers"],
		"additionalProperties": false
	})
}

/// Strict decode of the model's structured output. Nothing is coerced.
pub fn decode_decision(raw: Value, num_choices: usize) -> Result<RoutingDecision> {
	let decision: RoutingDecision = serde_json::from_value(raw).map_err(|err| {
		Error::routing(format!("Model output does not match the routing shape: {err}"))
	})?;

	decision.validate(num_choices)?;

	Ok(decision)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_multi_choice_decision_in_model_order() {
		let raw = serde_json::json!({
			"answers": [
				{ "choice": 2, "reason": "needs a figure" },
				{ "choice": 1, "reason": "needs the deck" }
			]
		});
		let decision = decode_decision(raw, 2).expect("decode failed");

		assert_eq!(decision.answers.iter().map(|a| a.choice).collect::<Vec<_>>(), vec![2, 1]);
	}

	#[test]
	fn rejects_zero_and_overflowing_choices() {
		for choice in [0, 3] {
			let raw = serde_json::json!({ "answers": [{ "choice": choice, "reason": "r" }] });
			let err = decode_decision(raw, 2).expect_err("expected out-of-range failure");

			assert!(matches!(err, Error::Routing { .. }), "unexpected error: {err:?}");
		}
	}

	#[test]
	fn rejects_structural_mismatches() {
		let cases = [
			serde_json::json!({ "answers": [{ "choice": "1", "reason": "r" }] }),
			serde_json::json!({ "answers": [{ "choice": 1.5, "reason": "r" }] }),
			serde_json::json!({ "answers": [{ "choice": -1, "reason": "r" }] }),
			serde_json::json!({ "answers": [{ "choice": 1 }] }),
			serde_json::json!({ "answers": [{ "choice": 1, "reason": "r", "score": 0.9 }] }),
			serde_json::json!({ "choices": [1] }),
			serde_json::json!({ "answers": [] }),
		];

		for raw in cases {
			assert!(decode_decision(raw.clone(), 2).is_err(), "accepted malformed output: {raw}");
		}
	}

	#[test]
	fn schema_requires_choice_and_reason() {
		let schema = routing_schema();

		assert_eq!(
			schema["properties"]["answers"]["items"]["required"],
			serde_json::json!(["choice", "reason"])
		);
	}
}
