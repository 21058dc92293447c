use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{Document, EngineResponse, Error, Expert, FinalAnswer, Result, TreeSummarizer};

pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.2;

const UNTITLED: &str = "Untitled";

#[derive(Debug, Deserialize)]
struct ExpertEntry {
	name: String,
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	image: Option<String>,
}

/// Documents and experts backed by accepted evidence, in walk order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence {
	pub documents: Vec<Document>,
	pub experts: Vec<Expert>,
}

#[derive(Clone)]
pub struct Synthesizer {
	summarizer: TreeSummarizer,
	relevance_threshold: f64,
	verbose: bool,
}
impl Synthesizer {
	pub fn new(summarizer: TreeSummarizer, relevance_threshold: f64, verbose: bool) -> Self {
		Self { summarizer, relevance_threshold, verbose }
	}

	pub async fn synthesize(
		&self,
		query: &str,
		responses: &[EngineResponse],
	) -> Result<FinalAnswer> {
		let Evidence { documents, experts } =
			collect_evidence(responses, self.relevance_threshold, self.verbose)?;
		let response_strs: Vec<String> = responses.iter().map(ToString::to_string).collect();
		let text = self.summarizer.summarize(query, &response_strs).await?;

		Ok(FinalAnswer { text, documents, experts })
	}
}

/// Walks every evidence unit and keeps those scoring strictly below `threshold`.
///
/// Units without a score, a node or metadata contribute nothing. Documents are not
/// deduplicated. Experts are keyed by name and keep first-seen order; each expert lists every
/// distinct title it is linked to.
pub fn collect_evidence(
	responses: &[EngineResponse],
	threshold: f64,
	verbose: bool,
) -> Result<Evidence> {
	let mut evidence = Evidence::default();
	let mut expert_index: HashMap<String, usize> = HashMap::new();

	for source in responses.iter().flat_map(|response| &response.source_nodes) {
		let Some(score) = source.score else {
			continue;
		};

		if verbose {
			tracing::info!(score, "Evidence score.");
		} else {
			tracing::trace!(score, "Evidence score.");
		}

		let accepted = score < threshold;

		if !accepted {
			continue;
		}

		let Some(metadata) = source.node.as_ref().and_then(|node| node.metadata.as_ref()) else {
			continue;
		};
		let title = optional_str(metadata, "file_name")?.unwrap_or(UNTITLED).to_string();
		let url = optional_str(metadata, "url")?.unwrap_or_default().to_string();
		let page = match metadata.get("page_number") {
			None | Some(Value::Null) => Value::String(String::new()),
			Some(page) => page.clone(),
		};

		for entry in expert_entries(metadata)? {
			match expert_index.get(&entry.name) {
				Some(&idx) => {
					let documents = &mut evidence.experts[idx].documents;

					if !documents.contains(&title) {
						documents.push(title.clone());
					}
				},
				None => {
					expert_index.insert(entry.name.clone(), evidence.experts.len());
					evidence.experts.push(Expert {
						name: entry.name,
						email: entry.email.unwrap_or_default(),
						image: entry.image.unwrap_or_default(),
						documents: vec![title.clone()],
					});
				},
			}
		}

		evidence.documents.push(Document { title, url, page });
	}

	Ok(evidence)
}

fn optional_str<'a>(metadata: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
	match metadata.get(key) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(value)) => Ok(Some(value.as_str())),
		Some(other) => Err(Error::synthesis(format!(
			"Evidence metadata {key} must be a string, got {other}."
		))),
	}
}

fn expert_entries(metadata: &Map<String, Value>) -> Result<Vec<ExpertEntry>> {
	match metadata.get("experts") {
		None | Some(Value::Null) => Ok(Vec::new()),
		Some(raw) => Vec::<ExpertEntry>::deserialize(raw).map_err(|err| {
			Error::synthesis(format!("Evidence metadata experts is malformed: {err}"))
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Node, SourceNode};

	fn unit(score: Option<f64>, metadata: Value) -> SourceNode {
		let metadata = match metadata {
			Value::Object(map) => Some(map),
			_ => None,
		};

		SourceNode { score, node: Some(Node { text: String::new(), metadata }) }
	}

	fn response(units: Vec<SourceNode>) -> EngineResponse {
		EngineResponse { text: "answer".to_string(), source_nodes: units }
	}

	#[test]
	fn threshold_is_strict_and_lower_is_better() {
		let responses = [response(vec![
			unit(Some(0.19), serde_json::json!({ "file_name": "keep.pdf" })),
			unit(Some(0.2), serde_json::json!({ "file_name": "edge.pdf" })),
			unit(Some(0.9), serde_json::json!({ "file_name": "far.pdf" })),
		])];
		let evidence = collect_evidence(&responses, DEFAULT_RELEVANCE_THRESHOLD, false)
			.expect("collect failed");

		assert_eq!(
			evidence.documents.iter().map(|d| d.title.as_str()).collect::<Vec<_>>(),
			vec!["keep.pdf"]
		);
	}

	#[test]
	fn missing_fields_take_defaults() {
		let responses = [response(vec![unit(Some(0.05), serde_json::json!({}))])];
		let evidence = collect_evidence(&responses, DEFAULT_RELEVANCE_THRESHOLD, false)
			.expect("collect failed");

		assert_eq!(
			evidence.documents,
			vec![Document {
				title: "Untitled".to_string(),
				url: String::new(),
				page: Value::String(String::new()),
			}]
		);
		assert!(evidence.experts.is_empty());
	}

	#[test]
	fn skips_units_without_score_node_or_metadata() {
		let responses = [response(vec![
			unit(None, serde_json::json!({ "file_name": "no-score.pdf" })),
			SourceNode { score: Some(0.01), node: None },
			SourceNode {
				score: Some(0.01),
				node: Some(Node { text: "bare".to_string(), metadata: None }),
			},
		])];
		let evidence = collect_evidence(&responses, DEFAULT_RELEVANCE_THRESHOLD, false)
			.expect("collect failed");

		assert_eq!(evidence, Evidence::default());
	}

	#[test]
	fn documents_repeat_but_expert_titles_do_not() {
		let meta = serde_json::json!({
			"file_name": "A.pdf",
			"page_number": 1,
			"experts": [{ "name": "Ana", "email": "ana@corp.test" }]
		});
		let responses = [response(vec![unit(Some(0.1), meta.clone()), unit(Some(0.1), meta)])];
		let evidence = collect_evidence(&responses, DEFAULT_RELEVANCE_THRESHOLD, false)
			.expect("collect failed");

		assert_eq!(evidence.documents.len(), 2);
		assert_eq!(evidence.experts.len(), 1);
		assert_eq!(evidence.experts[0].documents, vec!["A.pdf".to_string()]);
		assert_eq!(evidence.experts[0].email, "ana@corp.test");
	}

	#[test]
	fn first_seen_expert_record_wins() {
		let responses = [response(vec![
			unit(
				Some(0.1),
				serde_json::json!({
					"file_name": "A.pdf",
					"experts": [{ "name": "Ana", "image": "a.png" }, { "name": "Bo" }]
				}),
			),
			unit(
				Some(0.1),
				serde_json::json!({
					"file_name": "B.pdf",
					"experts": [{ "name": "Ana", "image": "other.png", "email": null }]
				}),
			),
		])];
		let evidence = collect_evidence(&responses, DEFAULT_RELEVANCE_THRESHOLD, false)
			.expect("collect failed");
		let names: Vec<_> = evidence.experts.iter().map(|e| e.name.as_str()).collect();

		assert_eq!(names, vec!["Ana", "Bo"]);
		assert_eq!(evidence.experts[0].image, "a.png");
		assert_eq!(evidence.experts[0].documents, vec!["A.pdf".to_string(), "B.pdf".to_string()]);
		assert_eq!(evidence.experts[1].documents, vec!["A.pdf".to_string()]);
	}

	#[test]
	fn malformed_metadata_is_a_synthesis_error() {
		let cases = [
			serde_json::json!({ "file_name": 7 }),
			serde_json::json!({ "experts": "Ana" }),
			serde_json::json!({ "experts": [{ "email": "ana@corp.test" }] }),
		];

		for meta in cases {
			let responses = [response(vec![unit(Some(0.1), meta.clone())])];
			let err = collect_evidence(&responses, DEFAULT_RELEVANCE_THRESHOLD, false)
				.expect_err("expected malformed metadata failure");

			assert!(
				matches!(err, Error::Synthesis { .. }),
				"unexpected error for {meta}: {err:?}"
			);
		}
	}

	#[test]
	fn rejected_units_are_not_inspected() {
		let responses =
			[response(vec![unit(Some(0.5), serde_json::json!({ "experts": "malformed" }))])];

		assert!(collect_evidence(&responses, DEFAULT_RELEVANCE_THRESHOLD, false).is_ok());
	}
}
