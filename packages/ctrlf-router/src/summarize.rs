use std::sync::Arc;

use futures::future;

use crate::{Error, ReasoningModel, Result, prompts};

const SEPARATOR: &str = "\n\n";

/// Tree-style reducer: packs texts into prompt-sized groups, summarizes each group against the
/// query, and repeats on the summaries until a single answer remains.
#[derive(Clone)]
pub struct TreeSummarizer {
	model: Arc<dyn ReasoningModel>,
	chunk_chars: usize,
}
impl TreeSummarizer {
	pub fn new(model: Arc<dyn ReasoningModel>, chunk_chars: usize) -> Self {
		Self { model, chunk_chars: chunk_chars.max(1) }
	}

	pub async fn summarize(&self, query: &str, texts: &[String]) -> Result<String> {
		if texts.is_empty() {
			return Err(Error::synthesis("Nothing to summarize."));
		}

		let mut level = split_oversized(texts, self.chunk_chars);

		loop {
			let groups = pack(&level, self.chunk_chars);

			if groups.len() == 1 {
				return self.summarize_group(query, &groups[0]).await;
			}

			tracing::debug!(groups = groups.len(), "Summarizing one tree level.");

			let calls = groups.iter().map(|group| self.summarize_group(query, group));

			level = future::try_join_all(calls).await?;
		}
	}

	async fn summarize_group(&self, query: &str, context: &str) -> Result<String> {
		let prompt = prompts::render(
			prompts::SUMMARY_PROMPT,
			&[("context_str", context), ("query_str", query)],
		);

		self.model.complete(&prompt).await.map_err(|err| {
			Error::synthesis(format!("Summarization call failed: {}", crate::error::describe(&err)))
		})
	}
}

/// Groups consecutive texts while they fit in `budget` characters. Always returns fewer groups
/// than inputs when there are at least two inputs, so every level of the tree shrinks.
fn pack(texts: &[String], budget: usize) -> Vec<String> {
	let separator_chars = SEPARATOR.chars().count();
	let mut groups: Vec<String> = Vec::new();
	let mut current = String::new();
	let mut current_chars = 0;

	for text in texts {
		let text_chars = text.chars().count();

		if !current.is_empty() && current_chars + separator_chars + text_chars > budget {
			groups.push(std::mem::take(&mut current));

			current_chars = 0;
		}
		if !current.is_empty() {
			current.push_str(SEPARATOR);

			current_chars += separator_chars;
		}

		current.push_str(text);

		current_chars += text_chars;
	}

	if !current.is_empty() || groups.is_empty() {
		groups.push(current);
	}
	if texts.len() > 1 && groups.len() >= texts.len() {
		return texts.chunks(2).map(|pair| pair.join(SEPARATOR)).collect();
	}

	groups
}

/// Cuts inputs longer than `budget` characters into consecutive pieces of at most `budget`.
fn split_oversized(texts: &[String], budget: usize) -> Vec<String> {
	let mut out = Vec::with_capacity(texts.len());

	for text in texts {
		if text.chars().count() <= budget {
			out.push(text.clone());

			continue;
		}

		let chars: Vec<char> = text.chars().collect();

		out.extend(chars.chunks(budget).map(|piece| piece.iter().collect::<String>()));
	}

	out
}
