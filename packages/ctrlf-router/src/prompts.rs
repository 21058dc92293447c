//! Built-in prompt templates and the placeholder renderer they share.

pub const DEFAULT_ROUTER_PROMPT: &str = "\
Some choices are given below, as a numbered list (1 to {num_choices}). \
Each item describes one way of searching the company drive.
---------------------
{context_list}
---------------------
Using only the choices above and not prior knowledge, return the choices that are most \
relevant to the question below. Return at most {max_outputs} choices and only select what \
is needed. Give a short reason for each choice.
Question: '{query_str}'
";

pub const DOC_METADATA_EXTRA: &str = "\
The drive holds reports, slide decks and documents. Every indexed page carries its file \
name, a share link, its page number and the people who last worked on the file.";

pub const DOC_ENGINE_DESCRIPTION: &str = "\
Useful for questions that need whole documents: summaries of a file, comparisons between \
files, or questions whose answer is spread across many pages of the same document. \
{doc_metadata_extra}";

pub const CHUNK_ENGINE_DESCRIPTION: &str = "\
Useful for questions about a specific fact, figure, quote or passage that a few pages can \
answer on their own. {doc_metadata_extra}";

pub const SUMMARY_PROMPT: &str = "\
Context information from multiple sources is below.
---------------------
{context_str}
---------------------
Given the information from multiple sources and not prior knowledge, answer the query.
Query: {query_str}
Answer: ";

/// The two descriptions used when none are configured: whole-document retrieval first,
/// chunk retrieval second.
pub fn default_choice_descriptions() -> Vec<String> {
	[DOC_ENGINE_DESCRIPTION, CHUNK_ENGINE_DESCRIPTION]
		.into_iter()
		.map(|template| render(template, &[("doc_metadata_extra", DOC_METADATA_EXTRA)]))
		.collect()
}

/// Enumerates choices from 1, one blank line between items.
pub fn choice_list(descriptions: &[String]) -> String {
	descriptions
		.iter()
		.enumerate()
		.map(|(idx, description)| format!("{}. {description}", idx + 1))
		.collect::<Vec<_>>()
		.join("\n\n")
}

/// Substitutes `{name}` placeholders in one pass. Substituted text is never re-scanned and
/// unknown placeholders are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
	let mut out = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(open) = rest.find('{') {
		out.push_str(&rest[..open]);

		let after = &rest[open + 1..];
		let value = after.find('}').and_then(|close| {
			let name = &after[..close];

			vars.iter().find(|(key, _)| *key == name).map(|(_, value)| (close, *value))
		});

		match value {
			Some((close, value)) => {
				out.push_str(value);
				rest = &after[close + 1..];
			},
			None => {
				out.push('{');
				rest = after;
			},
		}
	}

	out.push_str(rest);

	out
}
