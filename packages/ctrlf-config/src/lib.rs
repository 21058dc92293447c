mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Engine, LlmProviderConfig, Providers, RETRIEVAL_MODE_CHUNKS,
	RETRIEVAL_MODE_FILES_VIA_CONTENT, RetrievalProviderConfig, Service, Workflow,
};

use std::{collections::HashSet, fs, path::Path};

/// Number of engines the built-in choice descriptions cover.
pub const BUILTIN_DESCRIPTION_COUNT: usize = 2;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.workflow.timeout_secs == 0 {
		return Err(Error::Validation {
			message: "workflow.timeout_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.workflow.summary_chunk_chars == 0 {
		return Err(Error::Validation {
			message: "workflow.summary_chunk_chars must be greater than zero.".to_string(),
		});
	}
	if !cfg.workflow.relevance_threshold.is_finite() {
		return Err(Error::Validation {
			message: "workflow.relevance_threshold must be a finite number.".to_string(),
		});
	}
	if cfg.engines.is_empty() {
		return Err(Error::Validation { message: "engines must be non-empty.".to_string() });
	}

	let mut names = HashSet::new();

	for engine in &cfg.engines {
		if engine.name.trim().is_empty() {
			return Err(Error::Validation {
				message: "engines.name must be non-empty.".to_string(),
			});
		}
		if !names.insert(engine.name.as_str()) {
			return Err(Error::Validation {
				message: format!("engines.name {:?} is declared more than once.", engine.name),
			});
		}
		if !matches!(
			engine.retrieval_mode.as_str(),
			RETRIEVAL_MODE_FILES_VIA_CONTENT | RETRIEVAL_MODE_CHUNKS
		) {
			return Err(Error::Validation {
				message: format!(
					"engines.retrieval_mode must be one of {RETRIEVAL_MODE_FILES_VIA_CONTENT} or {RETRIEVAL_MODE_CHUNKS}."
				),
			});
		}

		for (label, value) in
			[("files_top_k", engine.files_top_k), ("rerank_top_n", engine.rerank_top_n)]
		{
			if value == Some(0) {
				return Err(Error::Validation {
					message: format!("engines.{label} must be greater than zero."),
				});
			}
		}
	}

	match cfg.workflow.choice_descriptions.as_ref() {
		Some(descriptions) if descriptions.len() != cfg.engines.len() => {
			return Err(Error::Validation {
				message: "workflow.choice_descriptions must have one entry per engine.".to_string(),
			});
		},
		None if cfg.engines.len() != BUILTIN_DESCRIPTION_COUNT => {
			return Err(Error::Validation {
				message: format!(
					"workflow.choice_descriptions is required unless exactly {BUILTIN_DESCRIPTION_COUNT} engines are configured."
				),
			});
		},
		_ => {},
	}

	if let Some(template) = cfg.workflow.router_prompt.as_deref() {
		for placeholder in ["{context_list}", "{query_str}"] {
			if !template.contains(placeholder) {
				return Err(Error::Validation {
					message: format!("workflow.router_prompt must contain {placeholder}."),
				});
			}
		}
	}

	for (label, key) in
		[("llm", &cfg.providers.llm.api_key), ("retrieval", &cfg.providers.retrieval.api_key)]
	{
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.workflow.router_prompt.as_deref().map(|p| p.trim().is_empty()).unwrap_or(false) {
		cfg.workflow.router_prompt = None;
	}
	if cfg.workflow.choice_descriptions.as_ref().map(|d| d.is_empty()).unwrap_or(false) {
		cfg.workflow.choice_descriptions = None;
	}
}
