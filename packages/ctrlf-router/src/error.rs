use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Routing failed: {message}")]
	Routing { message: String },
	#[error("Engine {engine} ({name}) query failed: {message}")]
	EngineQuery { engine: usize, name: String, message: String },
	#[error("Synthesis failed: {message}")]
	Synthesis { message: String },
	#[error("Workflow timed out after {}s.", timeout.as_secs_f64())]
	WorkflowTimeout { timeout: Duration },
	#[error("Invalid workflow configuration: {message}")]
	InvalidConfig { message: String },
}
impl Error {
	pub(crate) fn routing(message: impl Into<String>) -> Self {
		Self::Routing { message: message.into() }
	}

	pub(crate) fn synthesis(message: impl Into<String>) -> Self {
		Self::Synthesis { message: message.into() }
	}

	/// Workflow stage the failure belongs to. `None` for construction-time errors.
	pub fn stage(&self) -> Option<&'static str> {
		match self {
			Self::Routing { .. } => Some("choose_query_engine"),
			Self::EngineQuery { .. } => Some("query_each_engine"),
			Self::Synthesis { .. } => Some("synthesize_response"),
			Self::WorkflowTimeout { .. } => Some("workflow"),
			Self::InvalidConfig { .. } => None,
		}
	}
}

/// Flattens a collaborator report and its causes into one line.
pub(crate) fn describe(report: &color_eyre::Report) -> String {
	report.chain().map(|cause| cause.to_string()).collect::<Vec<_>>().join(": ")
}
