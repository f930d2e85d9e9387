use thiserror::Error;

/// Problems with a request, reported before any pipeline stage runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("No message provided")]
    MissingMessage,

    #[error("No logs provided")]
    MissingLogs,

    #[error("No model selector provided")]
    MissingModelSelector,

    #[error("Unknown model selector: {0}")]
    UnknownModel(String),

    #[error("Malformed log data: {0}")]
    MalformedLogData(String),
}

/// Failures that abort a running pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Backend(#[from] logtriage_agent::AgentError),

    #[error("Evidence retrieval failed: {0}")]
    Evidence(String),
}
