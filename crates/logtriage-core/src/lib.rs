//! # logtriage-core
//!
//! The streaming triage pipeline: request admission, evidence gathering and
//! the stage-by-stage orchestrator that turns agent answers into [`Action`]s.

mod action;
mod error;
mod evidence;
mod orchestrator;
mod outcome;
mod request;

pub use action::{Action, StreamEvent, DONE_SENTINEL};
pub use error::{PipelineError, RequestError};
pub use evidence::{Evidence, EvidenceSource, KeywordEvidence};
pub use orchestrator::{StreamOrchestrator, EVENT_BUFFER};
pub use outcome::RunOutcome;
pub use request::{Admitted, TriageRequest};
