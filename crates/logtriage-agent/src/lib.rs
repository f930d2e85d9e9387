mod agent;
mod decision;
mod error;
mod filter;
mod issue;
mod prompts;

pub use agent::{DecisionAgent, DetectedIssues, DEFAULT_BASE_PROMPT};
pub use decision::DecisionParse;
pub use error::AgentError;
pub use filter::{strip_code_fences, EmptyObject, Filter, FilterGroup, GeneratedFilterGroup};
pub use issue::IssueAssessment;
pub use prompts::AgentPrompts;
