pub mod report;
pub mod types;

pub use report::{AiStatus, AssessmentReport, GrammarIssue, GrammarReport};
pub use types::{
    DocumentFormat, DocumentId, DocumentRecord, DocumentStatus, UnsupportedFormat,
    ALLOWED_EXTENSIONS,
};
