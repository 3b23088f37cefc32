//! Grammar and style checking backends
//!
//! A checker is built once per process and shared behind
//! `Arc<dyn GrammarChecker>`. Each call is independent.

pub mod languagetool;
pub mod rules;

use async_trait::async_trait;
use shared_types::GrammarReport;
use thiserror::Error;

pub use languagetool::LanguageToolChecker;
pub use rules::RuleBasedChecker;

#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("Grammar service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Grammar service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid grammar service response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait GrammarChecker: Send + Sync {
    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;

    async fn check(&self, text: &str) -> Result<GrammarReport, GrammarError>;
}

/// Checker used when grammar analysis is switched off
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledChecker;

#[async_trait]
impl GrammarChecker for DisabledChecker {
    fn name(&self) -> &'static str {
        "off"
    }

    async fn check(&self, _text: &str) -> Result<GrammarReport, GrammarError> {
        Ok(GrammarReport::empty())
    }
}
