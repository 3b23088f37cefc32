pub mod assessment;
pub mod grammar;
pub mod llm;
pub mod patterns;

use std::sync::Arc;

use shared_types::AssessmentReport;
use tracing::debug;

pub use assessment::{truncate_text, AiOutcome, AssessmentGenerator};
pub use grammar::{
    DisabledChecker, GrammarChecker, GrammarError, LanguageToolChecker, RuleBasedChecker,
};
pub use llm::{GeminiClient, GenerationRequest, ProviderError, TextGenerator};

/// ComplianceEngine entry point
///
/// Combines a grammar backend with the language-model assessment generator.
#[derive(Clone)]
pub struct ComplianceEngine {
    grammar: Arc<dyn GrammarChecker>,
    ai: AssessmentGenerator,
}

impl ComplianceEngine {
    pub fn new(grammar: Arc<dyn GrammarChecker>, ai: AssessmentGenerator) -> Self {
        Self { grammar, ai }
    }

    pub fn grammar_backend(&self) -> &'static str {
        self.grammar.name()
    }

    pub fn ai_configured(&self) -> bool {
        self.ai.is_configured()
    }

    /// Produce a combined grammar and AI report for extracted text
    ///
    /// Blank text short-circuits to the extraction-failure report without
    /// touching either backend. Grammar failures propagate; provider
    /// failures are folded into the report.
    pub async fn evaluate(
        &self,
        text: &str,
        guidelines: Option<&str>,
    ) -> Result<AssessmentReport, GrammarError> {
        let truncated = truncate_text(text);
        if truncated.trim().is_empty() {
            return Ok(AssessmentReport::extraction_failure());
        }

        let outcome = self.ai.assess(truncated, guidelines).await;
        let grammar = self.grammar.check(truncated).await?;
        debug!(
            grammar_issues = grammar.issue_count,
            ai_status = ?outcome.status(),
            "Evaluation complete"
        );

        let status = outcome.status();
        Ok(AssessmentReport::combined(grammar, outcome.into_text(), status))
    }

    /// Ask the provider to rewrite text per a free-text instruction
    pub async fn rewrite(&self, text: &str, instruction: &str) -> AiOutcome {
        self.ai.rewrite(text, instruction).await
    }
}
