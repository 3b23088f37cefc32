//! Assessment and grammar report types returned to API clients

use serde::{Deserialize, Serialize};

pub const COMBINED_SUMMARY: &str = "Combined grammar and AI compliance report";
pub const EXTRACTION_FAILURE_SUMMARY: &str = "Extraction failure";
pub const EXTRACTION_FAILURE_REPORT: &str = "Error: Document text could not be extracted.";

/// A single grammar or style finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarIssue {
    /// Human-readable explanation
    pub message: String,
    /// Suggested replacements, possibly empty
    pub replacements: Vec<String>,
    /// Short snippet around the offending span
    pub context: String,
    /// Character offset of the span in the checked text
    pub offset: usize,
    /// Character length of the span
    pub length: usize,
    pub rule_id: String,
}

/// Result of a grammar check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarReport {
    pub issue_count: usize,
    pub issues: Vec<GrammarIssue>,
}

impl GrammarReport {
    pub fn from_issues(issues: Vec<GrammarIssue>) -> Self {
        Self {
            issue_count: issues.len(),
            issues,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// How the language-model portion of a report was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiStatus {
    /// Real provider output
    Ok,
    /// No API credential configured
    NotConfigured,
    /// Provider answered with no text (empty or safety-blocked)
    EmptyResponse,
    /// Provider or transport failure
    ProviderError,
    /// Call exceeded the configured time budget
    Timeout,
    /// Provider was not called (nothing to assess)
    Skipped,
}

/// Combined grammar + AI compliance report stored on a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub grammar: GrammarReport,
    /// Provider output, or a placeholder describing why there is none
    pub ai_report: String,
    pub ai_status: AiStatus,
    pub summary: String,
}

impl AssessmentReport {
    pub fn combined(grammar: GrammarReport, ai_report: String, ai_status: AiStatus) -> Self {
        Self {
            grammar,
            ai_report,
            ai_status,
            summary: COMBINED_SUMMARY.to_string(),
        }
    }

    /// Report for a document whose text came back empty
    pub fn extraction_failure() -> Self {
        Self {
            grammar: GrammarReport::empty(),
            ai_report: EXTRACTION_FAILURE_REPORT.to_string(),
            ai_status: AiStatus::Skipped,
            summary: EXTRACTION_FAILURE_SUMMARY.to_string(),
        }
    }

    pub fn is_extraction_failure(&self) -> bool {
        self.summary == EXTRACTION_FAILURE_SUMMARY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn issue(message: &str) -> GrammarIssue {
        GrammarIssue {
            message: message.to_string(),
            replacements: vec![],
            context: String::new(),
            offset: 0,
            length: 0,
            rule_id: "TEST".to_string(),
        }
    }

    #[test]
    fn test_extraction_failure_report() {
        let report = AssessmentReport::extraction_failure();
        assert!(report.is_extraction_failure());
        assert_eq!(report.grammar.issue_count, 0);
        assert_eq!(report.ai_status, AiStatus::Skipped);
    }

    #[test]
    fn test_report_serializes_expected_fields() {
        let report = AssessmentReport::combined(
            GrammarReport::from_issues(vec![issue("Possible typo")]),
            "Looks fine".to_string(),
            AiStatus::Ok,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["grammar"]["issue_count"], 1);
        assert_eq!(json["ai_report"], "Looks fine");
        assert_eq!(json["ai_status"], "ok");
        assert_eq!(json["summary"], COMBINED_SUMMARY);
    }

    proptest! {
        #[test]
        fn issue_count_matches_issue_list(n in 0usize..50) {
            let issues = (0..n).map(|i| issue(&format!("issue {}", i))).collect();
            let report = GrammarReport::from_issues(issues);
            prop_assert_eq!(report.issue_count, report.issues.len());
        }
    }
}
