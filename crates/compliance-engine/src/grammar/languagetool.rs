//! Client for a LanguageTool HTTP server

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use shared_types::{GrammarIssue, GrammarReport};
use tracing::debug;

use super::{GrammarChecker, GrammarError};

pub const DEFAULT_URL: &str = "http://localhost:8081";
const LANGUAGE: &str = "en-US";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct CheckResponse {
    matches: Vec<LtMatch>,
}

#[derive(Debug, Deserialize)]
struct LtMatch {
    message: String,
    #[serde(default)]
    replacements: Vec<LtReplacement>,
    context: LtContext,
    offset: usize,
    length: usize,
    rule: LtRule,
}

#[derive(Debug, Deserialize)]
struct LtReplacement {
    value: String,
}

#[derive(Debug, Deserialize)]
struct LtContext {
    text: String,
}

#[derive(Debug, Deserialize)]
struct LtRule {
    id: String,
}

impl From<LtMatch> for GrammarIssue {
    fn from(m: LtMatch) -> Self {
        GrammarIssue {
            message: m.message,
            replacements: m.replacements.into_iter().map(|r| r.value).collect(),
            context: m.context.text,
            offset: m.offset,
            length: m.length,
            rule_id: m.rule.id,
        }
    }
}

/// Grammar checker that delegates to `POST {base}/v2/check`
pub struct LanguageToolChecker {
    client: reqwest::Client,
    check_url: String,
}

impl LanguageToolChecker {
    pub fn new(base_url: &str) -> Result<Self, GrammarError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            check_url: check_url(base_url),
        })
    }
}

fn check_url(base_url: &str) -> String {
    format!("{}/v2/check", base_url.trim_end_matches('/'))
}

fn parse_response(body: &str) -> Result<GrammarReport, GrammarError> {
    let response: CheckResponse =
        serde_json::from_str(body).map_err(|e| GrammarError::InvalidResponse(e.to_string()))?;
    let issues = response.matches.into_iter().map(GrammarIssue::from).collect();
    Ok(GrammarReport::from_issues(issues))
}

#[async_trait]
impl GrammarChecker for LanguageToolChecker {
    fn name(&self) -> &'static str {
        "languagetool"
    }

    async fn check(&self, text: &str) -> Result<GrammarReport, GrammarError> {
        let response = self
            .client
            .post(&self.check_url)
            .form(&[("text", text), ("language", LANGUAGE)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GrammarError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let report = parse_response(&body)?;
        debug!(issues = report.issue_count, "LanguageTool check complete");
        Ok(report)
    }
}
