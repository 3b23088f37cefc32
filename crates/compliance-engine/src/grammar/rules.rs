//! Built-in regex grammar rules
//!
//! Catches mechanical mistakes only: doubled words, stray whitespace,
//! punctuation spacing, sentence capitalization, a/an agreement and a
//! short list of frequent misspellings.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{GrammarIssue, GrammarReport};

use super::{GrammarChecker, GrammarError};
use crate::patterns::{
    char_offset, context_snippet, match_capitalization, starts_with_any, COMMON_MISSPELLINGS,
    CONSONANT_SOUND_PREFIXES, SILENT_H_PREFIXES,
};

pub const REPEATED_WORD: &str = "REPEATED_WORD";
pub const WHITESPACE_REPETITION: &str = "WHITESPACE_REPETITION";
pub const SPACE_BEFORE_PUNCTUATION: &str = "SPACE_BEFORE_PUNCTUATION";
pub const MISSING_SPACE_AFTER_PUNCTUATION: &str = "MISSING_SPACE_AFTER_PUNCTUATION";
pub const LOWERCASE_SENTENCE_START: &str = "LOWERCASE_SENTENCE_START";
pub const LOWERCASE_I: &str = "LOWERCASE_I";
pub const A_AN_AGREEMENT: &str = "A_AN_AGREEMENT";
pub const MISSPELLING: &str = "MISSPELLING";

/// Words that end in a period without ending a sentence
const ABBREVIATIONS: &[&str] = &["etc", "vs", "approx", "incl", "dept", "no", "fig"];

lazy_static! {
    static ref WORD_PATTERN: Regex = Regex::new(r"[A-Za-z']+").unwrap();

    static ref MULTI_SPACE_PATTERN: Regex = Regex::new(r" {2,}").unwrap();

    static ref SPACE_BEFORE_PUNCT_PATTERN: Regex = Regex::new(r" +([,;:!?.])").unwrap();

    static ref MISSING_SPACE_SENTENCE_PATTERN: Regex =
        Regex::new(r"[a-z]{2}([.!?])[A-Z][a-z]").unwrap();

    static ref MISSING_SPACE_COMMA_PATTERN: Regex = Regex::new(r"[A-Za-z](,)[A-Za-z]").unwrap();

    static ref SENTENCE_START_PATTERN: Regex = Regex::new(r"[.!?]\s+([a-z]+)").unwrap();

    static ref LOWERCASE_I_PATTERN: Regex =
        Regex::new(r#"(?:^|[\s("])(i)(?:'m|'ve|'ll|'d)?(?:[\s,;:!?)"]|$)"#).unwrap();

    static ref ARTICLE_PATTERN: Regex = Regex::new(r"\b([Aa]n?)\s+([a-z]+)").unwrap();

    static ref MISSPELLING_PATTERN: Regex = {
        let words: Vec<&str> = COMMON_MISSPELLINGS.iter().map(|(wrong, _)| *wrong).collect();
        Regex::new(&format!(r"(?i)\b({})\b", words.join("|"))).unwrap()
    };
}

/// Grammar checker backed by the built-in rule set
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedChecker;

impl RuleBasedChecker {
    pub fn new() -> Self {
        Self
    }

    /// Run every rule and return issues ordered by position
    pub fn check_text(&self, text: &str) -> Vec<GrammarIssue> {
        let mut issues = Vec::new();
        issues.extend(check_repeated_words(text));
        issues.extend(check_whitespace(text));
        issues.extend(check_space_before_punctuation(text));
        issues.extend(check_missing_space_after_punctuation(text));
        issues.extend(check_sentence_start(text));
        issues.extend(check_lowercase_i(text));
        issues.extend(check_articles(text));
        issues.extend(check_misspellings(text));

        issues.sort_by(|a, b| a.offset.cmp(&b.offset).then_with(|| a.rule_id.cmp(&b.rule_id)));
        issues
    }
}

#[async_trait]
impl GrammarChecker for RuleBasedChecker {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn check(&self, text: &str) -> Result<GrammarReport, GrammarError> {
        Ok(GrammarReport::from_issues(self.check_text(text)))
    }
}

/// Build an issue from a byte span of `text`
fn issue(
    text: &str,
    start: usize,
    end: usize,
    rule_id: &str,
    message: impl Into<String>,
    replacements: Vec<String>,
) -> GrammarIssue {
    let offset = char_offset(text, start);
    let length = text[start..end].chars().count();
    GrammarIssue {
        message: message.into(),
        replacements,
        context: context_snippet(text, offset, length),
        offset,
        length,
        rule_id: rule_id.to_string(),
    }
}

fn check_repeated_words(text: &str) -> Vec<GrammarIssue> {
    let mut issues = Vec::new();
    let mut previous: Option<regex::Match> = None;

    for word in WORD_PATTERN.find_iter(text) {
        if let Some(prev) = previous {
            let gap = &text[prev.end()..word.start()];
            let only_spaces = !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t');
            if only_spaces && prev.as_str().eq_ignore_ascii_case(word.as_str()) {
                issues.push(issue(
                    text,
                    prev.start(),
                    word.end(),
                    REPEATED_WORD,
                    "Possible typo: you repeated a word",
                    vec![prev.as_str().to_string()],
                ));
            }
        }
        previous = Some(word);
    }

    issues
}

fn check_whitespace(text: &str) -> Vec<GrammarIssue> {
    MULTI_SPACE_PATTERN
        .find_iter(text)
        .map(|m| {
            issue(
                text,
                m.start(),
                m.end(),
                WHITESPACE_REPETITION,
                "Possible typo: you repeated a whitespace",
                vec![" ".to_string()],
            )
        })
        .collect()
}

fn check_space_before_punctuation(text: &str) -> Vec<GrammarIssue> {
    let mut issues = Vec::new();

    for caps in SPACE_BEFORE_PUNCT_PATTERN.captures_iter(text) {
        let (Some(whole), Some(punct)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // Ellipses and decimals such as " .5" are not stray spaces
        if punct.as_str() == "." {
            let next = text[punct.end()..].chars().next();
            if next.is_some_and(|c| c == '.' || c.is_ascii_digit()) {
                continue;
            }
        }
        // Skip spaces that start a line
        if whole.start() == 0 || text[..whole.start()].ends_with('\n') {
            continue;
        }
        issues.push(issue(
            text,
            whole.start(),
            whole.end(),
            SPACE_BEFORE_PUNCTUATION,
            "Don't put a space before the punctuation",
            vec![punct.as_str().to_string()],
        ));
    }

    issues
}

fn check_missing_space_after_punctuation(text: &str) -> Vec<GrammarIssue> {
    let sentence = MISSING_SPACE_SENTENCE_PATTERN.captures_iter(text);
    let comma = MISSING_SPACE_COMMA_PATTERN.captures_iter(text);

    sentence
        .chain(comma)
        .filter_map(|caps| caps.get(1))
        .map(|punct| {
            issue(
                text,
                punct.start(),
                punct.end(),
                MISSING_SPACE_AFTER_PUNCTUATION,
                "Add a space after the punctuation",
                vec![format!("{} ", punct.as_str())],
            )
        })
        .collect()
}

fn check_sentence_start(text: &str) -> Vec<GrammarIssue> {
    let mut issues = Vec::new();

    for caps in SENTENCE_START_PATTERN.captures_iter(text) {
        let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let preceding = text[..whole.start()]
            .rsplit(|c: char| !c.is_alphabetic())
            .next()
            .unwrap_or("");
        if preceding.chars().count() < 2
            || ABBREVIATIONS.contains(&preceding.to_lowercase().as_str())
        {
            continue;
        }
        issues.push(issue(
            text,
            word.start(),
            word.end(),
            LOWERCASE_SENTENCE_START,
            "This sentence does not start with an uppercase letter",
            vec![match_capitalization("X", word.as_str())],
        ));
    }

    issues
}

fn check_lowercase_i(text: &str) -> Vec<GrammarIssue> {
    LOWERCASE_I_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            issue(
                text,
                m.start(),
                m.end(),
                LOWERCASE_I,
                "The personal pronoun \"I\" should be uppercase",
                vec!["I".to_string()],
            )
        })
        .collect()
}

fn check_articles(text: &str) -> Vec<GrammarIssue> {
    let mut issues = Vec::new();

    for caps in ARTICLE_PATTERN.captures_iter(text) {
        let (Some(article), Some(word)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let next = word.as_str();
        let starts_with_vowel = next.starts_with(&['a', 'e', 'i', 'o', 'u'][..]);

        let expected = if article.as_str().len() == 1 {
            if starts_with_vowel && !starts_with_any(next, CONSONANT_SOUND_PREFIXES) {
                "an"
            } else {
                continue;
            }
        } else if !starts_with_vowel && !starts_with_any(next, SILENT_H_PREFIXES) {
            "a"
        } else {
            continue;
        };

        issues.push(issue(
            text,
            article.start(),
            article.end(),
            A_AN_AGREEMENT,
            format!(
                "Use \"{}\" instead of \"{}\" before \"{}\"",
                expected,
                article.as_str().to_lowercase(),
                next
            ),
            vec![match_capitalization(article.as_str(), expected)],
        ));
    }

    issues
}

fn check_misspellings(text: &str) -> Vec<GrammarIssue> {
    MISSPELLING_PATTERN
        .find_iter(text)
        .filter_map(|m| {
            let lower = m.as_str().to_lowercase();
            COMMON_MISSPELLINGS
                .iter()
                .find(|(wrong, _)| *wrong == lower)
                .map(|(_, right)| {
                    issue(
                        text,
                        m.start(),
                        m.end(),
                        MISSPELLING,
                        "Possible spelling mistake found",
                        vec![match_capitalization(m.as_str(), right)],
                    )
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn rule_ids(text: &str) -> Vec<String> {
        RuleBasedChecker::new()
            .check_text(text)
            .into_iter()
            .map(|i| i.rule_id)
            .collect()
    }

    #[test]
    fn test_clean_text_has_no_issues() {
        let text = "The tenant shall maintain the premises. An inspection occurs once a year.";
        assert!(rule_ids(text).is_empty());
    }

    #[test]
    fn test_detects_repeated_word() {
        let issues = RuleBasedChecker::new().check_text("This is the the policy.");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, REPEATED_WORD);
        assert_eq!(issues[0].offset, 8);
        assert_eq!(issues[0].length, 7);
        assert_eq!(issues[0].replacements, vec!["the"]);
    }

    #[test]
    fn test_repeated_word_across_paragraphs_is_fine() {
        assert!(rule_ids("End of section\n\nsection two begins here.").is_empty());
    }

    #[test]
    fn test_detects_double_space() {
        assert_eq!(rule_ids("Two  spaces here."), vec![WHITESPACE_REPETITION]);
    }

    #[test]
    fn test_detects_space_before_comma() {
        let issues = RuleBasedChecker::new().check_text("First , second.");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, SPACE_BEFORE_PUNCTUATION);
        assert_eq!(issues[0].replacements, vec![","]);
    }

    #[test]
    fn test_ellipsis_and_decimal_are_allowed() {
        assert!(rule_ids("Wait ... then go.").is_empty());
        assert!(rule_ids("The rate is .5 percent.").is_empty());
    }

    #[test]
    fn test_detects_missing_space_after_sentence() {
        assert_eq!(
            rule_ids("The term ends today.The next term starts."),
            vec![MISSING_SPACE_AFTER_PUNCTUATION]
        );
    }

    #[test]
    fn test_abbreviations_and_filenames_are_not_sentence_breaks() {
        assert!(rule_ids("Send report.docx to the team.").is_empty());
        assert!(rule_ids("Bring pens, paper, etc. for the exam.").is_empty());
        assert!(rule_ids("Use e.g. a template.").is_empty());
    }

    #[test]
    fn test_detects_missing_space_after_comma() {
        assert_eq!(rule_ids("Red,blue and green."), vec![MISSING_SPACE_AFTER_PUNCTUATION]);
        assert!(rule_ids("Costs 1,000 dollars.").is_empty());
    }

    #[test]
    fn test_detects_lowercase_sentence_start() {
        let issues = RuleBasedChecker::new().check_text("It is done. then we left.");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, LOWERCASE_SENTENCE_START);
        assert_eq!(issues[0].replacements, vec!["Then"]);
    }

    #[test]
    fn test_detects_lowercase_i() {
        assert_eq!(rule_ids("Yesterday i went home."), vec![LOWERCASE_I]);
        assert_eq!(rule_ids("Then i'm leaving."), vec![LOWERCASE_I]);
        assert!(rule_ids("See item (ii) and i.e. the annex.").is_empty());
    }

    #[test]
    fn test_detects_article_agreement() {
        let issues = RuleBasedChecker::new().check_text("He ate a apple and an banana.");
        let replacements: Vec<_> = issues.iter().map(|i| i.replacements[0].clone()).collect();
        assert_eq!(replacements, vec!["an", "a"]);
        assert!(issues.iter().all(|i| i.rule_id == A_AN_AGREEMENT));
    }

    #[test]
    fn test_article_exceptions() {
        assert!(rule_ids("It is a university and a one-time event.").is_empty());
        assert!(rule_ids("It took an hour for an honest answer.").is_empty());
    }

    #[test]
    fn test_detects_misspelling_with_case() {
        let issues = RuleBasedChecker::new().check_text("Teh tenant will recieve notice.");
        let fixes: Vec<_> = issues.iter().map(|i| i.replacements[0].clone()).collect();
        assert_eq!(fixes, vec!["The", "receive"]);
    }

    #[test]
    fn test_offsets_are_characters() {
        let issues = RuleBasedChecker::new().check_text("Café menu: teh soup.");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].offset, 11);
        assert_eq!(issues[0].length, 3);
    }

    #[test]
    fn test_issues_sorted_by_offset() {
        let issues = RuleBasedChecker::new().check_text("teh end.  i said so so.");
        let offsets: Vec<_> = issues.iter().map(|i| i.offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort();
        assert_eq!(offsets, sorted);
        assert!(issues.len() >= 3);
    }

    #[tokio::test]
    async fn test_report_count_matches_issues() {
        let report = RuleBasedChecker::new()
            .check("the the teh  end")
            .await
            .unwrap();
        assert_eq!(report.issue_count, report.issues.len());
        assert!(report.issue_count >= 3);
    }

    proptest! {
        #[test]
        fn issue_spans_stay_inside_text(text in "[a-zA-Z ,.!?'\n]{0,200}") {
            let chars = text.chars().count();
            for issue in RuleBasedChecker::new().check_text(&text) {
                prop_assert!(issue.offset + issue.length <= chars);
                prop_assert!(issue.length > 0);
            }
        }
    }
}
