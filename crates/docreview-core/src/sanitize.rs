//! Filename sanitizing for stored and downloaded documents

use shared_types::DocumentFormat;

const FALLBACK_NAME: &str = "document";

/// Reduce a client-supplied filename to a safe display name
///
/// Keeps alphanumerics, spaces, `.`, `_` and `-`; drops trailing
/// whitespace; turns the remaining spaces into underscores. A name with
/// nothing left becomes `"document"`.
pub fn sanitize_filename(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-'))
        .collect();
    let cleaned = kept.trim_end().replace(' ', "_");

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

/// Display name for a document rewritten from one named `{stem}.*`
pub fn derived_display_name(origin_stem: &str, target: DocumentFormat) -> String {
    format!("{}_modified.{}", origin_stem, target.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_strips_path_and_shell_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "....etcpasswd");
        assert_eq!(sanitize_filename("report<1>;rm -rf.pdf"), "report1rm_-rf.pdf");
    }

    #[test]
    fn test_spaces_become_underscores_after_trim() {
        assert_eq!(sanitize_filename("Annual Report 2024.docx  "), "Annual_Report_2024.docx");
        assert_eq!(sanitize_filename("  lead.pdf"), "__lead.pdf");
    }

    #[test]
    fn test_empty_result_falls_back() {
        assert_eq!(sanitize_filename(""), "document");
        assert_eq!(sanitize_filename("///   "), "document");
    }

    #[test]
    fn test_keeps_unicode_letters() {
        assert_eq!(sanitize_filename("résumé.pdf"), "résumé.pdf");
    }

    #[test]
    fn test_derived_display_name() {
        assert_eq!(
            derived_display_name("contract", DocumentFormat::Docx),
            "contract_modified.docx"
        );
        assert_eq!(
            derived_display_name("scan", DocumentFormat::Pdf),
            "scan_modified.pdf"
        );
    }

    proptest! {
        #[test]
        fn sanitized_names_are_path_safe(name in "\\PC{0,60}") {
            let cleaned = sanitize_filename(&name);
            prop_assert!(!cleaned.is_empty());
            prop_assert!(!cleaned.contains('/'));
            prop_assert!(!cleaned.contains('\\'));
            prop_assert!(!cleaned.chars().any(char::is_whitespace));
        }

        #[test]
        fn sanitizing_is_idempotent(name in "[a-zA-Z0-9 ._/-]{0,40}") {
            let once = sanitize_filename(&name);
            prop_assert_eq!(sanitize_filename(&once), once);
        }
    }
}
