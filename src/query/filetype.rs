// file: src/query/filetype.rs
// description: shorthand filetype aliases resolved to mimetype predicates
// reference: recoll mime: field syntax

/// Shorthand accepted from agents, mapped to what the engine indexes.
/// Anything not listed is passed through untouched.
const ALIASES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("text", "text/*"),
    ("txt", "text/plain"),
    ("markdown", "text/markdown"),
    ("md", "text/markdown"),
    ("html", "text/html"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("image", "image/*"),
    ("audio", "audio/*"),
    ("video", "video/*"),
    ("email", "message/rfc822"),
];

pub fn resolve_filetype(token: &str) -> &str {
    let lowered = token.to_ascii_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, mime)| *mime)
        .unwrap_or(token)
}

/// True when the engine would treat the mimetype as plain readable text.
pub fn is_text_mimetype(mimetype: &str) -> bool {
    mimetype.starts_with("text/")
        || matches!(
            mimetype,
            "application/json"
                | "application/xml"
                | "application/x-sh"
                | "application/javascript"
                | "application/x-yaml"
                | "application/toml"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_aliases_resolve() {
        assert_eq!(resolve_filetype("pdf"), "application/pdf");
        assert_eq!(resolve_filetype("Markdown"), "text/markdown");
        assert_eq!(resolve_filetype("image"), "image/*");
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        assert_eq!(resolve_filetype("application/x-fictionbook"), "application/x-fictionbook");
        assert_eq!(resolve_filetype("epub"), "epub");
    }

    #[test]
    fn test_text_mimetypes() {
        assert!(is_text_mimetype("text/plain"));
        assert!(is_text_mimetype("application/json"));
        assert!(!is_text_mimetype("application/pdf"));
    }
}
