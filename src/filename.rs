//! Output filename resolution for downloaded results.
//!
//! The API names result files through the `Content-Disposition` header.
//! These helpers extract that name and make it safe to use as a single path
//! component.

use std::path::{Component, Path, PathBuf};

/// Name used when neither the caller nor the server supplies one.
pub const FALLBACK_FILENAME: &str = "result";

/// Resolves where a downloaded result is written.
///
/// Order: explicit `output` path, then the sanitized `Content-Disposition`
/// filename (relative to the working directory), then [`FALLBACK_FILENAME`].
#[must_use]
pub fn resolve_output_path(output: Option<&Path>, content_disposition: Option<&str>) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }

    content_disposition
        .and_then(parse_content_disposition)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.trim_matches('_').is_empty())
        .map_or_else(|| PathBuf::from(FALLBACK_FILENAME), PathBuf::from)
}

/// Parses Content-Disposition header to extract filename.
///
/// Handles:
/// - `attachment; filename="result.csv"`
/// - `attachment; filename=result.csv`
/// - `attachment; filename*=UTF-8''r%C3%A9sultat.csv` (RFC 5987)
#[must_use]
pub fn parse_content_disposition(header: &str) -> Option<String> {
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + 10..].trim();
        // charset'language'encoded_value
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            let encoded_name = encoded[..end].trim().trim_matches('"');
            if let Ok(decoded) = urlencoding::decode(encoded_name)
                && !decoded.is_empty()
            {
                return Some(decoded.into_owned());
            }
        }
    }

    let pos = header.find("filename=")?;
    let value = header[pos + 9..].trim();

    if let Some(stripped) = value.strip_prefix('"') {
        let end = stripped.find('"')?;
        let filename = &stripped[..end];
        return (!filename.is_empty()).then(|| filename.to_string());
    }

    let end = value.find(';').unwrap_or(value.len());
    let filename = value[..end].trim().trim_matches('\'');
    (!filename.is_empty()).then(|| filename.to_string())
}

/// Sanitizes a server-supplied filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |` and control characters) and neutralizes `.`/`..`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_disposition_quoted() {
        let header = r#"attachment; filename="result.csv""#;
        assert_eq!(
            parse_content_disposition(header),
            Some("result.csv".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_unquoted() {
        let header = "attachment; filename=result.csv; size=10";
        assert_eq!(
            parse_content_disposition(header),
            Some("result.csv".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_rfc5987() {
        let header = "attachment; filename*=UTF-8''r%C3%A9sultat.csv";
        assert_eq!(
            parse_content_disposition(header),
            Some("résultat.csv".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_missing() {
        assert_eq!(parse_content_disposition("inline"), None);
        assert_eq!(parse_content_disposition(r#"attachment; filename="""#), None);
    }

    #[test]
    fn test_sanitize_filename_removes_path_separators() {
        assert_eq!(sanitize_filename("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_filename("a\\b.csv"), "a_b.csv");
        assert_eq!(sanitize_filename(".."), "__");
    }

    #[test]
    fn test_resolve_output_path_prefers_explicit_path() {
        let path = resolve_output_path(
            Some(Path::new("out/data.csv")),
            Some(r#"attachment; filename="server.csv""#),
        );
        assert_eq!(path, PathBuf::from("out/data.csv"));
    }

    #[test]
    fn test_resolve_output_path_uses_header() {
        let path = resolve_output_path(None, Some(r#"attachment; filename="server.csv""#));
        assert_eq!(path, PathBuf::from("server.csv"));
    }

    #[test]
    fn test_resolve_output_path_falls_back_to_result() {
        assert_eq!(resolve_output_path(None, None), PathBuf::from("result"));
        assert_eq!(
            resolve_output_path(None, Some("attachment")),
            PathBuf::from("result")
        );
    }
}
