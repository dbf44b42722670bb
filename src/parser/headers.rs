//! Parses a part's raw CRLF-terminated header block into `Content-Disposition`
//! and `Content-Type` metadata.
//!
//! Tolerant by design: a header line with no `:`, a `Content-Disposition`
//! that doesn't parse, or a `Content-Type` the `mime` crate rejects all
//! surface as an absent field on [`ParsedPartHeaders`], never as a parse
//! failure for the whole part.

use http::{HeaderMap, HeaderName, HeaderValue, header};

use crate::error::MultipartError;

/// Parsed `Content-Disposition` metadata for a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    /// Disposition type, lower-cased (`form-data` for a well-formed part).
    pub disposition: String,
    /// Parsed field name (`name` parameter).
    pub name: Option<String>,
    /// Parsed file name (`filename`/`filename*` parameter).
    pub filename: Option<String>,
}

/// Parsed header model for a multipart part, ready to hand to [`crate::Part`].
///
/// `Eq` is deliberately not derived: `http::HeaderMap` only implements
/// `PartialEq`, not `Eq`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPartHeaders {
    /// All raw headers for this part, in arrival order.
    pub raw: HeaderMap,
    /// Parsed content disposition metadata, absent if the header was missing
    /// or did not parse.
    pub content_disposition: Option<ContentDisposition>,
    /// Logical field name for this part, absent under the same conditions.
    pub field_name: Option<String>,
    /// Optional file name, if this part represents a file field.
    pub file_name: Option<String>,
    /// Parsed part-level content type, absent if the header was missing or
    /// did not parse.
    pub content_type: Option<mime::Mime>,
}

/// Parses the raw bytes of a header block (CRLF-terminated lines, without
/// the final blank-line terminator) into an [`http::HeaderMap`].
///
/// A line with no `:`, or one whose name/value `http` rejects outright, is
/// dropped rather than failing the whole block — see §7 of the governing
/// spec: malformed header lines are tolerated, not an error.
pub fn parse_header_block(bytes: &[u8]) -> Result<HeaderMap, MultipartError> {
    let text = std::str::from_utf8(bytes).map_err(|_| MultipartError::MalformedHeader)?;
    let mut map = HeaderMap::new();

    for line in split_crlf_lines(text) {
        let Some((name, value)) = line.split_once(':') else {
            #[cfg(feature = "tracing")]
            tracing::trace!(line, "multipart: dropping header line with no ':'");
            continue;
        };
        let Ok(name) = HeaderName::from_bytes(name.trim().as_bytes()) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(line, "multipart: dropping header line with invalid name");
            continue;
        };
        let Ok(value) = HeaderValue::from_str(value.trim()) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(line, "multipart: dropping header line with invalid value");
            continue;
        };
        map.append(name, value);
    }

    Ok(map)
}

fn split_crlf_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split("\r\n").filter(|line| !line.is_empty())
}

/// Parses a multipart part `Content-Disposition` value.
pub fn parse_content_disposition(value: &str) -> Result<ContentDisposition, MultipartError> {
    let mut segments = split_semicolon_aware(value).into_iter();
    let disposition = segments
        .next()
        .map(|segment| segment.trim().to_ascii_lowercase())
        .filter(|segment| !segment.is_empty())
        .ok_or(MultipartError::MalformedHeader)?;

    let mut name: Option<String> = None;
    let mut filename: Option<String> = None;
    let mut filename_star: Option<String> = None;

    for segment in segments {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = trimmed.split_once('=') else {
            return Err(MultipartError::MalformedHeader);
        };

        let key = raw_key.trim().to_ascii_lowercase();
        let decoded = parse_parameter_value(raw_value.trim())?;

        match key.as_str() {
            "name" => name = Some(decoded),
            "filename" => filename = Some(parse_filename_value(&decoded)?),
            "filename*" => filename_star = Some(parse_rfc5987_value(&decoded)?),
            _ => {}
        }
    }

    Ok(ContentDisposition {
        disposition,
        name,
        filename: filename_star.or(filename),
    })
}

/// Parses a complete header block into the metadata a [`crate::Part`] needs.
///
/// Never fails on a malformed or missing `Content-Disposition`/`Content-Type`
/// — those surface as `None` fields, per the data model's "absent if missing
/// or malformed" contract. Only an unreadable (non-UTF-8) header block fails
/// the whole part.
pub fn parse_part_headers(bytes: &[u8]) -> Result<ParsedPartHeaders, MultipartError> {
    let raw = parse_header_block(bytes)?;

    let content_disposition = raw
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| parse_content_disposition(value).ok());

    let field_name = content_disposition.as_ref().and_then(|cd| cd.name.clone());
    let file_name = content_disposition.as_ref().and_then(|cd| cd.filename.clone());

    let content_type = raw
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<mime::Mime>().ok());

    Ok(ParsedPartHeaders {
        raw,
        content_disposition,
        field_name,
        file_name,
        content_type,
    })
}

fn parse_parameter_value(raw: &str) -> Result<String, MultipartError> {
    if let Some(stripped) = raw.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        return unescape_quoted_string(stripped);
    }
    if raw.contains('"') {
        return Err(MultipartError::MalformedHeader);
    }
    Ok(raw.trim().to_owned())
}

fn unescape_quoted_string(value: &str) -> Result<String, MultipartError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            let escaped = chars.next().ok_or(MultipartError::MalformedHeader)?;
            out.push(escaped);
            continue;
        }
        out.push(ch);
    }

    Ok(out)
}

fn parse_rfc5987_value(value: &str) -> Result<String, MultipartError> {
    let Some((charset, encoded)) = split_rfc5987(value) else {
        return Err(MultipartError::MalformedHeader);
    };
    if !charset.eq_ignore_ascii_case("utf-8") {
        return Err(MultipartError::MalformedHeader);
    }
    percent_decode_utf8(encoded)
}

fn split_rfc5987(value: &str) -> Option<(&str, &str)> {
    let (charset, rest) = value.split_once('\'')?;
    let (_, encoded) = rest.split_once('\'')?;
    Some((charset, encoded))
}

fn parse_filename_value(value: &str) -> Result<String, MultipartError> {
    if !value.as_bytes().contains(&b'%') {
        return Ok(value.to_owned());
    }
    percent_decode_utf8(value)
}

fn percent_decode_utf8(value: &str) -> Result<String, MultipartError> {
    let raw = value.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut index = 0;

    while index < raw.len() {
        if raw[index] == b'%' {
            if index + 2 >= raw.len() {
                return Err(MultipartError::MalformedHeader);
            }
            let hi = hex_value(raw[index + 1])?;
            let lo = hex_value(raw[index + 2])?;
            bytes.push((hi << 4) | lo);
            index += 3;
            continue;
        }
        bytes.push(raw[index]);
        index += 1;
    }

    String::from_utf8(bytes).map_err(|_| MultipartError::MalformedHeader)
}

fn hex_value(byte: u8) -> Result<u8, MultipartError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(MultipartError::MalformedHeader),
    }
}

fn split_semicolon_aware(value: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in value.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }

        match ch {
            '\\' if in_quotes => {
                current.push(ch);
                escaped = true;
            }
            '"' => {
                current.push(ch);
                in_quotes = !in_quotes;
            }
            ';' if !in_quotes => {
                segments.push(current);
                current = String::new();
            }
            _ => current.push(ch),
        }
    }

    segments.push(current);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_filename() {
        let value = r#"form-data; name="file"; filename="report.pdf""#;
        let disposition = parse_content_disposition(value).unwrap();
        assert_eq!(disposition.name.as_deref(), Some("file"));
        assert_eq!(disposition.filename.as_deref(), Some("report.pdf"));
    }

    #[test]
    fn prefers_filename_star_over_filename() {
        let value = "form-data; name=\"f\"; filename=\"fallback.txt\"; filename*=utf-8''na%C3%AFve.txt";
        let disposition = parse_content_disposition(value).unwrap();
        assert_eq!(disposition.filename.as_deref(), Some("naïve.txt"));
    }

    #[test]
    fn name_is_absent_when_parameter_missing() {
        let disposition = parse_content_disposition("form-data; filename=\"x\"").unwrap();
        assert_eq!(disposition.name, None);
    }

    #[test]
    fn content_type_is_absent_when_header_missing() {
        let block = b"Content-Disposition: form-data; name=\"field\"\r\n";
        let parsed = parse_part_headers(block).unwrap();
        assert_eq!(parsed.content_type, None);
    }

    #[test]
    fn content_type_is_absent_when_unparsable() {
        let block = b"Content-Disposition: form-data; name=\"field\"\r\nContent-Type: \r\n";
        let parsed = parse_part_headers(block).unwrap();
        assert_eq!(parsed.content_type, None);
    }

    #[test]
    fn parses_full_header_block() {
        let block = b"Content-Disposition: form-data; name=\"field\"\r\nContent-Type: text/plain\r\n";
        let parsed = parse_part_headers(block).unwrap();
        assert_eq!(parsed.field_name.as_deref(), Some("field"));
        assert_eq!(parsed.content_type.unwrap().essence_str(), "text/plain");
    }

    #[test]
    fn drops_malformed_header_line_without_failing_the_block() {
        let block = b"Invalid-Header\r\nContent-Disposition: form-data; name=\"field\"\r\n";
        let raw = parse_header_block(block).unwrap();
        assert!(!raw.contains_key("invalid-header"));
        let parsed = parse_part_headers(block).unwrap();
        assert_eq!(parsed.field_name.as_deref(), Some("field"));
    }

    #[test]
    fn field_name_is_absent_when_content_disposition_missing() {
        let block = b"Content-Type: text/plain\r\n";
        let parsed = parse_part_headers(block).unwrap();
        assert_eq!(parsed.field_name, None);
        assert_eq!(parsed.content_disposition, None);
    }
}
