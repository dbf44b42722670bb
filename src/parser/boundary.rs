//! Resolves the multipart boundary delimiter from a `Content-Type` header.

use crate::error::MultipartError;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const MAX_BOUNDARY_LEN: usize = 70;

/// Extracts and validates the `boundary` parameter from a `Content-Type`
/// header value, returning the raw bytes the scanner should search for
/// (without the leading `--` or trailing CRLF, which the state machine adds).
pub fn extract_boundary(content_type: &str) -> Result<String, MultipartError> {
    let mime = content_type
        .parse::<mime::Mime>()
        .map_err(|_| MultipartError::MissingOrInvalidContentType)?;

    if mime.essence_str() != MULTIPART_FORM_DATA {
        return Err(MultipartError::MissingOrInvalidContentType);
    }

    let boundary = mime
        .get_param("boundary")
        .map(|value| value.as_str())
        .ok_or(MultipartError::MissingBoundary)?;

    let boundary = decode_percent_encoding(boundary)?;
    validate(&boundary)?;
    Ok(boundary)
}

fn validate(boundary: &str) -> Result<(), MultipartError> {
    if boundary.is_empty() {
        return Err(MultipartError::MissingBoundary);
    }
    if boundary.len() > MAX_BOUNDARY_LEN {
        return Err(MultipartError::MissingBoundary);
    }
    if boundary.ends_with(' ') {
        return Err(MultipartError::MissingBoundary);
    }
    if !boundary.chars().all(is_boundary_char) {
        return Err(MultipartError::MissingBoundary);
    }
    Ok(())
}

fn decode_percent_encoding(boundary: &str) -> Result<String, MultipartError> {
    if !boundary.as_bytes().contains(&b'%') {
        return Ok(boundary.to_owned());
    }

    let raw = boundary.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut index = 0usize;

    while index < raw.len() {
        if raw[index] == b'%' {
            if index + 2 >= raw.len() {
                return Err(MultipartError::MissingBoundary);
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

    String::from_utf8(bytes).map_err(|_| MultipartError::MissingBoundary)
}

fn hex_value(byte: u8) -> Result<u8, MultipartError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(MultipartError::MissingBoundary),
    }
}

fn is_boundary_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?' | ' '
        )
}
