//! Header-block parsing edge cases: RFC 5987 `filename*`, quoted-string
//! escaping, and the "absent, not an error" contract for malformed or
//! missing `Content-Disposition`/`Content-Type`.

use multipart_stream::parser::parse_part_headers;

#[test]
fn decodes_rfc5987_filename_star() {
    let block = b"Content-Disposition: form-data; name=\"f\"; filename*=UTF-8''na%C3%AFve.txt\r\n";
    let parsed = parse_part_headers(block).unwrap();
    assert_eq!(parsed.file_name.as_deref(), Some("naïve.txt"));
}

#[test]
fn unescapes_backslash_escaped_quoted_string() {
    let block = b"Content-Disposition: form-data; name=\"a \\\"quoted\\\" name\"\r\n";
    let parsed = parse_part_headers(block).unwrap();
    assert_eq!(parsed.field_name.as_deref(), Some("a \"quoted\" name"));
}

#[test]
fn missing_content_type_leaves_media_type_absent() {
    let block = b"Content-Disposition: form-data; name=\"a\"\r\n";
    let parsed = parse_part_headers(block).unwrap();
    assert_eq!(parsed.content_type, None);
}

#[test]
fn missing_content_disposition_leaves_name_absent_without_erroring() {
    let block = b"X-Custom: value\r\n";
    let parsed = parse_part_headers(block).unwrap();
    assert_eq!(parsed.field_name, None);
    assert_eq!(parsed.file_name, None);
    assert!(parsed.raw.contains_key("x-custom"));
}

#[test]
fn header_names_are_case_insensitive() {
    let block = b"content-DISPOSITION: form-data; name=\"a\"\r\nCONTENT-type: text/plain\r\n";
    let parsed = parse_part_headers(block).unwrap();
    assert_eq!(parsed.field_name.as_deref(), Some("a"));
    assert_eq!(parsed.content_type.unwrap().essence_str(), "text/plain");
}

#[test]
fn multiple_values_for_the_same_header_name_are_all_kept() {
    let block = b"Content-Disposition: form-data; name=\"a\"\r\nX-Tag: one\r\nX-Tag: two\r\n";
    let parsed = parse_part_headers(block).unwrap();
    let values: Vec<_> = parsed.raw.get_all("x-tag").iter().collect();
    assert_eq!(values.len(), 2);
}
