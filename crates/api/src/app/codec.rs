//! Strict JSON request reading and uniform JSON response writing.
//!
//! Reading enforces, in order: a hard body-size cap, a non-empty body, a
//! well-formed single JSON value, no unknown keys, and field-level type
//! agreement. Every failure maps to a fixed client-safe message carried
//! by [`ReadError`]; handlers turn any of them into a 400.
//!
//! Writing produces indented JSON with a trailing newline, merges any
//! caller-supplied headers, and sets the JSON content type.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::app::errors;

/// Maximum accepted request body, in bytes.
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Decode failures. The `Display` text is sent verbatim to clients in
/// the 400 response envelope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadError {
    #[error("body must not be larger than {0} bytes")]
    TooLarge(usize),
    #[error("body must not be empty")]
    Empty,
    #[error("body contains badly-formed JSON (at character {0})")]
    SyntaxAt(usize),
    #[error("body contains badly-formed JSON")]
    Truncated,
    #[error("body contains incorrect JSON type for field {0:?}")]
    FieldType(String),
    #[error("body contains incorrect JSON type (at character {0})")]
    TypeAt(usize),
    #[error("body contains unknown key {0:?}")]
    UnknownKey(String),
    #[error("body must only contain a single JSON value")]
    MultipleValues,
    #[error("body could not be read")]
    Unreadable,
}

/// Read and decode the request body into `T` under the strict rules
/// above. The size cap is enforced while streaming the body in, before
/// any parsing happens.
pub async fn read_json<T: DeserializeOwned>(req: Request) -> Result<T, ReadError> {
    let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|err| {
            if is_length_limit(&err) {
                ReadError::TooLarge(MAX_BODY_BYTES)
            } else {
                ReadError::Unreadable
            }
        })?;

    decode(&bytes)
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(inner) = source {
        if inner.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        source = inner.source();
    }
    false
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ReadError> {
    if bytes
        .iter()
        .all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
    {
        return Err(ReadError::Empty);
    }

    let mut de = serde_json::Deserializer::from_slice(bytes);
    let mut track = serde_path_to_error::Track::new();
    let value = match T::deserialize(serde_path_to_error::Deserializer::new(&mut de, &mut track)) {
        Ok(value) => value,
        Err(err) => return Err(classify(bytes, &err, &track.path())),
    };

    // Anything after the first JSON value (whitespace aside) is rejected.
    if de.end().is_err() {
        return Err(ReadError::MultipleValues);
    }

    Ok(value)
}

fn classify(bytes: &[u8], err: &serde_json::Error, path: &serde_path_to_error::Path) -> ReadError {
    use serde_json::error::Category;

    match err.classify() {
        Category::Syntax => ReadError::SyntaxAt(byte_offset(bytes, err.line(), err.column())),
        Category::Eof => ReadError::Truncated,
        Category::Io => ReadError::Unreadable,
        Category::Data => {
            if let Some(key) = unknown_key(&err.to_string()) {
                return ReadError::UnknownKey(key);
            }
            match leaf_field(path) {
                Some(field) => ReadError::FieldType(field),
                None => ReadError::TypeAt(byte_offset(bytes, err.line(), err.column())),
            }
        }
    }
}

/// serde reports unknown struct keys only through its message text, as
/// ``unknown field `name`, expected ...``.
fn unknown_key(message: &str) -> Option<String> {
    let rest = message.strip_prefix("unknown field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Innermost map key on the error path, if any. An empty path means the
/// mismatch is at the top-level value itself.
fn leaf_field(path: &serde_path_to_error::Path) -> Option<String> {
    let mut field = None;
    for segment in path.iter() {
        if let serde_path_to_error::Segment::Map { key } = segment {
            field = Some(key.clone());
        }
    }
    field
}

/// Translate serde_json's 1-based line/column into the 1-based byte
/// offset the error messages quote.
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    if line <= 1 {
        return column;
    }
    let mut newlines_left = line - 1;
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'\n' {
            newlines_left -= 1;
            if newlines_left == 0 {
                return i + 1 + column;
            }
        }
    }
    column
}

/// Serialize `body` as indented JSON with a trailing newline, merging
/// `headers` into the response.
///
/// Encoding a valid value cannot fail; callers treat an error here as a
/// server fault.
pub fn write_json<T: Serialize>(
    status: StatusCode,
    body: &T,
    headers: HeaderMap,
) -> Result<Response, serde_json::Error> {
    let mut buf = serde_json::to_vec_pretty(body)?;
    buf.push(b'\n');

    let mut response = Response::new(Body::from(buf));
    *response.status_mut() = status;
    for (name, value) in headers.iter() {
        response.headers_mut().append(name, value.clone());
    }
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(response)
}

/// Write `body`, or the generic server error if encoding fails.
pub fn respond<T: Serialize>(status: StatusCode, body: &T, headers: HeaderMap) -> Response {
    match write_json(status, body, headers) {
        Ok(response) => response,
        Err(err) => errors::server_error_response(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct Payload {
        title: String,
        release_year: i32,
    }

    #[test]
    fn decodes_a_full_payload() {
        let payload: Payload = decode(br#"{"title": "Solaris", "release_year": 1972}"#).unwrap();
        assert_eq!(payload.title, "Solaris");
        assert_eq!(payload.release_year, 1972);
    }

    #[test]
    fn missing_keys_fall_back_to_zero_values() {
        let payload: Payload = decode(br#"{"title": "Solaris"}"#).unwrap();
        assert_eq!(payload.title, "Solaris");
        assert_eq!(payload.release_year, 0);
    }

    #[test]
    fn empty_and_blank_bodies_are_rejected() {
        for body in [&b""[..], b"   ", b" \t\r\n "] {
            let err = decode::<Payload>(body).unwrap_err();
            assert_eq!(err, ReadError::Empty);
            assert_eq!(err.to_string(), "body must not be empty");
        }
    }

    #[test]
    fn unknown_keys_are_named_in_the_error() {
        let err = decode::<Payload>(br#"{"title": "x", "rating": 5}"#).unwrap_err();
        assert_eq!(err, ReadError::UnknownKey("rating".to_string()));
        assert_eq!(err.to_string(), r#"body contains unknown key "rating""#);
    }

    #[test]
    fn syntax_errors_carry_a_character_offset() {
        let err = decode::<Payload>(b"xxx").unwrap_err();
        assert_eq!(err, ReadError::SyntaxAt(1));
        assert_eq!(
            err.to_string(),
            "body contains badly-formed JSON (at character 1)"
        );
    }

    #[test]
    fn syntax_offset_accounts_for_earlier_lines() {
        // The stray bracket sits at byte 18, on the second line.
        let err = decode::<Payload>(b"{\n  \"title\": \"x\" ]}").unwrap_err();
        match err {
            ReadError::SyntaxAt(offset) => assert_eq!(offset, 18),
            other => panic!("expected SyntaxAt, got {other:?}"),
        }
    }

    #[test]
    fn truncated_json_is_reported_without_offset() {
        let err = decode::<Payload>(br#"{"title": "Sola"#).unwrap_err();
        assert_eq!(err, ReadError::Truncated);
        assert_eq!(err.to_string(), "body contains badly-formed JSON");
    }

    #[test]
    fn wrong_field_type_names_the_field() {
        let err = decode::<Payload>(br#"{"release_year": "nineteen"}"#).unwrap_err();
        assert_eq!(err, ReadError::FieldType("release_year".to_string()));
        assert_eq!(
            err.to_string(),
            r#"body contains incorrect JSON type for field "release_year""#
        );
    }

    #[test]
    fn wrong_top_level_type_reports_an_offset() {
        let err = decode::<Payload>(br#"["not", "an", "object"]"#).unwrap_err();
        assert!(matches!(err, ReadError::TypeAt(_)), "got {err:?}");
    }

    #[test]
    fn trailing_values_are_rejected() {
        let err = decode::<Payload>(br#"{"title": "a"}{"title": "b"}"#).unwrap_err();
        assert_eq!(err, ReadError::MultipleValues);
        assert_eq!(err.to_string(), "body must only contain a single JSON value");

        // Trailing whitespace is fine.
        let payload: Payload = decode(b"{\"title\": \"a\"}  \n").unwrap();
        assert_eq!(payload.title, "a");
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected_before_parsing() {
        let big = vec![b' '; MAX_BODY_BYTES + 1];
        let req = Request::builder().body(Body::from(big)).unwrap();

        let err = read_json::<Payload>(req).await.unwrap_err();
        assert_eq!(err, ReadError::TooLarge(MAX_BODY_BYTES));
        assert_eq!(
            err.to_string(),
            "body must not be larger than 1048576 bytes"
        );
    }

    #[tokio::test]
    async fn body_at_the_cap_is_accepted() {
        let mut body = br#"{"title": "x"}"#.to_vec();
        body.resize(MAX_BODY_BYTES, b' ');
        let req = Request::builder().body(Body::from(body)).unwrap();

        let payload = read_json::<Payload>(req).await.unwrap();
        assert_eq!(payload.title, "x");
    }

    #[test]
    fn write_json_indents_and_appends_newline() {
        #[derive(Serialize)]
        struct Envelope {
            message: &'static str,
        }

        let response = write_json(
            StatusCode::OK,
            &Envelope { message: "ok" },
            HeaderMap::new(),
        )
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn write_json_merges_caller_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::LOCATION, HeaderValue::from_static("/v1/titles/1"));

        let response = write_json(StatusCode::CREATED, &serde_json::json!({}), headers).unwrap();
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/v1/titles/1"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
