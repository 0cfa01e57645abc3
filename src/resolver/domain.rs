//! Domain canonicalization and record decoding.
//!
//! Both functions are pure; all network I/O lives in `client.rs`.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use url::Url;

use crate::resolver::types::{InvokeResult, ResolverError, ResolverResult};

/// Strip a leading `http://` or `https://` and every trailing `/`.
///
/// `http://test.neo/` becomes `test.neo`. Anything else is left as-is, so
/// malformed input simply fails to resolve later.
pub fn canonical_domain(request_url: &str) -> String {
    let without_scheme = request_url
        .strip_prefix("https://")
        .or_else(|| request_url.strip_prefix("http://"))
        .unwrap_or(request_url);
    without_scheme.trim_end_matches('/').to_string()
}

/// The base64 record in `stack[0].value`.
pub fn stack_value(result: &InvokeResult) -> ResolverResult<&str> {
    result
        .stack
        .first()
        .and_then(|item| item.value.as_ref())
        .and_then(|value| value.as_str())
        .filter(|value| !value.is_empty())
        .ok_or(ResolverError::MissingValue)
}

/// Standard alphabet; trailing `=` padding is optional.
const RECORD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a base64 record into a `https://` destination URL.
pub fn decode_target(encoded: &str) -> ResolverResult<Url> {
    let bytes = RECORD_ENGINE.decode(encoded)?;
    let text = String::from_utf8(bytes)?;
    if text.is_empty() {
        return Err(ResolverError::EmptyRecord);
    }
    Ok(Url::parse(&format!("https://{}", text))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::types::StackItem;

    fn encode(text: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(text)
    }

    #[test]
    fn test_canonical_domain() {
        assert_eq!(canonical_domain("http://test.neo/"), "test.neo");
        assert_eq!(canonical_domain("https://test.neo///"), "test.neo");
        assert_eq!(canonical_domain("test.neo"), "test.neo");
        assert_eq!(canonical_domain("https://sub.test.neo/path/"), "sub.test.neo/path");
        assert_eq!(canonical_domain("ftp://test.neo/"), "ftp://test.neo");
    }

    #[test]
    fn test_decode_target() {
        let url = decode_target(&encode("example.com/page")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");

        let url = decode_target(&encode("example.com")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_decode_target_accepts_missing_padding() {
        let padded = encode("example.com");
        assert!(padded.ends_with('='));
        let unpadded = padded.trim_end_matches('=');
        assert_eq!(decode_target(unpadded).unwrap(), decode_target(&padded).unwrap());
    }

    #[test]
    fn test_decode_target_is_deterministic() {
        let encoded = encode("ipfs.example.org/site/");
        assert_eq!(decode_target(&encoded).unwrap(), decode_target(&encoded).unwrap());
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(decode_target("!!not base64!!"), Err(ResolverError::Base64(_))));
        assert!(matches!(decode_target(""), Err(ResolverError::EmptyRecord)));
        assert!(matches!(decode_target("/w=="), Err(ResolverError::Utf8(_))));
        assert!(matches!(
            decode_target(&encode("exa mple.com")),
            Err(ResolverError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_stack_value() {
        let result = InvokeResult {
            stack: vec![StackItem {
                kind: Some("ByteString".to_string()),
                value: Some(serde_json::json!("ZXhhbXBsZS5jb20=")),
            }],
            ..Default::default()
        };
        assert_eq!(stack_value(&result).unwrap(), "ZXhhbXBsZS5jb20=");

        let empty = InvokeResult {
            stack: vec![StackItem {
                kind: Some("ByteString".to_string()),
                value: Some(serde_json::json!("")),
            }],
            ..Default::default()
        };
        assert!(matches!(stack_value(&empty), Err(ResolverError::MissingValue)));
        assert!(matches!(
            stack_value(&InvokeResult::default()),
            Err(ResolverError::MissingValue)
        ));
    }
}
