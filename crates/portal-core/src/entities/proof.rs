use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::enums::ProofType;
use crate::errors::CoreError;

/// A proof submitted for a task or challenge.
///
/// The variant is fixed at submission from the task's declared [`ProofType`].
/// `Image` holds a reference: a stored blob id locally, or a hosted file URL
/// when an endpoint hosts the blobs. Before persistence an `Image`
/// may briefly carry an inline `data:image/...` URI.
///
/// Serialized as `{"kind": "link", "value": "https://..."}`. A bare string is
/// also accepted and read as `Text`; callers holding the config re-type such
/// values with [`ProofValue::retyped`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProofValue {
    Text(String),
    Link(String),
    Image(String),
}

#[derive(Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
enum Tagged {
    Text(String),
    Link(String),
    Image(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Tagged(Tagged),
    Bare(String),
}

impl<'de> Deserialize<'de> for ProofValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Tagged(Tagged::Text(v)) | Repr::Bare(v) => Self::Text(v),
            Repr::Tagged(Tagged::Link(v)) => Self::Link(v),
            Repr::Tagged(Tagged::Image(v)) => Self::Image(v),
        })
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}

impl ProofValue {
    /// Classify a raw proof string against the declared proof type.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the value is empty, a link is not an
    /// http(s) URL, or an image is neither an inline image URI nor a URL.
    pub fn classify(proof_type: ProofType, key: &str, raw: &str) -> Result<Self, CoreError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoreError::Validation(format!("proof for '{key}' is empty")));
        }
        match proof_type {
            ProofType::Text => Ok(Self::Text(raw.to_string())),
            ProofType::Link if is_http_url(raw) => Ok(Self::Link(raw.to_string())),
            ProofType::Link => Err(CoreError::Validation(format!(
                "proof for '{key}' must be an http(s) link"
            ))),
            ProofType::Image if raw.starts_with("data:image/") || is_http_url(raw) => {
                Ok(Self::Image(raw.to_string()))
            }
            ProofType::Image => Err(CoreError::Validation(format!(
                "proof for '{key}' must be an image upload or image URL"
            ))),
        }
    }

    /// The declared type this value was classified as.
    #[must_use]
    pub const fn proof_type(&self) -> ProofType {
        match self {
            Self::Text(_) => ProofType::Text,
            Self::Link(_) => ProofType::Link,
            Self::Image(_) => ProofType::Image,
        }
    }

    /// The underlying string, whatever the variant.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(v) | Self::Link(v) | Self::Image(v) => v,
        }
    }

    /// Image proof still carrying an inline data URI.
    #[must_use]
    pub fn inline_image(&self) -> Option<&str> {
        match self {
            Self::Image(v) if v.starts_with("data:") => Some(v),
            _ => None,
        }
    }

    /// Re-type a value read back as `Text` according to the declared type.
    #[must_use]
    pub fn retyped(self, declared: ProofType) -> Self {
        match (self, declared) {
            (Self::Text(v), ProofType::Link) => Self::Link(v),
            (Self::Text(v), ProofType::Image) => Self::Image(v),
            (other, _) => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ProofType::Text, "@handle", ProofValue::Text("@handle".into()))]
    #[case(
        ProofType::Link,
        " https://github.com/me ",
        ProofValue::Link("https://github.com/me".into())
    )]
    #[case(
        ProofType::Image,
        "data:image/png;base64,AAAA",
        ProofValue::Image("data:image/png;base64,AAAA".into())
    )]
    #[case(
        ProofType::Image,
        "https://cdn.example.com/a.png",
        ProofValue::Image("https://cdn.example.com/a.png".into())
    )]
    fn classify_accepts(#[case] ty: ProofType, #[case] raw: &str, #[case] expected: ProofValue) {
        assert_eq!(ProofValue::classify(ty, "t1", raw).unwrap(), expected);
    }

    #[rstest]
    #[case(ProofType::Text, "   ")]
    #[case(ProofType::Link, "github.com/me")]
    #[case(ProofType::Image, "my cat picture")]
    fn classify_rejects(#[case] ty: ProofType, #[case] raw: &str) {
        assert!(matches!(
            ProofValue::classify(ty, "t1", raw),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn serializes_tagged() {
        let json = serde_json::to_value(ProofValue::Link("https://x.dev".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "link", "value": "https://x.dev"}));
    }

    #[test]
    fn bare_string_reads_as_text_and_retypes_by_declaration() {
        let value: ProofValue = serde_json::from_str("\"https://x.dev/shot.png\"").unwrap();
        assert_eq!(value, ProofValue::Text("https://x.dev/shot.png".into()));
        assert_eq!(
            value.retyped(ProofType::Image),
            ProofValue::Image("https://x.dev/shot.png".into())
        );
    }

    #[test]
    fn retyping_never_downgrades() {
        let value = ProofValue::Link("https://x.dev".into());
        assert_eq!(value.clone().retyped(ProofType::Text), value);
    }

    #[test]
    fn inline_image_only_for_data_uris() {
        assert!(ProofValue::Image("data:image/png;base64,AA".into()).inline_image().is_some());
        assert!(ProofValue::Image("blob-abc".into()).inline_image().is_none());
        assert!(ProofValue::Text("data:image/png".into()).inline_image().is_none());
    }
}
