//! Blob <-> data-URI transcoding for session attachments

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// MIME type assumed for blobs that do not declare one
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A binary payload with its MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    mime_type: String,
    bytes: Vec<u8>,
}

/// Named attachments, keyed the way the caller keyed them
pub type Attachments = BTreeMap<String, Blob>;

impl Blob {
    /// Create a blob. An empty MIME type is stored as `application/octet-stream`.
    pub fn new(mime_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let mime_type = mime_type.into();
        let mime_type = if mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE.to_string()
        } else {
            mime_type
        };
        Self {
            mime_type,
            bytes: bytes.into(),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Convert to a data URI (`data:<mime>;base64,<payload>`)
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.bytes))
    }

    /// Parse a base64 data URI.
    ///
    /// Everything between `data:` and the trailing `;base64` marker is the
    /// MIME type, parameters included, so `audio/webm;codecs=opus` survives.
    /// The payload is split off at the last comma; base64 never contains one,
    /// while parameters such as `codecs=vp8,opus` may.
    pub fn from_data_uri(data_uri: &str) -> Option<Self> {
        let rest = data_uri.strip_prefix("data:")?;
        let (header, payload) = rest.rsplit_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        let bytes = BASE64.decode(payload.trim()).ok()?;
        Some(Self::new(mime_type, bytes))
    }
}

/// Encode every blob to a data-URI string under the same key
pub fn encode_attachments(attachments: &Attachments) -> Map<String, Value> {
    attachments
        .iter()
        .map(|(key, blob)| (key.clone(), Value::String(blob.to_data_uri())))
        .collect()
}

/// Decode data-URI strings back into blobs.
///
/// Entries that are not strings or not valid base64 data URIs are dropped.
pub fn decode_attachments(encoded: &Map<String, Value>) -> Attachments {
    let mut attachments = Attachments::new();
    for (key, value) in encoded {
        match value.as_str().and_then(Blob::from_data_uri) {
            Some(blob) => {
                attachments.insert(key.clone(), blob);
            }
            None => warn!("Dropping undecodable attachment: {}", key),
        }
    }
    attachments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_uri_format() {
        let blob = Blob::new("audio/mpeg", b"hello".to_vec());
        assert_eq!(blob.to_data_uri(), "data:audio/mpeg;base64,aGVsbG8=");
    }

    #[test]
    fn test_mime_parameters_survive() {
        let blob = Blob::new("audio/webm;codecs=opus", vec![0u8, 1, 2, 255]);
        let decoded = Blob::from_data_uri(&blob.to_data_uri()).unwrap();
        assert_eq!(decoded, blob);
        assert_eq!(decoded.mime_type(), "audio/webm;codecs=opus");
    }

    #[test]
    fn test_mime_parameters_with_commas() {
        let blob = Blob::new("video/webm;codecs=vp8,opus", vec![1u8, 2, 3]);
        let uri = blob.to_data_uri();
        assert_eq!(uri, "data:video/webm;codecs=vp8,opus;base64,AQID");

        let decoded = Blob::from_data_uri(&uri).unwrap();
        assert_eq!(decoded.mime_type(), "video/webm;codecs=vp8,opus");
        assert_eq!(decoded, blob);
    }

    #[test]
    fn test_empty_mime_defaults() {
        let blob = Blob::new("", vec![1u8]);
        assert_eq!(blob.mime_type(), DEFAULT_MIME_TYPE);
        assert_eq!(Blob::from_data_uri("data:;base64,AQ==").unwrap(), blob);
    }

    #[test]
    fn test_empty_blob() {
        let blob = Blob::new("audio/wav", Vec::new());
        assert!(blob.is_empty());
        assert_eq!(blob.to_data_uri(), "data:audio/wav;base64,");
        assert_eq!(Blob::from_data_uri(&blob.to_data_uri()).unwrap(), blob);
    }

    #[test]
    fn test_rejects_malformed_uris() {
        assert!(Blob::from_data_uri("").is_none());
        assert!(Blob::from_data_uri("aGVsbG8=").is_none());
        assert!(Blob::from_data_uri("data:audio/mpeg;base64").is_none());
        assert!(Blob::from_data_uri("data:text/plain,hello").is_none());
        assert!(Blob::from_data_uri("data:audio/mpeg;base64,@@@").is_none());
    }

    #[test]
    fn test_attachments_keep_keys() {
        let mut attachments = Attachments::new();
        attachments.insert("B".to_string(), Blob::new("audio/mpeg", vec![1u8, 2]));
        attachments.insert("7".to_string(), Blob::new("audio/ogg", vec![3u8]));

        let encoded = encode_attachments(&attachments);
        assert_eq!(encoded.len(), 2);
        assert_eq!(encoded["7"], json!("data:audio/ogg;base64,Aw=="));

        assert_eq!(decode_attachments(&encoded), attachments);
    }

    #[test]
    fn test_decode_drops_bad_entries() {
        let encoded = json!({
            "good": "data:audio/mpeg;base64,AQI=",
            "number": 42,
            "text": "not a data uri",
            "empty": "",
        });

        let decoded = decode_attachments(encoded.as_object().unwrap());
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded["good"].bytes(), &[1u8, 2]);
    }
}
