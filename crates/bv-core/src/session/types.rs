//! Session types

use serde::Serialize;
use serde_json::{Map, Value};

use crate::session::codec::{Attachments, decode_attachments, encode_attachments};
use crate::{Error, Result};

/// Name given to a session saved without one
pub const DEFAULT_SESSION_NAME: &str = "Untitled_Bingo_Session";

/// Name given to a session exported without one
pub const DEFAULT_EXPORT_NAME: &str = "Exported_Bingo_Session";

/// `mode` reported by the list view when the generator state has none
pub const UNKNOWN_MODE: &str = "unknown";

// Record field names
const ID: &str = "id";
const NAME: &str = "name";
const DATE: &str = "date";
const GENERATOR_STATE: &str = "generatorState";
const CALLER_STATE: &str = "callerState";
const HEADER_AUDIO_BLOBS: &str = "headerAudioBlobs";
const ITEM_AUDIO_BLOBS: &str = "itemAudioBlobs";
const HEADER_AUDIO_DATA: &str = "headerAudioData";
const ITEM_AUDIO_DATA: &str = "itemAudioData";

/// A saved bingo/board session, in its in-memory shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Assigned by the store when absent
    pub id: Option<i64>,
    pub name: Option<String>,
    /// ISO-8601 timestamp, assigned by the store when absent
    pub date: Option<String>,
    /// Opaque generator payload
    pub generator_state: Value,
    pub caller_state: Option<CallerState>,
    /// Any other top-level fields, passed through untouched
    pub extra: Map<String, Value>,
}

/// Caller state: opaque fields plus the two audio attachment collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallerState {
    pub header_audio_blobs: Attachments,
    pub item_audio_blobs: Attachments,
    pub fields: Map<String, Value>,
}

impl Session {
    /// Create an unsaved session around a generator payload
    pub fn new(generator_state: Value) -> Self {
        Self {
            generator_state,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_caller_state(mut self, caller_state: CallerState) -> Self {
        self.caller_state = Some(caller_state);
        self
    }

    /// `generatorState.mode`, or `"unknown"`
    pub fn mode(&self) -> &str {
        generator_mode(&self.generator_state)
    }

    /// Length of `generatorState.itemPool`, or 0
    pub fn item_count(&self) -> usize {
        generator_item_count(&self.generator_state)
    }

    /// Total number of attached blobs
    pub fn attachment_count(&self) -> usize {
        self.caller_state
            .as_ref()
            .map(|c| c.header_audio_blobs.len() + c.item_audio_blobs.len())
            .unwrap_or(0)
    }

    /// Build the JSON record written to disk and to export files.
    ///
    /// Blob maps become `headerAudioData` / `itemAudioData` data-URI maps;
    /// the result shares no data with `self`.
    pub fn to_record(&self) -> Value {
        let mut record = self.extra.clone();

        if let Some(id) = self.id {
            record.insert(ID.to_string(), Value::from(id));
        }
        if let Some(name) = &self.name {
            record.insert(NAME.to_string(), Value::String(name.clone()));
        }
        if let Some(date) = &self.date {
            record.insert(DATE.to_string(), Value::String(date.clone()));
        }
        record.insert(GENERATOR_STATE.to_string(), self.generator_state.clone());

        if let Some(caller) = &self.caller_state {
            let mut caller_record = caller.fields.clone();
            caller_record.insert(
                HEADER_AUDIO_DATA.to_string(),
                Value::Object(encode_attachments(&caller.header_audio_blobs)),
            );
            caller_record.insert(
                ITEM_AUDIO_DATA.to_string(),
                Value::Object(encode_attachments(&caller.item_audio_blobs)),
            );
            record.insert(CALLER_STATE.to_string(), Value::Object(caller_record));
        }

        Value::Object(record)
    }

    /// Rebuild the in-memory shape from a JSON record.
    ///
    /// `*Data` maps are decoded back into blobs and removed from the caller
    /// fields. Fails with `InvalidSession` when the record is not an object.
    pub fn from_record(record: Value) -> Result<Self> {
        let Value::Object(mut record) = record else {
            return Err(Error::InvalidSession(
                "session record is not a JSON object".to_string(),
            ));
        };

        let id = record.remove(ID).as_ref().and_then(coerce_id);
        let name = take_string(&mut record, NAME);
        let date = take_string(&mut record, DATE);
        let generator_state = record.remove(GENERATOR_STATE).unwrap_or(Value::Null);

        // A callerState that is not an object carries no attachments; keep it as-is
        let caller_state = match record.remove(CALLER_STATE) {
            Some(Value::Object(fields)) => Some(CallerState::from_fields(fields)),
            Some(other) => {
                record.insert(CALLER_STATE.to_string(), other);
                None
            }
            None => None,
        };

        Ok(Self {
            id,
            name,
            date,
            generator_state,
            caller_state,
            extra: record,
        })
    }
}

impl CallerState {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    fn from_fields(mut fields: Map<String, Value>) -> Self {
        // Blob maps never carry real data once serialized
        fields.remove(HEADER_AUDIO_BLOBS);
        fields.remove(ITEM_AUDIO_BLOBS);

        let header_audio_blobs = take_attachments(&mut fields, HEADER_AUDIO_DATA);
        let item_audio_blobs = take_attachments(&mut fields, ITEM_AUDIO_DATA);

        Self {
            header_audio_blobs,
            item_audio_blobs,
            fields,
        }
    }
}

/// Lightweight list-view projection of a stored session; never carries attachments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: i64,
    pub name: Option<String>,
    pub date: String,
    pub mode: String,
    pub item_count: usize,
}

/// Integer key of a stored session.
///
/// Lookups accept anything that coerces to an integer: `i64`, or strings
/// such as `"1717243200000"` and `"1717243200000.0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub i64);

impl From<i64> for SessionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for SessionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i64>() {
            return Ok(Self(id));
        }
        s.parse::<f64>()
            .ok()
            .and_then(integral_f64_to_i64)
            .map(Self)
            .ok_or_else(|| Error::InvalidSession(format!("not a session id: {:?}", s)))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) fn generator_mode(generator_state: &Value) -> &str {
    generator_state
        .get("mode")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_MODE)
}

pub(crate) fn generator_item_count(generator_state: &Value) -> usize {
    generator_state
        .get("itemPool")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0)
}

fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral_f64_to_i64)),
        Value::String(s) => s.parse::<SessionId>().ok().map(|id| id.0),
        _ => None,
    }
}

/// Whole-number floats that fit in an `i64`; anything else is `None`
fn integral_f64_to_i64(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

fn take_string(record: &mut Map<String, Value>, key: &str) -> Option<String> {
    match record.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn take_attachments(fields: &mut Map<String, Value>, key: &str) -> Attachments {
    match fields.remove(key) {
        Some(Value::Object(encoded)) => decode_attachments(&encoded),
        _ => Attachments::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::codec::Blob;
    use serde_json::json;

    fn caller_with_audio() -> CallerState {
        let mut caller = CallerState::new(json!({"called": [3, 7]}).as_object().unwrap().clone());
        caller
            .header_audio_blobs
            .insert("B".to_string(), Blob::new("audio/mpeg", vec![1u8, 2, 3]));
        caller
            .item_audio_blobs
            .insert("cat".to_string(), Blob::new("audio/ogg", vec![9u8]));
        caller
    }

    #[test]
    fn test_record_shape() {
        let mut session = Session::new(json!({"mode": "words"}))
            .with_name("Animals")
            .with_caller_state(caller_with_audio());
        session.id = Some(42);
        session.date = Some("2024-06-01T00:00:00.000Z".to_string());

        let record = session.to_record();
        assert_eq!(record["id"], json!(42));
        assert_eq!(record["name"], json!("Animals"));
        assert_eq!(record["generatorState"]["mode"], json!("words"));
        assert_eq!(record["callerState"]["called"], json!([3, 7]));
        assert_eq!(
            record["callerState"]["headerAudioData"]["B"],
            json!("data:audio/mpeg;base64,AQID")
        );
        assert!(record["callerState"].get("headerAudioBlobs").is_none());
        assert!(record["callerState"].get("itemAudioBlobs").is_none());
    }

    #[test]
    fn test_record_without_caller_state() {
        let record = Session::new(json!({})).to_record();
        assert!(record.get("callerState").is_none());
        assert!(record.get("id").is_none());
    }

    #[test]
    fn test_empty_caller_state_writes_both_maps() {
        let record = Session::new(json!({}))
            .with_caller_state(CallerState::default())
            .to_record();
        assert_eq!(record["callerState"]["headerAudioData"], json!({}));
        assert_eq!(record["callerState"]["itemAudioData"], json!({}));
    }

    #[test]
    fn test_from_record_restores_blobs() {
        let mut session = Session::new(json!({"itemPool": ["a", "b"]}))
            .with_caller_state(caller_with_audio());
        session.extra.insert("theme".to_string(), json!("dark"));

        let restored = Session::from_record(session.to_record()).unwrap();
        assert_eq!(restored, session);
        assert!(!restored.caller_state.unwrap().fields.contains_key("itemAudioData"));
    }

    #[test]
    fn test_from_record_strips_stale_blob_maps() {
        let record = json!({
            "generatorState": {},
            "callerState": {
                "headerAudioBlobs": {"B": {}},
                "headerAudioData": {"B": "data:audio/mpeg;base64,AQ=="}
            }
        });

        let session = Session::from_record(record).unwrap();
        let caller = session.caller_state.unwrap();
        assert!(caller.fields.is_empty());
        assert_eq!(caller.header_audio_blobs["B"].bytes(), &[1u8]);
        assert!(caller.item_audio_blobs.is_empty());
    }

    #[test]
    fn test_non_object_caller_state_passes_through() {
        let record = json!({"generatorState": {}, "callerState": [1, 2]});

        let session = Session::from_record(record).unwrap();
        assert!(session.caller_state.is_none());
        assert_eq!(session.extra["callerState"], json!([1, 2]));

        let written = session.to_record();
        assert_eq!(written["callerState"], json!([1, 2]));
    }

    #[test]
    fn test_from_record_rejects_non_object() {
        assert!(matches!(
            Session::from_record(json!([1, 2])),
            Err(Error::InvalidSession(_))
        ));
    }

    #[test]
    fn test_mode_and_item_count() {
        let session = Session::new(json!({"mode": "numbers", "itemPool": [1, 2, 3]}));
        assert_eq!(session.mode(), "numbers");
        assert_eq!(session.item_count(), 3);

        let bare = Session::new(json!({"mode": 5, "itemPool": "nope"}));
        assert_eq!(bare.mode(), UNKNOWN_MODE);
        assert_eq!(bare.item_count(), 0);
    }

    #[test]
    fn test_session_id_coercion() {
        assert_eq!("1717243200000".parse::<SessionId>().unwrap(), SessionId(1717243200000));
        assert_eq!(" 12.0 ".parse::<SessionId>().unwrap(), SessionId(12));
        assert!("12.5".parse::<SessionId>().is_err());
        assert!("abc".parse::<SessionId>().is_err());
        assert_eq!(coerce_id(&json!("77")), Some(77));
        assert_eq!(coerce_id(&json!(77.0)), Some(77));
        assert_eq!(coerce_id(&json!(null)), None);
        assert_eq!(coerce_id(&json!(1e300)), None);
        assert_eq!(coerce_id(&json!(9.3e18)), None);
        assert_eq!(coerce_id(&json!(-9.3e18)), None);
        assert_eq!(coerce_id(&json!(-4096.0)), Some(-4096));
        assert!("1e300".parse::<SessionId>().is_err());
    }
}
