use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dynamic::Tagged;
use crate::error::{CodecError, CodecResult};

/// Serialization strategy for the values stored under one field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// Scalar text passthrough. Strings are stored verbatim, numbers and
    /// booleans as their decimal/`true`/`false` text.
    #[default]
    Raw,
    /// `bincode` bytes of a self-describing value tree.
    ///
    /// Values are first mapped to their JSON data model, so bytes written
    /// for a typed value decode as the equivalent untyped value and the
    /// other way round. A shape mismatch on decode is an error.
    Binary,
    /// JSON text.
    Json,
}

impl Codec {
    /// Encode a value into backend bytes.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<Vec<u8>> {
        match self {
            Self::Raw => encode_raw(value),
            Self::Binary => encode_binary(value),
            Self::Json => {
                serde_json::to_vec(value).map_err(|e| CodecError::Serialization(e.to_string()))
            }
        }
    }

    /// Decode backend bytes into a value.
    pub fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> CodecResult<T> {
        match self {
            Self::Raw => decode_raw(data),
            Self::Binary => decode_binary(data),
            Self::Json => {
                serde_json::from_slice(data).map_err(|e| CodecError::Serialization(e.to_string()))
            }
        }
    }

    /// Config name of this codec.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Binary => "binary",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = CodecError;

    fn from_str(s: &str) -> CodecResult<Self> {
        match s {
            "raw" => Ok(Self::Raw),
            "binary" => Ok(Self::Binary),
            "json" => Ok(Self::Json),
            other => Err(CodecError::Serialization(format!("unknown codec: {other}"))),
        }
    }
}

fn encode_binary<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let value =
        serde_json::to_value(value).map_err(|e| CodecError::Serialization(e.to_string()))?;
    bincode::serialize(&Tagged::from(&value)).map_err(|e| CodecError::Serialization(e.to_string()))
}

fn decode_binary<T: DeserializeOwned>(data: &[u8]) -> CodecResult<T> {
    let tagged: Tagged =
        bincode::deserialize(data).map_err(|e| CodecError::Serialization(e.to_string()))?;
    serde_json::from_value(Value::from(tagged))
        .map_err(|e| CodecError::Serialization(e.to_string()))
}

fn encode_raw<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let value =
        serde_json::to_value(value).map_err(|e| CodecError::Serialization(e.to_string()))?;
    match value {
        Value::String(s) => Ok(s.into_bytes()),
        Value::Number(n) => Ok(n.to_string().into_bytes()),
        Value::Bool(b) => Ok(b.to_string().into_bytes()),
        Value::Null => Err(CodecError::UnsupportedType("null".into())),
        Value::Array(_) => Err(CodecError::UnsupportedType("array".into())),
        Value::Object(_) => Err(CodecError::UnsupportedType("object".into())),
    }
}

/// Stored text is offered as a string first, then as a JSON scalar so that
/// numeric and boolean targets can read what `encode_raw` wrote.
fn decode_raw<T: DeserializeOwned>(data: &[u8]) -> CodecResult<T> {
    let text = std::str::from_utf8(data)
        .map_err(|e| CodecError::Serialization(format!("raw value is not UTF-8: {e}")))?;
    if let Ok(value) = serde_json::from_value(Value::String(text.to_string())) {
        return Ok(value);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(scalar @ (Value::Number(_) | Value::Bool(_))) => serde_json::from_value(scalar)
            .map_err(|e| CodecError::Serialization(e.to_string())),
        _ => Err(CodecError::Serialization(format!(
            "raw value {text:?} does not match the requested type"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DynamicValue;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Job {
        id: u64,
        name: String,
        tags: Vec<String>,
        meta: BTreeMap<String, i32>,
    }

    fn job() -> Job {
        Job {
            id: 9,
            name: "render".into(),
            tags: vec!["a".into(), "b".into()],
            meta: BTreeMap::from([("retries".into(), 3)]),
        }
    }

    // ---- Raw ----

    #[test]
    fn raw_string_is_passthrough() {
        assert_eq!(Codec::Raw.encode("hello").unwrap(), b"hello");
        let back: String = Codec::Raw.decode(b"hello").unwrap();
        assert_eq!(back, "hello");
    }

    #[test]
    fn raw_numbers_are_decimal_text() {
        assert_eq!(Codec::Raw.encode(&42i64).unwrap(), b"42");
        let back: i64 = Codec::Raw.decode(b"-17").unwrap();
        assert_eq!(back, -17);
        let back: bool = Codec::Raw.decode(b"true").unwrap();
        assert!(back);
    }

    #[test]
    fn raw_numeric_text_reads_as_string() {
        let back: String = Codec::Raw.decode(b"007").unwrap();
        assert_eq!(back, "007");
    }

    #[test]
    fn raw_rejects_structures() {
        let err = Codec::Raw.encode(&job()).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedType("object".into()));
        let err = Codec::Raw.encode(&vec![1, 2]).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedType("array".into()));
        let err = Codec::Raw.encode(&Option::<i32>::None).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedType("null".into()));
    }

    #[test]
    fn raw_type_mismatch_fails() {
        let err = Codec::Raw.decode::<i64>(b"not a number").unwrap_err();
        assert!(matches!(err, CodecError::Serialization(_)));
    }

    #[test]
    fn raw_non_utf8_fails() {
        let err = Codec::Raw.decode::<String>(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, CodecError::Serialization(_)));
    }

    // ---- Binary / Json ----

    #[test]
    fn binary_roundtrip_struct() {
        let bytes = Codec::Binary.encode(&job()).unwrap();
        let back: Job = Codec::Binary.decode(&bytes).unwrap();
        assert_eq!(back, job());
    }

    #[test]
    fn binary_typed_and_dynamic_share_layout() {
        let typed = Codec::Binary.encode(&job()).unwrap();
        let dynamic: DynamicValue = Codec::Binary.decode(&typed).unwrap();
        assert_eq!(dynamic.0, serde_json::to_value(job()).unwrap());
        assert_eq!(Codec::Binary.encode(&dynamic).unwrap(), typed);

        let written = Codec::Binary
            .encode(&DynamicValue(serde_json::json!({
                "id": 2,
                "name": "y",
                "tags": [],
                "meta": {"n": 1}
            })))
            .unwrap();
        let back: Job = Codec::Binary.decode(&written).unwrap();
        assert_eq!(back.id, 2);
        assert_eq!(back.name, "y");
        assert_eq!(back.meta.get("n"), Some(&1));
    }

    #[test]
    fn binary_shape_mismatch_is_error() {
        let bytes = Codec::Binary
            .encode(&DynamicValue(serde_json::json!({"id": 1})))
            .unwrap();
        assert!(matches!(
            Codec::Binary.decode::<Job>(&bytes).unwrap_err(),
            CodecError::Serialization(_)
        ));
        let bytes = Codec::Binary.encode(&job()).unwrap();
        assert!(Codec::Binary.decode::<Vec<String>>(&bytes).is_err());
    }

    #[test]
    fn json_is_readable_text() {
        let bytes = Codec::Json.encode(&job()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"name\":\"render\""));
        let back: Job = Codec::Json.decode(&bytes).unwrap();
        assert_eq!(back, job());
    }

    #[test]
    fn malformed_input_is_serialization_error() {
        assert!(matches!(
            Codec::Binary.decode::<Job>(&[1, 2]).unwrap_err(),
            CodecError::Serialization(_)
        ));
        assert!(matches!(
            Codec::Json.decode::<Job>(b"{not json").unwrap_err(),
            CodecError::Serialization(_)
        ));
    }

    #[test]
    fn codec_mismatch_is_detected_for_json_reader() {
        let bytes = Codec::Binary.encode(&job()).unwrap();
        assert!(Codec::Json.decode::<Job>(&bytes).is_err());
    }

    // ---- Names ----

    #[test]
    fn names_roundtrip() {
        for codec in [Codec::Raw, Codec::Binary, Codec::Json] {
            assert_eq!(codec.name().parse::<Codec>().unwrap(), codec);
            assert_eq!(codec.to_string(), codec.name());
        }
        assert!("pickle".parse::<Codec>().is_err());
        assert_eq!(Codec::default(), Codec::Raw);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Codec::Binary).unwrap(), "\"binary\"");
        let c: Codec = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(c, Codec::Json);
    }

    proptest! {
        #[test]
        fn binary_and_json_roundtrip(
            id in any::<u64>(),
            name in ".*",
            tags in proptest::collection::vec("[a-z]{0,8}", 0..5),
        ) {
            let value = Job { id, name, tags, meta: BTreeMap::new() };
            for codec in [Codec::Binary, Codec::Json] {
                let bytes = codec.encode(&value).unwrap();
                let back: Job = codec.decode(&bytes).unwrap();
                prop_assert_eq!(&back, &value);
            }
        }

        #[test]
        fn raw_roundtrips_integers(n in any::<i64>()) {
            let bytes = Codec::Raw.encode(&n).unwrap();
            let back: i64 = Codec::Raw.decode(&bytes).unwrap();
            prop_assert_eq!(back, n);
        }
    }
}
