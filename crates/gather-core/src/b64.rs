//! Serde adapter for optional binary blobs, encoded as base64 strings in
//! JSON. Used for event image payloads crossing the HTTP boundary.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(bytes: &Option<Vec<u8>>, ser: S) -> Result<S::Ok, S::Error>
where
  S: Serializer,
{
  match bytes {
    Some(b) => ser.serialize_some(&B64.encode(b)),
    None => ser.serialize_none(),
  }
}

pub fn deserialize<'de, D>(de: D) -> Result<Option<Vec<u8>>, D::Error>
where
  D: Deserializer<'de>,
{
  let encoded: Option<String> = Option::deserialize(de)?;
  encoded
    .map(|s| B64.decode(s).map_err(serde::de::Error::custom))
    .transpose()
}
