use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::HandlerError;

/// How a typed payload is stored in the item's string `payload` column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadCodec {
    /// Human readable JSON.
    #[default]
    Json,
    /// Compact bitcode binary, base64 encoded.
    Bitcode,
}

impl PayloadCodec {
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String, HandlerError> {
        match self {
            PayloadCodec::Json => Ok(serde_json::to_string(value)?),
            PayloadCodec::Bitcode => {
                let bytes = bitcode::serialize(value)
                    .map_err(|err| HandlerError::Codec(err.to_string()))?;
                Ok(STANDARD.encode(bytes))
            }
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, payload: &str) -> Result<T, HandlerError> {
        match self {
            PayloadCodec::Json => Ok(serde_json::from_str(payload)?),
            PayloadCodec::Bitcode => {
                let bytes = STANDARD
                    .decode(payload)
                    .map_err(|err| HandlerError::Codec(err.to_string()))?;
                bitcode::deserialize(&bytes).map_err(|err| HandlerError::Codec(err.to_string()))
            }
        }
    }
}
