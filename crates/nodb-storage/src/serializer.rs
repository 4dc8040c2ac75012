use nodb_core::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use crate::traits::StringSerializer;

pub const JSON_FILE_EXTENSION: &str = ".json";

/// JSON serializer writing `.json` files.
pub struct JsonStringSerializer<T> {
    pretty: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStringSerializer<T> {
    /// Pretty-printed output, so stored files stay readable and diffable.
    pub fn new() -> Self {
        Self {
            pretty: true,
            _marker: PhantomData,
        }
    }

    pub fn compact() -> Self {
        Self {
            pretty: false,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonStringSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StringSerializer<T> for JsonStringSerializer<T>
where
    T: Serialize + DeserializeOwned,
{
    fn expected_file_extension(&self) -> &str {
        JSON_FILE_EXTENSION
    }

    fn serialize(&self, obj: &T) -> StoreResult<String> {
        let result = if self.pretty {
            serde_json::to_string_pretty(obj)
        } else {
            serde_json::to_string(obj)
        };
        result.map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn try_deserialize(&self, payload: &str, key: &str) -> StoreResult<T> {
        serde_json::from_str(payload).map_err(|e| StoreError::Deserialization {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}
