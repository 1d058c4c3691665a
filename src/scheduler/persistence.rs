//! Workpackage snapshot serialization
//!
//! A built workpackage sometimes has to cross a process or durability
//! boundary before it is executed (queue brokers, prepared-transaction
//! stores). This module provides a versioned wire form with JSON, binary
//! and compressed encodings. How and whether a snapshot is stored is the
//! queue infrastructure's business, not this crate's.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::collections::OrderedMap;
use crate::{TxBatchError, TxBatchResult};

use super::key::ProcessorId;
use super::queue::Workpackage;

/// Serialized workpackage format for persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkpackageSnapshot<C, M> {
    /// Schema version for forward compatibility
    pub version: u32,
    pub context: C,
    pub processor: ProcessorId,
    /// Parameters in map insertion order
    pub parameters: Vec<SnapshotParameter>,
    /// Elements in first-insertion order
    pub elements: Vec<M>,
    pub metadata: SnapshotMetadata,
}

/// One workpackage parameter.
///
/// The value is stored as JSON text: `serde_json::Value` deserializes via
/// `deserialize_any`, which non-self-describing encodings like bincode
/// reject, so the raw value cannot appear in the snapshot directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotParameter {
    pub name: String,
    /// JSON-encoded parameter value
    pub value: String,
}

/// Metadata about when and by what the snapshot was built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// ISO8601 timestamp when the snapshot was taken
    pub built_at: String,
    /// Version of the crate that produced the snapshot
    pub crate_version: String,
}

const SNAPSHOT_VERSION: u32 = 1;

impl<C, M> WorkpackageSnapshot<C, M>
where
    C: Serialize + DeserializeOwned,
    M: Serialize + DeserializeOwned,
{
    /// Take a snapshot of a built workpackage
    pub fn from_workpackage(workpackage: Workpackage<C, M>) -> TxBatchResult<Self> {
        let parameters = workpackage
            .parameters
            .iter()
            .map(|(name, value)| {
                Ok(SnapshotParameter {
                    name: name.clone(),
                    value: serde_json::to_string(value)?,
                })
            })
            .collect::<TxBatchResult<Vec<_>>>()?;

        Ok(Self {
            version: SNAPSHOT_VERSION,
            context: workpackage.context,
            processor: workpackage.processor,
            parameters,
            elements: workpackage.elements,
            metadata: SnapshotMetadata {
                built_at: chrono::Utc::now().to_rfc3339(),
                crate_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    /// Convert back into a workpackage
    pub fn into_workpackage(self) -> TxBatchResult<Workpackage<C, M>> {
        let mut parameters = OrderedMap::new();
        for parameter in self.parameters {
            parameters.insert(parameter.name, serde_json::from_str(&parameter.value)?);
        }

        Ok(Workpackage {
            context: self.context,
            processor: self.processor,
            parameters,
            elements: self.elements,
        })
    }

    /// Serialize to a JSON value (human-readable, easier debugging)
    pub fn to_json(&self) -> TxBatchResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| TxBatchError::Serialization {
            message: format!("Failed to serialize workpackage to JSON: {e}"),
        })
    }

    /// Deserialize from a JSON value
    pub fn from_json(json: serde_json::Value) -> TxBatchResult<Self> {
        serde_json::from_value(json).map_err(|e| TxBatchError::Serialization {
            message: format!("Failed to deserialize workpackage from JSON: {e}"),
        })
    }

    /// Serialize to binary format (compact, faster for large packages).
    ///
    /// The context and model types must themselves be encodable by a
    /// non-self-describing format (no `deserialize_any` in their serde
    /// impls); use the JSON encodings otherwise.
    pub fn to_binary(&self) -> TxBatchResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| TxBatchError::Serialization {
            message: format!("Failed to serialize workpackage to binary: {e}"),
        })
    }

    /// Deserialize from binary format
    pub fn from_binary(data: &[u8]) -> TxBatchResult<Self> {
        bincode::deserialize(data).map_err(|e| TxBatchError::Serialization {
            message: format!("Failed to deserialize binary workpackage: {e}"),
        })
    }

    /// Serialize to gzip-compressed JSON (balance of readability and size)
    pub fn to_compressed_json(&self) -> TxBatchResult<Vec<u8>> {
        let json = serde_json::to_vec(self).map_err(|e| TxBatchError::Serialization {
            message: format!("Failed to serialize workpackage to JSON: {e}"),
        })?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        Ok(encoder.finish()?)
    }

    /// Deserialize from gzip-compressed JSON
    pub fn from_compressed_json(data: &[u8]) -> TxBatchResult<Self> {
        let mut decoder = GzDecoder::new(data);
        let mut json = Vec::new();
        decoder.read_to_end(&mut json)?;

        serde_json::from_slice(&json).map_err(|e| TxBatchError::Serialization {
            message: format!("Failed to deserialize compressed workpackage: {e}"),
        })
    }
}
