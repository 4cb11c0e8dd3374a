//! Finalized extrinsic receipts.

use crate::chain::DispatchError;
use crate::error::{PolymeshError, PolymeshResult};
use polymesh_sdk_types::H256;
use serde::{Deserialize, Serialize};

/// An event emitted while an extrinsic executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// The emitting pallet, e.g. `identity`.
    pub section: String,
    /// The event name, e.g. `AuthorizationAdded`.
    pub method: String,
    /// The decoded event payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ChainEvent {
    /// Creates an event.
    pub fn new(
        section: impl Into<String>,
        method: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            section: section.into(),
            method: method.into(),
            data,
        }
    }

    /// Returns true if this is `section.method`.
    pub fn is(&self, section: &str, method: &str) -> bool {
        self.section == section && self.method == method
    }
}

/// The leg of an atomic batch that interrupted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInterruption {
    /// Position of the failing call within the batch.
    pub index: usize,
    /// Why it failed.
    pub error: DispatchError,
}

/// The outcome of a finalized extrinsic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Hash of the extrinsic.
    pub tx_hash: H256,
    /// Hash of the including block.
    pub block_hash: H256,
    /// Number of the including block.
    pub block_number: u64,
    /// Index of the extrinsic within the block.
    pub tx_index: u32,
    /// Set when the runtime rejected the dispatched call.
    #[serde(default)]
    pub dispatch_error: Option<DispatchError>,
    /// Events emitted by the extrinsic.
    #[serde(default)]
    pub events: Vec<ChainEvent>,
}

impl Receipt {
    /// Returns the first event named `section.method`.
    pub fn find_event(&self, section: &str, method: &str) -> Option<&ChainEvent> {
        self.events.iter().find(|e| e.is(section, method))
    }

    /// Returns true if the runtime accepted the dispatched call.
    pub fn is_success(&self) -> bool {
        self.dispatch_error.is_none()
    }

    /// Decodes the `utility.BatchInterrupted` event, if present.
    ///
    /// An atomic batch whose leg fails still finalizes; the failure is only
    /// visible through this event.
    pub fn batch_interruption(&self) -> PolymeshResult<Option<BatchInterruption>> {
        match self.find_event("utility", "BatchInterrupted") {
            Some(event) => serde_json::from_value(event.data.clone())
                .map(Some)
                .map_err(|e| {
                    PolymeshError::Internal(format!("malformed BatchInterrupted event: {e}"))
                }),
            None => Ok(None),
        }
    }

    /// Decodes field `field` of the first `section.method` event.
    pub fn event_field<T: serde::de::DeserializeOwned>(
        &self,
        section: &str,
        method: &str,
        field: &str,
    ) -> PolymeshResult<T> {
        let event = self.find_event(section, method).ok_or_else(|| {
            PolymeshError::Internal(format!("receipt has no {section}.{method} event"))
        })?;
        let value = event.data.get(field).cloned().ok_or_else(|| {
            PolymeshError::Internal(format!("{section}.{method} event has no field '{field}'"))
        })?;
        Ok(serde_json::from_value(value)?)
    }
}
