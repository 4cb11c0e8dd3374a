//! Transaction tags identifying chain calls.

use crate::error::{TypeError, TypeResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifies one dispatchable call as `module.call`, e.g. `asset.freeze`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxTag {
    module: String,
    call: String,
}

impl TxTag {
    /// Creates a tag from its module and call names.
    pub fn new(module: impl Into<String>, call: impl Into<String>) -> TypeResult<Self> {
        let module = module.into();
        let call = call.into();
        for part in [&module, &call] {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(TypeError::InvalidTxTag(format!("{module}.{call}")));
            }
        }
        Ok(Self { module, call })
    }

    /// The pallet / module name.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The call name within the module.
    pub fn call(&self) -> &str {
        &self.call
    }
}

impl fmt::Display for TxTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.call)
    }
}

impl fmt::Debug for TxTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxTag({self})")
    }
}

impl FromStr for TxTag {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, call) = s
            .split_once('.')
            .ok_or_else(|| TypeError::InvalidTxTag(s.to_string()))?;
        Self::new(module, call)
    }
}

impl Serialize for TxTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Well-known tags used by the SDK's procedures.
pub mod tags {
    use super::TxTag;

    fn tag(module: &str, call: &str) -> TxTag {
        TxTag {
            module: module.to_string(),
            call: call.to_string(),
        }
    }

    /// `asset.registerTicker`
    pub fn register_ticker() -> TxTag {
        tag("asset", "registerTicker")
    }

    /// `asset.createAsset`
    pub fn create_asset() -> TxTag {
        tag("asset", "createAsset")
    }

    /// `asset.freeze`
    pub fn freeze() -> TxTag {
        tag("asset", "freeze")
    }

    /// `asset.unfreeze`
    pub fn unfreeze() -> TxTag {
        tag("asset", "unfreeze")
    }

    /// `asset.issue`
    pub fn issue() -> TxTag {
        tag("asset", "issue")
    }

    /// `asset.addDocuments`
    pub fn add_documents() -> TxTag {
        tag("asset", "addDocuments")
    }

    /// `asset.removeDocuments`
    pub fn remove_documents() -> TxTag {
        tag("asset", "removeDocuments")
    }

    /// `identity.addAuthorization`
    pub fn add_authorization() -> TxTag {
        tag("identity", "addAuthorization")
    }

    /// `balances.transferWithMemo`
    pub fn transfer_with_memo() -> TxTag {
        tag("balances", "transferWithMemo")
    }

    /// `relayer.acceptPayingKey`
    pub fn accept_paying_key() -> TxTag {
        tag("relayer", "acceptPayingKey")
    }

    /// `utility.batchAtomic`
    pub fn batch_atomic() -> TxTag {
        tag("utility", "batchAtomic")
    }
}
