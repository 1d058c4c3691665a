use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a unit-of-work (a transaction name or id assigned by the
/// host transaction manager).
///
/// The "no transaction" case is expressed as `Option<TrxId>` at the policy
/// boundary: `None` means the item runs outside any unit-of-work and is
/// dispatched immediately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrxId(String);

impl TrxId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrxId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TrxId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Identity of a scheduler use case. Part of the registry key, so two
/// schedulers sharing a transaction keep independent collectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UseCaseId(String);

impl UseCaseId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UseCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UseCaseId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Identity of the processor that will execute a workpackage. Carried
/// inside the workpackage and never interpreted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessorId(String);

impl ProcessorId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProcessorId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Identifies a unique live collector: (use case, transaction)
///
/// Also the hook key handed to the external transaction manager. An
/// explicit composite type, so unrelated use cases sharing a transaction
/// can never collide the way concatenated string keys can.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectorKey {
    pub use_case: UseCaseId,
    pub transaction: TrxId,
}

impl CollectorKey {
    pub fn new(use_case: UseCaseId, transaction: TrxId) -> Self {
        Self {
            use_case,
            transaction,
        }
    }
}

impl fmt::Display for CollectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.use_case, self.transaction)
    }
}
