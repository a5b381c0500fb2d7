use derive_more::{AsRef, Display, From, FromStr};
use serde::{Deserialize, Serialize};

/// Identifier of a logged-in account (a "site").
#[repr(transparent)]
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, AsRef, From, FromStr, Display, derive_more::Debug)]
#[debug("AccountId({})", _0)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for AccountId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        AccountId(s.to_owned())
    }
}

/// Name under which a feature contributes to the aggregated badge counters.
#[repr(transparent)]
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, AsRef, From, FromStr, Display, derive_more::Debug)]
#[debug("CounterSourceId({})", _0)]
#[serde(transparent)]
pub struct CounterSourceId(pub String);

impl CounterSourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for CounterSourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CounterSourceId {
    fn from(s: &str) -> Self {
        CounterSourceId(s.to_owned())
    }
}
