/// Transaction types for hashledger
use serde_json::{json, Number, Value};
use std::fmt;

/// Sender recorded on the reward transaction: the coin is newly minted.
pub const REWARD_SENDER: &str = "0";

/// Units paid to the miner for every forged block.
pub const MINING_REWARD: u64 = 1;

/// The value carried by a transaction.
///
/// No balance model exists, so amounts are recorded as submitted: either a
/// JSON number or a free-form token such as `"5 BTC"`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(Number),
    Text(String),
}

impl Amount {
    /// Returns `None` for NaN and infinities, which JSON cannot carry.
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Amount::Number)
    }

    pub fn to_value(&self) -> Value {
        match self {
            Amount::Number(n) => Value::Number(n.clone()),
            Amount::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount::Number(value.into())
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::Number(value.into())
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_string())
    }
}

impl From<String> for Amount {
    fn from(value: String) -> Self {
        Amount::Text(value)
    }
}

/// A transfer waiting in the pending pool or recorded in a block
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Self {
        Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    /// The miner's reward for forging a block.
    pub fn reward(miner: impl Into<String>) -> Self {
        Transaction::new(REWARD_SENDER, miner, MINING_REWARD)
    }

    /// JSON object form used when hashing the enclosing block.
    pub fn canonical_value(&self) -> Value {
        json!({
            "sender": self.sender,
            "recipient": self.recipient,
            "amount": self.amount.to_value(),
        })
    }
}
