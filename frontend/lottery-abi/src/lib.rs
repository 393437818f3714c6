// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*! Shared definitions for the no-rake lottery client */

use std::{fmt, time::Duration};

use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Smallest units (MIST) per display unit (SUI).
pub const UNIT_SCALE: u64 = 1_000_000_000;
/// Number of fractional digits of a display unit.
pub const UNIT_DECIMALS: u32 = 9;
pub const TICKER_SYMBOL: &str = "SUI";

/// Shared randomness object of the network.
pub const RANDOM_OBJECT_ID: &str = "0x8";
/// Shared clock object of the network.
pub const CLOCK_OBJECT_ID: &str = "0x6";

pub const DEFAULT_MODULE: &str = "no_rake_lotto";
pub const LOTTERY_STRUCT: &str = "Lottery";
pub const TICKET_STRUCT: &str = "Ticket";

pub const DEFAULT_STATE_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_BALANCE_POLL_INTERVAL_MS: u64 = 10_000;

pub type Result<T> = std::result::Result<T, LotteryError>;

/// Failures surfaced at the boundary of a single user action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LotteryError {
    /// The lottery object was not found or has an unexpected type.
    #[error("lottery state is not loaded yet")]
    AbsentState,
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("no account is connected")]
    MissingAccount,
    /// The signer or the network rejected the transaction; carries its message verbatim.
    #[error("{0}")]
    SubmissionFailure(String),
    /// Another transaction of this session is still in flight.
    #[error("a transaction is already in flight")]
    Busy,
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// Entries are rejected while the lottery is paused.
    #[error("the lottery is paused")]
    Paused,
}

/// Identifier of an on-chain object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

async_graphql::scalar!(ObjectId);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        ObjectId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        ObjectId::new(id)
    }
}

/// Account address of the connected wallet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

async_graphql::scalar!(Address);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Address(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digest returned by the signer for an executed transaction.
pub type TransactionDigest = String;

/// Long form of an account or package address: `0x` and 64 lowercase hex digits.
pub fn normalize_address(address: &str) -> String {
    let hex = address.strip_prefix("0x").unwrap_or(address);
    format!("0x{:0>64}", hex.to_ascii_lowercase())
}

/// Rewrites every address of a Move type tag in long form, generics included.
///
/// Nodes report `0x000...5f1c::module::Struct` where users configure `0x5f1c`,
/// so type tags are only compared in this form.
pub fn normalize_type_tag(type_tag: &str) -> String {
    let mut normalized = String::with_capacity(type_tag.len() + 64);
    let mut rest = type_tag;
    while let Some(start) = rest.find("0x") {
        let (before, after) = rest.split_at(start);
        normalized.push_str(before);
        let digits = after[2..].bytes().take_while(|b| b.is_ascii_hexdigit()).count();
        let token = &after[..2 + digits];
        let at_boundary = normalized
            .chars()
            .last()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'));
        if digits > 0 && at_boundary {
            normalized.push_str(&normalize_address(token));
        } else {
            normalized.push_str(token);
        }
        rest = &after[token.len()..];
    }
    normalized.push_str(rest);
    normalized
}

// ========================================
// Raw documents
// ========================================

/// An on-chain Move object as returned by the node: id, declared type and field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObject {
    pub object_id: ObjectId,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawObject {
    /// Unpacks one entry of a node object response (`{ data: { objectId, content } }`).
    ///
    /// Returns `None` when the entry carries no Move object content, e.g. for
    /// packages or for errors reported in place of the object.
    pub fn from_node_response(response: &Value) -> Option<Self> {
        let data = response.get("data").unwrap_or(response);
        let content = data.get("content")?;
        if content.get("dataType")?.as_str()? != "moveObject" {
            return None;
        }
        let object_id = data.get("objectId")?.as_str()?;
        let object_type = content
            .get("type")
            .or_else(|| data.get("type"))?
            .as_str()?;
        let fields = content.get("fields")?.as_object()?.clone();
        Some(RawObject {
            object_id: ObjectId::new(object_id),
            object_type: object_type.to_string(),
            fields,
        })
    }
}

// ========================================
// View models
// ========================================

/// Snapshot of the lottery object, amounts in MIST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct LotteryState {
    pub object_id: ObjectId,
    pub pool_balance: u64,
    pub current_round: u64,
    pub round_start_time: u64,
    pub is_paused: bool,
    pub admin_commission_rate: Option<u64>,
    pub end_eligible_time: Option<u64>,
    pub cancel_eligible_time: Option<u64>,
}

/// A ticket object owned by the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct Ticket {
    pub id: ObjectId,
    pub round: u64,
}

impl Ticket {
    /// Whether the ticket was bought in the round the lottery is currently running.
    pub fn is_current(&self, state: &LotteryState) -> bool {
        self.round == state.current_round
    }
}

/// Phase of the lottery as perceived by the client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, async_graphql::Enum)]
pub enum ViewPhase {
    Unknown, // Nothing requested yet
    Loading, // Requested, no usable state yet
    Paused,  // Entries rejected
    Open,    // Accepting entries
}

impl ViewPhase {
    pub fn of(state: Option<&LotteryState>, requested: bool) -> Self {
        match state {
            Some(state) if state.is_paused => ViewPhase::Paused,
            Some(_) => ViewPhase::Open,
            None if requested => ViewPhase::Loading,
            None => ViewPhase::Unknown,
        }
    }

    /// Only entries are gated by the client; draw and claim are left to the contract.
    pub fn permits_enter(self) -> bool {
        self == ViewPhase::Open
    }
}

// ========================================
// Transaction intents
// ========================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, async_graphql::Enum)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    Prize,
    Refund,
}

impl ClaimKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimKind::Prize => "prize",
            ClaimKind::Refund => "refund",
        }
    }
}

/// Fully-qualified Move function called by an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub package: String,
    pub module: String,
    pub function: String,
}

impl EntryPoint {
    pub fn target(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IntentArgument {
    /// Reference to an on-chain object.
    #[serde(rename_all = "camelCase")]
    Object { object_id: ObjectId },
    /// Coin of `amount` MIST split from the gas coin of the signer.
    GasPayment { amount: u64 },
}

impl IntentArgument {
    pub fn object(id: impl Into<ObjectId>) -> Self {
        IntentArgument::Object {
            object_id: id.into(),
        }
    }
}

/// A move call ready to be handed to the signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIntent {
    pub entry_point: EntryPoint,
    pub arguments: Vec<IntentArgument>,
}

impl TransactionIntent {
    /// MIST split from the gas coin, if the call takes a payment.
    pub fn payment(&self) -> Option<u64> {
        self.arguments.iter().find_map(|argument| match argument {
            IntentArgument::GasPayment { amount } => Some(*amount),
            IntentArgument::Object { .. } => None,
        })
    }
}

// ========================================
// Parameters
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryClientParameters {
    pub package_id: String,
    pub lottery_id: ObjectId,
    #[serde(default = "default_module")]
    pub module: String,
    #[serde(default = "default_state_poll_interval_ms")]
    pub state_poll_interval_ms: u64,
    #[serde(default = "default_balance_poll_interval_ms")]
    pub balance_poll_interval_ms: u64,
}

fn default_module() -> String {
    DEFAULT_MODULE.to_string()
}

fn default_state_poll_interval_ms() -> u64 {
    DEFAULT_STATE_POLL_INTERVAL_MS
}

fn default_balance_poll_interval_ms() -> u64 {
    DEFAULT_BALANCE_POLL_INTERVAL_MS
}

impl LotteryClientParameters {
    pub fn new(package_id: impl Into<String>, lottery_id: impl Into<ObjectId>) -> Self {
        LotteryClientParameters {
            package_id: package_id.into(),
            lottery_id: lottery_id.into(),
            module: default_module(),
            state_poll_interval_ms: DEFAULT_STATE_POLL_INTERVAL_MS,
            balance_poll_interval_ms: DEFAULT_BALANCE_POLL_INTERVAL_MS,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| LotteryError::InvalidParameters(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.package_id.is_empty() {
            return Err(LotteryError::InvalidParameters("empty package id".to_string()));
        }
        if self.lottery_id.is_empty() {
            return Err(LotteryError::InvalidParameters("empty lottery id".to_string()));
        }
        if self.state_poll_interval_ms == 0 || self.balance_poll_interval_ms == 0 {
            return Err(LotteryError::InvalidParameters(
                "poll intervals must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Declared Move type of the lottery object.
    pub fn lottery_type(&self) -> String {
        format!("{}::{}::{}", self.package_id, self.module, LOTTERY_STRUCT)
    }

    /// Declared Move type of ticket objects.
    pub fn ticket_type(&self) -> String {
        format!("{}::{}::{}", self.package_id, self.module, TICKET_STRUCT)
    }

    pub fn state_poll_interval(&self) -> Duration {
        Duration::from_millis(self.state_poll_interval_ms)
    }

    pub fn balance_poll_interval(&self) -> Duration {
        Duration::from_millis(self.balance_poll_interval_ms)
    }
}
