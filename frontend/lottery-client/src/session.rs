// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Submission of intents with at most one transaction in flight.

use std::sync::atomic::{AtomicBool, Ordering};

use lottery_abi::{ClaimKind, LotteryError, Result, TransactionDigest, TransactionIntent};
use serde::Serialize;
use tracing::{error, info};

use crate::{node::TransactionSigner, units::format_display};

/// User action a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    /// Entry; the amount is the payment of the submitted intent.
    Enter,
    DrawWinner,
    Claim(ClaimKind),
}

impl ActionKind {
    fn success_message(self, intent: &TransactionIntent) -> String {
        match self {
            ActionKind::Enter => match intent.payment() {
                Some(amount) => format!(
                    "Successfully entered the lottery with {} SUI!",
                    format_display(amount, 0, 9)
                ),
                None => "Successfully entered the lottery!".to_string(),
            },
            ActionKind::DrawWinner => "Winner drawn successfully!".to_string(),
            ActionKind::Claim(ClaimKind::Prize) => "Prize claimed successfully!".to_string(),
            ActionKind::Claim(ClaimKind::Refund) => "Refund claimed successfully!".to_string(),
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            ActionKind::Enter => "Error entering lottery",
            ActionKind::DrawWinner => "Error drawing winner",
            ActionKind::Claim(ClaimKind::Prize) => "Error claiming prize",
            ActionKind::Claim(ClaimKind::Refund) => "Error claiming refund",
        }
    }
}

/// Outcome of a user action, ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notification {
    Success {
        action: ActionKind,
        digest: TransactionDigest,
        message: String,
    },
    Failure {
        action: ActionKind,
        error: LotteryErrorKind,
        message: String,
    },
}

/// Error category carried by a failure notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LotteryErrorKind {
    AbsentState,
    InvalidAmount,
    MissingAccount,
    SubmissionFailure,
    Busy,
    Fetch,
    InvalidParameters,
    Paused,
}

impl From<&LotteryError> for LotteryErrorKind {
    fn from(error: &LotteryError) -> Self {
        match error {
            LotteryError::AbsentState => LotteryErrorKind::AbsentState,
            LotteryError::InvalidAmount(_) => LotteryErrorKind::InvalidAmount,
            LotteryError::MissingAccount => LotteryErrorKind::MissingAccount,
            LotteryError::SubmissionFailure(_) => LotteryErrorKind::SubmissionFailure,
            LotteryError::Busy => LotteryErrorKind::Busy,
            LotteryError::Fetch(_) => LotteryErrorKind::Fetch,
            LotteryError::InvalidParameters(_) => LotteryErrorKind::InvalidParameters,
            LotteryError::Paused => LotteryErrorKind::Paused,
        }
    }
}

impl Notification {
    /// Success of `action`, described from the intent that was executed.
    pub fn success(action: ActionKind, intent: &TransactionIntent, digest: TransactionDigest) -> Self {
        Notification::Success {
            action,
            message: action.success_message(intent),
            digest,
        }
    }

    pub fn failure(action: ActionKind, error: &LotteryError) -> Self {
        let message = match error {
            LotteryError::InvalidAmount(_) => "Please enter a valid, positive amount.".to_string(),
            LotteryError::MissingAccount => "Please connect a wallet first.".to_string(),
            LotteryError::SubmissionFailure(reason) => format!("{}: {}", action.failure_prefix(), reason),
            other => format!("{}: {}", action.failure_prefix(), other),
        };
        Notification::Failure {
            action,
            error: error.into(),
            message,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notification::Success { message, .. } | Notification::Failure { message, .. } => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notification::Success { .. })
    }
}

/// Clears the busy flag when the submission ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Gate that lets one transaction at a time reach the signer.
///
/// There is no timeout: a signer that never answers keeps the session busy
/// until the pending submission is dropped. Reads and projections are not
/// affected.
#[derive(Debug, Default)]
pub struct ActionSession {
    busy: AtomicBool,
}

impl ActionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(&self.busy))
            .map_err(|_| LotteryError::Busy)
    }

    /// Hands `intent` to the signer. Fails with `Busy` while another submission is pending.
    pub async fn submit<S: TransactionSigner>(
        &self,
        signer: &S,
        intent: &TransactionIntent,
    ) -> Result<TransactionDigest> {
        let _guard = self.acquire()?;
        let target = intent.entry_point.target();
        info!(%target, arguments = intent.arguments.len(), "submitting transaction");

        match signer.sign_and_execute(intent).await {
            Ok(digest) => {
                info!(%target, %digest, "transaction executed");
                Ok(digest)
            }
            Err(message) => {
                error!(%target, error = %message, "transaction failed");
                Err(LotteryError::SubmissionFailure(message))
            }
        }
    }

    /// Runs one user action end to end and converts its outcome into a notification.
    ///
    /// `intent` is the builder's result, so validation failures are reported
    /// without reaching the signer. `on_success` runs after execution, typically
    /// to ask the poller for fresh state; nothing is updated optimistically.
    pub async fn perform<S: TransactionSigner>(
        &self,
        signer: &S,
        action: ActionKind,
        intent: Result<TransactionIntent>,
        on_success: impl FnOnce(),
    ) -> Notification {
        let intent = match intent {
            Ok(intent) => intent,
            Err(error) => return Notification::failure(action, &error),
        };
        match self.submit(signer, &intent).await {
            Ok(digest) => {
                on_success();
                Notification::success(action, &intent, digest)
            }
            Err(error) => Notification::failure(action, &error),
        }
    }
}
