// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Transaction intents for each user action.
//!
//! Argument order and count match the Move signatures of the lottery module
//! and must not change independently of it.

use lottery_abi::{
    Address, ClaimKind, EntryPoint, IntentArgument, LotteryClientParameters, LotteryError,
    ObjectId, Result, TransactionIntent, CLOCK_OBJECT_ID, DEFAULT_MODULE, RANDOM_OBJECT_ID,
};
use tracing::debug;

use crate::units::parse_display_amount;

fn entry_point(package: &str, module: &str, function: impl Into<String>) -> EntryPoint {
    EntryPoint {
        package: package.to_string(),
        module: module.to_string(),
        function: function.into(),
    }
}

fn enter(package: &str, module: &str, lottery_id: &ObjectId, amount: u64) -> TransactionIntent {
    TransactionIntent {
        entry_point: entry_point(package, module, "enter"),
        arguments: vec![
            IntentArgument::object(lottery_id.clone()),
            IntentArgument::GasPayment { amount },
        ],
    }
}

fn draw_winner(package: &str, module: &str, lottery_id: &ObjectId) -> TransactionIntent {
    TransactionIntent {
        entry_point: entry_point(package, module, "draw_winner"),
        arguments: vec![
            IntentArgument::object(lottery_id.clone()),
            IntentArgument::object(RANDOM_OBJECT_ID),
            IntentArgument::object(CLOCK_OBJECT_ID),
        ],
    }
}

fn claim(
    package: &str,
    module: &str,
    kind: ClaimKind,
    lottery_id: &ObjectId,
    ticket_id: &ObjectId,
) -> TransactionIntent {
    TransactionIntent {
        entry_point: entry_point(package, module, format!("claim_{}", kind.as_str())),
        arguments: vec![
            IntentArgument::object(lottery_id.clone()),
            IntentArgument::object(ticket_id.clone()),
        ],
    }
}

/// Rejects zero and anything that does not fit in `u64`, negative values included.
fn positive_amount<A>(amount: A) -> Result<u64>
where
    A: TryInto<u64> + Copy + std::fmt::Display,
{
    match amount.try_into() {
        Ok(mist) if mist > 0 => Ok(mist),
        _ => Err(LotteryError::InvalidAmount(format!(
            "{} is not a positive amount of MIST",
            amount
        ))),
    }
}

/// Splits `amount` MIST from the gas coin and enters the lottery with it.
pub fn build_enter_intent<A>(package: &str, lottery_id: &ObjectId, amount: A) -> Result<TransactionIntent>
where
    A: TryInto<u64> + Copy + std::fmt::Display,
{
    let amount = positive_amount(amount)?;
    Ok(enter(package, DEFAULT_MODULE, lottery_id, amount))
}

/// Draws the winner of the current round using the network's randomness and clock objects.
pub fn build_draw_winner_intent(package: &str, lottery_id: &ObjectId) -> TransactionIntent {
    draw_winner(package, DEFAULT_MODULE, lottery_id)
}

/// Claims the prize or the refund of `ticket_id`.
///
/// The account is not part of the intent, the signer attaches it, but claiming
/// without one connected is rejected here.
pub fn build_claim_intent(
    package: &str,
    kind: ClaimKind,
    lottery_id: &ObjectId,
    ticket_id: &ObjectId,
    account: Option<&Address>,
) -> Result<TransactionIntent> {
    if account.is_none() {
        return Err(LotteryError::MissingAccount);
    }
    Ok(claim(package, DEFAULT_MODULE, kind, lottery_id, ticket_id))
}

/// Intent builder bound to one deployment of the lottery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentBuilder {
    package: String,
    module: String,
    lottery_id: ObjectId,
}

impl IntentBuilder {
    pub fn new(params: &LotteryClientParameters) -> Self {
        IntentBuilder {
            package: params.package_id.clone(),
            module: params.module.clone(),
            lottery_id: params.lottery_id.clone(),
        }
    }

    pub fn lottery_id(&self) -> &ObjectId {
        &self.lottery_id
    }

    pub fn enter<A>(&self, amount: A) -> Result<TransactionIntent>
    where
        A: TryInto<u64> + Copy + std::fmt::Display,
    {
        let amount = positive_amount(amount)?;
        debug!(lottery_id = %self.lottery_id, amount, "building enter intent");
        Ok(enter(&self.package, &self.module, &self.lottery_id, amount))
    }

    /// Enters with an amount typed in display units, e.g. `"1.5"`.
    pub fn enter_from_display(&self, input: &str) -> Result<TransactionIntent> {
        self.enter(parse_display_amount(input)?)
    }

    pub fn draw_winner(&self) -> TransactionIntent {
        debug!(lottery_id = %self.lottery_id, "building draw_winner intent");
        draw_winner(&self.package, &self.module, &self.lottery_id)
    }

    pub fn claim(
        &self,
        kind: ClaimKind,
        ticket_id: &ObjectId,
        account: Option<&Address>,
    ) -> Result<TransactionIntent> {
        if account.is_none() {
            return Err(LotteryError::MissingAccount);
        }
        debug!(lottery_id = %self.lottery_id, %ticket_id, kind = kind.as_str(), "building claim intent");
        Ok(claim(&self.package, &self.module, kind, &self.lottery_id, ticket_id))
    }
}
