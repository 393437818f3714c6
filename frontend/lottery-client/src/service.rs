// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use async_graphql::{EmptySubscription, Json, Object, Request, Response, Schema};
use lottery_abi::{
    Address, ClaimKind, LotteryClientParameters, LotteryError, LotteryState, ObjectId, Ticket,
    TransactionIntent, ViewPhase,
};

use crate::{
    intent::IntentBuilder,
    poller::{LotterySnapshot, PollerHandle},
    state::find_ticket,
};

/// GraphQL view over the latest snapshot; mutations build intents without submitting them.
pub struct LotteryService {
    handle: PollerHandle,
    builder: IntentBuilder,
    account: Option<Address>,
}

impl LotteryService {
    pub fn new(params: &LotteryClientParameters, handle: PollerHandle, account: Option<Address>) -> Self {
        LotteryService {
            handle,
            builder: IntentBuilder::new(params),
            account,
        }
    }

    pub async fn handle_query(&self, request: Request) -> Response {
        let snapshot = self.handle.snapshot();
        let schema = Schema::build(
            QueryRoot {
                snapshot: snapshot.clone(),
            },
            MutationRoot {
                snapshot,
                builder: self.builder.clone(),
                account: self.account.clone(),
            },
            EmptySubscription,
        )
        .finish();
        schema.execute(request).await
    }
}

struct QueryRoot {
    snapshot: LotterySnapshot,
}

#[Object]
impl QueryRoot {
    /// Projected lottery object, null while loading
    async fn lottery_state(&self) -> Option<LotteryState> {
        self.snapshot.lottery.clone()
    }

    async fn phase(&self) -> ViewPhase {
        self.snapshot.phase
    }

    async fn can_enter(&self) -> bool {
        self.snapshot.phase.permits_enter()
    }

    /// Prize pool in display units, e.g. "5 SUI"
    async fn prize_pool(&self) -> Option<String> {
        self.snapshot.prize_pool()
    }

    async fn balance(&self) -> Option<String> {
        self.snapshot.balance_display()
    }

    async fn tickets(&self) -> Vec<Ticket> {
        self.snapshot.tickets.clone()
    }

    /// One owned ticket by id, null when the account does not hold it
    async fn ticket(&self, id: ObjectId) -> Option<Ticket> {
        find_ticket(&self.snapshot.tickets, &id).cloned()
    }

    async fn current_round_tickets(&self) -> Vec<Ticket> {
        self.snapshot.current_round_tickets()
    }

    async fn malformed_tickets(&self) -> u64 {
        self.snapshot.malformed_tickets as u64
    }

    async fn version(&self) -> String {
        "1.0.0".to_string()
    }
}

struct MutationRoot {
    snapshot: LotterySnapshot,
    builder: IntentBuilder,
    account: Option<Address>,
}

#[Object]
impl MutationRoot {
    /// Intent entering the lottery with `amount` SUI, as typed by the user
    async fn enter(&self, amount: String) -> async_graphql::Result<Json<TransactionIntent>> {
        match self.snapshot.phase {
            ViewPhase::Open => Ok(Json(self.builder.enter_from_display(&amount)?)),
            ViewPhase::Paused => Err(LotteryError::Paused.into()),
            ViewPhase::Unknown | ViewPhase::Loading => Err(LotteryError::AbsentState.into()),
        }
    }

    async fn draw_winner(&self) -> Json<TransactionIntent> {
        Json(self.builder.draw_winner())
    }

    async fn claim(
        &self,
        kind: ClaimKind,
        ticket_id: ObjectId,
    ) -> async_graphql::Result<Json<TransactionIntent>> {
        Ok(Json(self.builder.claim(kind, &ticket_id, self.account.as_ref())?))
    }
}
