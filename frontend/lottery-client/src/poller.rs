// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Periodic re-fetch of lottery state, owned tickets and account balance.
//!
//! [`Poller::run`] is driven by the task that owns the view. It stops when
//! every [`PollerHandle`] has been dropped, so tearing the view down cancels
//! polling. Each feed awaits its fetch before its next tick, polls never
//! overlap.

use std::{sync::Arc, time::Duration};

use lottery_abi::{
    Address, LotteryClientParameters, LotteryError, LotteryState, ObjectId, Result, Ticket,
    ViewPhase,
};
use serde::Serialize;
use tokio::{
    sync::{watch, Notify},
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{
    node::ObjectFetcher,
    state::{current_round_tickets, project_lottery, project_tickets_with_report, MoveTypes, TicketProjection},
    units::{display_balance, display_pool},
};

/// Everything the view renders, recomputed from fresh fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotterySnapshot {
    pub phase: ViewPhase,
    pub lottery: Option<LotteryState>,
    pub tickets: Vec<Ticket>,
    /// Ticket objects dropped by the last projection because they were malformed.
    pub malformed_tickets: usize,
    pub balance: Option<u64>,
    /// Number of fetches folded into this snapshot.
    pub revision: u64,
}

impl Default for LotterySnapshot {
    fn default() -> Self {
        LotterySnapshot {
            phase: ViewPhase::Unknown,
            lottery: None,
            tickets: Vec::new(),
            malformed_tickets: 0,
            balance: None,
            revision: 0,
        }
    }
}

impl LotterySnapshot {
    pub fn prize_pool(&self) -> Option<String> {
        self.lottery.as_ref().map(|state| display_pool(state.pool_balance))
    }

    pub fn balance_display(&self) -> Option<String> {
        self.balance.map(display_balance)
    }

    pub fn current_round_tickets(&self) -> Vec<Ticket> {
        match &self.lottery {
            Some(state) => current_round_tickets(&self.tickets, state).cloned().collect(),
            None => Vec::new(),
        }
    }
}

/// Whether `next` reports an older round than `previous`, i.e. the node served stale state.
pub fn round_regressed(previous: Option<&LotteryState>, next: Option<&LotteryState>) -> bool {
    matches!((previous, next), (Some(previous), Some(next)) if next.current_round < previous.current_round)
}

/// View-side end of a poller: reads snapshots and asks for re-fetches.
#[derive(Debug, Clone)]
pub struct PollerHandle {
    snapshot: watch::Receiver<LotterySnapshot>,
    refresh: Arc<Notify>,
}

impl PollerHandle {
    /// A handle over a fixed snapshot that is never updated.
    #[cfg(test)]
    pub(crate) fn fixed(snapshot: LotterySnapshot) -> Self {
        let (_, receiver) = watch::channel(snapshot);
        PollerHandle {
            snapshot: receiver,
            refresh: Arc::new(Notify::new()),
        }
    }

    pub fn snapshot(&self) -> LotterySnapshot {
        self.snapshot.borrow().clone()
    }

    /// Re-fetches everything right away instead of waiting for the next tick.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    /// Waits for the next published snapshot.
    pub async fn changed(&mut self) -> Result<LotterySnapshot> {
        self.snapshot
            .changed()
            .await
            .map_err(|_| LotteryError::Fetch("poller stopped".to_string()))?;
        Ok(self.snapshot.borrow_and_update().clone())
    }
}

pub struct Poller<F> {
    fetcher: F,
    types: MoveTypes,
    lottery_id: ObjectId,
    account: Option<Address>,
    state_interval: Duration,
    balance_interval: Duration,
    snapshot: watch::Sender<LotterySnapshot>,
    refresh: Arc<Notify>,
}

impl<F: ObjectFetcher> Poller<F> {
    pub fn new(
        fetcher: F,
        params: &LotteryClientParameters,
        account: Option<Address>,
    ) -> (Self, PollerHandle) {
        let (sender, receiver) = watch::channel(LotterySnapshot::default());
        let refresh = Arc::new(Notify::new());
        let poller = Poller {
            fetcher,
            types: MoveTypes::from(params),
            lottery_id: params.lottery_id.clone(),
            account,
            state_interval: params.state_poll_interval(),
            balance_interval: params.balance_poll_interval(),
            snapshot: sender,
            refresh: refresh.clone(),
        };
        let handle = PollerHandle {
            snapshot: receiver,
            refresh,
        };
        (poller, handle)
    }

    /// Polls until every handle is dropped.
    pub async fn run(self) {
        self.snapshot.send_modify(|snapshot| snapshot.phase = ViewPhase::Loading);

        let mut state_ticks = interval(self.state_interval);
        state_ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut balance_ticks = interval(self.balance_interval);
        balance_ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let has_account = self.account.is_some();

        loop {
            tokio::select! {
                _ = self.snapshot.closed() => {
                    debug!(lottery_id = %self.lottery_id, "view dropped, polling stopped");
                    return;
                }
                _ = self.refresh.notified() => {
                    self.poll_state().await;
                    self.poll_balance().await;
                }
                _ = state_ticks.tick() => self.poll_state().await,
                _ = balance_ticks.tick(), if has_account => self.poll_balance().await,
            }
        }
    }

    /// Tickets of the connected account; `None` without an account.
    async fn fetch_tickets(&self) -> Option<Result<TicketProjection>> {
        let owner = self.account.as_ref()?;
        Some(
            self.fetcher
                .get_owned_objects(owner, &self.types.ticket)
                .await
                .map(|raws| project_tickets_with_report(&raws, &self.types)),
        )
    }

    async fn poll_state(&self) {
        let (lottery, tickets) = futures::join!(
            self.fetcher.get_object(&self.lottery_id),
            self.fetch_tickets()
        );

        // Each feed that failed keeps its previous value
        let lottery = match lottery {
            Ok(raw) => Some(raw.and_then(|raw| project_lottery(&raw, &self.types))),
            Err(error) => {
                warn!(lottery_id = %self.lottery_id, %error, "failed to fetch lottery object");
                None
            }
        };
        let tickets = match tickets {
            Some(Ok(projection)) => {
                if projection.malformed > 0 {
                    warn!(malformed = projection.malformed, "dropped malformed ticket objects");
                }
                Some(projection)
            }
            Some(Err(error)) => {
                warn!(%error, "failed to fetch owned tickets");
                None
            }
            None => None,
        };
        if lottery.is_none() && tickets.is_none() {
            return;
        }

        self.snapshot.send_modify(|snapshot| {
            if let Some(lottery) = lottery {
                if round_regressed(snapshot.lottery.as_ref(), lottery.as_ref()) {
                    warn!(
                        previous = snapshot.lottery.as_ref().map(|s| s.current_round),
                        next = lottery.as_ref().map(|s| s.current_round),
                        "lottery round went backwards, node may be serving stale state"
                    );
                }
                snapshot.phase = ViewPhase::of(lottery.as_ref(), true);
                snapshot.lottery = lottery;
            }
            if let Some(projection) = tickets {
                snapshot.tickets = projection.tickets;
                snapshot.malformed_tickets = projection.malformed;
            }
            snapshot.revision += 1;
        });
    }

    async fn poll_balance(&self) {
        let Some(owner) = &self.account else {
            return;
        };
        match self.fetcher.get_balance(owner).await {
            Ok(balance) => self.snapshot.send_modify(|snapshot| {
                snapshot.balance = Some(balance);
                snapshot.revision += 1;
            }),
            Err(error) => warn!(%owner, %error, "failed to fetch balance"),
        }
    }
}
