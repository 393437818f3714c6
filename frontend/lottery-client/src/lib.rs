// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*! Lottery client core: projects node documents into view models and builds transaction intents */

pub mod intent;
pub mod node;
pub mod poller;
pub mod service;
pub mod session;
pub mod state;
pub mod units;

// Re-export the shared definitions so callers only depend on this crate
pub use lottery_abi::{
    Address, ClaimKind, EntryPoint, IntentArgument, LotteryClientParameters, LotteryError,
    LotteryState, ObjectId, RawObject, Result, Ticket, TransactionDigest, TransactionIntent,
    ViewPhase,
};

pub use self::{
    intent::{build_claim_intent, build_draw_winner_intent, build_enter_intent, IntentBuilder},
    node::{ObjectFetcher, TransactionSigner},
    poller::{LotterySnapshot, Poller, PollerHandle},
    service::LotteryService,
    session::{ActionKind, ActionSession, Notification},
    state::{project_lottery, project_tickets, project_tickets_with_report, MoveTypes, TicketProjection},
    units::{format_display, parse_display_amount, to_display_units},
};
