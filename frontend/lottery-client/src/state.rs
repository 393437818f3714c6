// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Projection of raw node documents into the client's view models.
//!
//! Both projectors are pure functions of their input. A document whose
//! declared type is not the expected one is absence, never an error.

use lottery_abi::{
    normalize_type_tag, LotteryClientParameters, LotteryState, ObjectId, RawObject, Ticket,
};
use serde_json::{Map, Value};
use tracing::warn;

/// Declared Move types the projectors match against, addresses in long form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTypes {
    pub lottery: String,
    pub ticket: String,
}

impl MoveTypes {
    pub fn new(lottery: &str, ticket: &str) -> Self {
        MoveTypes {
            lottery: normalize_type_tag(lottery),
            ticket: normalize_type_tag(ticket),
        }
    }

    pub fn is_lottery(&self, raw: &RawObject) -> bool {
        normalize_type_tag(&raw.object_type) == self.lottery
    }

    pub fn is_ticket(&self, raw: &RawObject) -> bool {
        normalize_type_tag(&raw.object_type) == self.ticket
    }
}

impl From<&LotteryClientParameters> for MoveTypes {
    fn from(params: &LotteryClientParameters) -> Self {
        MoveTypes::new(&params.lottery_type(), &params.ticket_type())
    }
}

/// Reads an unsigned integer field encoded either as a decimal string (u64 and
/// wider) or as a JSON number (u8 to u32). Signs are not part of the encoding.
fn field_u64(fields: &Map<String, Value>, name: &str) -> Option<u64> {
    match fields.get(name)? {
        Value::String(s) if s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn field_bool(fields: &Map<String, Value>, name: &str) -> Option<bool> {
    fields.get(name)?.as_bool()
}

/// Projects the lottery object.
///
/// Returns `None` when the document has another declared type or lacks one of
/// `current_pool`, `current_round` or `pause`; callers treat it as state not
/// loaded yet.
pub fn project_lottery(raw: &RawObject, types: &MoveTypes) -> Option<LotteryState> {
    if !types.is_lottery(raw) {
        return None;
    }
    let fields = &raw.fields;

    // Older deployments named the pool `total_pool`
    let pool_balance = field_u64(fields, "current_pool").or_else(|| field_u64(fields, "total_pool"));
    let current_round = field_u64(fields, "current_round");
    let is_paused = field_bool(fields, "pause");

    let (Some(pool_balance), Some(current_round), Some(is_paused)) =
        (pool_balance, current_round, is_paused)
    else {
        warn!(object_id = %raw.object_id, "lottery object is missing required fields");
        return None;
    };

    let round_start_time = field_u64(fields, "round_start_time").unwrap_or_else(|| {
        warn!(object_id = %raw.object_id, "lottery object has no usable round_start_time");
        0
    });

    Some(LotteryState {
        object_id: raw.object_id.clone(),
        pool_balance,
        current_round,
        round_start_time,
        is_paused,
        admin_commission_rate: field_u64(fields, "admin_commission_rate"),
        end_eligible_time: field_u64(fields, "end_eligible_time"),
        cancel_eligible_time: field_u64(fields, "cancel_eligible_time"),
    })
}

/// Result of projecting owned objects, with the number of ticket documents
/// that were dropped because they were malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketProjection {
    pub tickets: Vec<Ticket>,
    pub malformed: usize,
}

fn project_ticket(raw: &RawObject) -> Option<Ticket> {
    if raw.object_id.is_empty() {
        return None;
    }
    Some(Ticket {
        id: raw.object_id.clone(),
        round: field_u64(&raw.fields, "round")?,
    })
}

/// Projects owned objects into tickets, preserving input order.
///
/// Objects of other types are skipped silently. Ticket documents without a
/// usable `round` are counted in `malformed` instead of being partially filled.
pub fn project_tickets_with_report(raws: &[RawObject], types: &MoveTypes) -> TicketProjection {
    let mut projection = TicketProjection::default();
    for raw in raws.iter().filter(|raw| types.is_ticket(raw)) {
        match project_ticket(raw) {
            Some(ticket) => projection.tickets.push(ticket),
            None => projection.malformed += 1,
        }
    }
    projection
}

pub fn project_tickets(raws: &[RawObject], types: &MoveTypes) -> Vec<Ticket> {
    project_tickets_with_report(raws, types).tickets
}

/// Tickets bought in the round the lottery is currently running.
pub fn current_round_tickets<'a>(
    tickets: &'a [Ticket],
    state: &'a LotteryState,
) -> impl Iterator<Item = &'a Ticket> + 'a {
    tickets.iter().filter(move |ticket| ticket.is_current(state))
}

/// Looks up a ticket of the snapshot by id.
pub fn find_ticket<'a>(tickets: &'a [Ticket], id: &ObjectId) -> Option<&'a Ticket> {
    tickets.iter().find(|ticket| &ticket.id == id)
}
