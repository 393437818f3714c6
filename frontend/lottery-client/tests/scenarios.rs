// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end flows over fixture documents shaped like node responses.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use assert_matches::assert_matches;
use lottery_client::{
    project_lottery, project_tickets, units::display_pool, ActionKind, ActionSession,
    Address, ClaimKind, IntentArgument, IntentBuilder, LotteryClientParameters, LotteryError,
    MoveTypes, ObjectFetcher, ObjectId, Poller, RawObject, Result, TransactionDigest,
    TransactionIntent, TransactionSigner, ViewPhase,
};
use serde_json::{json, Value};

const PACKAGE: &str = "0x5f1c";
const LOTTERY_ID: &str = "0x77aa";

fn params() -> LotteryClientParameters {
    LotteryClientParameters::from_json(&json!({ "package_id": PACKAGE, "lottery_id": LOTTERY_ID }).to_string())
        .unwrap()
}

fn lottery_response(pool: &str, round: &str, pause: bool) -> Value {
    json!({
        "data": {
            "objectId": LOTTERY_ID,
            "version": "42",
            "digest": "8xM2",
            "content": {
                "dataType": "moveObject",
                "type": format!("{}::no_rake_lotto::Lottery", PACKAGE),
                "hasPublicTransfer": false,
                "fields": {
                    "id": { "id": LOTTERY_ID },
                    "current_pool": pool,
                    "current_round": round,
                    "round_start_time": "1718000000000",
                    "pause": pause,
                    "admin_commission_rate": "0",
                    "end_eligible_time": "1718000600000",
                    "cancel_eligible_time": "1718086400000"
                }
            }
        }
    })
}

fn owned_response(id: &str, object_type: &str, fields: Value) -> Value {
    json!({
        "data": {
            "objectId": id,
            "content": { "dataType": "moveObject", "type": object_type, "fields": fields }
        }
    })
}

#[test]
fn lottery_document_projects_to_display_value() {
    let raw = RawObject::from_node_response(&lottery_response("5000000000", "3", false)).unwrap();
    let state = project_lottery(&raw, &MoveTypes::from(&params())).unwrap();

    assert_eq!(state.pool_balance, 5_000_000_000);
    assert_eq!(state.current_round, 3);
    assert!(!state.is_paused);
    assert_eq!(display_pool(state.pool_balance), "5 SUI");
    assert_eq!(ViewPhase::of(Some(&state), true), ViewPhase::Open);
}

#[test]
fn node_reported_long_form_type_matches_short_package_id() {
    let mut response = lottery_response("5000000000", "3", false);
    response["data"]["content"]["type"] = json!(format!("0x{:0>64}::no_rake_lotto::Lottery", "5f1c"));

    let raw = RawObject::from_node_response(&response).unwrap();
    let state = project_lottery(&raw, &MoveTypes::from(&params())).unwrap();
    assert_eq!(display_pool(state.pool_balance), "5 SUI");
    assert_eq!(state.current_round, 3);
}

#[test]
fn only_matching_ticket_objects_are_kept() {
    let raws: Vec<RawObject> = [
        owned_response("0xt1", &format!("{}::no_rake_lotto::Ticket", PACKAGE), json!({ "round": "3" })),
        owned_response("0xc1", "0x2::coin::Coin<0x2::sui::SUI>", json!({ "balance": "100" })),
    ]
    .iter()
    .filter_map(RawObject::from_node_response)
    .collect();

    let tickets = project_tickets(&raws, &MoveTypes::from(&params()));
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].id, ObjectId::new("0xt1"));
    assert_eq!(tickets[0].round, 3);
}

/// Node whose lottery document is replaced when a transaction lands.
struct FakeNode {
    lottery: Mutex<Value>,
    fetches: AtomicUsize,
}

impl ObjectFetcher for FakeNode {
    async fn get_object(&self, id: &ObjectId) -> Result<Option<RawObject>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if id.as_str() != LOTTERY_ID {
            return Ok(None);
        }
        let response = self
            .lottery
            .lock()
            .map_err(|e| LotteryError::Fetch(e.to_string()))?
            .clone();
        Ok(RawObject::from_node_response(&response))
    }

    async fn get_owned_objects(&self, _owner: &Address, _type_filter: &str) -> Result<Vec<RawObject>> {
        Ok(Vec::new())
    }

    async fn get_balance(&self, _owner: &Address) -> Result<u64> {
        Ok(20_000_000_000)
    }
}

/// Wallet that records intents and "executes" entries against the fake node.
struct FakeWallet<'a> {
    node: &'a FakeNode,
    submitted: Mutex<Vec<TransactionIntent>>,
}

impl TransactionSigner for FakeWallet<'_> {
    async fn sign_and_execute(&self, intent: &TransactionIntent) -> std::result::Result<TransactionDigest, String> {
        self.submitted.lock().map_err(|e| e.to_string())?.push(intent.clone());
        match intent.arguments.get(1) {
            Some(IntentArgument::GasPayment { amount }) => {
                let pool = 5_000_000_000 + amount;
                *self.node.lottery.lock().map_err(|e| e.to_string())? =
                    lottery_response(&pool.to_string(), "3", false);
                Ok("digest-enter".to_string())
            }
            _ => Err("MoveAbort in draw_winner: ENotEnoughPlayers".to_string()),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn entering_refetches_instead_of_predicting() {
    let node = FakeNode {
        lottery: Mutex::new(lottery_response("5000000000", "3", false)),
        fetches: AtomicUsize::new(0),
    };
    let wallet = FakeWallet {
        node: &node,
        submitted: Mutex::new(Vec::new()),
    };
    let params = params();
    let builder = IntentBuilder::new(&params);
    let session = ActionSession::new();
    let (poller, mut handle) = Poller::new(&node, &params, Some(Address::new("0xfeed")));

    tokio::select! {
        _ = poller.run() => panic!("poller stopped early"),
        _ = async {
            while handle.changed().await.unwrap().prize_pool().is_none() {}
            assert_eq!(handle.snapshot().prize_pool().as_deref(), Some("5 SUI"));

            let intent = builder.enter_from_display("1.5");
            let notification = session
                .perform(&wallet, ActionKind::Enter, intent, || handle.refresh())
                .await;
            assert_eq!(notification.message(), "Successfully entered the lottery with 1.5 SUI!");

            // The snapshot only moves once the poller has fetched again
            assert_eq!(handle.snapshot().prize_pool().as_deref(), Some("5 SUI"));
            while handle.changed().await.unwrap().prize_pool().as_deref() != Some("6.5 SUI") {}
        } => {}
    }

    let submitted = wallet.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(
        submitted[0].arguments,
        vec![
            IntentArgument::object(LOTTERY_ID),
            IntentArgument::GasPayment { amount: 1_500_000_000 },
        ]
    );
    assert!(!session.is_busy());
}

#[tokio::test]
async fn failed_draw_is_reported_and_leaves_state_alone() {
    let node = FakeNode {
        lottery: Mutex::new(lottery_response("5000000000", "3", false)),
        fetches: AtomicUsize::new(0),
    };
    let wallet = FakeWallet {
        node: &node,
        submitted: Mutex::new(Vec::new()),
    };
    let builder = IntentBuilder::new(&params());
    let session = ActionSession::new();
    let mut refreshed = false;

    let notification = session
        .perform(&wallet, ActionKind::DrawWinner, Ok(builder.draw_winner()), || refreshed = true)
        .await;

    assert_eq!(
        notification.message(),
        "Error drawing winner: MoveAbort in draw_winner: ENotEnoughPlayers"
    );
    assert!(!refreshed);
    assert_eq!(node.fetches.load(Ordering::SeqCst), 0);
    assert_eq!(
        wallet.submitted.lock().unwrap()[0].arguments,
        vec![
            IntentArgument::object(LOTTERY_ID),
            IntentArgument::object("0x8"),
            IntentArgument::object("0x6"),
        ]
    );
}

#[tokio::test]
async fn claim_without_wallet_is_aborted_before_submission() {
    let node = FakeNode {
        lottery: Mutex::new(lottery_response("0", "4", true)),
        fetches: AtomicUsize::new(0),
    };
    let wallet = FakeWallet {
        node: &node,
        submitted: Mutex::new(Vec::new()),
    };
    let builder = IntentBuilder::new(&params());
    let session = ActionSession::new();
    let ticket = ObjectId::new("0xt1");

    let intent = builder.claim(ClaimKind::Prize, &ticket, None);
    assert_matches!(intent, Err(LotteryError::MissingAccount));

    let notification = session
        .perform(&wallet, ActionKind::Claim(ClaimKind::Prize), intent, || {})
        .await;
    assert!(!notification.is_success());
    assert!(wallet.submitted.lock().unwrap().is_empty());
}
