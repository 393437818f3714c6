// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Collaborators the client consumes: the node's object-fetch API and the wallet signer.
//!
//! Implementations live outside this crate; everything here takes them as
//! explicit parameters instead of reaching for a process-wide client.

#![allow(async_fn_in_trait)]

use lottery_abi::{Address, ObjectId, RawObject, Result, TransactionDigest, TransactionIntent};

/// Read access to node state.
pub trait ObjectFetcher {
    /// Fetches one object; `Ok(None)` when it does not exist.
    async fn get_object(&self, id: &ObjectId) -> Result<Option<RawObject>>;

    /// Fetches the objects of `owner` whose declared type is `type_filter`.
    async fn get_owned_objects(&self, owner: &Address, type_filter: &str) -> Result<Vec<RawObject>>;

    /// Total balance of `owner` in MIST.
    async fn get_balance(&self, owner: &Address) -> Result<u64>;
}

/// Wallet that signs, submits and waits for a transaction.
pub trait TransactionSigner {
    /// Returns the digest on success or the wallet's human-readable failure message.
    async fn sign_and_execute(
        &self,
        intent: &TransactionIntent,
    ) -> std::result::Result<TransactionDigest, String>;
}

impl<T: ObjectFetcher> ObjectFetcher for &T {
    async fn get_object(&self, id: &ObjectId) -> Result<Option<RawObject>> {
        (**self).get_object(id).await
    }

    async fn get_owned_objects(&self, owner: &Address, type_filter: &str) -> Result<Vec<RawObject>> {
        (**self).get_owned_objects(owner, type_filter).await
    }

    async fn get_balance(&self, owner: &Address) -> Result<u64> {
        (**self).get_balance(owner).await
    }
}

impl<T: TransactionSigner> TransactionSigner for &T {
    async fn sign_and_execute(
        &self,
        intent: &TransactionIntent,
    ) -> std::result::Result<TransactionDigest, String> {
        (**self).sign_and_execute(intent).await
    }
}
