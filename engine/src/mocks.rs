//! Test doubles for the external collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::{PacingConfig, TableConfig};
use crate::rng::{RngProvider, RngProviderError, RngSeed};
use crate::store::{SessionStore, StoreError};
use crate::wallet::{WalletError, WalletGateway, WalletResponse};
use baize_types::SessionSnapshot;

/// In-memory wallet holding a single balance. Debits beyond the balance are
/// declined; `failing` makes every call return a service error instead.
pub struct MockWallet {
    balance: Mutex<u64>,
    failing: bool,
}

impl MockWallet {
    pub fn with_balance(balance: u64) -> Self {
        Self {
            balance: Mutex::new(balance),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            balance: Mutex::new(0),
            failing: true,
        }
    }

    pub fn balance(&self) -> u64 {
        *self.balance.lock().unwrap()
    }
}

#[async_trait]
impl WalletGateway for MockWallet {
    async fn debit(&self, amount: u64) -> Result<WalletResponse, WalletError> {
        if self.failing {
            return Err(WalletError("wallet unreachable".to_string()));
        }
        let mut balance = self.balance.lock().unwrap();
        if *balance < amount {
            return Ok(WalletResponse::declined(*balance, "insufficient funds"));
        }
        *balance -= amount;
        Ok(WalletResponse::approved(*balance))
    }

    async fn credit(&self, amount: u64) -> Result<WalletResponse, WalletError> {
        if self.failing {
            return Err(WalletError("wallet unreachable".to_string()));
        }
        let mut balance = self.balance.lock().unwrap();
        *balance += amount;
        Ok(WalletResponse::approved(*balance))
    }
}

/// RNG provider that hands out fixed seeds, or fails when empty.
pub struct ScriptedRng {
    seeds: Mutex<Vec<String>>,
}

impl ScriptedRng {
    pub fn with_seeds(seeds: Vec<String>) -> Self {
        Self {
            seeds: Mutex::new(seeds),
        }
    }

    /// A provider that always fails, forcing the local fallback.
    pub fn unavailable() -> Self {
        Self::with_seeds(Vec::new())
    }
}

#[async_trait]
impl RngProvider for ScriptedRng {
    async fn draw(&self, _game_id: &str) -> Result<RngSeed, RngProviderError> {
        let mut seeds = self.seeds.lock().unwrap();
        if seeds.is_empty() {
            return Err(RngProviderError("no seeds scripted".to_string()));
        }
        Ok(RngSeed::new(seeds.remove(0)))
    }
}

/// Provider whose draw never resolves, for exercising caller-side
/// cancellation and the request timeout.
pub struct StalledRng;

#[async_trait]
impl RngProvider for StalledRng {
    async fn draw(&self, _game_id: &str) -> Result<RngSeed, RngProviderError> {
        std::future::pending().await
    }
}

/// Snapshot store backed by a hash map.
#[derive(Default)]
pub struct MemoryStore {
    snapshots: Mutex<HashMap<String, SessionSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table_id: &str) -> Option<SessionSnapshot> {
        self.snapshots.lock().unwrap().get(table_id).cloned()
    }

    pub fn put(&self, table_id: &str, snapshot: SessionSnapshot) {
        self.snapshots
            .lock()
            .unwrap()
            .insert(table_id.to_string(), snapshot);
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, table_id: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        Ok(self.get(table_id))
    }

    async fn save(&self, table_id: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        self.put(table_id, snapshot.clone());
        Ok(())
    }
}

/// Store that fails every call, for exercising degraded persistence.
pub struct BrokenStore;

#[async_trait]
impl SessionStore for BrokenStore {
    async fn load(&self, _table_id: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        Err(StoreError("store offline".to_string()))
    }

    async fn save(&self, _table_id: &str, _snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        Err(StoreError("store offline".to_string()))
    }
}

/// Table configuration with pacing pauses zeroed out for tests.
pub fn test_config() -> TableConfig {
    TableConfig {
        pacing: PacingConfig::zero(),
        ..TableConfig::default()
    }
}
