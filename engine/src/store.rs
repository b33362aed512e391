//! Session persistence boundary.

use async_trait::async_trait;
use baize_types::SessionSnapshot;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("session store failure: {0}")]
pub struct StoreError(pub String);

/// Durable storage for per-table session snapshots. Save failures are
/// surfaced but never abort gameplay; the ledger stays authoritative.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, table_id: &str) -> Result<Option<SessionSnapshot>, StoreError>;
    async fn save(&self, table_id: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError>;
}
