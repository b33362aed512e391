//! Round randomness.
//!
//! An external [`RngProvider`] supplies an opaque seed per round; the
//! [`GameRng`] derives all in-round randomness (wheel outcomes, shoe
//! shuffles) from it. When the provider fails or times out the round falls
//! back to a locally seeded stream so it can always complete — RNG failures
//! are never surfaced to the player.

use async_trait::async_trait;
use baize_types::WHEEL_OUTCOMES;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use thiserror::Error;

/// Opaque seed returned by the RNG collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RngSeed {
    pub seed: String,
}

impl RngSeed {
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }
}

/// The RNG collaborator rejected the draw.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("rng provider unavailable: {0}")]
pub struct RngProviderError(pub String);

/// Asynchronous seed source. May fail; callers must tolerate rejection.
#[async_trait]
pub trait RngProvider: Send + Sync {
    async fn draw(&self, game_id: &str) -> Result<RngSeed, RngProviderError>;
}

/// Deterministic per-round random stream keyed by a provider seed.
pub struct GameRng {
    inner: ChaCha8Rng,
}

impl GameRng {
    /// Key a stream from the provider seed. The seed bytes are folded into
    /// the full 32-byte ChaCha key so the whole seed contributes, and the
    /// wheel outcome is drawn uniformly rather than reduced from trailing
    /// seed characters.
    pub fn from_seed(seed: &RngSeed) -> Self {
        let mut key = [0u8; 32];
        for (i, byte) in seed.seed.bytes().enumerate() {
            key[i % 32] = key[i % 32].wrapping_mul(31).wrapping_add(byte);
        }
        Self {
            inner: ChaCha8Rng::from_seed(key),
        }
    }

    /// Locally seeded fallback stream, used when the provider fails.
    pub fn local() -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(rand::thread_rng().gen()),
        }
    }

    /// Uniform wheel outcome in `0..=36`.
    pub fn wheel_outcome(&mut self) -> u8 {
        self.inner.gen_range(0..WHEEL_OUTCOMES)
    }

    /// Fisher-Yates shuffle driven by this stream.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }
}

/// Obtain a round RNG from the provider, with a timeout and local fallback.
pub async fn round_rng(provider: &dyn RngProvider, timeout: Duration, game_id: &str) -> GameRng {
    match tokio::time::timeout(timeout, provider.draw(game_id)).await {
        Ok(Ok(seed)) => GameRng::from_seed(&seed),
        Ok(Err(err)) => {
            tracing::warn!(%err, game_id, "rng provider failed; using local draw");
            GameRng::local()
        }
        Err(_) => {
            tracing::warn!(game_id, "rng provider timed out; using local draw");
            GameRng::local()
        }
    }
}
