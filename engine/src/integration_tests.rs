//! End-to-end session flows against the mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::bets::BetKind;
use crate::blackjack::{BlackjackEngine, TurnFlow};
use crate::config::TimeoutConfig;
use crate::error::SessionError;
use crate::mocks::{test_config, BrokenStore, MemoryStore, MockWallet, ScriptedRng, StalledRng};
use crate::rng::{GameRng, RngSeed};
use crate::roulette::RouletteEngine;
use crate::session::SessionOrchestrator;
use crate::wallet::{WalletError, WalletGateway, WalletResponse};
use baize_types::{Denomination, GameKind, PlayerAction, SessionEvent};

fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

async fn roulette_session(
    wallet_balance: u64,
    seeds: Vec<String>,
) -> (
    SessionOrchestrator<RouletteEngine>,
    mpsc::UnboundedReceiver<SessionEvent>,
    Arc<MockWallet>,
    Arc<MemoryStore>,
) {
    let wallet = Arc::new(MockWallet::with_balance(wallet_balance));
    let store = Arc::new(MemoryStore::new());
    let rng = Arc::new(ScriptedRng::with_seeds(seeds));
    let (session, rx) = SessionOrchestrator::start(
        "table-1",
        test_config(),
        RouletteEngine::new(),
        wallet.clone(),
        rng,
        store.clone(),
    )
    .await;
    (session, rx, wallet, store)
}

#[tokio::test]
async fn test_buy_chips_moves_value_from_wallet() {
    let (mut session, mut rx, wallet, store) = roulette_session(1_000, Vec::new()).await;

    session
        .buy_chips(Denomination::TwentyFive, 4)
        .await
        .unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.chips.count(Denomination::TwentyFive), 4);
    assert_eq!(snapshot.balance, 900);
    assert_eq!(wallet.balance(), 900);
    // Written through to the store on the same call.
    assert_eq!(store.get("table-1").unwrap(), snapshot);

    let events = drain(&mut rx);
    assert!(events.contains(&SessionEvent::ChipsPurchased {
        total_value: 100,
        balance: 900
    }));
}

#[tokio::test]
async fn test_buy_chips_declined_leaves_ledger_untouched() {
    let (mut session, _rx, _wallet, _store) = roulette_session(50, Vec::new()).await;

    let err = session
        .buy_chips(Denomination::Hundred, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InsufficientFunds { amount: 100, .. }));
    assert!(session.snapshot().chips.is_empty());
}

#[tokio::test]
async fn test_buy_chips_wallet_outage_is_a_service_error() {
    let wallet = Arc::new(MockWallet::failing());
    let store = Arc::new(MemoryStore::new());
    let rng = Arc::new(ScriptedRng::unavailable());
    let (mut session, _rx) = SessionOrchestrator::start(
        "table-1",
        test_config(),
        RouletteEngine::new(),
        wallet,
        rng,
        store,
    )
    .await;

    let err = session.buy_chips(Denomination::Five, 1).await.unwrap_err();
    assert!(matches!(err, SessionError::WalletService(_)));
    assert!(session.snapshot().chips.is_empty());
}

#[tokio::test]
async fn test_withdraw_returns_chip_value_to_wallet() {
    let (mut session, mut rx, wallet, _store) = roulette_session(1_000, Vec::new()).await;
    session.buy_chips(Denomination::Five, 6).await.unwrap();
    assert_eq!(wallet.balance(), 970);

    session.withdraw_chips().await.unwrap();
    assert!(session.snapshot().chips.is_empty());
    assert_eq!(wallet.balance(), 1_000);
    assert_eq!(session.snapshot().balance, 1_000);

    let events = drain(&mut rx);
    assert!(events.contains(&SessionEvent::ChipsWithdrawn {
        total_value: 30,
        balance: 1_000
    }));
}

#[tokio::test]
async fn test_session_state_survives_restart() {
    let store = Arc::new(MemoryStore::new());
    {
        let wallet = Arc::new(MockWallet::with_balance(500));
        let rng = Arc::new(ScriptedRng::unavailable());
        let (mut session, _rx) = SessionOrchestrator::start(
            "table-9",
            test_config(),
            RouletteEngine::new(),
            wallet,
            rng,
            store.clone(),
        )
        .await;
        session.buy_chips(Denomination::Five, 8).await.unwrap();
        session.close();
    }

    let wallet = Arc::new(MockWallet::with_balance(460));
    let rng = Arc::new(ScriptedRng::unavailable());
    let (session, _rx) = SessionOrchestrator::start(
        "table-9",
        test_config(),
        RouletteEngine::new(),
        wallet,
        rng,
        store,
    )
    .await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.chips.count(Denomination::Five), 8);
    assert_eq!(snapshot.balance, 460);
}

#[tokio::test]
async fn test_broken_store_starts_empty_and_keeps_playing() {
    let wallet = Arc::new(MockWallet::with_balance(100));
    let rng = Arc::new(ScriptedRng::unavailable());
    let (mut session, _rx) = SessionOrchestrator::start(
        "table-1",
        test_config(),
        RouletteEngine::new(),
        wallet,
        rng,
        Arc::new(BrokenStore),
    )
    .await;

    // Save failures are logged, not fatal.
    session.buy_chips(Denomination::Five, 2).await.unwrap();
    assert_eq!(session.snapshot().chips.count(Denomination::Five), 2);
}

#[tokio::test]
async fn test_roulette_round_is_deterministic_for_a_seed() {
    let seed = "round-seed-42".to_string();
    let expected = GameRng::from_seed(&RngSeed::new(seed.clone())).wheel_outcome();

    let (mut session, mut rx, _wallet, _store) = roulette_session(1_000, vec![seed]).await;
    session.buy_chips(Denomination::Five, 10).await.unwrap();
    session.select_denomination(Denomination::Five);
    session.place_bet(BetKind::Straight(expected)).await.unwrap();

    let settlement = session.spin().await.unwrap();
    assert_eq!(settlement.winning_number, expected);
    assert_eq!(settlement.total_won, 5 * 36);
    // 50 bought, 5 staked, 180 returned.
    assert_eq!(session.snapshot().chips.total_value(), 45 + 180);

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::BetPlaced {
            game: GameKind::Roulette,
            denomination: 5
        }
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::RoundResolved {
            game: GameKind::Roulette,
            total_won: 180,
            ..
        }
    )));
}

#[tokio::test]
async fn test_roulette_round_completes_on_rng_outage() {
    let (mut session, _rx, _wallet, _store) = roulette_session(1_000, Vec::new()).await;
    session.buy_chips(Denomination::Five, 4).await.unwrap();
    session.select_denomination(Denomination::Five);
    session.place_bet(BetKind::Red).await.unwrap();
    session.place_bet(BetKind::Black).await.unwrap();

    // Provider has no seeds; the local fallback still resolves the round.
    let settlement = session.spin().await.unwrap();
    assert!(u64::from(settlement.winning_number) < 37);
    // One of the two even-money bets wins unless the wheel lands on zero.
    let chips = session.snapshot().chips.total_value();
    if settlement.winning_number == 0 {
        assert_eq!(chips, 10);
    } else {
        assert_eq!(chips, 20);
    }
}

#[tokio::test]
async fn test_roulette_reset_bets_refunds_stakes() {
    let (mut session, _rx, _wallet, _store) = roulette_session(1_000, Vec::new()).await;
    session.buy_chips(Denomination::Five, 4).await.unwrap();
    session.select_denomination(Denomination::Five);
    session.place_bet(BetKind::Odd).await.unwrap();
    session.place_bet(BetKind::Dozen(0)).await.unwrap();
    assert_eq!(session.snapshot().chips.total_value(), 10);

    assert_eq!(session.reset_bets().await.unwrap(), 10);
    assert_eq!(session.snapshot().chips.total_value(), 20);
}

#[tokio::test]
async fn test_blackjack_round_conserves_value() {
    let wallet = Arc::new(MockWallet::with_balance(1_000));
    let store = Arc::new(MemoryStore::new());
    let rng = Arc::new(ScriptedRng::with_seeds(vec!["shoe-seed".to_string()]));
    let config = test_config();
    let (mut session, mut rx) = SessionOrchestrator::start(
        "table-1",
        config,
        BlackjackEngine::new(config.blackjack),
        wallet,
        rng,
        store,
    )
    .await;

    session.buy_chips(Denomination::TwentyFive, 4).await.unwrap();
    session.select_denomination(Denomination::TwentyFive);
    session.wager_chip().await.unwrap();
    session.wager_chip().await.unwrap();

    let mut flow = session.deal().await.unwrap();
    while flow == TurnFlow::Playing {
        flow = session.action(PlayerAction::Stand).await.unwrap();
    }
    let summary = match flow {
        TurnFlow::Settled(summary) => summary,
        other => panic!("round did not settle: {other:?}"),
    };

    // 100 bought, 50 wagered, whatever the table returned came back as chips.
    assert_eq!(summary.total_wagered, 50);
    assert_eq!(
        session.snapshot().chips.total_value(),
        100 - summary.total_wagered + summary.total_won
    );

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::RoundStarted {
            game: GameKind::Blackjack
        }
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::RoundResolved {
            game: GameKind::Blackjack,
            ..
        }
    )));

    // The table re-armed after the (zero-length) display pause.
    session.wager_chip().await.unwrap();
}

#[tokio::test]
async fn test_blackjack_actions_are_emitted() {
    let wallet = Arc::new(MockWallet::with_balance(1_000));
    let store = Arc::new(MemoryStore::new());
    let rng = Arc::new(ScriptedRng::unavailable());
    let config = test_config();
    let (mut session, mut rx) = SessionOrchestrator::start(
        "table-1",
        config,
        BlackjackEngine::new(config.blackjack),
        wallet,
        rng,
        store,
    )
    .await;

    session.buy_chips(Denomination::Five, 10).await.unwrap();
    session.select_denomination(Denomination::Five);
    session.wager_chip().await.unwrap();

    let mut flow = session.deal().await.unwrap();
    let mut acted = false;
    while flow == TurnFlow::Playing {
        flow = session.action(PlayerAction::Stand).await.unwrap();
        acted = true;
    }
    let events = drain(&mut rx);
    if acted {
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::ActionTaken {
                game: GameKind::Blackjack,
                action: PlayerAction::Stand
            }
        )));
    }
}

/// Wallet that never answers, for exercising the request timeout.
struct HangingWallet;

#[async_trait]
impl WalletGateway for HangingWallet {
    async fn debit(&self, _amount: u64) -> Result<WalletResponse, WalletError> {
        std::future::pending().await
    }

    async fn credit(&self, _amount: u64) -> Result<WalletResponse, WalletError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_wallet_timeout_surfaces_as_service_error() {
    let mut config = test_config();
    config.timeouts = TimeoutConfig {
        wallet: Duration::from_millis(10),
        rng: Duration::from_millis(10),
    };
    let store = Arc::new(MemoryStore::new());
    let rng = Arc::new(ScriptedRng::unavailable());
    let (mut session, _rx) = SessionOrchestrator::start(
        "table-1",
        config,
        RouletteEngine::new(),
        Arc::new(HangingWallet),
        rng,
        store,
    )
    .await;

    let err = session.buy_chips(Denomination::Five, 1).await.unwrap_err();
    assert!(matches!(err, SessionError::WalletService(_)));
    assert!(session.snapshot().chips.is_empty());
}

#[tokio::test]
async fn test_dropped_wallet_call_releases_the_latch() {
    let mut config = test_config();
    config.timeouts = TimeoutConfig {
        wallet: Duration::from_millis(50),
        rng: Duration::from_millis(10),
    };
    let store = Arc::new(MemoryStore::new());
    let rng = Arc::new(ScriptedRng::unavailable());
    let (mut session, _rx) = SessionOrchestrator::start(
        "table-1",
        config,
        RouletteEngine::new(),
        Arc::new(HangingWallet),
        rng,
        store,
    )
    .await;

    // The caller gives up before the session's own wallet timeout fires,
    // dropping the purchase future mid-await.
    let abandoned = tokio::time::timeout(
        Duration::from_millis(5),
        session.buy_chips(Denomination::Five, 1),
    )
    .await;
    assert!(abandoned.is_err());

    // The next operation is judged on its own: it times out against the
    // hung wallet instead of being rejected by a stale in-flight flag.
    let err = session.buy_chips(Denomination::Five, 1).await.unwrap_err();
    assert!(matches!(err, SessionError::WalletService(_)));
}

#[tokio::test]
async fn test_dropped_spin_leaves_the_table_playable() {
    let mut config = test_config();
    config.timeouts = TimeoutConfig {
        wallet: Duration::from_millis(50),
        rng: Duration::from_millis(50),
    };
    let wallet = Arc::new(MockWallet::with_balance(100));
    let store = Arc::new(MemoryStore::new());
    let (mut session, _rx) = SessionOrchestrator::start(
        "table-1",
        config,
        RouletteEngine::new(),
        wallet,
        Arc::new(StalledRng),
        store,
    )
    .await;

    session.buy_chips(Denomination::Five, 4).await.unwrap();
    session.select_denomination(Denomination::Five);
    session.place_bet(BetKind::Red).await.unwrap();

    // The caller abandons the spin while the seed request is pending.
    let abandoned = tokio::time::timeout(Duration::from_millis(5), session.spin()).await;
    assert!(abandoned.is_err());

    // The book is not stranded mid-spin: it can still be cleared, and a
    // fresh spin completes via the local fallback draw.
    assert_eq!(session.reset_bets().await.unwrap(), 5);
    session.place_bet(BetKind::Red).await.unwrap();
    let settlement = session.spin().await.unwrap();
    assert!(u64::from(settlement.winning_number) < 37);
}

#[tokio::test]
async fn test_withdraw_with_no_chips_is_rejected() {
    let (mut session, _rx, _wallet, _store) = roulette_session(100, Vec::new()).await;
    let err = session.withdraw_chips().await.unwrap_err();
    assert!(matches!(err, SessionError::IllegalAction { .. }));
}
