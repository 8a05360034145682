//! # engine::feed
//!
//! The **Price Feed**: one repeating timer that drives all mutation.
//!
//! Every period: take the table write lock, run the mutator, release the
//! lock, then publish each update through the broadcaster.  The same tick
//! sweeps rate-limit buckets that have refilled.  Stopping is a
//! single `watch` flip, done by the shutdown signal handler in `main`.

use std::sync::atomic::Ordering;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::events::WsEvent;
use crate::state::SharedState;

/// Spawn the feed.  It runs until `shutdown` becomes `true` or its sender is
/// dropped.
pub fn spawn_price_feed(state: SharedState, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = state.config.tick_interval;
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // `interval` fires immediately; the seed data is already fresh.
        ticker.tick().await;

        info!(?period, "📈 Price feed started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    run_tick(&state).await;
                    let pruned = state.rate_limiter.prune_idle();
                    if pruned > 0 {
                        debug!(pruned, "Idle rate-limit buckets dropped");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("📉 Price feed stopped");
    })
}

/// One tick: mutate, then fan out.  Returns the total number of deliveries.
pub async fn run_tick(state: &SharedState) -> usize {
    let updates = {
        let mut table = state.market.write().await;
        let mut rng = StdRng::from_entropy();
        state.mutator.tick(&mut table, &mut rng, Utc::now())
    };

    let tick = state.tick_count.fetch_add(1, Ordering::Relaxed) + 1;

    let mut delivered = 0;
    for update in updates {
        let symbol = update.symbol.clone();
        delivered += state.broadcaster.publish(&symbol, &WsEvent::from(update)).await;
    }

    debug!(tick, delivered, "Tick published");
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::AppConfig;
    use crate::state::build_state;

    fn test_state(tick_ms: u64) -> SharedState {
        build_state(AppConfig {
            tick_interval: Duration::from_millis(tick_ms),
            history_window: 5,
            ..AppConfig::default()
        })
    }

    #[tokio::test]
    async fn test_run_tick_updates_every_symbol_and_fans_out() {
        let state = test_state(1000);
        let (id, mut rx) = state.broadcaster.connect().await;
        state.broadcaster.subscribe(id, Some("AAPL".into())).await;

        let symbols = state.market.read().await.len();
        let delivered = run_tick(&state).await;

        assert_eq!(delivered, 1);
        assert_eq!(state.tick_count.load(Ordering::Relaxed), 1);

        let frame = rx.recv().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(v["type"], "priceUpdate");
        assert_eq!(v["symbol"], "AAPL");

        let table = state.market.read().await;
        assert_eq!(table.len(), symbols);
        for (_, s) in table.listings() {
            assert_eq!(s.price_history.len(), 5);
        }
    }

    #[tokio::test]
    async fn test_unfiltered_listener_gets_every_symbol() {
        let state = test_state(1000);
        let (_id, mut rx) = state.broadcaster.connect().await;

        let symbols = state.market.read().await.len();
        assert_eq!(run_tick(&state).await, symbols);

        let mut frames = 0;
        while rx.try_recv().is_ok() {
            frames += 1;
        }
        assert_eq!(frames, symbols);
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_ticks_on_interval_and_stops() {
        let state = test_state(100);
        let (tx, rx) = watch::channel(false);
        let handle = spawn_price_feed(state.clone(), rx);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(state.tick_count.load(Ordering::Relaxed), 3);

        tx.send(true).unwrap();
        handle.await.unwrap();

        let after_stop = state.tick_count.load(Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(state.tick_count.load(Ordering::Relaxed), after_stop);
    }

    #[tokio::test]
    async fn test_feed_sweeps_idle_rate_limit_buckets() {
        let state = build_state(AppConfig {
            tick_interval: Duration::from_millis(10),
            rate_limit_burst: 1,
            rate_limit_per_sec: 1_000_000.0,
            ..AppConfig::default()
        });
        state.rate_limiter.check("10.0.0.9").unwrap();
        assert_eq!(state.rate_limiter.tracked_clients(), 1);

        let (tx, rx) = watch::channel(false);
        let handle = spawn_price_feed(state.clone(), rx);
        tokio::time::sleep(Duration::from_millis(60)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(state.rate_limiter.tracked_clients(), 0);
    }
}
