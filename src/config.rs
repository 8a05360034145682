//! # config: อ่าน Config จาก Environment Variables
//!
//! | Variable              | Default        | Description                              |
//! |-----------------------|----------------|------------------------------------------|
//! | `BIND_ADDR`           | `0.0.0.0:5000` | Address Axum listens on                  |
//! | `APP_ENV`             | `development`  | Reported by `/health`                    |
//! | `TICK_INTERVAL_MS`    | `5000`         | Price feed timer period                  |
//! | `HISTORY_WINDOW`      | `30`           | Max bars kept per symbol                 |
//! | `TICK_BAND_PCT`       | `1.0`          | ± percent a price may move per tick      |
//! | `LISTENER_QUEUE`      | `64`           | Outbound queue size per WebSocket client |
//! | `RATE_LIMIT_BURST`    | `1000`         | Token bucket capacity per client IP      |
//! | `RATE_LIMIT_PER_SEC`  | burst / 900    | Token refill rate per client IP          |
//!
//! With `APP_ENV=production` the burst default drops to `100`, i.e. 100
//! requests per 15 minutes per client.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};

/// Token buckets refill over this many seconds (15 minutes).
const RATE_LIMIT_WINDOW_SECS: f64 = 900.0;
const PRODUCTION_RATE_LIMIT_BURST: u32 = 100;

/// Config ทั้งหมดที่ server ต้องการ
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr:          SocketAddr,
    pub environment:        String,
    /// รอบเวลา Price Feed
    pub tick_interval:      Duration,
    /// จำนวนแท่งราคาสูงสุดต่อ Symbol (เก่าสุดถูกตัดทิ้งก่อน)
    pub history_window:     usize,
    /// ช่วงการขยับราคาต่อ Tick เป็น % (1.0 = ±1%)
    pub tick_band_pct:      f64,
    pub listener_queue:     usize,
    pub rate_limit_burst:   u32,
    pub rate_limit_per_sec: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr:          SocketAddr::from(([0, 0, 0, 0], 5000)),
            environment:        "development".to_string(),
            tick_interval:      Duration::from_millis(5000),
            history_window:     30,
            tick_band_pct:      1.0,
            listener_queue:     64,
            rate_limit_burst:   1000,
            rate_limit_per_sec: 1000.0 / RATE_LIMIT_WINDOW_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source; unset keys fall back to [`Default`].
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tick_ms: u64 = parse_or(&lookup, "TICK_INTERVAL_MS", 5000)?;
        if tick_ms == 0 {
            bail!("TICK_INTERVAL_MS must be greater than zero");
        }

        let history_window: usize = parse_or(&lookup, "HISTORY_WINDOW", defaults.history_window)?;
        if history_window == 0 {
            bail!("HISTORY_WINDOW must be at least 1");
        }

        let tick_band_pct: f64 = parse_or(&lookup, "TICK_BAND_PCT", defaults.tick_band_pct)?;
        if !(0.0..100.0).contains(&tick_band_pct) {
            bail!("TICK_BAND_PCT must be within [0, 100), got {tick_band_pct}");
        }

        let listener_queue: usize = parse_or(&lookup, "LISTENER_QUEUE", defaults.listener_queue)?;
        if listener_queue == 0 {
            bail!("LISTENER_QUEUE must be at least 1");
        }

        let environment = lookup("APP_ENV").unwrap_or(defaults.environment);
        let default_burst = if environment.eq_ignore_ascii_case("production") {
            PRODUCTION_RATE_LIMIT_BURST
        } else {
            defaults.rate_limit_burst
        };
        let rate_limit_burst: u32 = parse_or(&lookup, "RATE_LIMIT_BURST", default_burst)?;
        let rate_limit_per_sec: f64 = parse_or(
            &lookup,
            "RATE_LIMIT_PER_SEC",
            rate_limit_burst as f64 / RATE_LIMIT_WINDOW_SECS,
        )?;

        Ok(Self {
            bind_addr:          parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            environment,
            tick_interval:      Duration::from_millis(tick_ms),
            history_window,
            tick_band_pct,
            listener_queue,
            rate_limit_burst,
            rate_limit_per_sec,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow::anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
