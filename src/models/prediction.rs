//! # models::prediction
//!
//! The "AI" outlook attached to each symbol.  There is no model behind it:
//! values are either canned at seed time or drawn at random by
//! [`crate::market::forecast`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outlook {
    Bullish,
    Bearish,
    Neutral,
}

impl Outlook {
    pub const ALL: [Outlook; 3] = [Outlook::Bullish, Outlook::Bearish, Outlook::Neutral];

    pub fn as_str(self) -> &'static str {
        match self {
            Outlook::Bullish => "bullish",
            Outlook::Bearish => "bearish",
            Outlook::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub prediction: Outlook,
    /// 0.0 – 1.0
    pub confidence: f64,
    pub target_price: f64,
    pub timeframe: String,
    pub factors: Vec<String>,
    pub analysis: String,
    /// `true` once regenerated through the API; seeded predictions are `false`.
    #[serde(default)]
    pub generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

// ─── Accuracy (mock) ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HitRate {
    pub total: u32,
    pub correct: u32,
    pub accuracy: f64,
}

impl HitRate {
    pub fn new(total: u32, correct: u32) -> Self {
        let accuracy = if total == 0 { 0.0 } else { correct as f64 / total as f64 };
        Self { total, correct, accuracy }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBucket {
    pub predictions: u32,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ByOutlook {
    pub bullish: HitRate,
    pub bearish: HitRate,
    pub neutral: HitRate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ByConfidence {
    pub high: ConfidenceBucket,
    pub medium: ConfidenceBucket,
    pub low: ConfidenceBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyReport {
    pub symbol: String,
    pub overall_accuracy: f64,
    pub last_30_days: HitRate,
    pub by_prediction_type: ByOutlook,
    pub average_time_to_target: String,
    pub confidence_vs_accuracy: ByConfidence,
}
