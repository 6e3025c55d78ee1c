//! Quota urgency scoring.
//!
//! Folds weekly utilization, daily utilization, and spend rate into a single
//! 0-100 score, with a bonus when the remaining budget window drops below
//! thirty minutes. The score drives the account-swap recommendation shown
//! alongside quota segments.

use serde::{Deserialize, Serialize};

const WEEKLY_WEIGHT: f64 = 0.6;
const DAILY_WEIGHT: f64 = 0.3;
const BURN_WEIGHT: f64 = 0.1;

/// Spend rate at which the burn component saturates, in dollars per hour.
const BURN_CAP_PER_HOUR: f64 = 20.0;

/// Remaining-budget horizon below which urgency gets a bonus.
const BONUS_WINDOW_MINUTES: f64 = 30.0;
const MAX_BONUS: f64 = 15.0;

const MEDIUM_THRESHOLD: f64 = 50.0;
const HIGH_THRESHOLD: f64 = 80.0;
const URGENT_THRESHOLD: f64 = 95.0;

/// Inputs to the urgency score. Percentages are 0-100.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrgencyInput {
    pub weekly_used_pct: f64,
    pub daily_used_pct: f64,
    pub burn_rate_per_hour: f64,
    /// Projected minutes until the binding quota limit is reached, when known.
    pub remaining_budget_minutes: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    #[default]
    Low,
    Medium,
    High,
    Urgent,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::High => "high",
            UrgencyLevel::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the user should consider swapping to another account slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    #[default]
    None,
    SwapRecommended,
    SwapUrgent,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::None => "none",
            Recommendation::SwapRecommended => "swap_recommended",
            Recommendation::SwapUrgent => "swap_urgent",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrgencyAssessment {
    pub score: f64,
    pub level: UrgencyLevel,
    pub recommendation: Recommendation,
}

/// Score quota pressure from the given inputs.
///
/// Weekly utilization dominates the score since weekly limits are the hard
/// backstop. The burn component saturates at [`BURN_CAP_PER_HOUR`] so a
/// one-off expensive call cannot swamp the utilization signal. The bonus is
/// zero at exactly thirty minutes remaining and grows linearly to
/// [`MAX_BONUS`] as the remaining budget approaches zero.
pub fn assess(input: &UrgencyInput) -> UrgencyAssessment {
    let weekly = input.weekly_used_pct.clamp(0.0, 100.0) * WEEKLY_WEIGHT;
    let daily = input.daily_used_pct.clamp(0.0, 100.0) * DAILY_WEIGHT;
    let burn_pct =
        (input.burn_rate_per_hour.clamp(0.0, BURN_CAP_PER_HOUR) / BURN_CAP_PER_HOUR) * 100.0;
    let burn = burn_pct * BURN_WEIGHT;

    let bonus = match input.remaining_budget_minutes {
        Some(minutes) if minutes < BONUS_WINDOW_MINUTES => {
            MAX_BONUS * (1.0 - minutes.max(0.0) / BONUS_WINDOW_MINUTES)
        }
        _ => 0.0,
    };

    let score = (weekly + daily + burn + bonus).clamp(0.0, 100.0);

    UrgencyAssessment {
        score,
        level: level_for(score),
        recommendation: recommendation_for(score),
    }
}

fn level_for(score: f64) -> UrgencyLevel {
    if score >= URGENT_THRESHOLD {
        UrgencyLevel::Urgent
    } else if score >= HIGH_THRESHOLD {
        UrgencyLevel::High
    } else if score >= MEDIUM_THRESHOLD {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    }
}

fn recommendation_for(score: f64) -> Recommendation {
    if score >= URGENT_THRESHOLD {
        Recommendation::SwapUrgent
    } else if score >= HIGH_THRESHOLD {
        Recommendation::SwapRecommended
    } else {
        Recommendation::None
    }
}
