//! Model-keyed token pricing.

/// Per-million-token rates in USD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
    pub cache_write: f64,
    pub cache_read: f64,
}

const OPUS: ModelPricing = ModelPricing {
    input: 15.0,
    output: 75.0,
    cache_write: 18.75,
    cache_read: 1.5,
};

const SONNET: ModelPricing = ModelPricing {
    input: 3.0,
    output: 15.0,
    cache_write: 3.75,
    cache_read: 0.3,
};

const HAIKU: ModelPricing = ModelPricing {
    input: 0.8,
    output: 4.0,
    cache_write: 1.0,
    cache_read: 0.08,
};

/// Rates for a model id. Unknown models price at the mid tier rather than
/// zero so estimates stay conservative.
pub fn pricing_for(model: &str) -> ModelPricing {
    let model = model.to_ascii_lowercase();
    if model.contains("opus") {
        OPUS
    } else if model.contains("haiku") {
        HAIKU
    } else {
        SONNET
    }
}

/// Cost in USD for a token batch under the given rates.
pub fn cost_usd(
    pricing: &ModelPricing,
    input: u64,
    output: u64,
    cache_write: u64,
    cache_read: u64,
) -> f64 {
    const MILLION: f64 = 1_000_000.0;
    (input as f64 / MILLION) * pricing.input
        + (output as f64 / MILLION) * pricing.output
        + (cache_write as f64 / MILLION) * pricing.cache_write
        + (cache_read as f64 / MILLION) * pricing.cache_read
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_matches_model_family() {
        assert_eq!(pricing_for("claude-opus-4-20250514"), OPUS);
        assert_eq!(pricing_for("claude-sonnet-4-20250514"), SONNET);
        assert_eq!(pricing_for("claude-3-5-haiku-20241022"), HAIKU);
    }

    #[test]
    fn test_pricing_is_case_insensitive() {
        assert_eq!(pricing_for("Claude-OPUS-4"), OPUS);
    }

    #[test]
    fn test_unknown_model_prices_at_mid_tier() {
        assert_eq!(pricing_for("some-future-model"), SONNET);
        assert_eq!(pricing_for(""), SONNET);
    }

    #[test]
    fn test_cost_per_component() {
        // 1M of each component at sonnet rates
        let cost = cost_usd(&SONNET, 1_000_000, 0, 0, 0);
        assert!((cost - 3.0).abs() < 1e-9);
        let cost = cost_usd(&SONNET, 0, 1_000_000, 0, 0);
        assert!((cost - 15.0).abs() < 1e-9);
        let cost = cost_usd(&SONNET, 0, 0, 1_000_000, 0);
        assert!((cost - 3.75).abs() < 1e-9);
        let cost = cost_usd(&SONNET, 0, 0, 0, 1_000_000);
        assert!((cost - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_zero_tokens_cost_nothing() {
        assert_eq!(cost_usd(&OPUS, 0, 0, 0, 0), 0.0);
    }
}
