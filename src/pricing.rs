//! Completion cost accounting
//!
//! Prices are USD per million tokens. Lookup uses the longest matching prefix
//! of the wire model name, so dated snapshots (`gpt-4o-2024-08-06`) resolve to
//! their family entry.

use std::collections::HashMap;

use crate::error::LlmError;
use crate::types::Usage;

/// Input and output token prices for one model, USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelPrice {
    pub const fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    /// Cost of the given usage in USD.
    pub fn cost(&self, usage: &Usage) -> f64 {
        (usage.prompt_tokens as f64 * self.input_per_million
            + usage.completion_tokens as f64 * self.output_per_million)
            / 1_000_000.0
    }
}

const BUILTIN_PRICES: &[(&str, ModelPrice)] = &[
    ("gpt-4o-mini", ModelPrice::new(0.15, 0.60)),
    ("gpt-4o", ModelPrice::new(2.50, 10.00)),
    ("gpt-4.1-nano", ModelPrice::new(0.10, 0.40)),
    ("gpt-4.1-mini", ModelPrice::new(0.40, 1.60)),
    ("gpt-4.1", ModelPrice::new(2.00, 8.00)),
    ("gpt-4-turbo", ModelPrice::new(10.00, 30.00)),
    ("gpt-4-vision-preview", ModelPrice::new(10.00, 30.00)),
    ("gpt-4", ModelPrice::new(30.00, 60.00)),
    ("gpt-3.5-turbo", ModelPrice::new(0.50, 1.50)),
    ("o1-mini", ModelPrice::new(1.10, 4.40)),
    ("o1", ModelPrice::new(15.00, 60.00)),
    ("o3-mini", ModelPrice::new(1.10, 4.40)),
    ("o3", ModelPrice::new(2.00, 8.00)),
    ("o4-mini", ModelPrice::new(1.10, 4.40)),
    ("gemini-1.5-flash", ModelPrice::new(0.075, 0.30)),
    ("gemini-1.5-pro", ModelPrice::new(1.25, 5.00)),
    ("gemini-2.0-flash-lite", ModelPrice::new(0.075, 0.30)),
    ("gemini-2.0-flash", ModelPrice::new(0.10, 0.40)),
    ("gemini-2.5-flash", ModelPrice::new(0.30, 2.50)),
    ("gemini-2.5-pro", ModelPrice::new(1.25, 10.00)),
    ("claude-3-5-haiku", ModelPrice::new(0.80, 4.00)),
    ("claude-3-5-sonnet", ModelPrice::new(3.00, 15.00)),
    ("claude-3-7-sonnet", ModelPrice::new(3.00, 15.00)),
    ("claude-3-opus", ModelPrice::new(15.00, 75.00)),
    ("claude-3-haiku", ModelPrice::new(0.25, 1.25)),
    ("claude-sonnet-4", ModelPrice::new(3.00, 15.00)),
    ("claude-opus-4", ModelPrice::new(15.00, 75.00)),
    ("deepseek-chat", ModelPrice::new(0.27, 1.10)),
    ("deepseek-reasoner", ModelPrice::new(0.55, 2.19)),
];

/// Price for a wire model name from the custom table, then the built-in one.
pub fn lookup_price(model: &str, custom: &HashMap<String, ModelPrice>) -> Option<ModelPrice> {
    if let Some(price) = custom.get(model) {
        return Some(*price);
    }

    // Vendor-qualified names (OpenRouter) are priced by their last segment
    let name = model.rsplit('/').next().unwrap_or(model).to_lowercase();
    BUILTIN_PRICES
        .iter()
        .filter(|(prefix, _)| name.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, price)| *price)
}

/// Cost of a completion in USD.
pub fn completion_cost(
    model: &str,
    usage: &Usage,
    custom: &HashMap<String, ModelPrice>,
) -> Result<f64, LlmError> {
    lookup_price(model, custom)
        .map(|price| price.cost(usage))
        .ok_or_else(|| {
            LlmError::PricingError(format!("No pricing information for model: {model}"))
        })
}
