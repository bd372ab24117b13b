use rust_decimal::Decimal;

/// Outcome of quoting one input amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub amount_in: Decimal,
    pub amount_out_min: Decimal,
    pub price_impact_pct: Decimal,
}

impl Quote {
    /// Minimum output without trailing zeros, e.g. `"0.98"`.
    pub fn amount_out_min_display(&self) -> String {
        self.amount_out_min.normalize().to_string()
    }

    /// Price impact with two decimals, e.g. `"2.00"`.
    pub fn price_impact_display(&self) -> String {
        let mut impact = self.price_impact_pct.round_dp(2);
        impact.rescale(2);
        impact.to_string()
    }
}

/// A pricing source. Implementations must be pure and must not block.
pub trait QuoteStrategy: Send + Sync {
    fn estimate(&self, amount_in: Decimal) -> Quote;
}

/// Fixed-ratio stand-in for a real price feed: 98% out, 2% impact.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderQuote;

impl PlaceholderQuote {
    pub fn output_ratio() -> Decimal {
        Decimal::new(98, 2)
    }

    pub fn price_impact_pct() -> Decimal {
        Decimal::new(200, 2)
    }
}

impl QuoteStrategy for PlaceholderQuote {
    fn estimate(&self, amount_in: Decimal) -> Quote {
        Quote {
            amount_in,
            amount_out_min: amount_in * Self::output_ratio(),
            price_impact_pct: Self::price_impact_pct(),
        }
    }
}

/// Front for whichever `QuoteStrategy` is plugged in.
pub struct QuoteEstimator {
    strategy: Box<dyn QuoteStrategy>,
}

impl QuoteEstimator {
    pub fn new(strategy: Box<dyn QuoteStrategy>) -> Self {
        Self { strategy }
    }

    pub fn estimate(&self, amount_in: Decimal) -> Quote {
        self.strategy.estimate(amount_in)
    }
}

impl Default for QuoteEstimator {
    fn default() -> Self {
        Self::new(Box::new(PlaceholderQuote))
    }
}
