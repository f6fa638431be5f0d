//! Event pre-filtering
//!
//! The API attaches event references that may already be closed or
//! deactivated. Grouping on a dead event would resurrect it, so those
//! references are stripped before the batch reaches the transformer.

use crate::types::GammaMarket;
use tracing::debug;

/// Drop event references that are no longer live
pub fn retain_live_events(market: &mut GammaMarket) {
    let before = market.events.len();
    market.events.retain(|event| event.is_live());

    let dropped = before - market.events.len();
    if dropped > 0 {
        debug!(
            "Dropped {} dead event ref(s) from market {}",
            dropped, market.id
        );
    }
}

/// Pre-filter a whole batch in place, returning it for chaining
pub fn filter_batch(mut markets: Vec<GammaMarket>) -> Vec<GammaMarket> {
    for market in &mut markets {
        retain_live_events(market);
    }
    markets
}
