//! Position and portfolio valuation.

use rust_decimal::Decimal;

use super::portfolio_model::{PortfolioSnapshot, Position, PositionView};
use crate::quotes::Quote;

/// `part / whole × 100`, or zero when `whole` is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part / whole * Decimal::ONE_HUNDRED
}

/// Join a position with its quote.
pub fn build_position_view(position: &Position, quote: &Quote) -> PositionView {
    let shares = Decimal::from(position.shares);
    let total_cost = position.total_cost();
    let current_value = shares * quote.price;
    let gain = current_value - total_cost;

    PositionView {
        symbol: position.symbol.clone(),
        name: quote.name.clone(),
        sector: quote.sector.clone(),
        shares: position.shares,
        avg_price: position.avg_price,
        current_price: quote.price,
        change: quote.change,
        change_percent: quote.change_percent,
        total_cost,
        current_value,
        gain,
        gain_percent: percent_of(gain, total_cost),
    }
}

/// Sum position views into portfolio totals.
pub fn build_snapshot(positions: Vec<PositionView>, watchlist: Vec<String>) -> PortfolioSnapshot {
    let total_value: Decimal = positions.iter().map(|p| p.current_value).sum();
    let total_cost: Decimal = positions.iter().map(|p| p.total_cost).sum();
    let total_gain = total_value - total_cost;

    PortfolioSnapshot {
        total_value,
        total_cost,
        total_gain,
        total_gain_percent: percent_of(total_gain, total_cost),
        positions,
        watchlist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::fallback_quote;
    use rust_decimal_macros::dec;

    fn quote(symbol: &str, price: Decimal) -> Quote {
        let mut quote = fallback_quote(symbol, price);
        quote.previous_close = dec!(190);
        quote.change = price - dec!(190);
        quote
    }

    #[test]
    fn test_percent_of_zero_whole() {
        assert_eq!(percent_of(dec!(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_of(dec!(5), dec!(50)), dec!(10));
    }

    #[test]
    fn test_position_view_gain() {
        let position = Position::new("AAPL", 50, dec!(170)).unwrap();
        let view = build_position_view(&position, &quote("AAPL", dec!(200)));

        assert_eq!(view.current_value, dec!(10000));
        assert_eq!(view.total_cost, dec!(8500));
        assert_eq!(view.gain, dec!(1500));
        assert_eq!(view.gain_percent.round_dp(3), dec!(17.647));
        assert_eq!(view.change, dec!(10));
        assert_eq!(view.name, "Apple Inc.");
    }

    #[test]
    fn test_fallback_position_has_zero_gain() {
        let position = Position::new("MSFT", 30, dec!(375)).unwrap();
        let view = build_position_view(&position, &fallback_quote("MSFT", dec!(375)));

        assert_eq!(view.current_value, view.total_cost);
        assert_eq!(view.gain, Decimal::ZERO);
        assert_eq!(view.gain_percent, Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_totals() {
        let aapl = Position::new("AAPL", 50, dec!(170)).unwrap();
        let msft = Position::new("MSFT", 30, dec!(375)).unwrap();
        let views = vec![
            build_position_view(&aapl, &quote("AAPL", dec!(200))),
            build_position_view(&msft, &fallback_quote("MSFT", dec!(375))),
        ];

        let snapshot = build_snapshot(views, vec!["V".to_string()]);
        assert_eq!(snapshot.total_cost, dec!(19750));
        assert_eq!(snapshot.total_value, dec!(21250));
        assert_eq!(snapshot.total_gain, dec!(1500));
        assert_eq!(snapshot.watchlist, vec!["V"]);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = build_snapshot(Vec::new(), Vec::new());
        assert_eq!(snapshot.total_value, Decimal::ZERO);
        assert_eq!(snapshot.total_gain_percent, Decimal::ZERO);
    }
}
