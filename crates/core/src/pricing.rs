//! Display price resolution.
//!
//! Every product in a search response shows exactly one price. Given the price
//! rows recorded for a product and the user's preferred store, [`resolve_price`]
//! picks that price and explains where it came from:
//!
//! 1. No rows at all: nothing to show ([`PriceSource::None`]).
//! 2. The preferred store has a usable price: show it
//!    ([`PriceSource::FavoriteStore`]).
//! 3. Otherwise show the mean of every usable price ([`PriceSource::Average`]),
//!    or nothing if no row is usable.
//!
//! A row is *usable* when its price parsed to a non-negative decimal. Unusable
//! rows still count towards `other_store_count`, since the store does carry the
//! product.
//!
//! All arithmetic is exact decimal arithmetic; results are rounded to cents
//! half-up only at the end.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Availability, PriceSource, StoreId};

/// Fraction digits of a display price.
const DISPLAY_SCALE: u32 = 2;

/// One store's price for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorePrice {
    pub store_id: StoreId,
    /// Parsed price, or `None` if the stored value was missing or unusable.
    pub price: Option<Decimal>,
}

impl StorePrice {
    /// Create a price row from an already-parsed amount.
    #[must_use]
    pub const fn new(store_id: StoreId, price: Decimal) -> Self {
        Self {
            store_id,
            price: Some(price),
        }
    }

    /// Create a price row whose stored value could not be used.
    #[must_use]
    pub const fn unusable(store_id: StoreId) -> Self {
        Self {
            store_id,
            price: None,
        }
    }
}

/// The outcome of resolving one product's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrice {
    /// Price rounded to cents, if any.
    pub display_price: Option<Decimal>,
    pub price_source: PriceSource,
    pub is_at_favorite_store: bool,
    pub other_store_count: usize,
}

impl ResolvedPrice {
    const NONE: Self = Self {
        display_price: None,
        price_source: PriceSource::None,
        is_at_favorite_store: false,
        other_store_count: 0,
    };

    /// Availability summary for the search response.
    #[must_use]
    pub const fn availability(&self) -> Availability {
        Availability {
            is_at_favorite_store: self.is_at_favorite_store,
            other_store_count: self.other_store_count,
        }
    }

    /// Display price formatted with exactly two decimals.
    #[must_use]
    pub fn formatted_price(&self) -> Option<String> {
        self.display_price.map(format_price)
    }
}

/// Resolve the display price for one product.
///
/// `rows` are all price rows recorded for the product (one per store).
/// `preferred_store` is the requesting user's preferred store, if set.
#[must_use]
pub fn resolve_price(rows: &[StorePrice], preferred_store: Option<StoreId>) -> ResolvedPrice {
    if rows.is_empty() {
        return ResolvedPrice::NONE;
    }

    let favorite = preferred_store.and_then(|store_id| {
        rows.iter()
            .filter(|row| row.store_id == store_id)
            .find_map(|row| usable(row.price))
            .map(|price| (store_id, price))
    });

    if let Some((store_id, price)) = favorite {
        return ResolvedPrice {
            display_price: Some(round_to_cents(price)),
            price_source: PriceSource::FavoriteStore,
            is_at_favorite_store: true,
            other_store_count: rows.iter().filter(|row| row.store_id != store_id).count(),
        };
    }

    let prices: Vec<Decimal> = rows.iter().filter_map(|row| usable(row.price)).collect();
    let display_price = mean(&prices).map(round_to_cents);

    ResolvedPrice {
        display_price,
        price_source: if display_price.is_some() {
            PriceSource::Average
        } else {
            PriceSource::None
        },
        is_at_favorite_store: false,
        other_store_count: rows.len(),
    }
}

/// Parse a stored price value.
///
/// Returns `None` for anything that is not a non-negative decimal number.
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
        .and_then(|price| usable(Some(price)))
}

/// Format a price with exactly two decimals, rounding half-up.
///
/// ```rust
/// # use bestcart_core::format_price;
/// # use rust_decimal::Decimal;
/// assert_eq!(format_price(Decimal::new(45, 1)), "4.50");
/// assert_eq!(format_price(Decimal::new(4_745, 3)), "4.75");
/// ```
#[must_use]
pub fn format_price(price: Decimal) -> String {
    let mut rounded = round_to_cents(price);
    rounded.rescale(DISPLAY_SCALE);
    rounded.to_string()
}

fn usable(price: Option<Decimal>) -> Option<Decimal> {
    price.filter(|p| !p.is_sign_negative() || p.is_zero())
}

fn round_to_cents(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn mean(prices: &[Decimal]) -> Option<Decimal> {
    if prices.is_empty() {
        return None;
    }
    let sum: Decimal = prices.iter().sum();
    sum.checked_div(Decimal::from(prices.len()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn store(id: i32) -> StoreId {
        StoreId::new(id)
    }

    fn priced(id: i32, price: &str) -> StorePrice {
        StorePrice::new(store(id), dec(price))
    }

    #[test]
    fn test_no_rows_resolves_to_none() {
        let resolved = resolve_price(&[], Some(store(1)));
        assert_eq!(resolved.display_price, None);
        assert_eq!(resolved.price_source, PriceSource::None);
        assert!(!resolved.is_at_favorite_store);
        assert_eq!(resolved.other_store_count, 0);
    }

    #[test]
    fn test_average_without_preferred_store() {
        let rows = [priced(1, "4.50"), priced(2, "5.00")];
        let resolved = resolve_price(&rows, None);

        assert_eq!(resolved.formatted_price().as_deref(), Some("4.75"));
        assert_eq!(resolved.price_source, PriceSource::Average);
        assert!(!resolved.is_at_favorite_store);
        assert_eq!(resolved.other_store_count, 2);
    }

    #[test]
    fn test_favorite_store_wins() {
        let rows = [priced(1, "4.50"), priced(2, "5.00")];
        let resolved = resolve_price(&rows, Some(store(1)));

        assert_eq!(resolved.formatted_price().as_deref(), Some("4.50"));
        assert_eq!(resolved.price_source, PriceSource::FavoriteStore);
        assert!(resolved.is_at_favorite_store);
        assert_eq!(resolved.other_store_count, 1);
    }

    #[test]
    fn test_favorite_store_regardless_of_competitors() {
        let rows = [
            priced(2, "1.00"),
            priced(3, "1.10"),
            priced(7, "9.99"),
            priced(4, "0.50"),
        ];
        let resolved = resolve_price(&rows, Some(store(7)));

        assert_eq!(resolved.price_source, PriceSource::FavoriteStore);
        assert!(resolved.is_at_favorite_store);
        assert_eq!(resolved.formatted_price().as_deref(), Some("9.99"));
        assert_eq!(resolved.other_store_count, 3);
    }

    #[test]
    fn test_preferred_store_without_price_falls_back_to_average() {
        let rows = [priced(2, "2.00"), priced(3, "3.00")];
        let resolved = resolve_price(&rows, Some(store(1)));

        assert_eq!(resolved.price_source, PriceSource::Average);
        assert_eq!(resolved.formatted_price().as_deref(), Some("2.50"));
        assert!(!resolved.is_at_favorite_store);
        assert_eq!(resolved.other_store_count, 2);
    }

    #[test]
    fn test_unusable_favorite_price_falls_back_to_average() {
        let rows = [StorePrice::unusable(store(1)), priced(2, "3.00")];
        let resolved = resolve_price(&rows, Some(store(1)));

        assert_eq!(resolved.price_source, PriceSource::Average);
        assert_eq!(resolved.formatted_price().as_deref(), Some("3.00"));
        assert_eq!(resolved.other_store_count, 2);
    }

    #[test]
    fn test_unusable_rows_count_but_do_not_average() {
        let rows = [
            StorePrice::unusable(store(1)),
            priced(2, "1.00"),
            priced(3, "2.00"),
        ];
        let resolved = resolve_price(&rows, Some(store(2)));

        assert_eq!(resolved.price_source, PriceSource::FavoriteStore);
        assert_eq!(resolved.other_store_count, 2);

        let resolved = resolve_price(&rows, None);
        assert_eq!(resolved.formatted_price().as_deref(), Some("1.50"));
        assert_eq!(resolved.other_store_count, 3);
    }

    #[test]
    fn test_only_unusable_rows_resolve_to_none_but_keep_count() {
        let rows = [StorePrice::unusable(store(1)), StorePrice::unusable(store(2))];
        let resolved = resolve_price(&rows, None);

        assert_eq!(resolved.display_price, None);
        assert_eq!(resolved.price_source, PriceSource::None);
        assert_eq!(resolved.other_store_count, 2);
    }

    #[test]
    fn test_zero_prices_are_valid() {
        let rows = [priced(1, "0"), priced(2, "0.00")];
        let resolved = resolve_price(&rows, None);
        assert_eq!(resolved.price_source, PriceSource::Average);
        assert_eq!(resolved.formatted_price().as_deref(), Some("0.00"));

        let resolved = resolve_price(&rows, Some(store(2)));
        assert_eq!(resolved.price_source, PriceSource::FavoriteStore);
        assert_eq!(resolved.formatted_price().as_deref(), Some("0.00"));
    }

    #[test]
    fn test_average_rounds_half_up() {
        // (1.00 + 1.01 + 1.02 + 1.00) / 4 = 1.0075 -> 1.01
        let rows = [
            priced(1, "1.00"),
            priced(2, "1.01"),
            priced(3, "1.02"),
            priced(4, "1.00"),
        ];
        let resolved = resolve_price(&rows, None);
        assert_eq!(resolved.formatted_price().as_deref(), Some("1.01"));

        // 0.125 exactly -> 0.13
        let rows = [priced(1, "0.10"), priced(2, "0.15")];
        assert_eq!(
            resolve_price(&rows, None).formatted_price().as_deref(),
            Some("0.13")
        );
    }

    #[test]
    fn test_repeating_mean_rounds_to_cents() {
        let rows = [priced(1, "1"), priced(2, "1"), priced(3, "2")];
        let resolved = resolve_price(&rows, None);
        assert_eq!(resolved.formatted_price().as_deref(), Some("1.33"));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("4.50"), Some(dec("4.50")));
        assert_eq!(parse_price(" 5 "), Some(dec("5")));
        assert_eq!(parse_price("0"), Some(Decimal::ZERO));
        assert_eq!(parse_price("1e1"), Some(dec("10")));
        assert_eq!(parse_price("-0.01"), None);
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_format_price_pads_and_rounds() {
        assert_eq!(format_price(dec("4.5")), "4.50");
        assert_eq!(format_price(dec("5")), "5.00");
        assert_eq!(format_price(dec("2.345")), "2.35");
        assert_eq!(format_price(dec("2.344")), "2.34");
    }

    #[test]
    fn test_availability_projection() {
        let rows = [priced(1, "4.50"), priced(2, "5.00")];
        let availability = resolve_price(&rows, Some(store(1))).availability();
        assert!(availability.is_at_favorite_store);
        assert_eq!(availability.other_store_count, 1);
    }
}
