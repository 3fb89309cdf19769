//! Configurable base-price table.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, AssetType, Region};
use crate::error::{Result, ValidationError};
use crate::port::outbound::BasePriceLookup;

/// One `(asset_type, region) → price` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasePriceEntry {
    pub asset_type: AssetType,
    pub region: Region,
    pub price: Amount,
}

impl BasePriceEntry {
    pub fn new(asset_type: AssetType, region: impl Into<Region>, price: Amount) -> Self {
        Self {
            asset_type,
            region: region.into(),
            price,
        }
    }
}

/// Base prices keyed by asset type and region, with a fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct BasePriceTable {
    prices: HashMap<(AssetType, Region), Amount>,
    fallback: Amount,
}

impl BasePriceTable {
    /// Build a table; every price and the fallback must be positive.
    pub fn new(
        entries: impl IntoIterator<Item = BasePriceEntry>,
        fallback: Amount,
    ) -> Result<Self> {
        let mut prices = HashMap::new();
        for entry in entries {
            if entry.price <= Decimal::ZERO {
                return Err(ValidationError::InvalidBasePrice {
                    asset_type: entry.asset_type,
                    region: entry.region.to_string(),
                    price: entry.price,
                }
                .into());
            }
            prices.insert((entry.asset_type, entry.region), entry.price);
        }
        if fallback <= Decimal::ZERO {
            return Err(ValidationError::Negative {
                field: "fallback_base_price",
                value: fallback,
            }
            .into());
        }
        Ok(Self { prices, fallback })
    }

    #[must_use]
    pub fn fallback(&self) -> Amount {
        self.fallback
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// The reference prices: nft in the three launch cities, phygital in two,
/// digital and real-world assets globally.
pub fn default_base_prices() -> Vec<BasePriceEntry> {
    vec![
        BasePriceEntry::new(AssetType::Nft, "mumbai", dec!(2.0)),
        BasePriceEntry::new(AssetType::Nft, "delhi", dec!(1.8)),
        BasePriceEntry::new(AssetType::Nft, "bangalore", dec!(2.2)),
        BasePriceEntry::new(AssetType::Phygital, "mumbai", dec!(3.5)),
        BasePriceEntry::new(AssetType::Phygital, "delhi", dec!(3.2)),
        BasePriceEntry::new(AssetType::Digital, "global", dec!(1.5)),
        BasePriceEntry::new(AssetType::RealWorldAsset, "global", dec!(5.0)),
    ]
}

pub const DEFAULT_FALLBACK_PRICE: Decimal = Decimal::ONE;

impl Default for BasePriceTable {
    fn default() -> Self {
        let prices = default_base_prices()
            .into_iter()
            .map(|e| ((e.asset_type, e.region), e.price))
            .collect();
        Self {
            prices,
            fallback: DEFAULT_FALLBACK_PRICE,
        }
    }
}

impl BasePriceLookup for BasePriceTable {
    fn base_price(&self, asset_type: AssetType, region: &Region) -> Amount {
        self.prices
            .get(&(asset_type, region.clone()))
            .copied()
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_pairs_and_fallback() {
        let table = BasePriceTable::default();
        assert_eq!(table.base_price(AssetType::Nft, &Region::new("Mumbai")), dec!(2.0));
        assert_eq!(table.base_price(AssetType::RealWorldAsset, &Region::new("global")), dec!(5.0));
        assert_eq!(table.base_price(AssetType::Digital, &Region::new("delhi")), dec!(1));
    }

    #[test]
    fn rejects_non_positive_prices() {
        assert!(BasePriceTable::new(
            [BasePriceEntry::new(AssetType::Nft, "delhi", dec!(0))],
            dec!(1)
        )
        .is_err());
        assert!(BasePriceTable::new([], dec!(-1)).is_err());
    }
}
