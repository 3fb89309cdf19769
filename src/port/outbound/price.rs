//! Base-price lookup port.

use crate::domain::{Amount, AssetType, Region};

/// Base price for an `(asset_type, region)` pair.
///
/// Implementations should return a positive amount; the pricing engine
/// rejects anything else.
pub trait BasePriceLookup {
    fn base_price(&self, asset_type: AssetType, region: &Region) -> Amount;
}

impl<F> BasePriceLookup for F
where
    F: Fn(AssetType, &Region) -> Amount,
{
    fn base_price(&self, asset_type: AssetType, region: &Region) -> Amount {
        self(asset_type, region)
    }
}
