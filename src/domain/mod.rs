//! Domain types: identifiers, facts, rules, prices, ownership and stakes.

mod asset;
mod facts;
mod id;
mod money;
mod ownership;
mod price;
mod rule;
mod stake;

pub use asset::{AssetType, Region};
pub use facts::{FactValue, Facts};
pub use id::{AssetId, CreatorId, OwnerId, RuleId, StakeId};
pub use money::{truncate, Amount, Factor, Rate, Share};
pub use ownership::{Creator, OwnershipProposal, RevenueDistribution, SHARE_EPSILON};
pub use price::{fields, AppliedMultiplier, PriceCategory, PriceEstimate, PriceFacts};
pub use rule::{Effect, Predicate, Rule, RuleMatch, RuleSet};
pub use stake::{
    AprTier, ClaimReceipt, ExitMode, RewardAccrual, StakePosition, StakeRequest, StakeStatus,
    UnstakePayout,
};

pub(crate) use ownership::largest_entry;
pub(crate) use stake::empty_accrual;
