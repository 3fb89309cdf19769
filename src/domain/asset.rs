//! Asset classification used as pricing and staking facts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of tradable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Nft,
    Phygital,
    Digital,
    RealWorldAsset,
}

impl AssetType {
    /// Canonical lowercase name, as matched by rule predicates.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            AssetType::Nft => "nft",
            AssetType::Phygital => "phygital",
            AssetType::Digital => "digital",
            AssetType::RealWorldAsset => "real_world_asset",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "nft" => Ok(AssetType::Nft),
            "phygital" => Ok(AssetType::Phygital),
            "digital" => Ok(AssetType::Digital),
            "real_world_asset" | "realworldasset" | "rwa" => Ok(AssetType::RealWorldAsset),
            other => Err(format!("unknown asset type '{other}'")),
        }
    }
}

/// Market region. Normalized to lowercase on construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Region(String);

impl Region {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Region {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Region {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}
