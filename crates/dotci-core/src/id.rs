//! Build identifiers.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// The sequential number of a build within its project.
///
/// A parent build and every sub-build it fans out into share the same number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct BuildNumber(u64);

impl BuildNumber {
    pub fn new(number: u64) -> Self {
        Self(number)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<BuildNumber> for u64 {
    fn from(number: BuildNumber) -> Self {
        number.0
    }
}

impl std::str::FromStr for BuildNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim_start_matches('#').parse()?))
    }
}
