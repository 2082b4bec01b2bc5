//! Combinations: the axis labels of a fanned-out build.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Error, Result};

/// Axis name that separates the post-build phase from the main run.
pub const SCRIPT_AXIS: &str = "script";

/// Value of the `script` axis for the post-build phase.
pub const POST_BUILD: &str = "post_build";

/// Key/value labelling of one sub-build's execution axis, e.g. `script=main,ruby=3.2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination(BTreeMap<String, String>);

impl Combination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, axis: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(axis.into(), value.into());
        self
    }

    pub fn get(&self, axis: &str) -> Option<&str> {
        self.0.get(axis).map(String::as_str)
    }

    pub fn is_post_build(&self) -> bool {
        self.get(SCRIPT_AXIS) == Some(POST_BUILD)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Combination {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl std::fmt::Display for Combination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (axis, value) in &self.0 {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}={}", axis, value)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for Combination {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Ok(Self::new());
        }
        let mut axes = BTreeMap::new();
        for pair in s.split(',') {
            let (axis, value) = pair
                .split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| Error::InvalidInput(format!("invalid combination: {}", s)))?;
            if axes.contains_key(&axis) {
                return Err(Error::InvalidInput(format!(
                    "duplicate axis {} in combination: {}",
                    axis, s
                )));
            }
            axes.insert(axis, value);
        }
        Ok(Self(axes))
    }
}

/// Every combination that is not the post-build phase, in the given order.
///
/// The returned iterator is lazy and can be cloned to iterate again.
pub fn main_run_combinations<'a, I>(all: I) -> impl Iterator<Item = &'a Combination> + Clone
where
    I: IntoIterator<Item = &'a Combination>,
    I::IntoIter: Clone,
{
    all.into_iter().filter(|c| !c.is_post_build())
}

/// The first post-build combination in the given order.
///
/// Additional post-build combinations are ignored.
pub fn post_build_combination<'a, I>(all: I) -> Option<&'a Combination>
where
    I: IntoIterator<Item = &'a Combination>,
{
    all.into_iter().find(|c| c.is_post_build())
}
