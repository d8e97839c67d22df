//! Comms / non-comms population division strategies.

use std::str::FromStr;

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::index;

use crate::error::{Error, Result};

/// Disjoint cover of the population into comms-capable and non-comms units,
/// by population index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    comms: Vec<usize>,
    non_comms: Vec<usize>,
    is_comms: Vec<bool>,
}

impl Partition {
    /// Builds a partition of `0..population_len` from the comms members.
    /// Out-of-range and duplicate indices are ignored.
    pub fn from_comms(population_len: usize, members: impl IntoIterator<Item = usize>) -> Self {
        let mut is_comms = vec![false; population_len];
        for i in members {
            if let Some(flag) = is_comms.get_mut(i) {
                *flag = true;
            }
        }
        let (comms, non_comms): (Vec<usize>, Vec<usize>) =
            (0..population_len).partition(|&i| is_comms[i]);
        Self {
            comms,
            non_comms,
            is_comms,
        }
    }

    /// Every unit in the non-comms subset.
    pub fn all_non_comms(population_len: usize) -> Self {
        Self::from_comms(population_len, std::iter::empty())
    }

    /// Comms members in ascending population order.
    pub fn comms(&self) -> &[usize] {
        &self.comms
    }

    /// Non-comms members in ascending population order.
    pub fn non_comms(&self) -> &[usize] {
        &self.non_comms
    }

    pub fn is_comms(&self, index: usize) -> bool {
        self.is_comms.get(index).copied().unwrap_or(false)
    }
}

/// How the hub chooses the comms-capable subset at each peak boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivisionStrategy {
    /// Uniform random sample of exactly `size` units (clamped to the population).
    ConstantSize,
    /// Uniform random sample whose size is drawn from `0..=size`.
    VariableSize,
    /// Empty comms subset.
    NoComms,
    /// Whole population is comms-capable.
    EntirePopulation,
}

impl DivisionStrategy {
    /// Names accepted in configuration files.
    pub const NAMES: &[&str] = &["constant", "variable", "none", "entire"];

    /// Divides a population of `population_len` units.
    ///
    /// # Arguments
    ///
    /// * `population_len` - Number of units
    /// * `size` - Sample size (constant) or cap (variable); ignored otherwise
    /// * `rng` - Sampling source, advanced only by the random strategies
    pub fn divide(&self, population_len: usize, size: usize, rng: &mut StdRng) -> Partition {
        match self {
            Self::ConstantSize => sample(population_len, size.min(population_len), rng),
            Self::VariableSize => {
                let cap = size.min(population_len);
                let amount = rng.random_range(0..=cap);
                sample(population_len, amount, rng)
            }
            Self::NoComms => Partition::all_non_comms(population_len),
            Self::EntirePopulation => Partition::from_comms(population_len, 0..population_len),
        }
    }
}

fn sample(population_len: usize, amount: usize, rng: &mut StdRng) -> Partition {
    let picked = index::sample(rng, population_len, amount);
    Partition::from_comms(population_len, picked.into_vec())
}

impl FromStr for DivisionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "constant" => Ok(Self::ConstantSize),
            "variable" => Ok(Self::VariableSize),
            "none" => Ok(Self::NoComms),
            "entire" => Ok(Self::EntirePopulation),
            other => Err(Error::Configuration(format!(
                "unknown division strategy \"{other}\", available: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }
}
