//! Parameter variation framework for exploring the obfuscation parameter space.
//!
//! This module provides tools for defining parameter spaces and generating
//! parameter sets for a sweep. Supports grid search and random sampling
//! strategies.

use serde::{Deserialize, Serialize};

mod combinations;
mod constraints;
mod sampling;
mod values;

pub use values::{parse_value_list, ValueListError};

use combinations::ParameterVariations;

/// AmneziaWG obfuscation parameters for one tunnel configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AwgParams {
    /// Junk packet count.
    pub jc: u32,
    /// Minimum junk packet size.
    pub jmin: u32,
    /// Maximum junk packet size.
    pub jmax: u32,
    /// Init message padding.
    pub s1: u32,
    /// Response message padding.
    pub s2: u32,
    pub h1: u32,
    pub h2: u32,
    pub h3: u32,
    pub h4: u32,
}

impl Default for AwgParams {
    fn default() -> Self {
        Self {
            jc: 0,
            jmin: 40,
            jmax: 70,
            s1: 0,
            s2: 0,
            h1: 1,
            h2: 2,
            h3: 3,
            h4: 4,
        }
    }
}

impl AwgParams {
    pub fn get(&self, field: ParamField) -> u32 {
        match field {
            ParamField::Jc => self.jc,
            ParamField::Jmin => self.jmin,
            ParamField::Jmax => self.jmax,
            ParamField::S1 => self.s1,
            ParamField::S2 => self.s2,
            ParamField::H1 => self.h1,
            ParamField::H2 => self.h2,
            ParamField::H3 => self.h3,
            ParamField::H4 => self.h4,
        }
    }

    pub fn set(&mut self, field: ParamField, value: u32) {
        match field {
            ParamField::Jc => self.jc = value,
            ParamField::Jmin => self.jmin = value,
            ParamField::Jmax => self.jmax = value,
            ParamField::S1 => self.s1 = value,
            ParamField::S2 => self.s2 = value,
            ParamField::H1 => self.h1 = value,
            ParamField::H2 => self.h2 = value,
            ParamField::H3 => self.h3 = value,
            ParamField::H4 => self.h4 = value,
        }
    }

    /// Copy of these parameters with one field replaced.
    pub fn with(mut self, field: ParamField, value: u32) -> Self {
        self.set(field, value);
        self
    }

    /// Copy of these parameters with H1..H4 taken from `other`.
    pub fn with_headers_of(self, other: &AwgParams) -> Self {
        ParamField::HEADERS
            .iter()
            .fold(self, |params, &field| params.with(field, other.get(field)))
    }

    /// Compact label for the swept fields, e.g. `Jc3_Jmin40_Jmax100_S10_S20`.
    pub fn short_name(&self) -> String {
        format!(
            "Jc{}_Jmin{}_Jmax{}_S1{}_S2{}",
            self.jc, self.jmin, self.jmax, self.s1, self.s2
        )
    }

    /// `Key = Value` lines in declared field order.
    pub fn config_lines(&self) -> Vec<String> {
        ParamField::ALL
            .iter()
            .map(|&field| format!("{} = {}", field.key(), self.get(field)))
            .collect()
    }
}

/// One of the nine substitutable configuration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamField {
    Jc,
    Jmin,
    Jmax,
    S1,
    S2,
    H1,
    H2,
    H3,
    H4,
}

impl ParamField {
    /// Declared field order. The first field varies slowest during a sweep.
    pub const ALL: [ParamField; 9] = [
        ParamField::Jc,
        ParamField::Jmin,
        ParamField::Jmax,
        ParamField::S1,
        ParamField::S2,
        ParamField::H1,
        ParamField::H2,
        ParamField::H3,
        ParamField::H4,
    ];

    /// Message type headers. They must match the server, so they are never
    /// part of a preset grid.
    pub const HEADERS: [ParamField; 4] = [
        ParamField::H1,
        ParamField::H2,
        ParamField::H3,
        ParamField::H4,
    ];

    /// Key as written in the `[Interface]` section.
    pub fn key(self) -> &'static str {
        match self {
            ParamField::Jc => "Jc",
            ParamField::Jmin => "Jmin",
            ParamField::Jmax => "Jmax",
            ParamField::S1 => "S1",
            ParamField::S2 => "S2",
            ParamField::H1 => "H1",
            ParamField::H2 => "H2",
            ParamField::H3 => "H3",
            ParamField::H4 => "H4",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.key() == key)
    }
}

/// A single parameter configuration for one sweep iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSet {
    /// Obfuscation parameters substituted into the template.
    pub params: AwgParams,
    /// Stable identifier for this combination (`combo_<n>` or `sample_<n>`).
    pub combination_id: String,
    /// Position in enumeration order.
    pub index: usize,
}

impl ParameterSet {
    pub fn new(params: AwgParams, index: usize) -> Self {
        Self::with_id(params, index, format!("combo_{index}"))
    }

    pub fn with_id(params: AwgParams, index: usize, combination_id: String) -> Self {
        Self {
            params,
            combination_id,
            index,
        }
    }
}

/// Defines a parameter space for exploration.
///
/// Supports grid search (Cartesian product) and random sampling strategies.
/// Fields without candidate values fall back to the base parameters.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    /// Base parameters (used as defaults for unspecified fields).
    base: AwgParams,
    jc: Vec<u32>,
    jmin: Vec<u32>,
    jmax: Vec<u32>,
    s1: Vec<u32>,
    s2: Vec<u32>,
    h1: Vec<u32>,
    h2: Vec<u32>,
    h3: Vec<u32>,
    h4: Vec<u32>,
    /// Drop combinations whose `jmax` does not exceed `jmin`.
    require_jmax_above_jmin: bool,
}

impl ParameterSpace {
    /// Create a new parameter space with default base parameters.
    pub fn new() -> Self {
        Self {
            base: AwgParams::default(),
            jc: vec![],
            jmin: vec![],
            jmax: vec![],
            s1: vec![],
            s2: vec![],
            h1: vec![],
            h2: vec![],
            h3: vec![],
            h4: vec![],
            require_jmax_above_jmin: false,
        }
    }

    /// Create a new parameter space for grid search.
    pub fn grid() -> Self {
        Self::new()
    }

    /// Set junk packet counts to explore.
    pub fn jc(mut self, values: Vec<u32>) -> Self {
        self.jc = values;
        self
    }

    /// Set minimum junk sizes to explore.
    pub fn jmin(mut self, values: Vec<u32>) -> Self {
        self.jmin = values;
        self
    }

    /// Set maximum junk sizes to explore.
    pub fn jmax(mut self, values: Vec<u32>) -> Self {
        self.jmax = values;
        self
    }

    /// Set init padding sizes to explore.
    pub fn s1(mut self, values: Vec<u32>) -> Self {
        self.s1 = values;
        self
    }

    /// Set response padding sizes to explore.
    pub fn s2(mut self, values: Vec<u32>) -> Self {
        self.s2 = values;
        self
    }

    pub fn h1(mut self, values: Vec<u32>) -> Self {
        self.h1 = values;
        self
    }

    pub fn h2(mut self, values: Vec<u32>) -> Self {
        self.h2 = values;
        self
    }

    pub fn h3(mut self, values: Vec<u32>) -> Self {
        self.h3 = values;
        self
    }

    pub fn h4(mut self, values: Vec<u32>) -> Self {
        self.h4 = values;
        self
    }

    /// Set candidate values for a field by name.
    pub fn field(self, field: ParamField, values: Vec<u32>) -> Self {
        match field {
            ParamField::Jc => self.jc(values),
            ParamField::Jmin => self.jmin(values),
            ParamField::Jmax => self.jmax(values),
            ParamField::S1 => self.s1(values),
            ParamField::S2 => self.s2(values),
            ParamField::H1 => self.h1(values),
            ParamField::H2 => self.h2(values),
            ParamField::H3 => self.h3(values),
            ParamField::H4 => self.h4(values),
        }
    }

    /// Set base parameters (used as defaults).
    pub fn with_base(mut self, base: AwgParams) -> Self {
        self.base = base;
        self
    }

    /// Skip combinations where `jmax <= jmin`.
    pub fn require_jmax_above_jmin(mut self, enabled: bool) -> Self {
        self.require_jmax_above_jmin = enabled;
        self
    }

    pub fn base(&self) -> &AwgParams {
        &self.base
    }

    /// Candidate values for a field, empty when the base value is used.
    pub fn values(&self, field: ParamField) -> &[u32] {
        match field {
            ParamField::Jc => &self.jc,
            ParamField::Jmin => &self.jmin,
            ParamField::Jmax => &self.jmax,
            ParamField::S1 => &self.s1,
            ParamField::S2 => &self.s2,
            ParamField::H1 => &self.h1,
            ParamField::H2 => &self.h2,
            ParamField::H3 => &self.h3,
            ParamField::H4 => &self.h4,
        }
    }

    /// Size of the full grid before constraints are applied.
    pub fn combination_count(&self) -> usize {
        ParamField::ALL
            .iter()
            .map(|&field| self.values(field).len().max(1))
            .fold(1usize, |acc, len| acc.saturating_mul(len))
    }

    /// Generate all parameter sets using grid search (Cartesian product).
    ///
    /// Enumeration is lexicographic over [`ParamField::ALL`]: `jc` varies
    /// slowest and `h4` fastest.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let variations = ParameterVariations::from_space(self);

        variations
            .generate_combinations()
            .into_iter()
            .filter(|params| self.accepts(params))
            .enumerate()
            .map(|(index, params)| ParameterSet::new(params, index))
            .collect()
    }

    fn accepts(&self, params: &AwgParams) -> bool {
        !self.require_jmax_above_jmin || constraints::is_valid_jitter(params)
    }
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self::new()
    }
}
