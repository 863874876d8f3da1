//! Intermediate states computed by analyzers.
//!
//! A state is a sufficient statistic for one metric. States that implement
//! [`AnalyzerState`] can be computed on disjoint partitions of the rows and
//! combined with [`AnalyzerState::sum`]; the combination is associative and
//! commutative, so merging partial states reproduces the single-pass state.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::data::FrequencyTable;

/// A state that can be merged with another state of the same kind.
pub trait AnalyzerState: Debug + Clone + Send + Sync + Sized {
    /// Combines two partial states.
    fn sum(&self, other: &Self) -> Self;

    /// Folds any number of partial states; `None` when there are none.
    fn merge<I>(states: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        states.into_iter().reduce(|acc, state| acc.sum(&state))
    }
}

/// A state that maps to a single floating point metric.
pub trait DoubleValuedState {
    fn metric_value(&self) -> f64;
}

/// Number of matching rows; backs `Size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumMatches {
    pub num_matches: u64,
}

impl AnalyzerState for NumMatches {
    fn sum(&self, other: &Self) -> Self {
        Self {
            num_matches: self.num_matches + other.num_matches,
        }
    }
}

impl DoubleValuedState for NumMatches {
    fn metric_value(&self) -> f64 {
        self.num_matches as f64
    }
}

/// Matches out of a row count; backs every ratio metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumMatchesAndCount {
    pub num_matches: u64,
    pub count: u64,
}

impl AnalyzerState for NumMatchesAndCount {
    fn sum(&self, other: &Self) -> Self {
        Self {
            num_matches: self.num_matches + other.num_matches,
            count: self.count + other.count,
        }
    }
}

impl DoubleValuedState for NumMatchesAndCount {
    fn metric_value(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.num_matches as f64 / self.count as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinState {
    pub min_value: f64,
}

impl AnalyzerState for MinState {
    fn sum(&self, other: &Self) -> Self {
        Self {
            min_value: self.min_value.min(other.min_value),
        }
    }
}

impl DoubleValuedState for MinState {
    fn metric_value(&self) -> f64 {
        self.min_value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxState {
    pub max_value: f64,
}

impl AnalyzerState for MaxState {
    fn sum(&self, other: &Self) -> Self {
        Self {
            max_value: self.max_value.max(other.max_value),
        }
    }
}

impl DoubleValuedState for MaxState {
    fn metric_value(&self) -> f64 {
        self.max_value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SumState {
    pub sum_value: f64,
}

impl AnalyzerState for SumState {
    fn sum(&self, other: &Self) -> Self {
        Self {
            sum_value: self.sum_value + other.sum_value,
        }
    }
}

impl DoubleValuedState for SumState {
    fn metric_value(&self) -> f64 {
        self.sum_value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanState {
    pub total: f64,
    pub count: u64,
}

impl AnalyzerState for MeanState {
    fn sum(&self, other: &Self) -> Self {
        Self {
            total: self.total + other.total,
            count: self.count + other.count,
        }
    }
}

impl DoubleValuedState for MeanState {
    fn metric_value(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.total / self.count as f64
        }
    }
}

/// Count, mean and sum of squared deviations (`m2`) of the non-null values.
///
/// Partitions are combined with the parallel form of Welford's algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardDeviationState {
    pub n: f64,
    pub avg: f64,
    pub m2: f64,
}

impl StandardDeviationState {
    pub fn new(n: f64, avg: f64, m2: f64) -> Self {
        Self { n, avg, m2 }
    }
}

impl AnalyzerState for StandardDeviationState {
    fn sum(&self, other: &Self) -> Self {
        let n = self.n + other.n;
        let delta = other.avg - self.avg;
        let delta_n = if n == 0.0 { 0.0 } else { delta / n };
        Self {
            n,
            avg: self.avg + delta_n * other.n,
            m2: self.m2 + other.m2 + delta * delta_n * self.n * other.n,
        }
    }
}

impl DoubleValuedState for StandardDeviationState {
    /// Population standard deviation.
    fn metric_value(&self) -> f64 {
        if self.avg.is_nan() {
            f64::NAN
        } else if self.avg.is_infinite() {
            f64::INFINITY
        } else {
            (self.m2 / self.n).sqrt()
        }
    }
}

/// A single quantile value.
///
/// Quantiles of partitions cannot be combined into the quantile of the whole,
/// so this state deliberately does not implement [`AnalyzerState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileState {
    pub value: f64,
}

impl DoubleValuedState for QuantileState {
    fn metric_value(&self) -> f64 {
        self.value
    }
}

/// Row counts per distinct key plus the number of rows that were grouped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrequenciesAndNumRows {
    pub frequencies: FrequencyTable,
    pub num_rows: u64,
}

impl FrequenciesAndNumRows {
    pub fn new(frequencies: FrequencyTable) -> Self {
        let num_rows = frequencies.values().sum();
        Self {
            frequencies,
            num_rows,
        }
    }

    /// Number of keys that occur exactly once.
    pub fn unique_values(&self) -> u64 {
        self.frequencies.values().filter(|&&count| count == 1).count() as u64
    }
}

impl AnalyzerState for FrequenciesAndNumRows {
    fn sum(&self, other: &Self) -> Self {
        let mut frequencies = self.frequencies.clone();
        for (key, count) in &other.frequencies {
            *frequencies.entry(key.clone()).or_insert(0) += count;
        }
        Self {
            frequencies,
            num_rows: self.num_rows + other.num_rows,
        }
    }
}
