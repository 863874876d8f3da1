//! Aggregation requirements and keyed aggregation results.
//!
//! Scan-shareable analyzers declare which aggregation functions they need per
//! column. Requirements from many analyzers are merged by set union and sent to
//! the dataset as one request. The result is keyed by `(function, column)` so
//! each analyzer finds its own values no matter how the request was merged.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::analyzers::{AnalyzerError, AnalyzerResult};

use super::sql::quote_literal;

/// A quantile level in `[0, 1]`, totally ordered so it can live in sets.
#[derive(Debug, Clone, Copy)]
pub struct Probability(f64);

impl Probability {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.0)
    }
}

impl PartialEq for Probability {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Probability {}

impl Hash for Probability {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Probability {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Probability {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// An aggregation over a single column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AggregationFunction {
    /// Number of rows, nulls included.
    CountAll,
    /// Number of non-null values.
    CountNonNull,
    /// Number of non-null values that are not NaN.
    CountNumeric,
    Min,
    Max,
    Sum,
    Mean,
    /// Population variance (degrees of freedom = 0).
    PopulationVariance,
    /// Exact nearest-rank quantile of the non-null values.
    Quantile(Probability),
    /// Number of non-null values matching a regular expression.
    PatternMatches(String),
}

impl AggregationFunction {
    pub fn quantile(q: f64) -> Self {
        Self::Quantile(Probability::new(q))
    }

    pub fn pattern_matches(pattern: impl Into<String>) -> Self {
        Self::PatternMatches(pattern.into())
    }

    /// Short name used in logs and lookup errors.
    pub fn name(&self) -> String {
        match self {
            Self::CountAll => "count_all".to_string(),
            Self::CountNonNull => "count".to_string(),
            Self::CountNumeric => "count_numeric".to_string(),
            Self::Min => "min".to_string(),
            Self::Max => "max".to_string(),
            Self::Sum => "sum".to_string(),
            Self::Mean => "mean".to_string(),
            Self::PopulationVariance => "var_pop".to_string(),
            Self::Quantile(q) => format!("quantile({})", q.value()),
            Self::PatternMatches(pattern) => format!("pattern_matches({pattern})"),
        }
    }

    /// Whether the function reads NaN as a missing value.
    ///
    /// Only `CountNonNull`, `CountAll` and pattern matching see NaN; numeric
    /// aggregates treat it like NULL.
    pub fn skips_nan(&self) -> bool {
        !matches!(
            self,
            Self::CountAll | Self::CountNonNull | Self::PatternMatches(_)
        )
    }

    /// Renders the SQL aggregate expression for an already quoted column.
    ///
    /// Quantiles collect the raw values with `ARRAY_AGG`; the rank is selected
    /// after the query returns.
    pub fn to_sql(&self, quoted_column: &str) -> AnalyzerResult<String> {
        let sql = match self {
            Self::CountAll => "COUNT(*)".to_string(),
            Self::CountNonNull | Self::CountNumeric => format!("COUNT({quoted_column})"),
            Self::Min => format!("MIN({quoted_column})"),
            Self::Max => format!("MAX({quoted_column})"),
            Self::Sum => format!("SUM({quoted_column})"),
            Self::Mean => format!("AVG({quoted_column})"),
            Self::PopulationVariance => format!("VAR_POP({quoted_column})"),
            Self::Quantile(q) => {
                if !q.is_valid() {
                    return Err(AnalyzerError::InvalidQuantile(q.value()));
                }
                format!("ARRAY_AGG({quoted_column})")
            }
            Self::PatternMatches(pattern) => {
                regex::Regex::new(pattern).map_err(|e| AnalyzerError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                format!(
                    "COUNT(CASE WHEN regexp_like({quoted_column}, {}) THEN 1 END)",
                    quote_literal(pattern)
                )
            }
        };
        Ok(sql)
    }
}

impl fmt::Display for AggregationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-column sets of aggregation functions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationSpec {
    columns: BTreeMap<String, BTreeSet<AggregationFunction>>,
}

impl AggregationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one function for one column.
    pub fn with(mut self, column: impl Into<String>, function: AggregationFunction) -> Self {
        self.add(column, function);
        self
    }

    pub fn add(&mut self, column: impl Into<String>, function: AggregationFunction) {
        self.columns.entry(column.into()).or_default().insert(function);
    }

    /// Merges another spec into this one by set union per column.
    pub fn merge(&mut self, other: &AggregationSpec) {
        for (column, functions) in &other.columns {
            self.columns
                .entry(column.clone())
                .or_default()
                .extend(functions.iter().cloned());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.values().all(BTreeSet::is_empty)
    }

    /// Total number of `(function, column)` pairs.
    pub fn len(&self) -> usize {
        self.columns.values().map(BTreeSet::len).sum()
    }

    pub fn functions_for(&self, column: &str) -> Option<&BTreeSet<AggregationFunction>> {
        self.columns.get(column)
    }

    /// Iterates over `(column, function)` pairs in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregationFunction)> {
        self.columns.iter().flat_map(|(column, functions)| {
            functions.iter().map(move |function| (column.as_str(), function))
        })
    }
}

impl<'a> FromIterator<&'a AggregationSpec> for AggregationSpec {
    fn from_iter<I: IntoIterator<Item = &'a AggregationSpec>>(iter: I) -> Self {
        let mut merged = AggregationSpec::new();
        for spec in iter {
            merged.merge(spec);
        }
        merged
    }
}

/// Values produced by [`Dataset::aggregate`](super::Dataset::aggregate).
///
/// A `None` value means the aggregate was SQL NULL, which happens when there
/// are no rows or every input value is null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResult {
    values: HashMap<(AggregationFunction, String), Option<f64>>,
}

impl AggregationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        function: AggregationFunction,
        column: impl Into<String>,
        value: Option<f64>,
    ) {
        self.values.insert((function, column.into()), value);
    }

    /// Looks up one aggregate by function and column.
    pub fn get(&self, function: &AggregationFunction, column: &str) -> AnalyzerResult<Option<f64>> {
        self.values
            .get(&(function.clone(), column.to_string()))
            .copied()
            .ok_or_else(|| {
                AnalyzerError::invalid_data(format!(
                    "Aggregation result has no entry for {function} of column {column}"
                ))
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_set_union() {
        let mut left = AggregationSpec::new()
            .with("att1", AggregationFunction::Min)
            .with("att1", AggregationFunction::CountNonNull);
        let right = AggregationSpec::new()
            .with("att1", AggregationFunction::CountNonNull)
            .with("att1", AggregationFunction::Sum)
            .with("att2", AggregationFunction::Max);

        left.merge(&right);

        assert_eq!(left.len(), 4);
        assert_eq!(left.functions_for("att1").map(|f| f.len()), Some(3));
        assert!(left
            .functions_for("att2")
            .is_some_and(|f| f.contains(&AggregationFunction::Max)));
    }

    #[test]
    fn test_distinct_quantiles_are_kept() {
        let spec: AggregationSpec = [
            AggregationSpec::new().with("x", AggregationFunction::quantile(0.5)),
            AggregationSpec::new().with("x", AggregationFunction::quantile(0.5)),
            AggregationSpec::new().with("x", AggregationFunction::quantile(0.9)),
        ]
        .iter()
        .collect();
        assert_eq!(spec.len(), 2);
    }

    #[test]
    fn test_skips_nan() {
        assert!(!AggregationFunction::CountNonNull.skips_nan());
        assert!(!AggregationFunction::CountAll.skips_nan());
        assert!(AggregationFunction::CountNumeric.skips_nan());
        assert!(AggregationFunction::PopulationVariance.skips_nan());
        assert!(AggregationFunction::quantile(0.5).skips_nan());
    }

    #[test]
    fn test_to_sql() {
        assert_eq!(
            AggregationFunction::Mean.to_sql("\"att1\"").unwrap(),
            "AVG(\"att1\")"
        );
        assert_eq!(
            AggregationFunction::quantile(1.5).to_sql("\"att1\""),
            Err(AnalyzerError::InvalidQuantile(1.5))
        );
        assert!(matches!(
            AggregationFunction::pattern_matches("(unclosed").to_sql("\"att1\""),
            Err(AnalyzerError::InvalidPattern { .. })
        ));
        assert_eq!(
            AggregationFunction::pattern_matches("^it's").to_sql("\"c\"").unwrap(),
            "COUNT(CASE WHEN regexp_like(\"c\", '^it''s') THEN 1 END)"
        );
    }

    #[test]
    fn test_result_lookup_by_key() {
        let mut result = AggregationResult::new();
        result.insert(AggregationFunction::Max, "att1", Some(6.0));
        result.insert(AggregationFunction::Min, "att1", None);

        assert_eq!(result.get(&AggregationFunction::Max, "att1"), Ok(Some(6.0)));
        assert_eq!(result.get(&AggregationFunction::Min, "att1"), Ok(None));
        assert!(result.get(&AggregationFunction::Max, "att2").is_err());
    }
}
