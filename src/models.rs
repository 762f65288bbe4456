//! Data types and associated functions and methods

use crate::types::DValue;

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use validator::Validate;

/// Country value that selects every row of the dataset.
pub const GLOBAL: &str = "Global";

fn default_country() -> String {
    "USA".to_string()
}

fn default_metric() -> String {
    "confirmed".to_string()
}

/// Supported reductions over the rows of each date
#[derive(Clone, Copy, Debug, Default, Deserialize, Display, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Aggregate {
    /// Number of non-null values
    Count,
    /// Largest value
    Max,
    /// Arithmetic mean of non-null values
    Mean,
    /// Smallest value
    Min,
    /// Sum of values
    #[default]
    Sum,
}

/// Rows a trend is computed over
#[derive(Clone, Debug, PartialEq)]
pub enum Scope {
    /// Every row
    Global,
    /// Rows whose country is exactly equal to this value
    Country(String),
}

impl From<&str> for Scope {
    fn from(country: &str) -> Self {
        if country == GLOBAL {
            Scope::Global
        } else {
            Scope::Country(country.to_string())
        }
    }
}

/// Query parameters for trend requests
#[derive(Clone, Debug, Deserialize, PartialEq, Validate)]
pub struct TrendQuery {
    /// Country to filter on, or `Global` for all rows
    #[serde(default = "default_country")]
    pub country: String,
    /// Name of the column to aggregate
    #[serde(default = "default_metric")]
    #[validate(length(min = 1, message = "metric must not be empty"))]
    pub metric: String,
    /// Reduction applied to the metric values of each date
    #[serde(default)]
    pub aggregate: Aggregate,
}

impl TrendQuery {
    /// Return a new TrendQuery using the sum reduction.
    pub fn new(country: &str, metric: &str) -> Self {
        TrendQuery {
            country: country.to_string(),
            metric: metric.to_string(),
            aggregate: Aggregate::Sum,
        }
    }

    /// Rows selected by the country of this query.
    pub fn scope(&self) -> Scope {
        Scope::from(self.country.as_str())
    }
}

impl Default for TrendQuery {
    fn default() -> Self {
        TrendQuery {
            country: default_country(),
            metric: default_metric(),
            aggregate: Aggregate::default(),
        }
    }
}

/// Date-ordered series for charting.
///
/// `labels` and `data` always have the same length; entry `i` of each describes the same date.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TrendSeries {
    /// Dates formatted as `YYYY-MM-DD`, ascending
    pub labels: Vec<String>,
    /// Aggregated value for each date
    pub data: Vec<DValue>,
}

impl TrendSeries {
    /// Append a point to the series.
    pub fn push(&mut self, label: String, value: DValue) {
        self.labels.push(label);
        self.data.push(value);
    }

    /// Number of points in the series.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
