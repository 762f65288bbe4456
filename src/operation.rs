use polars::prelude::*;

/// Trait for trend reductions.
///
/// This forms the contract between the trend query and reductions. A reduction builds a polars
/// expression that is evaluated once per date group.
pub trait Operation {
    /// Build the aggregation expression for a metric column.
    ///
    /// The expression must evaluate to a null for a group without a value, for example when every
    /// value in the group is null.
    ///
    /// # Arguments
    ///
    /// * `column`: Expression selecting the metric column
    /// * `dtype`: Inferred type of the metric column
    fn aggregate(column: Expr, dtype: &DataType) -> Expr;
}

/// Trait for reductions on numerical data.
///
/// This trait provides an entry point into the type system based on the inferred column type.
/// Text columns are cast to floating point numbers first, so non-numeric values become nulls.
/// `aggregate_values` is only evaluated for groups with at least one non-null value.
pub trait NumOperation: Operation {
    fn aggregate_values(values: Expr) -> Expr;
}

impl<T: NumOperation> Operation for T {
    /// Build the aggregation expression.
    ///
    /// This method casts text columns and guards `aggregate_values` against groups of nulls.
    fn aggregate(column: Expr, dtype: &DataType) -> Expr {
        let values = match dtype {
            DataType::Utf8 => column.cast(DataType::Float64),
            _ => column,
        };
        when(
            values
                .clone()
                .is_not_null()
                .cast(DataType::Int64)
                .sum()
                .gt(lit(0)),
        )
        .then(Self::aggregate_values(values))
        .otherwise(lit(NULL))
    }
}
