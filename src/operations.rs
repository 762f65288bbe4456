//! Trend reductions.
//!
//! Each reduction is implemented as a struct that implements the
//! [Operation](crate::operation::Operation) trait. All of them skip nulls.

use crate::models::Aggregate;
use crate::operation::{NumOperation, Operation};

use polars::prelude::*;

/// Signature shared by every [Operation::aggregate].
pub type AggregateFn = fn(Expr, &DataType) -> Expr;

/// Return the aggregate function of the reduction for an [Aggregate].
pub fn aggregate_fn(aggregate: Aggregate) -> AggregateFn {
    match aggregate {
        Aggregate::Count => Count::aggregate,
        Aggregate::Max => Max::aggregate,
        Aggregate::Mean => Mean::aggregate,
        Aggregate::Min => Min::aggregate,
        Aggregate::Sum => Sum::aggregate,
    }
}

/// Return the number of non-null values in the group.
///
/// Text values are counted whether or not they are numeric.
pub struct Count {}

impl Operation for Count {
    fn aggregate(column: Expr, _dtype: &DataType) -> Expr {
        column.is_not_null().cast(DataType::Int64).sum()
    }
}

/// Return the maximum of the values in the group.
pub struct Max {}

impl NumOperation for Max {
    fn aggregate_values(values: Expr) -> Expr {
        values.max()
    }
}

/// Return the arithmetic mean of the values in the group as a floating point number.
pub struct Mean {}

impl NumOperation for Mean {
    fn aggregate_values(values: Expr) -> Expr {
        values.cast(DataType::Float64).mean()
    }
}

/// Return the minimum of the values in the group.
pub struct Min {}

impl NumOperation for Min {
    fn aggregate_values(values: Expr) -> Expr {
        values.min()
    }
}

/// Return the sum of the values in the group.
///
/// Integer columns sum to an integer, other columns to a floating point number. A group with no
/// values has no sum.
pub struct Sum {}

impl NumOperation for Sum {
    fn aggregate_values(values: Expr) -> Expr {
        values.sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dataset::Dataset;
    use crate::test_utils::evaluate;
    use crate::types::DValue;

    fn dataset(header: &str, rows: &[&str]) -> Dataset {
        let data = format!("date,{header}\n{}\n", rows.join("\n"));
        Dataset::from_reader(data.as_bytes()).unwrap()
    }

    fn ints() -> Dataset {
        dataset(
            "value",
            &["2021-01-01,3", "2021-01-01,", "2021-01-01,-1", "2021-01-01,10"],
        )
    }

    fn floats() -> Dataset {
        dataset("value", &["2021-01-01,1.5", "2021-01-01,", "2021-01-01,2.5"])
    }

    fn text() -> Dataset {
        dataset("value", &["2021-01-01,4", "2021-01-01,abc", "2021-01-01,2"])
    }

    fn nulls() -> Dataset {
        dataset("value,other", &["2021-01-01,,1", "2021-01-01,,2"])
    }

    fn run(aggregate: AggregateFn, dataset: &Dataset) -> Option<DValue> {
        let column = dataset.column("value").unwrap();
        let expr = aggregate(col(column.name()), column.dtype());
        evaluate(dataset.frame(), expr).unwrap()
    }

    #[test]
    fn count() {
        assert_eq!(Some(3.into()), run(Count::aggregate, &ints()));
        assert_eq!(Some(2.into()), run(Count::aggregate, &floats()));
        assert_eq!(Some(3.into()), run(Count::aggregate, &text()));
        assert_eq!(Some(0.into()), run(Count::aggregate, &nulls()));
    }

    #[test]
    fn max() {
        assert_eq!(Some(10.into()), run(Max::aggregate, &ints()));
        assert_eq!(DValue::from_f64(2.5), run(Max::aggregate, &floats()));
        assert_eq!(DValue::from_f64(4.0), run(Max::aggregate, &text()));
        assert_eq!(None, run(Max::aggregate, &nulls()));
    }

    #[test]
    fn mean() {
        assert_eq!(DValue::from_f64(4.0), run(Mean::aggregate, &ints()));
        assert_eq!(DValue::from_f64(2.0), run(Mean::aggregate, &floats()));
        assert_eq!(DValue::from_f64(3.0), run(Mean::aggregate, &text()));
        assert_eq!(None, run(Mean::aggregate, &nulls()));
    }

    #[test]
    fn min() {
        assert_eq!(Some((-1).into()), run(Min::aggregate, &ints()));
        assert_eq!(DValue::from_f64(1.5), run(Min::aggregate, &floats()));
        assert_eq!(DValue::from_f64(2.0), run(Min::aggregate, &text()));
        assert_eq!(None, run(Min::aggregate, &nulls()));
    }

    #[test]
    fn sum() {
        assert_eq!(Some(12.into()), run(Sum::aggregate, &ints()));
        assert_eq!(DValue::from_f64(4.0), run(Sum::aggregate, &floats()));
        assert_eq!(DValue::from_f64(6.0), run(Sum::aggregate, &text()));
        assert_eq!(None, run(Sum::aggregate, &nulls()));
    }

    #[test]
    fn sum_is_integer_for_int_columns() {
        let total = run(Sum::aggregate, &ints()).unwrap();
        assert!(total.is_i64());
        assert_eq!("12", total.to_string());
    }

    #[test]
    fn aggregate_fn_dispatch() {
        let dataset = ints();
        assert_eq!(Some(12.into()), run(aggregate_fn(Aggregate::Sum), &dataset));
        assert_eq!(Some(3.into()), run(aggregate_fn(Aggregate::Count), &dataset));
        assert_eq!(Some(10.into()), run(aggregate_fn(Aggregate::Max), &dataset));
        assert_eq!(Some((-1).into()), run(aggregate_fn(Aggregate::Min), &dataset));
        assert_eq!(
            DValue::from_f64(4.0),
            run(aggregate_fn(Aggregate::Mean), &dataset)
        );
    }
}
