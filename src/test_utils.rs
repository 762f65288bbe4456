use crate::cli::CommandLineArgs;
use crate::types::{DValue, IntoDValue};

use clap::Parser;
use polars::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Small dataset with two dates and two countries.
pub(crate) const SAMPLE_DATA: &str = "\
date,country,confirmed,deaths,recovered
2021-01-01,USA,10,1,2.5
2021-01-01,Canada,5,0,1.0
2021-01-02,USA,20,2,4.5
";

/// Write CSV data to a temporary file, which is deleted when dropped.
pub(crate) fn data_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Create CommandLineArgs using a data file and otherwise default values.
pub(crate) fn get_test_args(data_file: &str, extra: &[&str]) -> CommandLineArgs {
    let args = ["case-trends", "--data-file", data_file]
        .into_iter()
        .chain(extra.iter().copied());
    CommandLineArgs::parse_from(args)
}

/// Evaluate an aggregation expression over a whole data frame, returning its single value.
pub(crate) fn evaluate(frame: &DataFrame, expr: Expr) -> PolarsResult<Option<DValue>> {
    let result = frame.clone().lazy().select([expr.alias("value")]).collect()?;
    let value = result.column("value")?.get(0)?.into_dvalue();
    Ok(value)
}
