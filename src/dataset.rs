//! In-memory dataset loaded from a delimited text file.
//!
//! The dataset is a polars [DataFrame]. Column types are inferred from every row of the file: a
//! column whose non-empty values all parse as integers is `Int64`, one whose values all parse as
//! floating point numbers is `Float64`, and anything else is `Utf8`. Empty fields are null. The
//! date column is renamed to [DATE_COLUMN] and parsed into a `Date` column.

use crate::error::TrendsError;
use crate::models::Scope;

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use polars::prelude::*;
use tracing::{event, Level};

/// Canonical name of the date column.
pub const DATE_COLUMN: &str = "Date";

/// Name of the column used to filter by country.
pub const COUNTRY_COLUMN: &str = "country";

/// Pattern of date values in the data file.
pub const DATE_PATTERN: &str = "%Y-%m-%d";

/// Immutable tabular dataset.
#[derive(Debug)]
pub struct Dataset {
    /// All columns, with the date column parsed. Rows whose date did not parse have a null date.
    frame: DataFrame,
    /// Name of the country column as it appears in the header row, if there is one.
    country_column: Option<String>,
}

/// Find a column name, ignoring ASCII case.
fn find_column<'a>(names: &[&'a str], name: &str) -> Option<&'a str> {
    names
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(name))
        .copied()
}

impl Dataset {
    /// Load a dataset from a CSV file with a header row.
    ///
    /// # Arguments
    ///
    /// * `path`: Path to the data file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TrendsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TrendsError::DataFileNotFound {
                path: path.display().to_string(),
            });
        }
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Read a dataset from CSV data with a header row.
    ///
    /// Short records are padded with nulls and extra fields are ignored.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, TrendsError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let mut frame = CsvReader::new(Cursor::new(bytes))
            .has_header(true)
            .infer_schema(None)
            .truncate_ragged_lines(true)
            .finish()?;

        let names = frame.get_column_names();
        let date_column = find_column(&names, DATE_COLUMN)
            .ok_or(TrendsError::MissingColumn {
                column: DATE_COLUMN,
            })?
            .to_string();
        let country_column = find_column(&names, COUNTRY_COLUMN).map(str::to_string);
        if date_column != DATE_COLUMN {
            event!(
                Level::DEBUG,
                "Renaming column {} to {}",
                date_column,
                DATE_COLUMN
            );
            frame.rename(&date_column, DATE_COLUMN)?;
        }

        let frame = frame
            .lazy()
            .with_column(
                col(DATE_COLUMN)
                    .cast(DataType::Utf8)
                    .str()
                    .to_date(StrptimeOptions {
                        format: Some(DATE_PATTERN.to_string()),
                        strict: false,
                        ..Default::default()
                    }),
            )
            .collect()?;

        let invalid_dates = frame.column(DATE_COLUMN)?.null_count();
        if invalid_dates > 0 {
            event!(
                Level::WARN,
                "{} rows have a missing or invalid date and will be ignored",
                invalid_dates
            );
        }

        Ok(Dataset {
            frame,
            country_column,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The underlying data frame.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Column names in header order, with the date column under its canonical name.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Look up a metric column by name, ignoring ASCII case. The date column is not a metric.
    pub fn column(&self, name: &str) -> Result<&Series, TrendsError> {
        self.frame
            .get_columns()
            .iter()
            .filter(|column| column.name() != DATE_COLUMN)
            .find(|column| column.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| TrendsError::UnknownMetric {
                metric: name.to_string(),
            })
    }

    /// Return a lazy query over the rows within a scope.
    ///
    /// Country matching is exact and case-sensitive. Null countries never match.
    pub fn select(&self, scope: &Scope) -> Result<LazyFrame, TrendsError> {
        let rows = self.frame.clone().lazy();
        match scope {
            Scope::Global => Ok(rows),
            Scope::Country(country) => {
                let country_column =
                    self.country_column
                        .as_deref()
                        .ok_or(TrendsError::MissingColumn {
                            column: COUNTRY_COLUMN,
                        })?;
                Ok(rows.filter(
                    col(country_column)
                        .cast(DataType::Utf8)
                        .eq(lit(country.as_str())),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    fn read(data: &str) -> Dataset {
        Dataset::from_reader(data.as_bytes()).unwrap()
    }

    fn dtype(dataset: &Dataset, name: &str) -> DataType {
        dataset.column(name).unwrap().dtype().clone()
    }

    fn height(rows: LazyFrame) -> usize {
        rows.collect().unwrap().height()
    }

    #[test]
    fn lowercase_date_column_is_normalized() {
        let dataset = read("date,country,confirmed\n2021-01-01,USA,10\n");
        assert_eq!(vec!["Date", "country", "confirmed"], dataset.column_names());
        let dates = dataset.frame().column(DATE_COLUMN).unwrap();
        assert_eq!(&DataType::Date, dates.dtype());
        assert_eq!(0, dates.null_count());
    }

    #[test]
    fn canonical_date_column() {
        let dataset = read("Date,country,confirmed\n2021-01-01,USA,10\n");
        assert_eq!(vec!["Date", "country", "confirmed"], dataset.column_names());
        assert_eq!(1, dataset.len());
    }

    #[test]
    fn missing_date_column() {
        let result = Dataset::from_reader("country,confirmed\nUSA,10\n".as_bytes());
        assert!(matches!(
            result,
            Err(TrendsError::MissingColumn {
                column: DATE_COLUMN
            })
        ));
    }

    #[test]
    fn invalid_dates_are_null() {
        let dataset = read(
            "date,country,confirmed\nnot-a-date,USA,1\n2021-01-01,USA,2\n2021-13-01,USA,3\n",
        );
        assert_eq!(3, dataset.len());
        let dates = dataset.frame().column(DATE_COLUMN).unwrap();
        assert_eq!(2, dates.null_count());
        assert!(dates.get(1).unwrap() != AnyValue::Null);
    }

    #[test]
    fn column_types_are_inferred() {
        let dataset = read(
            "date,country,confirmed,rate,notes\n\
             2021-01-01,USA,10,0.5,a\n\
             2021-01-02,USA,,1,b\n",
        );
        assert_eq!(DataType::Utf8, dtype(&dataset, "country"));
        assert_eq!(DataType::Int64, dtype(&dataset, "confirmed"));
        assert_eq!(DataType::Float64, dtype(&dataset, "rate"));
        assert_eq!(DataType::Utf8, dtype(&dataset, "notes"));
        let confirmed = dataset.column("confirmed").unwrap();
        assert_eq!(1, confirmed.null_count());
    }

    #[test]
    fn malformed_numeric_column_is_text() {
        let dataset = read("date,country,confirmed\n2021-01-01,USA,10\n2021-01-02,USA,n/a\n");
        assert_eq!(DataType::Utf8, dtype(&dataset, "confirmed"));
    }

    #[test]
    fn short_records_are_padded() {
        let dataset = read("date,country,confirmed\n2021-01-01,USA\n2021-01-02,USA,5\n");
        assert_eq!(2, dataset.len());
        let confirmed = dataset.column("confirmed").unwrap();
        assert_eq!(1, confirmed.null_count());
        assert_eq!(AnyValue::Int64(5), confirmed.get(1).unwrap());
    }

    #[test]
    fn column_lookup_ignores_case() {
        let dataset = read("date,country,confirmed\n2021-01-01,USA,10\n");
        assert_eq!("confirmed", dataset.column("Confirmed").unwrap().name());
    }

    #[test]
    fn unknown_column() {
        let dataset = read("date,country,confirmed\n2021-01-01,USA,10\n");
        assert!(matches!(
            dataset.column("deaths"),
            Err(TrendsError::UnknownMetric { metric }) if metric == "deaths"
        ));
        // The date column is not a metric.
        assert!(dataset.column("date").is_err());
    }

    #[test]
    fn select_global() {
        let dataset = read("date,country,confirmed\n2021-01-01,USA,10\n2021-01-01,Canada,5\n");
        assert_eq!(2, height(dataset.select(&Scope::Global).unwrap()));
    }

    #[test]
    fn select_country_is_case_sensitive() {
        let dataset = read(
            "date,country,confirmed\n2021-01-01,USA,10\n2021-01-01,Canada,5\n2021-01-02,usa,7\n",
        );
        let usa = Scope::Country("USA".to_string());
        assert_eq!(1, height(dataset.select(&usa).unwrap()));
        let nowhere = Scope::Country("Atlantis".to_string());
        assert_eq!(0, height(dataset.select(&nowhere).unwrap()));
    }

    #[test]
    fn select_country_without_country_column() {
        let dataset = read("date,confirmed\n2021-01-01,10\n");
        assert_eq!(1, height(dataset.select(&Scope::Global).unwrap()));
        let usa = Scope::Country("USA".to_string());
        assert!(matches!(
            dataset.select(&usa),
            Err(TrendsError::MissingColumn {
                column: COUNTRY_COLUMN
            })
        ));
    }

    #[test]
    fn load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "date,country,confirmed\n2021-01-01,USA,10\n").unwrap();
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(1, dataset.len());
    }

    #[test]
    fn load_file_not_found() {
        let result = Dataset::load("nonexistent/data.csv");
        assert!(matches!(
            result,
            Err(TrendsError::DataFileNotFound { path }) if path == "nonexistent/data.csv"
        ));
    }
}
