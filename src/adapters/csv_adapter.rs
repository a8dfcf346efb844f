//! CSV file data adapter.
//!
//! Reads `<base_path>/<symbol>.csv` with a `date,open,high,low,close,`
//! `volume[,amount]` header. Rows are sorted by date before the series is
//! built, and each bar's window is stretched to start exactly where the
//! previous row ended, so calendar gaps (weekends, holidays) still tile
//! into a contiguous series. The first row gets the adapter's base period.

use crate::domain::bar::Bar;
use crate::domain::error::BackcastError;
use crate::domain::num::{Num, NumKind};
use crate::domain::series::BarSeries;
use crate::ports::data_port::DataPort;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
    base_period: Duration,
}

struct Row {
    end_time: NaiveDateTime,
    open: Num,
    high: Num,
    low: Num,
    close: Num,
    volume: Num,
    amount: Num,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        CsvAdapter {
            base_path,
            base_period: Duration::days(1),
        }
    }

    pub fn with_base_period(mut self, base_period: Duration) -> Self {
        self.base_period = base_period;
        self
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn parse_row(record: &csv::StringRecord, kind: NumKind) -> Result<Row, BackcastError> {
        let field = |i: usize, name: &str| {
            record.get(i).ok_or_else(|| BackcastError::Data {
                reason: format!("missing {} column", name),
            })
        };

        let date = NaiveDate::parse_from_str(field(0, "date")?, "%Y-%m-%d").map_err(|e| {
            BackcastError::Data {
                reason: format!("invalid date: {}", e),
            }
        })?;
        let end_time = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| BackcastError::Data {
                reason: "invalid date".into(),
            })?;

        let value = |i: usize, name: &str| -> Result<Num, BackcastError> {
            kind.num_of_str(field(i, name)?).map_err(|_| BackcastError::Data {
                reason: format!("invalid {} value: {:?}", name, record.get(i)),
            })
        };

        let amount = match record.get(6) {
            Some(raw) if !raw.is_empty() => {
                kind.num_of_str(raw).map_err(|_| BackcastError::Data {
                    reason: format!("invalid amount value: {:?}", raw),
                })?
            }
            _ => kind.zero(),
        };

        Ok(Row {
            end_time,
            open: value(1, "open")?,
            high: value(2, "high")?,
            low: value(3, "low")?,
            close: value(4, "close")?,
            volume: value(5, "volume")?,
            amount,
        })
    }
}

impl DataPort for CsvAdapter {
    fn load_series(&self, symbol: &str, kind: NumKind) -> Result<BarSeries, BackcastError> {
        let path = self.csv_path(symbol);
        let mut reader = csv::Reader::from_path(&path).map_err(|e| BackcastError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| BackcastError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            rows.push(Self::parse_row(&record, kind)?);
        }
        rows.sort_by_key(|row| row.end_time);

        let mut series = BarSeries::new(symbol, kind);
        let mut previous_end: Option<NaiveDateTime> = None;
        for row in rows {
            let period = match previous_end {
                Some(previous) => row.end_time - previous,
                None => self.base_period,
            };
            if period <= Duration::zero() {
                return Err(BackcastError::Data {
                    reason: format!("duplicate bar at {}", row.end_time),
                });
            }
            let bar = Bar::from_prices(
                period,
                row.end_time,
                row.open,
                row.high,
                row.low,
                row.close,
                row.volume,
                row.amount,
            )?;
            series.add_bar(bar)?;
            previous_end = Some(row.end_time);
        }
        Ok(series)
    }

    fn list_symbols(&self) -> Result<Vec<String>, BackcastError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| BackcastError::Data {
            reason: format!("failed to read directory {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BackcastError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(symbol) = name.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}
