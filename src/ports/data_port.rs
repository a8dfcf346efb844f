//! Data access port trait.

use crate::domain::error::BackcastError;
use crate::domain::num::NumKind;
use crate::domain::series::BarSeries;

pub trait DataPort {
    /// Load the full bar history for a symbol into a series using the
    /// given numeric representation.
    fn load_series(&self, symbol: &str, kind: NumKind) -> Result<BarSeries, BackcastError>;

    fn list_symbols(&self) -> Result<Vec<String>, BackcastError>;
}
