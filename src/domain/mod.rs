//! Core backtesting domain: numeric values, bars, indicators, rules and
//! the trading ledger.

pub mod backtest;
pub mod bar;
pub mod cost;
pub mod criteria;
pub mod error;
pub mod indicator;
pub mod num;
pub mod record;
pub mod rule;
pub mod series;
pub mod strategy;
pub mod trade;
