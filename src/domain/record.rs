//! The trading record: an append-only ledger of orders and trades.
//!
//! Exactly one non-closed trade exists at any time. Closing it archives it
//! and instates a fresh NEW trade keyed to the configured starting side.

use crate::domain::cost::{HoldingCostModel, TransactionCostModel};
use crate::domain::error::BackcastError;
use crate::domain::num::Num;
use crate::domain::trade::{Order, OrderSide, Trade};

#[derive(Debug, Clone)]
pub struct TradingRecord {
    starting_side: OrderSide,
    transaction_cost: TransactionCostModel,
    holding_cost: HoldingCostModel,
    orders: Vec<Order>,
    closed_trades: Vec<Trade>,
    current: Trade,
}

impl Default for TradingRecord {
    fn default() -> Self {
        TradingRecord::new()
    }
}

impl TradingRecord {
    /// A long session (Buy entries) with zero cost models.
    pub fn new() -> TradingRecord {
        TradingRecord::with_starting_side(OrderSide::Buy)
    }

    pub fn with_starting_side(starting_side: OrderSide) -> TradingRecord {
        TradingRecord::with_cost_models(
            starting_side,
            TransactionCostModel::Zero,
            HoldingCostModel::Zero,
        )
    }

    pub fn with_cost_models(
        starting_side: OrderSide,
        transaction_cost: TransactionCostModel,
        holding_cost: HoldingCostModel,
    ) -> TradingRecord {
        TradingRecord {
            starting_side,
            transaction_cost,
            holding_cost,
            orders: Vec::new(),
            closed_trades: Vec::new(),
            current: Trade::with_cost_models(starting_side, transaction_cost, holding_cost),
        }
    }

    /// Rebuild a record by replaying a pre-existing order sequence.
    ///
    /// The session's starting side is taken from the first order. Whenever
    /// the next order's side does not match what a fresh NEW trade expects,
    /// the trade is re-keyed to the observed side — accommodates sequences
    /// that reverse direction mid-stream (BUY,SELL, SELL,BUY, ...).
    ///
    /// No partially replayed record is ever observable: the record is
    /// returned only after the whole sequence applied cleanly.
    pub fn from_orders(
        transaction_cost: TransactionCostModel,
        holding_cost: HoldingCostModel,
        orders: &[Order],
    ) -> Result<TradingRecord, BackcastError> {
        let first = orders
            .first()
            .ok_or_else(|| BackcastError::illegal_state("order sequence must not be empty"))?;
        let mut record =
            TradingRecord::with_cost_models(first.side, transaction_cost, holding_cost);
        for order in orders {
            if record.current.is_new() && order.side != record.current.entry_side() {
                record.current =
                    Trade::with_cost_models(order.side, transaction_cost, holding_cost);
            }
            record.operate(order.index, order.price, order.amount)?;
        }
        Ok(record)
    }

    pub fn starting_side(&self) -> OrderSide {
        self.starting_side
    }

    pub fn current_trade(&self) -> &Trade {
        &self.current
    }

    /// Closed trades, in chronological order of their entries.
    pub fn trades(&self) -> &[Trade] {
        &self.closed_trades
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Advance the current trade with one fill at `index`.
    ///
    /// The current trade being CLOSED here is a ledger invariant breach
    /// (it is archived and replaced the moment it closes); guarded
    /// defensively as `IllegalState`.
    pub fn operate(
        &mut self,
        index: usize,
        price: Num,
        amount: Num,
    ) -> Result<(), BackcastError> {
        if self.current.is_closed() {
            return Err(BackcastError::illegal_state(
                "current trade should not be closed",
            ));
        }
        let order = self.current.operate(index, price, amount)?;
        self.orders.push(order);
        if self.current.is_closed() {
            let replacement = Trade::with_cost_models(
                self.starting_side,
                self.transaction_cost,
                self.holding_cost,
            );
            let closed = std::mem::replace(&mut self.current, replacement);
            self.closed_trades.push(closed);
        }
        Ok(())
    }

    /// Open a position. No-op returning `false` unless the current trade
    /// is NEW.
    pub fn enter(
        &mut self,
        index: usize,
        price: Num,
        amount: Num,
    ) -> Result<bool, BackcastError> {
        if self.current.is_new() {
            self.operate(index, price, amount)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Close the open position. No-op returning `false` unless the current
    /// trade is OPENED.
    pub fn exit(
        &mut self,
        index: usize,
        price: Num,
        amount: Num,
    ) -> Result<bool, BackcastError> {
        if self.current.is_opened() {
            self.operate(index, price, amount)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn last_order(&self) -> Option<&Order> {
        self.orders.last()
    }

    pub fn last_order_of(&self, side: OrderSide) -> Option<&Order> {
        self.orders.iter().rev().find(|order| order.side == side)
    }

    pub fn last_entry(&self) -> Option<&Order> {
        self.current
            .entry()
            .or_else(|| self.closed_trades.last().and_then(|trade| trade.entry()))
    }

    pub fn last_exit(&self) -> Option<&Order> {
        self.closed_trades.last().and_then(|trade| trade.exit())
    }
}
