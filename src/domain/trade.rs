//! Orders and the trade lifecycle.
//!
//! An [`Order`] is one recorded fill. A [`Trade`] pairs an entry order with
//! an optional exit order and walks NEW → OPENED → CLOSED; its profit is
//! net of both transaction costs and the holding cost over the bars the
//! position stayed open.

use crate::domain::cost::{HoldingCostModel, TransactionCostModel};
use crate::domain::error::BackcastError;
use crate::domain::num::Num;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn complement(self) -> OrderSide {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// A single recorded fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    pub index: usize,
    pub side: OrderSide,
    pub price: Num,
    pub amount: Num,
    pub cost: Num,
}

impl Order {
    pub fn new(index: usize, side: OrderSide, price: Num, amount: Num, cost: Num) -> Order {
        Order {
            index,
            side,
            price,
            amount,
            cost,
        }
    }

    /// Build an order, deriving its cost from the transaction cost model.
    pub fn with_cost_model(
        index: usize,
        side: OrderSide,
        price: Num,
        amount: Num,
        model: TransactionCostModel,
    ) -> Result<Order, BackcastError> {
        let cost = model.calculate(price, amount)?;
        Ok(Order::new(index, side, price, amount, cost))
    }

    pub fn is_buy(&self) -> bool {
        self.side == OrderSide::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == OrderSide::Sell
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeState {
    New,
    Opened,
    Closed,
}

/// One position lifecycle: an expected entry side, an entry fill and an
/// optional exit fill of the opposite side.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    entry_side: OrderSide,
    entry: Option<Order>,
    exit: Option<Order>,
    transaction_cost: TransactionCostModel,
    holding_cost: HoldingCostModel,
}

impl Trade {
    pub fn new(entry_side: OrderSide) -> Trade {
        Trade::with_cost_models(entry_side, TransactionCostModel::Zero, HoldingCostModel::Zero)
    }

    pub fn with_cost_models(
        entry_side: OrderSide,
        transaction_cost: TransactionCostModel,
        holding_cost: HoldingCostModel,
    ) -> Trade {
        Trade {
            entry_side,
            entry: None,
            exit: None,
            transaction_cost,
            holding_cost,
        }
    }

    pub fn entry_side(&self) -> OrderSide {
        self.entry_side
    }

    pub fn entry(&self) -> Option<&Order> {
        self.entry.as_ref()
    }

    pub fn exit(&self) -> Option<&Order> {
        self.exit.as_ref()
    }

    pub fn state(&self) -> TradeState {
        match (&self.entry, &self.exit) {
            (None, _) => TradeState::New,
            (Some(_), None) => TradeState::Opened,
            (Some(_), Some(_)) => TradeState::Closed,
        }
    }

    pub fn is_new(&self) -> bool {
        self.state() == TradeState::New
    }

    pub fn is_opened(&self) -> bool {
        self.state() == TradeState::Opened
    }

    pub fn is_closed(&self) -> bool {
        self.state() == TradeState::Closed
    }

    /// Advance the lifecycle with one fill: the entry when NEW, the exit
    /// when OPENED. The recorded order's cost comes from the transaction
    /// cost model.
    pub fn operate(
        &mut self,
        index: usize,
        price: Num,
        amount: Num,
    ) -> Result<Order, BackcastError> {
        match self.state() {
            TradeState::Closed => Err(BackcastError::illegal_state(
                "cannot operate on a closed trade",
            )),
            TradeState::New => {
                let order =
                    Order::with_cost_model(index, self.entry_side, price, amount, self.transaction_cost)?;
                self.entry = Some(order);
                Ok(order)
            }
            TradeState::Opened => {
                let entry_index = self.entry.as_ref().map(|o| o.index).unwrap_or(0);
                if index < entry_index {
                    return Err(BackcastError::illegal_state(format!(
                        "exit index {} precedes entry index {}",
                        index, entry_index
                    )));
                }
                let order = Order::with_cost_model(
                    index,
                    self.entry_side.complement(),
                    price,
                    amount,
                    self.transaction_cost,
                )?;
                self.exit = Some(order);
                Ok(order)
            }
        }
    }

    /// Profit or loss of the closed trade, net of entry cost, exit cost
    /// and holding cost. Sign is positive when the position made money:
    /// price rose for a Buy entry, fell for a Sell entry.
    pub fn profit(&self) -> Result<Num, BackcastError> {
        let (entry, exit) = match (&self.entry, &self.exit) {
            (Some(entry), Some(exit)) => (entry, exit),
            _ => {
                return Err(BackcastError::illegal_state(
                    "profit is only defined for a closed trade",
                ))
            }
        };

        let delta = match self.entry_side {
            OrderSide::Buy => exit.price.subtract(entry.price)?,
            OrderSide::Sell => entry.price.subtract(exit.price)?,
        };
        let gross = delta.multiply(entry.amount)?;
        let holding =
            self.holding_cost
                .calculate(entry.index, exit.index, entry.price, entry.amount)?;
        gross
            .subtract(entry.cost)?
            .subtract(exit.cost)?
            .subtract(holding)
    }
}
