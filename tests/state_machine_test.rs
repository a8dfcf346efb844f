//! Property tests for the trading record state machine.

mod common;

use common::n;
use backcast::domain::record::TradingRecord;
use backcast::domain::trade::{OrderSide, TradeState};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Action {
    Enter,
    Exit,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![Just(Action::Enter), Just(Action::Exit)]
}

proptest! {
    /// The current trade only ever walks NEW → OPENED → (archived, fresh
    /// NEW); `enter` succeeds exactly from NEW and `exit` exactly from
    /// OPENED.
    #[test]
    fn transitions_stay_legal(
        actions in proptest::collection::vec((action(), 1.0f64..1000.0), 0..40),
        starting_buy in any::<bool>(),
    ) {
        let side = if starting_buy { OrderSide::Buy } else { OrderSide::Sell };
        let mut record = TradingRecord::with_starting_side(side);

        for (index, (action, price)) in actions.into_iter().enumerate() {
            let state_before = record.current_trade().state();
            prop_assert_ne!(state_before, TradeState::Closed);

            let accepted = match action {
                Action::Enter => record.enter(index, n(price), n(1.0)).unwrap(),
                Action::Exit => record.exit(index, n(price), n(1.0)).unwrap(),
            };

            match (action, state_before) {
                (Action::Enter, TradeState::New) => {
                    prop_assert!(accepted);
                    prop_assert_eq!(record.current_trade().state(), TradeState::Opened);
                }
                (Action::Exit, TradeState::Opened) => {
                    prop_assert!(accepted);
                    // Close archives the trade and instates a fresh one.
                    prop_assert_eq!(record.current_trade().state(), TradeState::New);
                    prop_assert_eq!(record.current_trade().entry_side(), side);
                }
                _ => {
                    prop_assert!(!accepted);
                    prop_assert_eq!(record.current_trade().state(), state_before);
                }
            }
        }
    }

    /// Orders alternate sides and every closed trade is internally
    /// consistent, whatever the action sequence.
    #[test]
    fn ledger_is_consistent(
        actions in proptest::collection::vec((action(), 1.0f64..1000.0), 0..40),
    ) {
        let mut record = TradingRecord::new();
        for (index, (action, price)) in actions.into_iter().enumerate() {
            match action {
                Action::Enter => record.enter(index, n(price), n(1.0)).unwrap(),
                Action::Exit => record.exit(index, n(price), n(1.0)).unwrap(),
            };
        }

        for pair in record.orders().windows(2) {
            prop_assert_ne!(pair[0].side, pair[1].side);
            prop_assert!(pair[0].index < pair[1].index);
        }

        for trade in record.trades() {
            prop_assert!(trade.is_closed());
            let entry = trade.entry().unwrap();
            let exit = trade.exit().unwrap();
            prop_assert_eq!(entry.side, OrderSide::Buy);
            prop_assert_eq!(exit.side, OrderSide::Sell);
            prop_assert!(entry.index < exit.index);
            trade.profit().unwrap();
        }

        let open_orders = record.orders().len() % 2;
        prop_assert_eq!(record.trades().len() * 2 + open_orders, record.orders().len());
        prop_assert_eq!(record.current_trade().is_opened(), open_orders == 1);
    }

    /// Replaying a record's own order log reproduces the same ledger.
    #[test]
    fn from_orders_replays_faithfully(
        actions in proptest::collection::vec((action(), 1.0f64..1000.0), 1..40),
    ) {
        let mut record = TradingRecord::new();
        for (index, (action, price)) in actions.into_iter().enumerate() {
            match action {
                Action::Enter => record.enter(index, n(price), n(1.0)).unwrap(),
                Action::Exit => record.exit(index, n(price), n(1.0)).unwrap(),
            };
        }
        prop_assume!(!record.orders().is_empty());

        let replayed = TradingRecord::from_orders(
            backcast::domain::cost::TransactionCostModel::Zero,
            backcast::domain::cost::HoldingCostModel::Zero,
            record.orders(),
        )
        .unwrap();

        prop_assert_eq!(replayed.orders(), record.orders());
        prop_assert_eq!(replayed.trades().len(), record.trades().len());
        for (a, b) in replayed.trades().iter().zip(record.trades()) {
            prop_assert_eq!(a.profit().unwrap(), b.profit().unwrap());
        }
    }
}
