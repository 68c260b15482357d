//! Sample exception graphs for the `demo` command.

use causegraph_core::{Frame, NativeException, SqlError, Throwable, TransactionError};
use clap::ValueEnum;
use color_eyre::Result;
use std::sync::Arc;

/// Shape of the sample graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Two-level cause chain
    Chain,
    /// Cause chain with suppressed exceptions at each level
    Suppressed,
    /// Three exceptions whose causes form a cycle
    Cycle,
    /// Three exceptions whose suppressed lists form a cycle
    SuppressedCycle,
    /// Transaction failure caused by a vendor SQL error
    Transaction,
}

fn frame(class: &str, method: &str, line: i32) -> Frame {
    let file = class.rsplit('.').next().map(|simple| format!("{simple}.java"));
    Frame::new(class, method, file, line)
}

fn service_stack(method: &str, line: i32) -> Vec<Frame> {
    vec![
        frame("app.OrderService", method, line),
        frame("app.OrderController", "post", 88),
        Frame::new("java.lang.Thread", "run", None, Frame::UNKNOWN_LINE),
    ]
}

/// Build the native graph for a scenario
pub fn build(scenario: Scenario) -> Result<Arc<dyn NativeException>> {
    let root = match scenario {
        Scenario::Chain => {
            let outer = Throwable::new("app.OrderFailed")
                .with_message("order 1842 could not be placed")
                .with_stack_trace(service_stack("place", 41))
                .into_shared();
            let inner = Throwable::new("java.io.IOException")
                .with_message("connection reset")
                .with_stack_trace(service_stack("write", 97))
                .into_shared();
            outer.init_cause(inner)?;
            outer
        }
        Scenario::Suppressed => {
            let outer = Throwable::new("app.OrderFailed")
                .with_stack_trace(service_stack("place", 41))
                .into_shared();
            let inner = Throwable::new("java.io.IOException")
                .with_message("connection reset")
                .with_stack_trace(service_stack("write", 97))
                .into_shared();
            outer.init_cause(inner.clone())?;
            for (owner, resource) in [(&outer, "Cursor"), (&inner, "Socket")] {
                owner.add_suppressed(
                    Throwable::new("java.lang.IllegalStateException")
                        .with_message(format!("{resource} already closed"))
                        .with_stack_trace(vec![frame("app.Resources", "close", 12)])
                        .into_shared(),
                );
            }
            outer
        }
        Scenario::Cycle => {
            let a = Throwable::new("app.A").with_message("first").into_shared();
            let b = Throwable::new("app.B").with_message("second").into_shared();
            let c = Throwable::new("app.C").into_shared();
            a.init_cause(b.clone())?;
            b.init_cause(c.clone())?;
            c.init_cause(a.clone())?;
            a
        }
        Scenario::SuppressedCycle => {
            let a = Throwable::new("app.A").into_shared();
            let b = Throwable::new("app.B").into_shared();
            let c = Throwable::new("app.C").into_shared();
            a.add_suppressed(b.clone());
            b.add_suppressed(c.clone());
            c.add_suppressed(a.clone());
            a
        }
        Scenario::Transaction => {
            let tx = TransactionError::new(-3, Some("transaction rolled back".to_string()))
                .with_stack_trace(service_stack("commit", 120))
                .into_shared();
            let sql = SqlError::new(
                Some("Deadlock found when trying to get lock".to_string()),
                "40001",
                1213,
            )
            .into_shared();
            tx.init_cause(sql)?;
            tx
        }
    };
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use causegraph_core::snapshot;

    #[test]
    fn test_every_scenario_builds() {
        for scenario in Scenario::value_variants() {
            let root = build(*scenario).unwrap();
            assert!(!snapshot(&root).is_empty());
        }
    }

    #[test]
    fn test_cycle_scenario_has_three_nodes() {
        let graph = snapshot(&build(Scenario::Cycle).unwrap());
        assert_eq!(graph.len(), 3);
        let root = graph.root();
        assert_eq!(root.cause().unwrap().cause().unwrap().cause().unwrap(), root);
    }

    #[test]
    fn test_transaction_scenario_fields() {
        let graph = snapshot(&build(Scenario::Transaction).unwrap());
        assert_eq!(graph.root().field("errorCode"), Some("-3"));
        assert!(graph.root().cause().unwrap().fields().is_empty());
    }

    #[test]
    fn test_frame_file_name() {
        let f = frame("app.OrderService", "place", 41);
        assert_eq!(f.file_name.as_deref(), Some("OrderService.java"));
    }
}
