//! BlockLab Core: strategy blocks, validation and persistence.
//!
//! This crate holds everything a front end needs to edit a strategy:
//! - Domain types (templates, instances, parameter values, findings)
//! - The static block catalog and its parameter schema table
//! - The sequence mutator (add / remove / reorder / set-parameter)
//! - The validator, re-run after every mutation
//! - The save gate and the persistence gateways behind it
//! - A backtester that runs SMA/RSI rules over a local bar series
//! - Configuration and logging setup

pub mod backtest;
pub mod catalog;
pub mod config;
pub mod document;
pub mod domain;
pub mod fingerprint;
pub mod gateway;
pub mod logging;
pub mod save_gate;
pub mod schema;
pub mod sequence;
pub mod validator;

pub use backtest::{BacktestError, BacktestParams, BacktestReport};
pub use catalog::Catalog;
pub use config::{BuilderConfig, ThemeMode};
pub use document::StrategyDocument;
pub use domain::{BlockInstance, BlockKind, BlockTemplate, InstanceId, ParamValue, ValidationFinding};
pub use gateway::{GatewayError, PersistenceGateway, SavedStrategy};
pub use save_gate::{SaveError, SaveGate, SaveNotice, SaveRequest};
pub use sequence::{SequenceError, StrategySequence};
pub use validator::validate;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types that cross the TUI worker channel are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<StrategyDocument>();
        require_sync::<StrategyDocument>();
        require_send::<SaveRequest>();
        require_sync::<SaveRequest>();
        require_send::<SaveNotice>();
        require_send::<SavedStrategy>();
        require_send::<GatewayError>();
        require_send::<StrategySequence>();
        require_sync::<StrategySequence>();
        require_send::<gateway::HttpGateway>();
        require_sync::<gateway::HttpGateway>();
        require_send::<gateway::JsonFileGateway>();
        require_sync::<gateway::JsonFileGateway>();
        require_send::<BacktestReport>();
    }

    /// Architecture contract: the validator is a plain function of the block slice.
    #[test]
    fn validator_takes_only_blocks() {
        fn _check(blocks: &[BlockInstance]) -> Vec<ValidationFinding> {
            validate(blocks)
        }
        assert_eq!(_check(&[]).len(), 1);
    }
}
