// Settings module
// Bridge configuration: timeout budgets and log filter

pub mod settings;

pub use settings::{current, BridgeSettings, TimeoutSettings};
