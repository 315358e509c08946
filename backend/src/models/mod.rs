//! Domain models for the transaction simulator

pub mod customer;
pub mod log_buffer;
pub mod merchant;
pub mod population;
pub mod record;

// Re-exports
pub use customer::{Customer, CustomerKind};
pub use log_buffer::{LogBuffer, LogRecord};
pub use merchant::Merchant;
pub use population::Population;
pub use record::{columns, TransactionRecord};
