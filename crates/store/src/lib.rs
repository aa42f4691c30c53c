//! Typed stores of the Tessera node, bound to the shared chainbase: every
//! persistent table reads and writes through a snapshot-layer view, so a
//! session revert rolls all of them back together.

pub mod accounts;
pub mod actuator;
pub mod blocks;
pub mod bundle;
pub mod delegated;
pub mod properties;
pub mod query;

pub use accounts::AccountStore;
pub use actuator::{Actuator, TransferActuator};
pub use blocks::BlockStore;
pub use bundle::StoreBundle;
pub use delegated::{DelegatedResourceAccountIndexStore, DelegatedResourceStore};
pub use properties::DynamicPropertiesStore;
pub use query::QueryService;

use tessera_chainbase::ChainbaseError;

/// Store errors.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("chainbase error: {0}")]
    Chainbase(#[from] ChainbaseError),
    #[error("chain parameter {0} is not set")]
    PropertyMissing(&'static str),
    #[error("validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
