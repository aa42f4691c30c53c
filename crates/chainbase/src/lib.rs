//! Layered copy-on-write snapshot storage for the Tessera node.
//!
//! Every persistent table sits on one shared stack of snapshot layers over
//! a durable ordered key-value backend. Consensus opens a [`Session`]
//! before applying a candidate block, actuators write through
//! [`TableView`]s into the tip layer, and the session then commits, merges
//! into its parent, or reverts when the fork is abandoned. Once a block is
//! irreversible the oldest layer is flushed into the backend and popped.
//! Readers pick the consistency point they observe with a [`Cursor`].

pub mod backend;
pub mod config;
pub mod cursor;
pub mod error;
mod layer;
pub mod manager;
pub mod table;

pub use backend::{BatchOp, DurableBackend, MemoryBackend, SledBackend};
pub use config::ChainbaseConfig;
pub use cursor::Cursor;
pub use error::{ChainbaseError, Result};
pub use manager::{Chainbase, Session};
pub use table::{JsonCodec, TableCodec, TableView};
