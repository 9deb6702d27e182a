pub mod address;
pub mod codec;
pub mod constants;
pub mod contract;
pub mod deposit;
pub mod entrypoints;
pub mod error;
pub mod header_store;
pub mod instruction;
pub mod ledger;
pub mod msg;
pub mod network;
pub mod spend;
pub mod spv;
pub mod state;
pub mod utxo;

pub use contract::{execute, instantiate, migrate, query};
