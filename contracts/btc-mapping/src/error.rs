pub use common_bitcoin::error::{ContractError, ContractResult};
