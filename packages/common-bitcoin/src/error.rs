use cosmwasm_std::StdError;

/// The error-kind vocabulary the contract aborts with. The variant name is
/// also the symbol surfaced to the host on abort (see `ContractError::symbol`).
#[derive(thiserror::Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("json_error: {0}")]
    Json(String),

    #[error("state_access_error: {0}")]
    StateAccess(String),

    #[error("authentication_error: {0}")]
    Authentication(String),

    #[error("no_permission: {0}")]
    NoPermission(String),

    #[error("bad_input: {0}")]
    BadInput(String),

    #[error("invalid_hex: {0}")]
    InvalidHex(String),

    #[error("contract_not_initialized: {0}")]
    NotInitialized(String),

    #[error("intent_error: {0}")]
    Intent(String),

    #[error("insufficient_balance: {0}")]
    InsufficientBalance(String),

    #[error("overflow_underflow: {0}")]
    Arithmetic(String),

    #[error("error_construction_transaction: {0}")]
    TransactionBuild(String),

    #[error(transparent)]
    Bitcoin(#[from] bitcoin::Error),

    #[error(transparent)]
    BitcoinAddress(#[from] bitcoin::util::address::Error),

    #[error(transparent)]
    BitcoinHash(#[from] bitcoin::hashes::Error),

    #[error(transparent)]
    BitcoinEncode(#[from] bitcoin::consensus::encode::Error),

    #[error(transparent)]
    Sighash(#[from] bitcoin::util::sighash::Error),

    #[error(transparent)]
    TryFrom(#[from] std::num::TryFromIntError),
}

impl ContractError {
    /// The bare symbol (no message), as handed to `abort(msg, symbol)` in
    /// the spec's host capability interface.
    pub fn symbol(&self) -> &'static str {
        match self {
            ContractError::Std(_) => "state_access_error",
            ContractError::Json(_) => "json_error",
            ContractError::StateAccess(_) => "state_access_error",
            ContractError::Authentication(_) => "authentication_error",
            ContractError::NoPermission(_) => "no_permission",
            ContractError::BadInput(_) => "bad_input",
            ContractError::InvalidHex(_) => "invalid_hex",
            ContractError::NotInitialized(_) => "contract_not_initialized",
            ContractError::Intent(_) => "intent_error",
            ContractError::InsufficientBalance(_) => "insufficient_balance",
            ContractError::Arithmetic(_) => "overflow_underflow",
            ContractError::TransactionBuild(_) => "error_construction_transaction",
            ContractError::Bitcoin(_)
            | ContractError::BitcoinAddress(_)
            | ContractError::BitcoinHash(_)
            | ContractError::BitcoinEncode(_)
            | ContractError::Sighash(_)
            | ContractError::TryFrom(_) => "error_construction_transaction",
        }
    }

    /// Prepends `context` to the error message, joined with `": "`, matching
    /// the original contract's `buildString`/`Prepend` behaviour.
    pub fn context(self, context: impl Into<String>) -> Self {
        let context = context.into();
        let msg = format!("{context}: {self}");
        match self.symbol() {
            "json_error" => ContractError::Json(msg),
            "state_access_error" => ContractError::StateAccess(msg),
            "authentication_error" => ContractError::Authentication(msg),
            "no_permission" => ContractError::NoPermission(msg),
            "bad_input" => ContractError::BadInput(msg),
            "invalid_hex" => ContractError::InvalidHex(msg),
            "contract_not_initialized" => ContractError::NotInitialized(msg),
            "intent_error" => ContractError::Intent(msg),
            "insufficient_balance" => ContractError::InsufficientBalance(msg),
            "overflow_underflow" => ContractError::Arithmetic(msg),
            _ => ContractError::TransactionBuild(msg),
        }
    }
}

impl From<ContractError> for StdError {
    fn from(source: ContractError) -> Self {
        Self::generic_err(source.to_string())
    }
}

pub type ContractResult<T> = std::result::Result<T, ContractError>;
