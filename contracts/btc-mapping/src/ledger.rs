//! Account balances, intent-gated authorisation, ephemeral per-tx
//! expenditure, and checked 64-bit arithmetic (§4.6). Grounded in the
//! original's `utils.go` (`checkAndDeductBalance`, `safeAdd64`/`safeSubtract64`).

use cosmwasm_std::Storage;

use crate::error::{ContractError, ContractResult};
use crate::state::{BALANCES, EPHEMERAL_EXPENDITURE};

pub const INTENT_TRANSFER_ALLOW: &str = "transfer.allow";
pub const INTENT_ARG_CONTRACT_ID: &str = "contract_id";
pub const INTENT_ARG_LIMIT: &str = "limit";

/// A single host-chain authorisation capability accompanying a call.
#[derive(Clone, Debug)]
pub struct Intent {
    pub intent_type: String,
    pub args: std::collections::HashMap<String, String>,
}

/// Which party's intents/balance `check_and_deduct` is authorising against.
pub enum Party<'a> {
    Sender(&'a str),
    Caller(&'a str),
}

impl<'a> Party<'a> {
    fn account(&self) -> &'a str {
        match self {
            Party::Sender(a) | Party::Caller(a) => a,
        }
    }

    fn is_caller(&self) -> bool {
        matches!(self, Party::Caller(_))
    }
}

pub fn get_balance(storage: &dyn Storage, account: &str) -> ContractResult<i64> {
    Ok(BALANCES.may_load(storage, account)?.unwrap_or_default())
}

pub fn set_balance(storage: &mut dyn Storage, account: &str, value: i64) -> ContractResult<()> {
    Ok(BALANCES.save(storage, account, &value)?)
}

pub fn inc_balance(storage: &mut dyn Storage, account: &str, delta: i64) -> ContractResult<()> {
    let current = get_balance(storage, account)?;
    let next = safe_add(current, delta)?;
    set_balance(storage, account, next)
}

pub fn safe_add(a: i64, b: i64) -> ContractResult<i64> {
    a.checked_add(b)
        .ok_or_else(|| ContractError::Arithmetic(format!("overflow adding {a} + {b}")))
}

pub fn safe_sub(a: i64, b: i64) -> ContractResult<i64> {
    a.checked_sub(b)
        .ok_or_else(|| ContractError::Arithmetic(format!("underflow subtracting {a} - {b}")))
}

fn get_expenditure(storage: &dyn Storage, contract_id: &str, account: &str) -> ContractResult<i64> {
    Ok(EPHEMERAL_EXPENDITURE
        .may_load(storage, (contract_id, account))?
        .unwrap_or_default())
}

fn set_expenditure(
    storage: &mut dyn Storage,
    contract_id: &str,
    account: &str,
    value: i64,
) -> ContractResult<()> {
    Ok(EPHEMERAL_EXPENDITURE.save(storage, (contract_id, account), &value)?)
}

/// Clears every ephemeral expenditure entry the current invocation wrote,
/// modelling the host-transaction-boundary reset described in §5.
pub fn clear_expenditure(storage: &mut dyn Storage, contract_id: &str, account: &str) {
    EPHEMERAL_EXPENDITURE.remove(storage, (contract_id, account));
}

/// Parses a decimal `limit` field. Caller-intent limits may carry a single
/// decimal point (e.g. a fixed-point display form); it is stripped before
/// parsing so the value reads as a plain integer, matching the original's
/// caller-intent handling.
fn parse_limit(raw: &str, is_caller: bool) -> ContractResult<i64> {
    let cleaned = if is_caller {
        raw.replacen('.', "", 1)
    } else {
        raw.to_string()
    };
    cleaned
        .parse::<i64>()
        .map_err(|_| ContractError::Intent(format!("unparsable intent limit: {raw}")))
}

/// Sums the `transfer.allow` intents in `intents` whose `contract_id`
/// argument matches `self_contract_id`.
fn sum_allowance(intents: &[Intent], self_contract_id: &str, is_caller: bool) -> ContractResult<i64> {
    let mut total = 0i64;
    for intent in intents {
        if intent.intent_type != INTENT_TRANSFER_ALLOW {
            continue;
        }
        let Some(contract_id) = intent.args.get(INTENT_ARG_CONTRACT_ID) else {
            continue;
        };
        if contract_id != self_contract_id {
            continue;
        }
        let Some(limit) = intent.args.get(INTENT_ARG_LIMIT) else {
            continue;
        };
        total = safe_add(total, parse_limit(limit, is_caller)?)?;
    }
    Ok(total)
}

/// The authorisation point (§4.6). Accepts `amount > 0` and an account that
/// is either the sender or the caller. Reads that party's intents, sums its
/// `transfer.allow` allowance for this contract, subtracts expenditure
/// already recorded this host transaction, and proceeds only if the
/// remaining allowance covers `amount`. On success, debits the balance and
/// records the expenditure.
pub fn check_and_deduct(
    storage: &mut dyn Storage,
    self_contract_id: &str,
    party: Party,
    intents: &[Intent],
    amount: i64,
) -> ContractResult<()> {
    if amount <= 0 {
        return Err(ContractError::BadInput(
            "check_and_deduct amount must be positive".to_string(),
        ));
    }

    let account = party.account();
    let balance = get_balance(storage, account)?;
    if balance < amount {
        return Err(ContractError::InsufficientBalance(format!(
            "account {account} has {balance}, needs {amount}"
        )));
    }

    let allowance = sum_allowance(intents, self_contract_id, party.is_caller())?;
    let already_spent = get_expenditure(storage, self_contract_id, account)?;
    let remaining = safe_sub(allowance, already_spent)?;
    if remaining < amount {
        return Err(ContractError::Intent(format!(
            "remaining allowance {remaining} below requested {amount}"
        )));
    }

    set_balance(storage, account, safe_sub(balance, amount)?)?;
    set_expenditure(
        storage,
        self_contract_id,
        account,
        safe_add(already_spent, amount)?,
    )?;

    Ok(())
}
