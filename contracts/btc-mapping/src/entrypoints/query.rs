//! Thin query-entrypoint handlers (§6 query surface). Grounded in the
//! teacher's `entrypoints/query.rs` one-function-per-variant pattern.

use cosmwasm_std::{StdResult, Storage};

use crate::header_store;
use crate::ledger;
use crate::state::{Supply, TxSpendEntry, UtxoDetail, SUPPLY, TX_SPENDS, UTXO_DETAILS, UTXO_REGISTRY};

pub fn balance(storage: &dyn Storage, account: String) -> StdResult<i64> {
    Ok(ledger::get_balance(storage, &account)?)
}

pub fn last_height(storage: &dyn Storage) -> StdResult<u32> {
    Ok(header_store::last_height(storage)?)
}

pub fn supply(storage: &dyn Storage) -> StdResult<Supply> {
    Ok(SUPPLY.may_load(storage)?.unwrap_or_default())
}

pub fn utxo_registry(storage: &dyn Storage) -> StdResult<Vec<(u32, i64, bool)>> {
    Ok(UTXO_REGISTRY.may_load(storage)?.unwrap_or_default())
}

pub fn utxo_detail(storage: &dyn Storage, id: u32) -> StdResult<UtxoDetail> {
    UTXO_DETAILS.load(storage, id)
}

pub fn tx_spend(storage: &dyn Storage, txid: String) -> StdResult<Option<TxSpendEntry>> {
    TX_SPENDS.may_load(storage, &txid)
}
