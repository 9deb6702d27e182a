//! UTXO registry: packed `(internal_id, amount, confirmed)` triples, per-id
//! detail entries, the observed-output set, and the tx-spends registry
//! (§3, §4.7). Grounded in the original's `utils.go` (`packUtxo`/`unpackUtxo`,
//! `getUtxoKey`, `joinIdVout`).

use cosmwasm_std::Storage;

use crate::error::{ContractError, ContractResult};
use crate::state::{
    TxSpendEntry, UtxoDetail, NEXT_UTXO_ID, OBSERVED_OUTPUTS, TX_SPENDS, TX_SPEND_REGISTRY,
    UTXO_DETAILS, UTXO_REGISTRY,
};

pub fn observed_key(txid: &str, vout: u32) -> String {
    format!("{txid}:{vout}")
}

pub fn is_observed(storage: &dyn Storage, txid: &str, vout: u32) -> ContractResult<bool> {
    Ok(OBSERVED_OUTPUTS
        .may_load(storage, &observed_key(txid, vout))?
        .unwrap_or(false))
}

pub fn mark_observed(storage: &mut dyn Storage, txid: &str, vout: u32) -> ContractResult<()> {
    Ok(OBSERVED_OUTPUTS.save(storage, &observed_key(txid, vout), &true)?)
}

pub fn load_registry(storage: &dyn Storage) -> ContractResult<Vec<(u32, i64, bool)>> {
    Ok(UTXO_REGISTRY.may_load(storage)?.unwrap_or_default())
}

pub fn save_registry(storage: &mut dyn Storage, registry: &[(u32, i64, bool)]) -> ContractResult<()> {
    Ok(UTXO_REGISTRY.save(storage, &registry.to_vec())?)
}

fn next_id(storage: &mut dyn Storage) -> ContractResult<u32> {
    let id = NEXT_UTXO_ID.may_load(storage)?.unwrap_or_default();
    let next = id
        .checked_add(1)
        .ok_or_else(|| ContractError::Arithmetic("utxo id overflow".to_string()))?;
    NEXT_UTXO_ID.save(storage, &next)?;
    Ok(id)
}

/// Allocates a new internal id, appends `(id, amount, confirmed)` to the
/// packed list, and persists the detail entry.
pub fn insert(
    storage: &mut dyn Storage,
    amount: i64,
    confirmed: bool,
    detail: UtxoDetail,
) -> ContractResult<u32> {
    if amount <= 0 {
        return Err(ContractError::BadInput(
            "utxo amount must be positive".to_string(),
        ));
    }

    let id = next_id(storage)?;
    let mut registry = load_registry(storage)?;
    registry.push((id, amount, confirmed));
    save_registry(storage, &registry)?;
    UTXO_DETAILS.save(storage, id, &detail)?;
    Ok(id)
}

pub fn load_detail(storage: &dyn Storage, id: u32) -> ContractResult<UtxoDetail> {
    UTXO_DETAILS
        .may_load(storage, id)?
        .ok_or_else(|| ContractError::StateAccess(format!("no utxo detail for id {id}")))
}

pub fn delete_detail(storage: &mut dyn Storage, id: u32) {
    UTXO_DETAILS.remove(storage, id);
}

/// Marks a registry row confirmed by internal id.
pub fn mark_confirmed(registry: &mut [(u32, i64, bool)], id: u32) {
    for row in registry.iter_mut() {
        if row.0 == id {
            row.2 = true;
        }
    }
}

/// Removes a set of ids from the packed list, returning the retained rows.
pub fn remove_ids(registry: &[(u32, i64, bool)], ids: &[u32]) -> Vec<(u32, i64, bool)> {
    registry
        .iter()
        .copied()
        .filter(|(id, _, _)| !ids.contains(id))
        .collect()
}

pub fn save_tx_spend(storage: &mut dyn Storage, txid: &str, entry: &TxSpendEntry) -> ContractResult<()> {
    TX_SPENDS.save(storage, txid, entry)?;
    let mut registry = TX_SPEND_REGISTRY.may_load(storage)?.unwrap_or_default();
    if !registry.iter().any(|t| t == txid) {
        registry.push(txid.to_string());
    }
    TX_SPEND_REGISTRY.save(storage, &registry)?;
    Ok(())
}

pub fn load_tx_spend(storage: &dyn Storage, txid: &str) -> ContractResult<Option<TxSpendEntry>> {
    Ok(TX_SPENDS.may_load(storage, txid)?)
}

pub fn delete_tx_spend(storage: &mut dyn Storage, txid: &str) -> ContractResult<()> {
    TX_SPENDS.remove(storage, txid);
    let mut registry = TX_SPEND_REGISTRY.may_load(storage)?.unwrap_or_default();
    registry.retain(|t| t != txid);
    TX_SPEND_REGISTRY.save(storage, &registry)?;
    Ok(())
}

/// Reconciliation of a previously unsigned spend (§4.7): if a tx-spend entry
/// exists for this inbound `txid`, every pending (`confirmed=0`) registry row
/// whose detail was created by that spend (its `tx_id` is this `txid` — the
/// pending change outputs `spend::build_spend` persists) is marked confirmed,
/// then the tx-spend entry is dropped. A change output is never itself an
/// instruction-registry match (it pays the contract's own address), so the
/// deposit processor's per-output scan would otherwise never confirm it.
pub fn update_tx_spends(storage: &mut dyn Storage, txid: &str) -> ContractResult<()> {
    if load_tx_spend(storage, txid)?.is_none() {
        return Ok(());
    }

    let mut registry = load_registry(storage)?;
    let pending_ids: Vec<u32> = registry
        .iter()
        .filter(|(_, _, confirmed)| !confirmed)
        .map(|(id, _, _)| *id)
        .collect();

    let mut to_confirm = Vec::new();
    for id in pending_ids {
        let detail = load_detail(storage, id)?;
        if detail.tx_id == txid {
            to_confirm.push(id);
        }
    }
    for id in to_confirm {
        mark_confirmed(&mut registry, id);
    }

    save_registry(storage, &registry)?;
    delete_tx_spend(storage, txid)?;
    Ok(())
}
