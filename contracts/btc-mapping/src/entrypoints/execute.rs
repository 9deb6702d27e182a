//! Thin execute-entrypoint handlers (§4.9): authenticate the caller, delegate
//! to the core modules, render a short attribute summary of the effect.
//! Grounded in the teacher's `entrypoints/execute.rs` wrapper pattern
//! (`relay_deposit`: load config, call into the domain layer, attach one
//! `action` attribute).

use bitcoin::consensus::serialize;
use cosmwasm_std::{Env, MessageInfo, Response, Storage};

use crate::codec;
use crate::deposit;
use crate::error::{ContractError, ContractResult};
use crate::header_store;
use crate::instruction;
use crate::ledger::{self, Party};
use crate::msg::{into_intents, IntentMsg, TxDataMsg};
use crate::spend;
use crate::spv;
use crate::state::{Config, TxSpendEntry, UtxoDetail, BACKUP_PUBKEY, CONFIG, PRIMARY_PUBKEY, ROUTER_ID, SUPPLY};
use crate::utxo;

/// Admin authority (§4.9): `sender == oracle` on mainnet, `sender == owner`
/// on test networks. CosmWasm collapses the spec's separate `sender`/
/// `caller` identities into one `MessageInfo::sender`.
fn ensure_admin(storage: &dyn Storage, info: &MessageInfo) -> ContractResult<Config> {
    let config = CONFIG.load(storage)?;
    let authorised = if config.network.is_mainnet() {
        info.sender == config.oracle
    } else {
        info.sender == config.owner
    };
    if !authorised {
        return Err(ContractError::Authentication(
            "admin endpoint requires the oracle (mainnet) or the owner (test networks)".to_string(),
        ));
    }
    Ok(config)
}

fn ensure_owner(storage: &dyn Storage, info: &MessageInfo) -> ContractResult<Config> {
    let config = CONFIG.load(storage)?;
    if info.sender != config.owner {
        return Err(ContractError::NoPermission(
            "caller is not the contract owner".to_string(),
        ));
    }
    Ok(config)
}

fn load_keys(storage: &dyn Storage) -> ContractResult<(Vec<u8>, Option<Vec<u8>>)> {
    let primary = codec::decode_hex(&PRIMARY_PUBKEY.may_load(storage)?.ok_or_else(|| {
        ContractError::NotInitialized("primary public key not set".to_string())
    })?)?;
    let backup = BACKUP_PUBKEY
        .may_load(storage)?
        .map(|hex_str| codec::decode_hex(&hex_str))
        .transpose()?;
    Ok((primary, backup))
}

pub fn seed_blocks(
    storage: &mut dyn Storage,
    info: MessageInfo,
    block_header: String,
    block_height: u32,
) -> ContractResult<Response> {
    let config = ensure_admin(storage, &info)?;
    let height = header_store::seed(storage, config.network, &block_header, block_height)?;
    Ok(Response::new()
        .add_attribute("action", "seed_blocks")
        .add_attribute("height", height.to_string()))
}

pub fn add_blocks(
    storage: &mut dyn Storage,
    info: MessageInfo,
    blocks: String,
    latest_fee: i64,
) -> ContractResult<Response> {
    let config = ensure_admin(storage, &info)?;
    let headers = codec::split_headers_hex(&blocks)?;
    let outcome = header_store::append(storage, config.network, &headers)?;

    // The base fee rate is updated after header processing regardless of
    // whether the batch stopped early on a bad link (§4.2).
    if latest_fee > 0 {
        let mut supply = SUPPLY.may_load(storage)?.unwrap_or_default();
        supply.base_fee_rate = latest_fee;
        SUPPLY.save(storage, &supply)?;
    }

    Ok(Response::new()
        .add_attribute("action", "add_blocks")
        .add_attribute("new_last_height", outcome.new_last_height.to_string())
        .add_attribute("headers_added", outcome.headers_added.to_string())
        .add_attribute("sequence_incorrect", outcome.sequence_incorrect.to_string()))
}

pub fn map(
    storage: &mut dyn Storage,
    tx_data: TxDataMsg,
    instructions: Vec<String>,
    sender: String,
) -> ContractResult<Response> {
    let config = CONFIG.load(storage)?;
    let btc_network = config.network.to_bitcoin_network();
    let csv_blocks = config.network.csv_blocks();

    let tx = spv::verify_transaction(
        storage,
        tx_data.block_height,
        &tx_data.raw_tx_hex,
        &tx_data.merkle_proof_hex,
        tx_data.tx_index,
    )?;
    let txid = tx.txid().to_string();

    let (primary_pubkey, backup_pubkey) = load_keys(storage)?;

    let instruction_registry = instruction::build_registry(
        &instructions,
        &primary_pubkey,
        backup_pubkey.as_deref(),
        csv_blocks,
        btc_network,
    )?;

    let router_id = ROUTER_ID.may_load(storage)?;

    let outcome = deposit::process_deposit(
        storage,
        &tx,
        &instruction_registry,
        btc_network,
        &sender,
        router_id.as_deref(),
    )?;

    // §4.7 reconciliation: this inbound txid may itself be a transaction
    // the contract previously built and left unsigned.
    utxo::update_tx_spends(storage, &txid)?;

    let mut supply = SUPPLY.may_load(storage)?.unwrap_or_default();
    supply.active_supply = ledger::safe_add(supply.active_supply, outcome.total_mapped)?;
    supply.user_supply = ledger::safe_add(supply.user_supply, outcome.total_mapped)?;
    SUPPLY.save(storage, &supply)?;

    let mut response = Response::new()
        .add_attribute("action", "map")
        .add_attribute("txid", txid)
        .add_attribute("total_mapped", outcome.total_mapped.to_string());

    for (account, amount) in &outcome.credited_accounts {
        response = response.add_attribute("credited", format!("{account}:{amount}"));
    }

    if !outcome.router_messages.is_empty() {
        response = response.add_attribute("router_calls", outcome.router_messages.len().to_string());
    }

    Ok(response.add_messages(outcome.router_messages))
}

#[allow(clippy::too_many_arguments)]
pub fn unmap(
    storage: &mut dyn Storage,
    env: Env,
    amount: i64,
    to: String,
    from: Option<String>,
    sender: String,
    sender_intents: Vec<IntentMsg>,
) -> ContractResult<Response> {
    if amount <= 0 {
        return Err(ContractError::BadInput(
            "unmap amount must be positive".to_string(),
        ));
    }

    let config = CONFIG.load(storage)?;
    let btc_network = config.network.to_bitcoin_network();
    let csv_blocks = config.network.csv_blocks();
    let (primary_pubkey, backup_pubkey) = load_keys(storage)?;

    let mut supply = SUPPLY.may_load(storage)?.unwrap_or_default();
    let fee_rate = supply.base_fee_rate;

    let built = spend::build_spend(
        storage,
        amount,
        &to,
        fee_rate,
        &primary_pubkey,
        backup_pubkey.as_deref(),
        csv_blocks,
        btc_network,
    )?;

    let vsc_fee = spend::vsc_fee(amount)?;
    let final_amount = ledger::safe_add(ledger::safe_add(amount, vsc_fee)?, built.fee)?;

    let account = from.unwrap_or_else(|| sender.clone());
    let self_contract_id = env.contract.address.to_string();
    let intents = into_intents(sender_intents);
    ledger::check_and_deduct(
        storage,
        &self_contract_id,
        Party::Sender(&account),
        &intents,
        final_amount,
    )?;
    ledger::clear_expenditure(storage, &self_contract_id, &account);

    // vsc_fee moves from user_supply to fee_supply without leaving the
    // system, so active_supply only drops by the amount actually paid out
    // plus the miner fee, not by vsc_fee a second time.
    let active_outflow = ledger::safe_sub(final_amount, vsc_fee)?;
    supply.active_supply = ledger::safe_sub(supply.active_supply, active_outflow)?;
    supply.user_supply = ledger::safe_sub(supply.user_supply, final_amount)?;
    supply.fee_supply = ledger::safe_add(supply.fee_supply, vsc_fee)?;
    SUPPLY.save(storage, &supply)?;

    let registry = utxo::load_registry(storage)?;
    let registry = utxo::remove_ids(&registry, &built.input_ids);
    utxo::save_registry(storage, &registry)?;
    for id in &built.input_ids {
        utxo::delete_detail(storage, *id);
    }

    for (vout, change_amount, pk_script) in &built.change_outputs {
        let detail = UtxoDetail {
            tx_id: built.txid.clone(),
            vout: *vout,
            amount: *change_amount,
            pk_script: codec::encode_hex(pk_script),
            tag: String::new(),
        };
        utxo::insert(storage, *change_amount, false, detail)?;
    }

    let tx_spend = TxSpendEntry {
        tx: codec::encode_hex(&serialize(&built.tx)),
        unsigned_sighashes: built.unsigned_sighashes.clone(),
    };
    utxo::save_tx_spend(storage, &built.txid, &tx_spend)?;

    Ok(Response::new()
        .add_attribute("action", "unmap")
        .add_attribute("txid", built.txid)
        .add_attribute("amount", amount.to_string())
        .add_attribute("vsc_fee", vsc_fee.to_string())
        .add_attribute("btc_fee", built.fee.to_string()))
}

pub fn transfer(
    storage: &mut dyn Storage,
    env: Env,
    amount: i64,
    to: String,
    from: Option<String>,
    caller: String,
    caller_intents: Vec<IntentMsg>,
) -> ContractResult<Response> {
    let account = from.unwrap_or_else(|| caller.clone());
    let self_contract_id = env.contract.address.to_string();
    let intents = into_intents(caller_intents);
    ledger::check_and_deduct(storage, &self_contract_id, Party::Caller(&account), &intents, amount)?;
    ledger::clear_expenditure(storage, &self_contract_id, &account);
    ledger::inc_balance(storage, &to, amount)?;

    Ok(Response::new()
        .add_attribute("action", "transfer")
        .add_attribute("from", account)
        .add_attribute("to", to)
        .add_attribute("amount", amount.to_string()))
}

pub fn transfer_from(
    storage: &mut dyn Storage,
    env: Env,
    amount: i64,
    to: String,
    from: Option<String>,
    sender: String,
    sender_intents: Vec<IntentMsg>,
) -> ContractResult<Response> {
    let account = from.unwrap_or_else(|| sender.clone());
    let self_contract_id = env.contract.address.to_string();
    let intents = into_intents(sender_intents);
    ledger::check_and_deduct(storage, &self_contract_id, Party::Sender(&account), &intents, amount)?;
    ledger::clear_expenditure(storage, &self_contract_id, &account);
    ledger::inc_balance(storage, &to, amount)?;

    Ok(Response::new()
        .add_attribute("action", "transfer_from")
        .add_attribute("from", account)
        .add_attribute("to", to)
        .add_attribute("amount", amount.to_string()))
}

pub fn register_public_key(
    storage: &mut dyn Storage,
    info: MessageInfo,
    primary_public_key: Option<String>,
    backup_public_key: Option<String>,
) -> ContractResult<Response> {
    let config = ensure_owner(storage, &info)?;

    if let Some(primary) = primary_public_key {
        if config.network.is_mainnet() && PRIMARY_PUBKEY.may_load(storage)?.is_some() {
            return Err(ContractError::NoPermission(
                "primary public key is immutable once set on mainnet".to_string(),
            ));
        }
        codec::decode_hex(&primary)?;
        PRIMARY_PUBKEY.save(storage, &primary)?;
    }

    if let Some(backup) = backup_public_key {
        if config.network.is_mainnet() && BACKUP_PUBKEY.may_load(storage)?.is_some() {
            return Err(ContractError::NoPermission(
                "backup public key is immutable once set on mainnet".to_string(),
            ));
        }
        codec::decode_hex(&backup)?;
        BACKUP_PUBKEY.save(storage, &backup)?;
    }

    Ok(Response::new().add_attribute("action", "register_public_key"))
}

pub fn create_key_pair(storage: &dyn Storage, info: MessageInfo) -> ContractResult<Response> {
    ensure_owner(storage, &info)?;
    // Threshold-signature keypair generation is an external collaborator
    // (§1 Non-goals); recorded as an attribute per §6's `tss.create_key` mapping.
    Ok(Response::new().add_attribute("action", "create_key_pair"))
}

pub fn register_router(
    storage: &mut dyn Storage,
    info: MessageInfo,
    contract_id: String,
) -> ContractResult<Response> {
    let config = ensure_owner(storage, &info)?;
    if config.network.is_mainnet() && ROUTER_ID.may_load(storage)?.is_some() {
        return Err(ContractError::NoPermission(
            "router id is immutable once set on mainnet".to_string(),
        ));
    }
    ROUTER_ID.save(storage, &contract_id)?;
    Ok(Response::new()
        .add_attribute("action", "register_router")
        .add_attribute("contract_id", contract_id))
}
