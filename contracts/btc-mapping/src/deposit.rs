//! Deposit/swap processing over a verified transaction (§4.7). Grounded in
//! the original's `mapping.go` (`indexOutputs`, `isForVscAcc`) and
//! `handlers.go` (`HandleMap`).

use std::collections::{BTreeMap, HashMap};

use bitcoin::{Address, Transaction};
use cosmwasm_std::{to_json_binary, CosmosMsg, WasmMsg};
use serde::{Deserialize, Serialize};

use crate::codec::encode_hex;
use crate::error::{ContractError, ContractResult};
use crate::instruction::{InstructionKind, ParsedInstruction};
use crate::ledger;
use crate::msg::IntentMsg;
use crate::state::UtxoDetail;
use crate::utxo;

const INTENT_TOKEN_BTC: &str = "btc";

/// Swap instruction synthesised for the router contract (§4.7 point 4). The
/// router has no way to move the funds credited to the sender without an
/// accompanying authorisation, so the `transfer.allow` intent (`limit` equal
/// to the deposited amount, `token` "btc") rides along as an explicit field
/// on the payload rather than `contract.call`'s host-level `options.intents`
/// — CosmWasm's `WasmMsg::Execute` has no capability slot to carry it
/// natively (same "carry intents as explicit message fields" treatment as
/// `ExecuteMsg::Unmap::sender_intents`).
#[derive(Serialize, Deserialize)]
struct SwapInstruction {
    #[serde(rename = "type")]
    kind: String,
    version: String,
    asset_in: String,
    asset_out: String,
    recipient: String,
    intent: IntentMsg,
}

pub struct DepositOutcome {
    pub total_mapped: i64,
    pub credited_accounts: Vec<(String, i64)>,
    pub router_messages: Vec<CosmosMsg>,
}

/// Processes every output of `tx` that matches an entry in `registry`,
/// crediting recipients (or routing swaps) and accumulating new confirmed
/// UTXOs. Idempotent per `(txid, vout)`.
pub fn process_deposit(
    storage: &mut dyn cosmwasm_std::Storage,
    tx: &Transaction,
    registry: &HashMap<String, ParsedInstruction>,
    btc_network: bitcoin::Network,
    sender: &str,
    router_id: Option<&str>,
) -> ContractResult<DepositOutcome> {
    let txid = tx.txid().to_string();
    let mut total_mapped = 0i64;
    let mut credited_accounts = Vec::new();
    let mut router_messages = Vec::new();

    for (vout, output) in tx.output.iter().enumerate() {
        let vout = vout as u32;

        let address = match Address::from_script(&output.script_pubkey, btc_network) {
            Ok(addr) => addr.to_string(),
            Err(_) => continue,
        };

        let Some(instruction) = registry.get(&address) else {
            continue;
        };

        if utxo::is_observed(storage, &txid, vout)? {
            continue;
        }

        let amount = i64::try_from(output.value)?;
        let detail = UtxoDetail {
            tx_id: txid.clone(),
            vout,
            amount,
            pk_script: encode_hex(output.script_pubkey.as_bytes()),
            tag: encode_hex(&instruction.tag),
        };
        utxo::insert(storage, amount, true, detail)?;
        utxo::mark_observed(storage, &txid, vout)?;

        match instruction.kind {
            InstructionKind::Deposit => {
                ledger::inc_balance(storage, &instruction.recipient, amount)?;
                credited_accounts.push((instruction.recipient.clone(), amount));
            }
            InstructionKind::Swap => {
                let router_id = router_id.ok_or_else(|| {
                    ContractError::NotInitialized("router id not registered".to_string())
                })?;
                let asset_out = instruction.swap_asset_out.clone().ok_or_else(|| {
                    ContractError::BadInput("swap instruction missing swap_asset_out".to_string())
                })?;

                // Credit the sender (not the swap recipient) first, so the
                // intent authorising the router call is valid (§9 design
                // note on cross-contract-call side effects).
                ledger::inc_balance(storage, sender, amount)?;
                credited_accounts.push((sender.to_string(), amount));

                let mut intent_args = BTreeMap::new();
                intent_args.insert("limit".to_string(), amount.to_string());
                intent_args.insert("token".to_string(), INTENT_TOKEN_BTC.to_string());
                let intent = IntentMsg {
                    intent_type: ledger::INTENT_TRANSFER_ALLOW.to_string(),
                    args: intent_args,
                };

                let swap_msg = SwapInstruction {
                    kind: "swap".to_string(),
                    version: "1.0.0".to_string(),
                    asset_in: "BTC".to_string(),
                    asset_out,
                    recipient: instruction.recipient.clone(),
                    intent,
                };

                router_messages.push(CosmosMsg::Wasm(WasmMsg::Execute {
                    contract_addr: router_id.to_string(),
                    msg: to_json_binary(&swap_msg)?,
                    funds: vec![],
                }));
            }
        }

        total_mapped = ledger::safe_add(total_mapped, amount)?;
    }

    Ok(DepositOutcome {
        total_mapped,
        credited_accounts,
        router_messages,
    })
}
