//! Unsigned spend-transaction builder (§4.8): coin selection, SegWit fee
//! estimation, change splitting, BIP-143 sighash generation. Grounded in the
//! original's `unmapping.go` (`getInputUtxos`, `calculatSegwitFee`,
//! `createSpendTransaction`) and the teacher's `checkpoint.rs`
//! (`BitcoinTx::populate_input_sig_message`, `SighashCache::segwit_signature_hash`).

use std::str::FromStr;

use bitcoin::blockdata::transaction::EcdsaSighashType;
use bitcoin::util::sighash::SighashCache;
use bitcoin::{Address, OutPoint, PackedLockTime, Script, Sequence, Transaction, TxIn, TxOut, Txid, Witness};
use cosmwasm_std::Storage;

use crate::address;
use crate::codec::{decode_hex, encode_hex};
use crate::constants::{
    CHANGE_SPLIT_THRESHOLD, DUST_THRESHOLD, MAX_CHANGE_OUTPUTS, MIN_VSC_FEE, P2WSH_INPUT_BASE_SIZE,
    TX_BASE_OVERHEAD, TX_OUTPUT_BASE_SIZE, VSC_FEE_RATE, WITNESS_ITEM_OVERHEAD, WITNESS_SIG_SIZE,
};
use crate::error::{ContractError, ContractResult};
use crate::ledger::{safe_add, safe_sub};
use crate::state::UtxoDetail;
use crate::utxo;

/// Non-witness ("base") size of a transaction with `num_inputs` P2WSH inputs
/// and `num_outputs` outputs, per the approximations in §4.8.
fn base_size(num_inputs: u64, num_outputs: u64) -> u64 {
    TX_BASE_OVERHEAD + num_inputs * P2WSH_INPUT_BASE_SIZE + num_outputs * TX_OUTPUT_BASE_SIZE
}

/// `vsize = ceil((3*base + (base + witness)) / 4) + 2`, the exact weighted-size
/// formula of §4.8, where `witness` is the summed per-input witness-stack size.
fn estimate_vsize(num_outputs: u64, witness_script_lens: &[u64]) -> u64 {
    let num_inputs = witness_script_lens.len() as u64;
    let base = base_size(num_inputs, num_outputs);
    let witness: u64 = witness_script_lens
        .iter()
        .map(|len| WITNESS_SIG_SIZE + len + WITNESS_ITEM_OVERHEAD)
        .sum();
    let total = base + witness;
    (3 * base + total + 3) / 4 + 2
}

fn estimate_fee(num_outputs: u64, witness_script_lens: &[u64], fee_rate: i64) -> ContractResult<i64> {
    let vsize = estimate_vsize(num_outputs, witness_script_lens);
    let vsize = i64::try_from(vsize)
        .map_err(|_| ContractError::Arithmetic("vsize overflow".to_string()))?;
    vsize
        .checked_mul(fee_rate)
        .ok_or_else(|| ContractError::Arithmetic("fee overflow".to_string()))
}

/// `vsc_fee = max(1000, floor(amount * 0.01))`; rejected (as "too small to
/// cover fee") if the fee would consume the entire amount.
pub fn vsc_fee(amount: i64) -> ContractResult<i64> {
    let percentage_fee = ((amount as f64) * VSC_FEE_RATE) as i64;
    let fee = percentage_fee.max(MIN_VSC_FEE);
    if fee >= amount {
        return Err(ContractError::BadInput(
            "transaction too small to cover fee".to_string(),
        ));
    }
    Ok(fee)
}

fn witness_script_for(
    detail: &UtxoDetail,
    primary_pubkey: &[u8],
    backup_pubkey: Option<&[u8]>,
    csv_blocks: i64,
) -> ContractResult<Script> {
    let tag = decode_hex(&detail.tag)?;
    address::witness_script(primary_pubkey, backup_pubkey, &tag, csv_blocks)
}

pub struct Selection {
    pub selected: Vec<(u32, UtxoDetail)>,
    pub total_in: i64,
}

/// Coin selection per §4.8: a single confirmed UTXO covering `send_amount`
/// plus its own one-input fee if one exists; otherwise greedily accumulate
/// confirmed UTXOs in list order, then (only once confirmed UTXOs are
/// exhausted) unconfirmed ones, re-estimating the one-output fee as each
/// input is added.
pub fn select_coins(
    storage: &dyn Storage,
    send_amount: i64,
    fee_rate: i64,
    primary_pubkey: &[u8],
    backup_pubkey: Option<&[u8]>,
    csv_blocks: i64,
) -> ContractResult<Selection> {
    let registry = utxo::load_registry(storage)?;

    for &(id, amount, confirmed) in &registry {
        if !confirmed {
            continue;
        }
        let detail = utxo::load_detail(storage, id)?;
        let wlen = witness_script_for(&detail, primary_pubkey, backup_pubkey, csv_blocks)?.len() as u64;
        let fee = estimate_fee(1, &[wlen], fee_rate)?;
        if amount >= safe_add(send_amount, fee)? {
            return Ok(Selection {
                selected: vec![(id, detail)],
                total_in: amount,
            });
        }
    }

    let mut selected: Vec<(u32, UtxoDetail)> = Vec::new();
    let mut wlens: Vec<u64> = Vec::new();
    let mut total_in: i64 = 0;

    for pass_confirmed in [true, false] {
        for &(id, amount, confirmed) in &registry {
            if confirmed != pass_confirmed {
                continue;
            }
            let detail = utxo::load_detail(storage, id)?;
            let wlen = witness_script_for(&detail, primary_pubkey, backup_pubkey, csv_blocks)?.len() as u64;
            selected.push((id, detail));
            wlens.push(wlen);
            total_in = safe_add(total_in, amount)?;

            let fee = estimate_fee(1, &wlens, fee_rate)?;
            if total_in >= safe_add(send_amount, fee)? {
                return Ok(Selection { selected, total_in });
            }
        }
    }

    Err(ContractError::TransactionBuild(
        "insufficient funds to cover spend".to_string(),
    ))
}

pub struct BuiltSpend {
    pub tx: Transaction,
    pub txid: String,
    pub unsigned_sighashes: Vec<crate::state::UnsignedSigHash>,
    pub input_ids: Vec<u32>,
    /// `(vout, amount, pk_script_bytes)` for each pending change output created.
    pub change_outputs: Vec<(u32, i64, Vec<u8>)>,
    pub fee: i64,
}

/// Builds the unsigned spend transaction sending `send_amount` to
/// `dest_address`, selecting coins and splitting change per §4.8, and
/// generating one BIP-143 witness sighash per input.
#[allow(clippy::too_many_arguments)]
pub fn build_spend(
    storage: &dyn Storage,
    send_amount: i64,
    dest_address: &str,
    fee_rate: i64,
    primary_pubkey: &[u8],
    backup_pubkey: Option<&[u8]>,
    csv_blocks: i64,
    network: bitcoin::Network,
) -> ContractResult<BuiltSpend> {
    let selection = select_coins(
        storage,
        send_amount,
        fee_rate,
        primary_pubkey,
        backup_pubkey,
        csv_blocks,
    )?;

    let dest_script = dest_address
        .parse::<Address>()
        .map_err(|e| ContractError::TransactionBuild(e.to_string()))?
        .script_pubkey();

    let witness_scripts: Vec<Script> = selection
        .selected
        .iter()
        .map(|(_, detail)| witness_script_for(detail, primary_pubkey, backup_pubkey, csv_blocks))
        .collect::<ContractResult<_>>()?;
    let wlens: Vec<u64> = witness_scripts.iter().map(|s| s.len() as u64).collect();

    let raw_change = safe_sub(selection.total_in, send_amount)?;

    let num_change_outputs: i64 = if raw_change <= DUST_THRESHOLD {
        0
    } else {
        (raw_change / CHANGE_SPLIT_THRESHOLD).clamp(1, MAX_CHANGE_OUTPUTS)
    };

    let num_outputs = 1 + num_change_outputs as u64;
    let fee = estimate_fee(num_outputs, &wlens, fee_rate)?;

    let mut outputs = vec![TxOut {
        value: u64::try_from(send_amount)?,
        script_pubkey: dest_script,
    }];
    let mut change_outputs = Vec::new();

    if num_change_outputs > 0 {
        let change_script = address::witness_script(primary_pubkey, backup_pubkey, &[], csv_blocks)?;
        let change_spk = Address::p2wsh(&change_script, network).script_pubkey();

        let leftover = safe_sub(raw_change, fee)?;
        if leftover < 0 {
            return Err(ContractError::TransactionBuild(
                "insufficient funds to cover fee after change splitting".to_string(),
            ));
        }
        let each = leftover / num_change_outputs;
        let remainder = leftover - each * (num_change_outputs - 1);

        for i in 0..num_change_outputs {
            let amount = if i == 0 { remainder } else { each };
            outputs.push(TxOut {
                value: u64::try_from(amount)?,
                script_pubkey: change_spk.clone(),
            });
            change_outputs.push((
                u32::try_from(outputs.len() - 1)
                    .map_err(|_| ContractError::Arithmetic("vout overflow".to_string()))?,
                amount,
                change_spk.to_bytes(),
            ));
        }
    }
    // If change is dust (no change outputs), the entire `raw_change` is paid
    // to miners as a (larger than estimated) fee rather than created as an
    // output nobody could economically spend.

    let inputs: Vec<TxIn> = selection
        .selected
        .iter()
        .map(|(_, detail)| -> ContractResult<TxIn> {
            let txid = Txid::from_str(&detail.tx_id)?;
            Ok(TxIn {
                previous_output: OutPoint::new(txid, detail.vout),
                script_sig: Script::new(),
                sequence: Sequence(u32::MAX),
                witness: Witness::new(),
            })
        })
        .collect::<ContractResult<_>>()?;

    let tx = Transaction {
        version: 2,
        lock_time: PackedLockTime(0),
        input: inputs,
        output: outputs,
    };
    let txid = tx.txid().to_string();

    let mut cache = SighashCache::new(&tx);
    let mut unsigned_sighashes = Vec::with_capacity(selection.selected.len());
    for (i, (_, detail)) in selection.selected.iter().enumerate() {
        let sighash = cache.segwit_signature_hash(
            i,
            &witness_scripts[i],
            u64::try_from(detail.amount)?,
            EcdsaSighashType::All,
        )?;
        unsigned_sighashes.push(crate::state::UnsignedSigHash {
            index: i as u32,
            sighash: encode_hex(&sighash.into_inner()),
            witness_script: encode_hex(&witness_scripts[i].to_bytes()),
        });
    }

    let input_ids = selection.selected.iter().map(|(id, _)| *id).collect();

    Ok(BuiltSpend {
        tx,
        txid,
        unsigned_sighashes,
        input_ids,
        change_outputs,
        fee: if num_change_outputs > 0 { fee } else { raw_change },
    })
}
