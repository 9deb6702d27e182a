//! Entry-point payloads (§6, §9 entrypoint table). CosmWasm has no native
//! intent/required-auths concept, so those capabilities are carried as
//! explicit fields on the executing message rather than derived from
//! `MessageInfo` alone — see SPEC_FULL.md §6.

use std::collections::BTreeMap;

use cosmwasm_schema::{cw_serde, QueryResponses};

use crate::ledger::Intent;
use crate::network::NetworkKind;

#[cw_serde]
pub struct InstantiateMsg {
    pub oracle: String,
    pub network: NetworkKind,
}

/// A single host-chain authorisation capability accompanying a call (§4.6).
#[cw_serde]
pub struct IntentMsg {
    pub intent_type: String,
    pub args: BTreeMap<String, String>,
}

impl From<IntentMsg> for Intent {
    fn from(msg: IntentMsg) -> Self {
        Intent {
            intent_type: msg.intent_type,
            args: msg.args.into_iter().collect(),
        }
    }
}

/// Converts a wire-carried intent list into the core's representation.
pub fn into_intents(msgs: Vec<IntentMsg>) -> Vec<Intent> {
    msgs.into_iter().map(Intent::from).collect()
}

#[cw_serde]
pub struct TxDataMsg {
    pub block_height: u32,
    pub raw_tx_hex: String,
    pub merkle_proof_hex: String,
    pub tx_index: u32,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Admin: initial seed, or test-network reseed, of the header chain.
    SeedBlocks {
        block_header: String,
        block_height: u32,
    },
    /// Admin: extend the header chain tip and update the base fee rate.
    /// `blocks` is the hex concatenation of consecutive 80-byte headers.
    AddBlocks {
        blocks: String,
        latest_fee: i64,
    },
    /// Verify an SPV proof, process matching deposit/swap outputs.
    Map {
        tx_data: TxDataMsg,
        instructions: Vec<String>,
        /// The host-chain identity crediting swap deposits, per §4.7 point 4.
        sender: String,
    },
    /// Build an unsigned Bitcoin spend transaction and debit the sender.
    Unmap {
        amount: i64,
        to: String,
        /// Defaults to `sender` when omitted.
        from: Option<String>,
        sender: String,
        sender_intents: Vec<IntentMsg>,
    },
    /// Caller-funded internal transfer.
    Transfer {
        amount: i64,
        to: String,
        from: Option<String>,
        caller: String,
        caller_intents: Vec<IntentMsg>,
    },
    /// Sender-funded internal transfer.
    TransferFrom {
        amount: i64,
        to: String,
        from: Option<String>,
        sender: String,
        sender_intents: Vec<IntentMsg>,
    },
    /// Owner: set the primary/backup secp256k1 public keys.
    RegisterPublicKey {
        primary_public_key: Option<String>,
        backup_public_key: Option<String>,
    },
    /// Owner: request threshold-signature keypair creation (recorded as an
    /// attribute; actual TSS key generation is an external collaborator).
    CreateKeyPair {},
    /// Owner: set the router contract id used for swap-typed deposits.
    RegisterRouter { contract_id: String },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(i64)]
    Balance { account: String },
    #[returns(u32)]
    LastHeight {},
    #[returns(crate::state::Supply)]
    Supply {},
    #[returns(Vec<(u32, i64, bool)>)]
    UtxoRegistry {},
    #[returns(crate::state::UtxoDetail)]
    UtxoDetail { id: u32 },
    #[returns(Option<crate::state::TxSpendEntry>)]
    TxSpend { txid: String },
}

#[cw_serde]
pub struct MigrateMsg {}
