//! Typed accessors over the persistent key/value layout described by the
//! contract's data model. Every entry lives under one `cw-storage-plus`
//! `Item`/`Map`, keyed exactly as the persisted key layout names it, so the
//! storage shape observed by the host matches the spec's key table.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Addr;
use cw_storage_plus::{Item, Map};

use crate::network::NetworkKind;

#[cw_serde]
pub struct Config {
    pub owner: Addr,
    pub oracle: Addr,
    pub network: NetworkKind,
}

/// `block/<height>` — hex-encoded 80-byte headers, one entry per height.
pub const HEADERS: Map<u32, String> = Map::new("block");
/// `lsthgt` — decimal last height.
pub const LAST_HEIGHT: Item<u32> = Item::new("lsthgt");

/// `pubkey` / `backupkey` — scalar compressed/uncompressed secp256k1 pubkeys, hex.
pub const PRIMARY_PUBKEY: Item<String> = Item::new("pubkey");
pub const BACKUP_PUBKEY: Item<String> = Item::new("backupkey");
/// `routerid` — opaque router contract id string.
pub const ROUTER_ID: Item<String> = Item::new("routerid");

/// `bal/<account>` — decimal account balances.
pub const BALANCES: Map<&str, i64> = Map::new("bal");

/// Ephemeral per-host-transaction expenditure, keyed by `(contract_id, account)`.
/// Modelled here as ordinary contract storage that the contract itself clears
/// at the end of every entrypoint that wrote to it (see §5 of the expanded spec).
pub const EPHEMERAL_EXPENDITURE: Map<(&str, &str), i64> = Map::new("ephem_expenditure");

/// `utxo_registry` — packed `(internal_id, amount, confirmed)` triples.
pub const UTXO_REGISTRY: Item<Vec<(u32, i64, bool)>> = Item::new("utxo_registry");
/// `utxo_id` — next internal id to allocate.
pub const NEXT_UTXO_ID: Item<u32> = Item::new("utxo_id");

/// `utxos/<id>` — one detail entry per internal id.
#[cw_serde]
pub struct UtxoDetail {
    pub tx_id: String,
    pub vout: u32,
    pub amount: i64,
    pub pk_script: String,
    pub tag: String,
}
pub const UTXO_DETAILS: Map<u32, UtxoDetail> = Map::new("utxos");

/// `observed_txs/<txid>:<vout>` — set-once idempotency flag.
pub const OBSERVED_OUTPUTS: Map<&str, bool> = Map::new("observed_txs");

/// `tx-spend/<txid>` — unsigned spend entries awaiting confirmation.
#[cw_serde]
pub struct UnsignedSigHash {
    pub index: u32,
    pub sighash: String,
    pub witness_script: String,
}

#[cw_serde]
pub struct TxSpendEntry {
    pub tx: String,
    pub unsigned_sighashes: Vec<UnsignedSigHash>,
}
pub const TX_SPENDS: Map<&str, TxSpendEntry> = Map::new("tx-spend");
/// `tx_spend_registry` — list of txids with a pending spend entry.
pub const TX_SPEND_REGISTRY: Item<Vec<String>> = Item::new("tx_spend_registry");

/// `supply` — system-wide supply accounting.
#[cw_serde]
pub struct Supply {
    pub active_supply: i64,
    pub user_supply: i64,
    pub fee_supply: i64,
    pub base_fee_rate: i64,
}

impl Default for Supply {
    fn default() -> Self {
        Self {
            active_supply: 0,
            user_supply: 0,
            fee_supply: 0,
            base_fee_rate: 1,
        }
    }
}

pub const SUPPLY: Item<Supply> = Item::new("supply");

pub const CONFIG: Item<Config> = Item::new("config");
