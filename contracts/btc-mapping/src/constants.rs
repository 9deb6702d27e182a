/// Relative CSV timelock (in blocks) guarding the backup spend path of a
/// derived P2WSH script.
pub const CSV_BLOCKS_MAINNET: i64 = 4320; // ~30 days at 10 min/block
pub const CSV_BLOCKS_TESTNET: i64 = 2;

/// Dust threshold below which a change output is not worth creating.
pub const DUST_THRESHOLD: i64 = 546;
/// Size, in satoshis, of change above which an additional change output is split off.
pub const CHANGE_SPLIT_THRESHOLD: i64 = 1_000_000;
pub const MAX_CHANGE_OUTPUTS: i64 = 4;

/// Fixed per-input witness signature size budget (DER sig + sighash byte),
/// used by the segwit vsize estimate.
pub const WITNESS_SIG_SIZE: u64 = 72;
/// Fixed byte overhead added to each input's witness stack item.
pub const WITNESS_ITEM_OVERHEAD: u64 = 3;
/// Base (non-witness) size contributed by a single P2WSH input.
pub const P2WSH_INPUT_BASE_SIZE: u64 = 41;
/// Base overhead of a transaction, excluding inputs/outputs.
pub const TX_BASE_OVERHEAD: u64 = 10;
/// Per-output base size.
pub const TX_OUTPUT_BASE_SIZE: u64 = 43;

pub const MIN_VSC_FEE: i64 = 1000;
pub const VSC_FEE_RATE: f64 = 0.01;

/// Maximum accepted Merkle path length; far beyond any conceivable block.
pub const MAX_MERKLE_PATH_LEN: usize = 33;
