//! Derived P2WSH witness-script construction (§4.4): a single-key spend path
//! gated on a per-instruction tag, with an optional CSV time-locked backup
//! spend path. Grounded in the teacher's `signatory.rs` script-builder idiom
//! (`bitcoin_script::script!` macro, `Script::to_v0_p2wsh`).

use bitcoin::blockdata::opcodes::all::{
    OP_CHECKSEQUENCEVERIFY, OP_CHECKSIG, OP_CHECKSIGVERIFY, OP_DROP, OP_ELSE, OP_ENDIF, OP_IF,
};
use bitcoin::{Address, Network, Script};
use bitcoin_script::bitcoin_script as script;

use crate::error::ContractResult;

/// Builds the witness script locking value to `primary_pubkey` (optionally
/// gated additionally by `tag`), with an optional CSV-timelocked
/// `backup_pubkey` fallback spend path.
pub fn witness_script(
    primary_pubkey: &[u8],
    backup_pubkey: Option<&[u8]>,
    tag: &[u8],
    csv_blocks: i64,
) -> ContractResult<Script> {
    let primary_branch = primary_spend_branch(primary_pubkey, tag);

    let script = match backup_pubkey {
        None => primary_branch,
        Some(backup_pubkey) => {
            let mut bytes = script! { OP_IF }.into_bytes();
            bytes.extend(primary_branch.into_bytes());
            let backup_branch = script! {
                OP_ELSE
                    <csv_blocks> OP_CHECKSEQUENCEVERIFY OP_DROP
                    <backup_pubkey> OP_CHECKSIG
                OP_ENDIF
            };
            bytes.extend(backup_branch.into_bytes());
            bytes.into()
        }
    };

    Ok(script)
}

/// The `<primary_pubkey> OP_CHECKSIGVERIFY <tag>` / `OP_CHECKSIG` branch.
/// `OP_CHECKSIGVERIFY` consumes the boolean result and leaves the stack
/// empty, which would fail script execution on its own — it is only valid
/// followed by more script (the tag push). An empty tag has nothing to
/// follow it with, so the non-VERIFY form is used instead, leaving the `1`
/// that satisfies validation.
fn primary_spend_branch(primary_pubkey: &[u8], tag: &[u8]) -> Script {
    if tag.is_empty() {
        script! { <primary_pubkey> OP_CHECKSIG }
    } else {
        script! { <primary_pubkey> OP_CHECKSIGVERIFY <tag> }
    }
}

/// Hashes `script` into its canonical bech32 P2WSH address on `network`.
pub fn derive_address(script: &Script, network: Network) -> ContractResult<String> {
    Ok(Address::p2wsh(script, network).to_string())
}

/// Convenience wrapper returning `(address, raw_script_bytes)` as §4.4 specifies.
pub fn derive(
    primary_pubkey: &[u8],
    backup_pubkey: Option<&[u8]>,
    tag: &[u8],
    csv_blocks: i64,
    network: Network,
) -> ContractResult<(String, Vec<u8>)> {
    let script = witness_script(primary_pubkey, backup_pubkey, tag, csv_blocks)?;
    let address = derive_address(&script, network)?;
    Ok((address, script.into_bytes()))
}
