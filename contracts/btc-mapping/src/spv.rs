//! Simplified Payment Verification (§4.3): reconstructs a Merkle root from a
//! transaction hash, its index, and a sibling list, and compares it against
//! a stored header. Grounded in the original's `proof.go`
//! (`verifyMerkleProof`: iterative doubling-hash reconstruction).

use bitcoin::Transaction;

use crate::codec::double_sha256;
use crate::constants::MAX_MERKLE_PATH_LEN;
use crate::error::{ContractError, ContractResult};
use crate::header_store;

/// Parses `merkle_proof_hex` into its constituent 32-byte sibling hashes.
pub fn parse_merkle_path(hex_str: &str) -> ContractResult<Vec<[u8; 32]>> {
    let bytes = crate::codec::decode_hex(hex_str)?;
    if bytes.len() % 32 != 0 {
        return Err(ContractError::InvalidHex(
            "merkle path length is not a multiple of 32".to_string(),
        ));
    }
    let path: Vec<[u8; 32]> = bytes
        .chunks_exact(32)
        .map(|chunk| {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(chunk);
            arr
        })
        .collect();
    if path.len() > MAX_MERKLE_PATH_LEN {
        return Err(ContractError::BadInput(
            "merkle path exceeds maximum length".to_string(),
        ));
    }
    Ok(path)
}

/// Reconstructs the Merkle root from `txid`, its `index` within the block,
/// and the sibling `path`, combining with a sibling on the left or right
/// depending on the parity of the running index at each level.
pub fn reconstruct_root(txid: [u8; 32], mut index: u32, path: &[[u8; 32]]) -> [u8; 32] {
    let mut current = txid;
    for sibling in path {
        let mut combined = Vec::with_capacity(64);
        if index % 2 == 0 {
            combined.extend_from_slice(&current);
            combined.extend_from_slice(sibling);
        } else {
            combined.extend_from_slice(sibling);
            combined.extend_from_slice(&current);
        }
        current = double_sha256(&combined);
        index /= 2;
    }
    current
}

/// Verifies that transaction `raw_tx_hex` is included in the block at
/// `block_height`, per the Merkle proof `merkle_proof_hex`/`tx_index`.
/// Returns the decoded transaction on success.
pub fn verify_transaction(
    storage: &dyn cosmwasm_std::Storage,
    block_height: u32,
    raw_tx_hex: &str,
    merkle_proof_hex: &str,
    tx_index: u32,
) -> ContractResult<Transaction> {
    let header = header_store::header_at(storage, block_height)?;
    let tx = crate::codec::parse_tx(raw_tx_hex)?;

    let txid = tx.txid();
    let mut txid_bytes = [0u8; 32];
    txid_bytes.copy_from_slice(&txid[..]);
    // Bitcoin txids are conventionally displayed/reconstructed in the
    // byte order they appear on the wire, which `bitcoin::Txid`'s
    // `Hash`-derived byte array already matches.

    let path = parse_merkle_path(merkle_proof_hex)?;
    let root = reconstruct_root(txid_bytes, tx_index, &path);

    let mut expected_root = [0u8; 32];
    expected_root.copy_from_slice(&header.merkle_root[..]);

    if root != expected_root {
        return Err(ContractError::BadInput(
            "merkle proof does not match header".to_string(),
        ));
    }

    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstructs_single_level_even_index() {
        let txid = [1u8; 32];
        let sibling = [2u8; 32];
        let expected = {
            let mut combined = Vec::new();
            combined.extend_from_slice(&txid);
            combined.extend_from_slice(&sibling);
            double_sha256(&combined)
        };
        assert_eq!(reconstruct_root(txid, 0, &[sibling]), expected);
    }

    #[test]
    fn reconstructs_single_level_odd_index() {
        let txid = [1u8; 32];
        let sibling = [2u8; 32];
        let expected = {
            let mut combined = Vec::new();
            combined.extend_from_slice(&sibling);
            combined.extend_from_slice(&txid);
            double_sha256(&combined)
        };
        assert_eq!(reconstruct_root(txid, 1, &[sibling]), expected);
    }

    #[test]
    fn flipping_a_sibling_bit_changes_the_root() {
        let txid = [1u8; 32];
        let mut sibling = [2u8; 32];
        let root_a = reconstruct_root(txid, 0, &[sibling]);
        sibling[0] ^= 1;
        let root_b = reconstruct_root(txid, 0, &[sibling]);
        assert_ne!(root_a, root_b);
    }

    #[test]
    fn rejects_path_not_multiple_of_32() {
        assert!(parse_merkle_path("00112233").is_err());
    }
}
