//! Append-only header chain (§4.2). Grounded in the original's
//! `blocklist.go` (`HandleSeedBlocks`/`HandleAddBlocks`: despite its package
//! name this is the block-*header* list, an earlier revision of this
//! component) and the teacher's `header.rs` PoW-validation idiom
//! (`BlockHeader::validate_pow`).

use cosmwasm_std::Storage;

use crate::codec::parse_header;
use crate::error::{ContractError, ContractResult};
use crate::network::NetworkKind;
use crate::state::{HEADERS, LAST_HEIGHT};

/// Result of an `append` call: how many of the supplied headers were
/// actually linked onto the tip before either exhausting the input or
/// hitting a broken link.
pub struct AppendOutcome {
    pub new_last_height: u32,
    pub headers_added: u32,
    /// Set when the batch stopped early because a header's `prev_hash`
    /// didn't match the tip. Per §7 this is *not* a fatal error: the tip
    /// advanced so far is still persisted.
    pub sequence_incorrect: bool,
}

/// Writes `header` at `height` and sets the tip to `height`.
///
/// Permitted only when no tip exists yet, or — on non-mainnet — when
/// `height` strictly exceeds the current tip (allows test-network
/// reseeding).
pub fn seed(
    storage: &mut dyn Storage,
    network: NetworkKind,
    header_hex: &str,
    height: u32,
) -> ContractResult<u32> {
    let current = LAST_HEIGHT.may_load(storage)?;
    match current {
        None => {}
        Some(last) if !network.is_mainnet() && height > last => {}
        Some(_) => {
            return Err(ContractError::BadInput(
                "header chain already seeded".to_string(),
            ))
        }
    }

    // Validate the header decodes before persisting it.
    parse_header(header_hex)?;

    HEADERS.save(storage, height, &header_hex.to_string())?;
    LAST_HEIGHT.save(storage, &height)?;
    Ok(height)
}

/// Appends `headers` (each raw 80-byte hex) onto the current tip in order.
pub fn append(
    storage: &mut dyn Storage,
    network: NetworkKind,
    headers: &[String],
) -> ContractResult<AppendOutcome> {
    let mut last_height = LAST_HEIGHT
        .may_load(storage)?
        .ok_or_else(|| ContractError::NotInitialized("header chain not seeded".to_string()))?;
    let mut prev_header = parse_header(&HEADERS.load(storage, last_height)?)?;

    let mut added = 0u32;
    let mut sequence_incorrect = false;

    for header_hex in headers {
        let header = parse_header(header_hex)?;

        header
            .validate_pow(&header.target())
            .map_err(|_| ContractError::BadInput("header proof-of-work below target".to_string()))?;

        if header.prev_blockhash != prev_header.block_hash() {
            sequence_incorrect = true;
            break;
        }

        let next_height = last_height
            .checked_add(1)
            .ok_or_else(|| ContractError::Arithmetic("header height overflow".to_string()))?;

        HEADERS.save(storage, next_height, header_hex)?;
        last_height = next_height;
        prev_header = header;
        added += 1;
    }

    LAST_HEIGHT.save(storage, &last_height)?;

    Ok(AppendOutcome {
        new_last_height: last_height,
        headers_added: added,
        sequence_incorrect,
    })
}

pub fn last_height(storage: &dyn Storage) -> ContractResult<u32> {
    Ok(LAST_HEIGHT.may_load(storage)?.unwrap_or_default())
}

pub fn header_at(storage: &dyn Storage, height: u32) -> ContractResult<bitcoin::BlockHeader> {
    let hex_str = HEADERS
        .may_load(storage, height)?
        .ok_or_else(|| ContractError::StateAccess(format!("no header stored at height {height}")))?;
    parse_header(&hex_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockStorage;

    fn zero_header_hex() -> String {
        "00".repeat(80)
    }

    #[test]
    fn seed_sets_tip() {
        let mut storage = MockStorage::new();
        seed(&mut storage, NetworkKind::Mainnet, &zero_header_hex(), 100).unwrap();
        assert_eq!(last_height(&storage).unwrap(), 100);
    }

    #[test]
    fn reseed_rejected_on_mainnet() {
        let mut storage = MockStorage::new();
        seed(&mut storage, NetworkKind::Mainnet, &zero_header_hex(), 100).unwrap();
        let err = seed(&mut storage, NetworkKind::Mainnet, &zero_header_hex(), 200).unwrap_err();
        assert_eq!(err.symbol(), "bad_input");
    }

    #[test]
    fn reseed_allowed_on_testnet_with_higher_height() {
        let mut storage = MockStorage::new();
        seed(&mut storage, NetworkKind::Testnet, &zero_header_hex(), 100).unwrap();
        seed(&mut storage, NetworkKind::Testnet, &zero_header_hex(), 200).unwrap();
        assert_eq!(last_height(&storage).unwrap(), 200);
    }
}
