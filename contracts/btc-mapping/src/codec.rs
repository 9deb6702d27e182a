//! Byte-exact (de)serialisation helpers: hex, header parsing, hashing.
//!
//! Transaction and header wire formats are delegated to the `bitcoin` crate's
//! `Encodable`/`Decodable` traits, which already implement the reference wire
//! format (little-endian integers, VarInt lengths, BIP-144 witness framing).
//! This module supplies the hex plumbing and hash primitives the rest of the
//! contract builds on.

use bitcoin::hashes::hex::{FromHex, ToHex};
use bitcoin::hashes::{ripemd160, sha256, sha256d, Hash};
use bitcoin::consensus::{deserialize, serialize};
use bitcoin::BlockHeader;

use crate::error::{ContractError, ContractResult};

pub const HEADER_LEN: usize = 80;

pub fn decode_hex(s: &str) -> ContractResult<Vec<u8>> {
    Vec::<u8>::from_hex(s).map_err(|e| ContractError::InvalidHex(e.to_string()))
}

pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.to_hex()
}

/// Parses a raw 80-byte Bitcoin block header from hex.
pub fn parse_header(hex_str: &str) -> ContractResult<BlockHeader> {
    let bytes = decode_hex(hex_str)?;
    if bytes.len() != HEADER_LEN {
        return Err(ContractError::InvalidHex(format!(
            "header must be {HEADER_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    deserialize(&bytes).map_err(|e| ContractError::InvalidHex(e.to_string()))
}

/// Serialises a header back to its canonical 80-byte hex form.
pub fn serialize_header(header: &BlockHeader) -> String {
    encode_hex(&serialize(header))
}

/// Parses a raw Bitcoin transaction from hex (legacy or witness form).
pub fn parse_tx(hex_str: &str) -> ContractResult<bitcoin::Transaction> {
    let bytes = decode_hex(hex_str)?;
    deserialize(&bytes).map_err(|e| ContractError::InvalidHex(e.to_string()))
}

/// SHA-256(SHA-256(data)), Bitcoin's standard "double hash".
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256d::Hash::hash(data).into_inner()
}

pub fn single_sha256(data: &[u8]) -> [u8; 32] {
    sha256::Hash::hash(data).into_inner()
}

pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160::Hash::hash(&single_sha256(data)).into_inner()
}

/// Splits the hex concatenation of consecutive 80-byte headers (as carried
/// by the `addBlocks` payload, §6) into individual header hex strings.
pub fn split_headers_hex(concat: &str) -> ContractResult<Vec<String>> {
    let chars_per_header = HEADER_LEN * 2;
    if concat.len() % chars_per_header != 0 {
        return Err(ContractError::InvalidHex(
            "block concatenation is not a multiple of the header length".to_string(),
        ));
    }
    Ok(concat
        .as_bytes()
        .chunks(chars_per_header)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect())
}
