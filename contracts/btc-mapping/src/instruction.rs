//! Instruction parser (§4.5): decodes URL-form instruction strings, validates
//! addresses per target network, derives a P2WSH address per instruction.
//! Grounded in the original's `init.go` (`parseInstructions`), using the
//! `url` crate as the direct analogue of the original's `net/url`.

use std::collections::HashMap;

use url::form_urlencoded;

use crate::address;
use crate::codec::single_sha256;
use crate::error::{ContractError, ContractResult};
use crate::network;

pub const KEY_DEPOSIT_TO: &str = "deposit_to";
pub const KEY_SWAP_TO: &str = "swap_to";
pub const KEY_SWAP_ASSET_OUT: &str = "swap_asset_out";
pub const KEY_SWAP_NETWORK_OUT: &str = "swap_network_out";
pub const KEY_RETURN_ADDRESS: &str = "return_address";
pub const KEY_RETURN_NETWORK: &str = "return_network";

#[derive(Clone, Debug, PartialEq)]
pub enum InstructionKind {
    Deposit,
    Swap,
}

#[derive(Clone, Debug)]
pub struct ParsedInstruction {
    pub kind: InstructionKind,
    pub recipient: String,
    pub tag: [u8; 32],
    pub raw: String,
    pub out_network: String,
    pub swap_asset_out: Option<String>,
}

/// Parses one URL-encoded instruction string and validates its recipient
/// against the network its `swap_network_out` (or the host chain, by
/// default) names.
pub fn parse_one(instruction: &str, btc_network: bitcoin::Network) -> ContractResult<ParsedInstruction> {
    let fields: HashMap<String, String> = form_urlencoded::parse(instruction.as_bytes())
        .into_owned()
        .collect();

    let (kind, recipient) = if let Some(deposit_to) = fields.get(KEY_DEPOSIT_TO) {
        (InstructionKind::Deposit, deposit_to.clone())
    } else if let Some(swap_to) = fields.get(KEY_SWAP_TO) {
        if !fields.contains_key(KEY_SWAP_ASSET_OUT) {
            return Err(ContractError::BadInput(
                "swap_to requires swap_asset_out".to_string(),
            ));
        }
        (InstructionKind::Swap, swap_to.clone())
    } else {
        return Err(ContractError::BadInput(
            "instruction has neither deposit_to nor swap_to".to_string(),
        ));
    };

    let out_network = fields
        .get(KEY_SWAP_NETWORK_OUT)
        .cloned()
        .unwrap_or_else(|| "hostchain".to_string());

    let validator = network::resolve(&out_network, btc_network);
    if !validator.validate_address(&recipient) {
        return Err(ContractError::BadInput(format!(
            "recipient address invalid for network {}",
            validator.name()
        )));
    }

    let tag = single_sha256(instruction.as_bytes());

    Ok(ParsedInstruction {
        kind,
        recipient,
        tag,
        raw: instruction.to_string(),
        out_network,
        swap_asset_out: fields.get(KEY_SWAP_ASSET_OUT).cloned(),
    })
}

/// Parses every instruction in `instructions`, deriving each one's P2WSH
/// address (§4.4) and building the `derived_address -> parsed` registry.
/// Duplicate derived addresses overwrite earlier ones. Rejects an empty
/// instruction list with `bad_input` (§9 Open Questions).
pub fn build_registry(
    instructions: &[String],
    primary_pubkey: &[u8],
    backup_pubkey: Option<&[u8]>,
    csv_blocks: i64,
    btc_network: bitcoin::Network,
) -> ContractResult<HashMap<String, ParsedInstruction>> {
    if instructions.is_empty() {
        return Err(ContractError::BadInput(
            "instruction list must not be empty".to_string(),
        ));
    }

    let mut registry = HashMap::new();
    for instruction in instructions {
        let parsed = parse_one(instruction, btc_network)?;
        let (address, _script) = address::derive(
            primary_pubkey,
            backup_pubkey,
            &parsed.tag,
            csv_blocks,
            btc_network,
        )?;
        registry.insert(address, parsed);
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_deposit_instruction() {
        let parsed = parse_one("deposit_to=hive%3Amilo-hpr", bitcoin::Network::Bitcoin).unwrap();
        assert_eq!(parsed.kind, InstructionKind::Deposit);
        assert_eq!(parsed.recipient, "hive:milo-hpr");
    }

    #[test]
    fn swap_without_asset_out_rejected() {
        let err = parse_one("swap_to=hive%3Amilo-hpr", bitcoin::Network::Bitcoin).unwrap_err();
        assert_eq!(err.symbol(), "bad_input");
    }

    #[test]
    fn neither_key_rejected() {
        let err = parse_one("foo=bar", bitcoin::Network::Bitcoin).unwrap_err();
        assert_eq!(err.symbol(), "bad_input");
    }

    #[test]
    fn empty_instruction_list_rejected() {
        let err = build_registry(&[], &[0x02; 33], None, 4320, bitcoin::Network::Bitcoin).unwrap_err();
        assert_eq!(err.symbol(), "bad_input");
    }
}
