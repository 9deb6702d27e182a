//! `Network` is polymorphic over the capability set `{name(), validate_address(s)}`,
//! with `HostChain` and `Bitcoin(params)` the only implementors currently
//! exercised by the core (per the design notes' network-abstraction note).

use cosmwasm_schema::cw_serde;

use crate::constants::{CSV_BLOCKS_MAINNET, CSV_BLOCKS_TESTNET};

/// Which Bitcoin network parameters the contract instance is configured for.
/// Distinct from `Network` below: this selects address-validation/HRP/CSV
/// parameters, while `Network` selects which *chain* an instruction targets.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum NetworkKind {
    Mainnet,
    Testnet,
    Regtest,
    Signet,
}

impl NetworkKind {
    pub fn is_mainnet(&self) -> bool {
        matches!(self, NetworkKind::Mainnet)
    }

    pub fn csv_blocks(&self) -> i64 {
        if self.is_mainnet() {
            CSV_BLOCKS_MAINNET
        } else {
            CSV_BLOCKS_TESTNET
        }
    }

    pub fn to_bitcoin_network(self) -> bitcoin::Network {
        match self {
            NetworkKind::Mainnet => bitcoin::Network::Bitcoin,
            NetworkKind::Testnet => bitcoin::Network::Testnet,
            NetworkKind::Regtest => bitcoin::Network::Regtest,
            NetworkKind::Signet => bitcoin::Network::Signet,
        }
    }
}

/// The target network of an instruction's recipient/return address.
pub trait Network {
    fn name(&self) -> &'static str;
    fn validate_address(&self, addr: &str) -> bool;
}

/// The host chain ("VSC"): addresses are `hive:`- or `did:`-prefixed opaque strings.
pub struct HostChain;

impl Network for HostChain {
    fn name(&self) -> &'static str {
        "hostchain"
    }

    fn validate_address(&self, addr: &str) -> bool {
        addr.starts_with("hive:") || addr.starts_with("did:")
    }
}

/// Bitcoin mainnet/testnet/etc, validated via the `bitcoin` crate's address parser.
pub struct BitcoinNetwork(pub bitcoin::Network);

impl Network for BitcoinNetwork {
    fn name(&self) -> &'static str {
        "bitcoin"
    }

    fn validate_address(&self, addr: &str) -> bool {
        match addr.parse::<bitcoin::Address>() {
            Ok(parsed) => parsed.network == self.0,
            Err(_) => false,
        }
    }
}

/// Resolves an out-network name (`"hostchain"`/`""`, `"bitcoin"`) to its
/// validator, defaulting to the host chain as §4.5 specifies.
pub fn resolve(name: &str, btc_network: bitcoin::Network) -> Box<dyn Network> {
    match name {
        "bitcoin" | "btc" => Box::new(BitcoinNetwork(btc_network)),
        _ => Box::new(HostChain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostchain_validates_known_prefixes() {
        let n = HostChain;
        assert!(n.validate_address("hive:milo-hpr"));
        assert!(n.validate_address("did:example:123"));
        assert!(!n.validate_address("bc1qexample"));
    }

    #[test]
    fn csv_blocks_differ_by_network() {
        assert_eq!(NetworkKind::Mainnet.csv_blocks(), 4320);
        assert_eq!(NetworkKind::Testnet.csv_blocks(), 2);
    }
}
