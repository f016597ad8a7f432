//! Network selection for key and address encodings.

use std::fmt;

/// Bitcoin network type for version-byte selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Network {
    /// Bitcoin mainnet (P2PKH addresses start with '1', WIF keys with '5', 'K' or 'L').
    #[default]
    Mainnet,
    /// Bitcoin testnet (P2PKH addresses start with 'm' or 'n', WIF keys with '9' or 'c').
    Testnet,
}

impl Network {
    /// Version byte prefixed to WIF-encoded private keys.
    pub fn wif_prefix(self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet => 0xef,
        }
    }

    /// Version byte for pay-to-pubkey-hash addresses.
    pub fn p2pkh_prefix(self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6f,
        }
    }

    /// Version byte for pay-to-script-hash addresses.
    pub fn p2sh_prefix(self) -> u8 {
        match self {
            Network::Mainnet => 0x05,
            Network::Testnet => 0xc4,
        }
    }

    /// Find the network whose WIF prefix is `byte`.
    pub fn from_wif_prefix(byte: u8) -> Option<Self> {
        [Network::Mainnet, Network::Testnet]
            .into_iter()
            .find(|n| n.wif_prefix() == byte)
    }

    /// Whether this is a test network.
    pub fn is_testnet(self) -> bool {
        self == Network::Testnet
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Testnet => f.write_str("testnet"),
        }
    }
}
