//! Chain descriptors for the supported networks.

use serde::Serialize;

use crate::shared::ChainId;

/// A chain the app can connect to or switch to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chain {
    pub id: ChainId,
    pub name: &'static str,
    pub native_symbol: &'static str,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    /// Where test ether can be requested (testnets only).
    pub faucet_url: Option<&'static str>,
}

impl Chain {
    pub fn is_testnet(&self) -> bool {
        self.faucet_url.is_some()
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), hash)
    }
}

pub const MAINNET: Chain = Chain {
    id: ChainId::new(1),
    name: "Ethereum",
    native_symbol: "ETH",
    rpc_url: "https://eth.merkle.io",
    explorer_url: "https://etherscan.io",
    faucet_url: None,
};

pub const SEPOLIA: Chain = Chain {
    id: ChainId::new(11_155_111),
    name: "Sepolia",
    native_symbol: "ETH",
    rpc_url: "https://sepolia.drpc.org",
    explorer_url: "https://sepolia.etherscan.io",
    faucet_url: Some("https://cloud.google.com/application/web3/faucet/ethereum/sepolia"),
};

pub const ARBITRUM: Chain = Chain {
    id: ChainId::new(42_161),
    name: "Arbitrum One",
    native_symbol: "ETH",
    rpc_url: "https://arb1.arbitrum.io/rpc",
    explorer_url: "https://arbiscan.io",
    faucet_url: None,
};

pub const OPTIMISM: Chain = Chain {
    id: ChainId::new(10),
    name: "OP Mainnet",
    native_symbol: "ETH",
    rpc_url: "https://mainnet.optimism.io",
    explorer_url: "https://optimistic.etherscan.io",
    faucet_url: None,
};

pub const POLYGON: Chain = Chain {
    id: ChainId::new(137),
    name: "Polygon",
    native_symbol: "POL",
    rpc_url: "https://polygon-rpc.com",
    explorer_url: "https://polygonscan.com",
    faucet_url: None,
};

/// Local development node (anvil / hardhat defaults).
pub const LOCAL_DEV: Chain = Chain {
    id: ChainId::new(31_337),
    name: "Local Dev",
    native_symbol: "ETH",
    rpc_url: "http://127.0.0.1:8545",
    explorer_url: "http://127.0.0.1:8545",
    faucet_url: None,
};

/// Default supported set, in the order the connect modal lists them.
pub const DEFAULT_CHAINS: [Chain; 5] = [ARBITRUM, MAINNET, OPTIMISM, POLYGON, SEPOLIA];

/// Look up a known chain by id.
pub fn by_id(id: ChainId) -> Option<&'static Chain> {
    [&MAINNET, &SEPOLIA, &ARBITRUM, &OPTIMISM, &POLYGON, &LOCAL_DEV]
        .into_iter()
        .find(|c| c.id == id)
}

/// The network the switch button offers: Mainnet while on Sepolia, otherwise Sepolia.
pub fn switch_target(current: Option<ChainId>) -> &'static Chain {
    if current == Some(SEPOLIA.id) {
        &MAINNET
    } else {
        &SEPOLIA
    }
}
