//! dRPC chain registry: EVM chain id → dRPC network slug.
//!
//! <https://drpc.org/chainlist>

/// Every chain dRPC serves, sorted by chain id.
pub const NETWORKS: &[(u64, &str)] = &[
    (1, "ethereum"),
    (10, "optimism"),
    (18, "thundercore-testnet"),
    (25, "cronos"),
    (30, "rootstock"),
    (31, "rootstock-testnet"),
    (40, "telos"),
    (41, "telos-testnet"),
    (56, "bsc"),
    (65, "oktc-testnet"),
    (66, "oktc"),
    (97, "bsc-testnet"),
    (100, "gnosis"),
    (108, "thundercore"),
    (122, "fuse"),
    (137, "polygon"),
    (169, "manta-pacific"),
    (199, "bittorrent"),
    (204, "opbnb"),
    (250, "fantom"),
    (252, "fraxtal"),
    (255, "kroma"),
    (288, "boba-eth"),
    (300, "zksync-sepolia"),
    (314, "filecoin"),
    (324, "zksync"),
    (338, "cronos-testnet"),
    (919, "mode-testnet"),
    (1001, "klaytn-baobab"),
    (1088, "metis"),
    (1100, "dymension"),
    (1101, "polygon-zkevm"),
    (1111, "wemix"),
    (1112, "wemix-testnet"),
    (1115, "core-testnet"),
    (1116, "core"),
    (1135, "lisk"),
    (1284, "moonbeam"),
    (1285, "moonriver"),
    (1287, "moonbase-alpha"),
    (1740, "metall2-testnet"),
    (1750, "metall2"),
    (1829, "playnance"),
    (2020, "ronin"),
    (2039, "alephzero-sepolia"),
    (2221, "kava-testnet"),
    (2222, "kava"),
    (2358, "kroma-sepolia"),
    (2442, "polygon-zkevm-cardona"),
    (2522, "fraxtal-testnet"),
    (3456, "goat-testnet"),
    (4002, "fantom-testnet"),
    (4202, "lisk-sepolia"),
    (5000, "mantle"),
    (5003, "mantle-sepolia"),
    (5611, "opbnb-testnet"),
    (6398, "everclear-sepolia"),
    (7000, "zeta-chain"),
    (7001, "zeta-chain-testnet"),
    (8217, "klaytn"),
    (8453, "base"),
    (9000, "evmos-testnet"),
    (9001, "evmos"),
    (10200, "gnosis-chiado"),
    (10888, "gameswift-testnet"),
    (11235, "haqq"),
    (13371, "immutable-zkevm"),
    (13473, "immutable-zkevm-testnet"),
    (17000, "holesky"),
    (34443, "mode"),
    (41455, "alephzero"),
    (42161, "arbitrum"),
    (42170, "arbitrum-nova"),
    (42220, "celo"),
    (43113, "avalanche-fuji"),
    (43114, "avalanche"),
    (44787, "celo-alfajores"),
    (48899, "zircuit-testnet"),
    (48900, "zircuit-mainnet"),
    (54211, "haqq-testnet"),
    (56288, "boba-bnb"),
    (59141, "linea-sepolia"),
    (59144, "linea"),
    (60808, "bob"),
    (80002, "polygon-amoy"),
    (80084, "bartio"),
    (81457, "blast"),
    (84532, "base-sepolia"),
    (111188, "real"),
    (167000, "taiko"),
    (167009, "taiko-hekla"),
    (314159, "filecoin-calibration"),
    (421614, "arbitrum-sepolia"),
    (534351, "scroll-sepolia"),
    (534352, "scroll"),
    (656476, "open-campus-codex-sepolia"),
    (808813, "bob-testnet"),
    (3441006, "manta-pacific-sepolia"),
    (7777777, "zora"),
    (11155111, "sepolia"),
    (11155420, "optimism-sepolia"),
    (94204209, "polygon-blackberry-testnet"),
    (123420111, "opcelestia-raspberry-testnet"),
    (168587773, "blast-sepolia"),
    (245022926, "neon-evm-devnet"),
    (245022934, "neon-evm"),
    (728126428, "tron"),
    (999999999, "zora-sepolia"),
    (1313161554, "aurora"),
    (1313161555, "aurora-testnet"),
    (1666600000, "harmony-0"),
    (1666600001, "harmony-1"),
    (2494104990, "tron-shasta"),
    (88153591557, "arb-blueberry-testnet"),
];

/// dRPC network slug for `chain_id`, `None` when dRPC does not serve it.
pub fn network_slug(chain_id: u64) -> Option<&'static str> {
    NETWORKS
        .binary_search_by_key(&chain_id, |&(id, _)| id)
        .ok()
        .map(|idx| NETWORKS[idx].1)
}

pub fn is_supported(chain_id: u64) -> bool {
    network_slug(chain_id).is_some()
}

/// Supported chain ids in ascending order.
pub fn chain_ids() -> impl Iterator<Item = u64> {
    NETWORKS.iter().map(|&(id, _)| id)
}

pub fn len() -> usize {
    NETWORKS.len()
}

/// HTTP endpoint for a slug. Contains the API key; never log it.
pub fn http_url(slug: &str, api_key: &str) -> String {
    format!("{BASE_URL}?network={slug}&dkey={api_key}")
}

/// Load balancer endpoint without query parameters.
pub const BASE_URL: &str = "https://lb.drpc.org/ogrpc";
