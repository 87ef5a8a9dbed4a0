//! Logical network identity: `"<architecture>:<chainId>"`, e.g. `evm:1`.

use std::str::FromStr;

use crate::error::GatewayError;

/// Chain family a network belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Architecture {
    Evm,
    Other(String),
}

impl Architecture {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Evm => "evm",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for Architecture {
    fn from(name: &str) -> Self {
        match name {
            "evm" => Self::Evm,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical network the gateway serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Network {
    id: String,
    architecture: Architecture,
    evm_chain_id: Option<u64>,
}

impl Network {
    /// An EVM network for `chain_id`.
    pub fn evm(chain_id: u64) -> Self {
        Self {
            id: format!("evm:{chain_id}"),
            architecture: Architecture::Evm,
            evm_chain_id: Some(chain_id),
        }
    }

    /// Parse `"<architecture>:<reference>"`. EVM references must be decimal chain ids.
    pub fn parse(network_id: &str) -> Result<Self, GatewayError> {
        let invalid = || GatewayError::InvalidNetworkId(network_id.to_string());
        let (architecture, reference) = network_id.split_once(':').ok_or_else(invalid)?;
        if architecture.is_empty() || reference.is_empty() {
            return Err(invalid());
        }

        match Architecture::from(architecture) {
            Architecture::Evm => {
                let chain_id = reference.parse::<u64>().map_err(|_| invalid())?;
                Ok(Self::evm(chain_id))
            }
            other => Ok(Self {
                id: network_id.to_string(),
                architecture: other,
                evm_chain_id: None,
            }),
        }
    }

    /// Stable identifier, used as the client-pool key.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Chain id for EVM networks, `None` for other architectures.
    pub fn evm_chain_id(&self) -> Option<u64> {
        self.evm_chain_id
    }
}

impl FromStr for Network {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_evm() {
        let network: Network = "evm:42161".parse().unwrap();
        assert_eq!(network.architecture(), &Architecture::Evm);
        assert_eq!(network.evm_chain_id(), Some(42161));
        assert_eq!(network.id(), "evm:42161");
        assert_eq!(network, Network::evm(42161));
    }

    #[test]
    fn parse_other_architecture() {
        let network = Network::parse("solana:mainnet").unwrap();
        assert_eq!(network.architecture().as_str(), "solana");
        assert_eq!(network.evm_chain_id(), None);
        assert_eq!(network.to_string(), "solana:mainnet");
    }

    #[test]
    fn reject_malformed_ids() {
        for bad in ["", "evm", "evm:", ":1", "evm:abc", "evm:-1"] {
            assert!(
                matches!(Network::parse(bad), Err(GatewayError::InvalidNetworkId(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
