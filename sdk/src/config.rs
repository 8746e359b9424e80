use std::{fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::{
    client::ProbeFailurePolicy,
    core::{program_id, SdkError, SdkResult, DEFAULT_FEE_BPS, DEFAULT_PROTOCOL_FEE_BPS, MAX_BPS},
};

const COMMITMENTS: [&str; 3] = ["processed", "confirmed", "finalized"];

/// SDK configuration for connecting to the AMM program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// AMM program ID
    #[serde(with = "pubkey_serde")]
    pub program_id: Pubkey,

    /// Commitment used for reads and preflight
    pub commitment: String,

    /// Pool fee set at initialization, in basis points
    pub fee_bps: u16,

    /// Protocol share of the pool fee, in basis points
    pub protocol_fee_bps: u16,

    /// How to treat failed account existence checks
    pub probe_failure_policy: ProbeFailurePolicy,

    /// Keypair file used by the CLI
    pub keypair_path: Option<String>,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self::localnet()
    }
}

impl SdkConfig {
    fn for_cluster(rpc_url: &str) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            program_id: program_id(),
            commitment: "confirmed".to_string(),
            fee_bps: DEFAULT_FEE_BPS,
            protocol_fee_bps: DEFAULT_PROTOCOL_FEE_BPS,
            probe_failure_policy: ProbeFailurePolicy::default(),
            keypair_path: None,
            request_timeout_secs: 30,
        }
    }

    pub fn localnet() -> Self {
        Self::for_cluster("http://localhost:8899")
    }

    pub fn devnet() -> Self {
        Self::for_cluster("https://api.devnet.solana.com")
    }

    pub fn mainnet() -> Self {
        Self::for_cluster("https://api.mainnet-beta.solana.com")
    }

    /// Preset by cluster name, or treat `cluster` as an RPC URL
    pub fn for_cluster_name(cluster: &str) -> Self {
        match cluster {
            "localnet" | "localhost" => Self::localnet(),
            "devnet" => Self::devnet(),
            "mainnet" | "mainnet-beta" => Self::mainnet(),
            url => Self::for_cluster(url),
        }
    }

    pub fn with_rpc_url(mut self, url: String) -> Self {
        self.rpc_url = url;
        self
    }

    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_probe_failure_policy(mut self, policy: ProbeFailurePolicy) -> Self {
        self.probe_failure_policy = policy;
        self
    }

    pub fn with_keypair_path(mut self, path: String) -> Self {
        self.keypair_path = Some(path);
        self
    }

    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SdkError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: SdkConfig = toml::from_str(&content).map_err(|e| {
            SdkError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> SdkResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| SdkError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content).map_err(|e| {
            SdkError::Config(format!("Failed to write config file {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SdkResult<()> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "rpc_url must be an http(s) URL, got {:?}",
                self.rpc_url
            )));
        }

        if self.fee_bps > MAX_BPS {
            return Err(SdkError::Config(format!(
                "fee_bps {} exceeds {}",
                self.fee_bps, MAX_BPS
            )));
        }

        if self.protocol_fee_bps > self.fee_bps {
            return Err(SdkError::Config(format!(
                "protocol_fee_bps {} exceeds fee_bps {}",
                self.protocol_fee_bps, self.fee_bps
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(SdkError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !COMMITMENTS.contains(&self.commitment.as_str()) {
            return Err(SdkError::Config(format!(
                "commitment must be one of {:?}, got {:?}",
                COMMITMENTS, self.commitment
            )));
        }

        Ok(())
    }
}

/// Pubkeys as base58 strings in TOML
mod pubkey_serde {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&pubkey.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(serde::de::Error::custom)
    }
}
