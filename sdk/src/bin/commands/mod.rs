// Command modules for the amm CLI

pub mod liquidity;
pub mod pool;
pub mod swap;
pub mod utils;

use std::path::Path;
use std::sync::Arc;

use amm_sdk::{AmmClient, SdkConfig};
use anyhow::{Context, Result};

use crate::prompt::ConfirmingSigner;
use utils::{load_keypair, parse_pubkey};

const DEFAULT_KEYPAIR: &str = "~/.config/solana/id.json";

/// Settings shared by every command
pub struct CliContext {
    pub config: SdkConfig,
    pub keypair_path: String,
    pub yes: bool,
    pub dry_run: bool,
}

impl CliContext {
    pub fn from_args(
        config_path: Option<&Path>,
        cluster: &str,
        rpc_url: Option<String>,
        keypair: Option<String>,
        program_id: Option<&str>,
        yes: bool,
        dry_run: bool,
    ) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => SdkConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SdkConfig::for_cluster_name(cluster),
        };
        if let Some(url) = rpc_url {
            config = config.with_rpc_url(url);
        }
        if let Some(id) = program_id {
            config = config.with_program_id(parse_pubkey(id)?);
        }
        config.validate().context("Invalid configuration")?;

        let keypair_path = keypair
            .or_else(|| config.keypair_path.clone())
            .unwrap_or_else(|| DEFAULT_KEYPAIR.to_string());

        Ok(Self {
            config,
            keypair_path,
            yes,
            dry_run,
        })
    }

    /// Client without a wallet, for read-only commands
    pub fn client(&self) -> Result<AmmClient> {
        Ok(AmmClient::new(&self.config)?)
    }

    /// Client with the keypair connected as signer
    pub fn connected_client(&self) -> Result<AmmClient> {
        let mut client = self.client()?;
        let keypair = load_keypair(&self.keypair_path)?;
        if self.yes {
            client.connect(Arc::new(keypair));
        } else {
            client.connect(Arc::new(ConfirmingSigner::new(keypair)));
        }
        Ok(client)
    }
}
