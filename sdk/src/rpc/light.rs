//! Lightweight Solana RPC client
//!
//! Implements only the JSON-RPC methods the sequencers need, over `ureq`,
//! avoiding the dependency chain of solana-client.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};
use tracing::debug;

use crate::{
    core::{SdkError, SdkResult, SimulationReport},
    rpc::RpcTransport,
};

/// JSON-RPC error code returned for lookups of accounts that do not exist
const INVALID_PARAMS_CODE: i64 = -32602;

/// Lightweight RPC client for Solana
pub struct LightRpcClient {
    url: String,
    commitment: String,
    agent: ureq::Agent,
}

/// RPC response wrapper
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

/// RPC error structure
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Account data response from RPC
#[derive(Debug, Deserialize)]
struct AccountInfo {
    lamports: u64,
    data: (String, String), // (data, encoding)
    owner: String,
    executable: bool,
    #[serde(rename = "rentEpoch")]
    rent_epoch: u64,
}

/// Program account response
#[derive(Debug, Deserialize)]
struct KeyedAccount {
    pubkey: String,
    account: AccountInfo,
}

/// Simulation value from RPC response
#[derive(Debug, Deserialize)]
struct SimulationValue {
    err: Option<Value>,
    logs: Option<Vec<String>>,
    #[serde(rename = "unitsConsumed")]
    units_consumed: Option<u64>,
}

impl LightRpcClient {
    /// Create a new client with `confirmed` commitment
    pub fn new(url: &str) -> Self {
        Self::with_options(url, "confirmed", Duration::from_secs(30))
    }

    pub fn with_options(url: &str, commitment: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout(timeout)
            .build();

        Self {
            url: url.to_string(),
            commitment: commitment.to_string(),
            agent,
        }
    }

    /// Make a JSON-RPC call and return the raw envelope
    async fn request(&self, method: &str, params: Value) -> SdkResult<RpcResponse> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        debug!("RPC call: {}", method);

        // ureq is blocking
        let response_body = tokio::task::spawn_blocking({
            let agent = self.agent.clone();
            let url = self.url.clone();
            let body = request_body.to_string();

            move || -> SdkResult<String> {
                let response = agent
                    .post(&url)
                    .set("Content-Type", "application/json")
                    .send_string(&body)?;
                Ok(response.into_string()?)
            }
        })
        .await
        .map_err(|e| SdkError::Transport(format!("RPC task failed: {}", e)))??;

        Ok(serde_json::from_str(&response_body)?)
    }

    /// Make a JSON-RPC call, treating any RPC error as a transport failure
    async fn call(&self, method: &str, params: Value) -> SdkResult<Value> {
        let response = self.request(method, params).await?;

        if let Some(error) = response.error {
            return Err(SdkError::Transport(format!(
                "{} failed ({}): {}",
                method, error.code, error.message
            )));
        }

        response
            .result
            .ok_or_else(|| SdkError::Transport(format!("No result in {} response", method)))
    }

    fn encode_transaction(transaction: &Transaction) -> SdkResult<String> {
        let serialized = bincode::serialize(transaction).map_err(|e| {
            SdkError::Serialization(format!("Failed to serialize transaction: {}", e))
        })?;
        Ok(base64::engine::general_purpose::STANDARD.encode(serialized))
    }

    /// Interpret a `getTokenAccountBalance` envelope
    fn token_balance(response: RpcResponse) -> SdkResult<Option<u64>> {
        if let Some(error) = response.error {
            // The node answers "could not find account" for a missing token account
            if error.code == INVALID_PARAMS_CODE && error.message.contains("could not find account")
            {
                return Ok(None);
            }
            return Err(SdkError::Transport(format!(
                "getTokenAccountBalance failed ({}): {}",
                error.code, error.message
            )));
        }

        let result = response.result.ok_or_else(|| {
            SdkError::Transport("No result in getTokenAccountBalance response".to_string())
        })?;
        if result["value"].is_null() {
            return Ok(None);
        }

        let amount = result["value"]["amount"]
            .as_str()
            .ok_or_else(|| SdkError::Transport("Invalid token balance response".to_string()))?;
        amount
            .parse()
            .map(Some)
            .map_err(|e| SdkError::Serialization(format!("Failed to parse token amount: {}", e)))
    }

    fn decode_account(info: AccountInfo) -> SdkResult<Account> {
        if info.data.1 != "base64" {
            return Err(SdkError::Serialization(format!(
                "Unsupported data encoding: {}",
                info.data.1
            )));
        }
        let data = base64::engine::general_purpose::STANDARD
            .decode(&info.data.0)
            .map_err(|e| SdkError::Serialization(format!("Failed to decode account data: {}", e)))?;
        let owner = info
            .owner
            .parse()
            .map_err(|e| SdkError::Serialization(format!("Failed to parse owner: {}", e)))?;

        Ok(Account {
            lamports: info.lamports,
            data,
            owner,
            executable: info.executable,
            rent_epoch: info.rent_epoch,
        })
    }
}

#[async_trait]
impl RpcTransport for LightRpcClient {
    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        let params = json!([
            address.to_string(),
            {
                "encoding": "base64",
                "commitment": self.commitment
            }
        ]);

        let response = self.call("getAccountInfo", params).await?;

        if response["value"].is_null() {
            return Ok(None);
        }

        let info: AccountInfo = serde_json::from_value(response["value"].clone())?;
        Self::decode_account(info).map(Some)
    }

    async fn get_token_balance(&self, address: &Pubkey) -> SdkResult<Option<u64>> {
        let params = json!([
            address.to_string(),
            {
                "commitment": self.commitment
            }
        ]);

        let response = self.request("getTokenAccountBalance", params).await?;
        Self::token_balance(response)
    }

    async fn get_latest_blockhash(&self) -> SdkResult<Hash> {
        let params = json!([{ "commitment": self.commitment }]);
        let response = self.call("getLatestBlockhash", params).await?;

        let blockhash = response["value"]["blockhash"]
            .as_str()
            .ok_or_else(|| SdkError::Transport("Invalid blockhash in response".to_string()))?;

        blockhash
            .parse()
            .map_err(|e| SdkError::Serialization(format!("Failed to parse blockhash: {}", e)))
    }

    async fn simulate_transaction(&self, transaction: &Transaction) -> SdkResult<SimulationReport> {
        let params = json!([
            Self::encode_transaction(transaction)?,
            {
                "encoding": "base64",
                "commitment": self.commitment,
                "sigVerify": false
            }
        ]);

        let response = self.call("simulateTransaction", params).await?;
        let value: SimulationValue = serde_json::from_value(response["value"].clone())?;

        Ok(SimulationReport {
            err: value.err.filter(|e| !e.is_null()).map(|e| e.to_string()),
            logs: value.logs.unwrap_or_default(),
            units_consumed: value.units_consumed,
        })
    }

    async fn send_transaction(&self, transaction: &Transaction) -> SdkResult<Signature> {
        let params = json!([
            Self::encode_transaction(transaction)?,
            {
                "encoding": "base64",
                "preflightCommitment": self.commitment
            }
        ]);

        let response = self.call("sendTransaction", params).await?;
        let signature = response
            .as_str()
            .ok_or_else(|| SdkError::Transport("Invalid sendTransaction response".to_string()))?;

        signature
            .parse()
            .map_err(|e| SdkError::Serialization(format!("Failed to parse signature: {}", e)))
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        prefix: Option<&[u8]>,
    ) -> SdkResult<Vec<(Pubkey, Account)>> {
        let mut config = json!({
            "encoding": "base64",
            "commitment": self.commitment
        });
        if let Some(prefix) = prefix {
            config["filters"] = json!([{
                "memcmp": {
                    "offset": 0,
                    "bytes": base64::engine::general_purpose::STANDARD.encode(prefix),
                    "encoding": "base64"
                }
            }]);
        }

        let response = self
            .call("getProgramAccounts", json!([program_id.to_string(), config]))
            .await?;
        let keyed: Vec<KeyedAccount> = serde_json::from_value(response)?;

        keyed
            .into_iter()
            .map(|entry| {
                let pubkey = entry.pubkey.parse().map_err(|e| {
                    SdkError::Serialization(format!("Failed to parse pubkey: {}", e))
                })?;
                Ok((pubkey, Self::decode_account(entry.account)?))
            })
            .collect()
    }
}
