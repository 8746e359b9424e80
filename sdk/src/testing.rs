//! Testing utilities for the AMM client
//!
//! In-memory stand-ins for the RPC transport and the signing identity, so
//! every operation can be sequenced and submitted without a cluster.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use solana_sdk::{
    account::Account,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};

use crate::{
    core::{PoolInfo, PoolState, SdkError, SdkResult, SimulationReport},
    protocol::{PdaBuilder, TokenPair},
    rpc::{RpcTransport, SigningIdentity},
};

#[derive(Default)]
struct MockState {
    accounts: HashMap<Pubkey, Account>,
    token_balances: HashMap<Pubkey, u64>,
    failing: HashSet<Pubkey>,
    simulation: SimulationReport,
    simulation_unavailable: bool,
    send_error: Option<String>,
    blockhash_error: Option<String>,
    simulated: Vec<Transaction>,
    sent: Vec<Transaction>,
    calls: Vec<String>,
}

/// In-memory [`RpcTransport`]
pub struct MockTransport {
    state: Mutex<MockState>,
    blockhash: Hash,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            blockhash: Hash::new_unique(),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert an arbitrary account
    pub fn add_account(&self, address: Pubkey, account: Account) {
        self.state().accounts.insert(address, account);
    }

    /// Insert a pool record owned by `program_id`
    pub fn add_pool(&self, program_id: &Pubkey, pool: &PoolInfo) {
        let data = pool
            .state
            .to_account_data()
            .unwrap_or_else(|e| panic!("encode pool fixture: {}", e));
        self.add_account(
            pool.address,
            Account {
                lamports: 2_039_280,
                data,
                owner: *program_id,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    /// Insert an existing token account holding `balance` base units
    pub fn add_token_account(&self, address: Pubkey, balance: u64) {
        let mut state = self.state();
        state.accounts.insert(
            address,
            Account {
                lamports: 2_039_280,
                data: vec![0u8; 165],
                owner: spl_token::id(),
                executable: false,
                rent_epoch: 0,
            },
        );
        state.token_balances.insert(address, balance);
    }

    /// Make every lookup of `address` fail with a transport error
    pub fn fail_lookups(&self, address: Pubkey) {
        self.state().failing.insert(address);
    }

    pub fn set_simulation(&self, report: SimulationReport) {
        self.state().simulation = report;
    }

    /// Make the simulate request itself fail
    pub fn fail_simulation_requests(&self) {
        self.state().simulation_unavailable = true;
    }

    pub fn fail_send(&self, message: &str) {
        self.state().send_error = Some(message.to_string());
    }

    pub fn fail_blockhash(&self, message: &str) {
        self.state().blockhash_error = Some(message.to_string());
    }

    pub fn blockhash(&self) -> Hash {
        self.blockhash
    }

    pub fn sent_transactions(&self) -> Vec<Transaction> {
        self.state().sent.clone()
    }

    pub fn simulated_transactions(&self) -> Vec<Transaction> {
        self.state().simulated.clone()
    }

    /// RPC methods in call order
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    fn record(&self, call: String) {
        self.state().calls.push(call);
    }

    fn check_failing(&self, method: &str, address: &Pubkey) -> SdkResult<()> {
        if self.state().failing.contains(address) {
            return Err(SdkError::Transport(format!(
                "{} failed for {}: connection reset",
                method, address
            )));
        }
        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        self.record(format!("getAccountInfo:{}", address));
        self.check_failing("getAccountInfo", address)?;
        Ok(self.state().accounts.get(address).cloned())
    }

    async fn get_token_balance(&self, address: &Pubkey) -> SdkResult<Option<u64>> {
        self.record(format!("getTokenAccountBalance:{}", address));
        self.check_failing("getTokenAccountBalance", address)?;
        Ok(self.state().token_balances.get(address).copied())
    }

    async fn get_latest_blockhash(&self) -> SdkResult<Hash> {
        self.record("getLatestBlockhash".to_string());
        match &self.state().blockhash_error {
            Some(message) => Err(SdkError::Transport(message.clone())),
            None => Ok(self.blockhash),
        }
    }

    async fn simulate_transaction(&self, transaction: &Transaction) -> SdkResult<SimulationReport> {
        self.record("simulateTransaction".to_string());
        let mut state = self.state();
        if state.simulation_unavailable {
            return Err(SdkError::Transport("simulateTransaction timed out".to_string()));
        }
        state.simulated.push(transaction.clone());
        Ok(state.simulation.clone())
    }

    async fn send_transaction(&self, transaction: &Transaction) -> SdkResult<Signature> {
        self.record("sendTransaction".to_string());
        let mut state = self.state();
        if let Some(message) = &state.send_error {
            return Err(SdkError::Transport(message.clone()));
        }
        state.sent.push(transaction.clone());
        Ok(transaction.signatures.first().copied().unwrap_or_default())
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        prefix: Option<&[u8]>,
    ) -> SdkResult<Vec<(Pubkey, Account)>> {
        self.record(format!("getProgramAccounts:{}", program_id));
        let state = self.state();
        let mut accounts: Vec<(Pubkey, Account)> = state
            .accounts
            .iter()
            .filter(|(_, account)| &account.owner == program_id)
            .filter(|(_, account)| prefix.map_or(true, |p| account.data.starts_with(p)))
            .map(|(address, account)| (*address, account.clone()))
            .collect();
        accounts.sort_by_key(|(address, _)| *address);
        Ok(accounts)
    }
}

/// Scripted [`SigningIdentity`] backed by a fresh keypair
pub struct MockSigner {
    keypair: Keypair,
    reject: bool,
    requests: AtomicUsize,
}

impl MockSigner {
    /// A signer that approves every request
    pub fn approving() -> Self {
        Self {
            keypair: Keypair::new(),
            reject: false,
            requests: AtomicUsize::new(0),
        }
    }

    /// A signer whose user declines every request
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::approving()
        }
    }

    /// Number of signature requests received
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SigningIdentity for MockSigner {
    fn pubkey(&self) -> Pubkey {
        Signer::pubkey(&self.keypair)
    }

    async fn sign_transaction(&self, transaction: &mut Transaction) -> SdkResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(SdkError::UserRejected);
        }
        SigningIdentity::sign_transaction(&self.keypair, transaction).await
    }
}

/// Build a pool record for `mint_x`/`mint_y` with addresses derived under `program_id`
pub fn pool_fixture(program_id: &Pubkey, mint_x: Pubkey, mint_y: Pubkey) -> PoolInfo {
    let pair = TokenPair::new(mint_x, mint_y)
        .unwrap_or_else(|e| panic!("pool fixture needs distinct mints: {}", e));
    let pda = PdaBuilder::new(*program_id);
    let (pool, bump) = pda.pool(&pair);
    let addresses = pda.pool_accounts(&pool);

    PoolInfo {
        address: pool,
        state: PoolState {
            mint_a: pair.mint_a(),
            mint_b: pair.mint_b(),
            vault_a: addresses.vault_a,
            vault_b: addresses.vault_b,
            lp_mint: addresses.lp_mint,
            pool_auth: addresses.pool_auth,
            fee_bps: 30,
            proto_fee_bps: 5,
            bump,
        },
    }
}
