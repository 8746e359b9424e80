use std::collections::HashMap;
use std::sync::RwLock;

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

use crate::core::constants::*;
use crate::protocol::TokenPair;

/// PDA cache to avoid recomputing addresses
pub struct PdaCache {
    cache: RwLock<HashMap<String, (Pubkey, u8)>>,
}

impl PdaCache {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> (Pubkey, u8)
    where
        F: FnOnce() -> (Pubkey, u8),
    {
        // A poisoned lock only means another thread panicked mid-insert;
        // the cached entries are still valid derivations.
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
        {
            return *cached;
        }

        let result = compute();
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), result);
        result
    }

    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PdaCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Every address the AMM program needs for one pool
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolAddresses {
    pub pool: Pubkey,
    pub lp_mint: Pubkey,
    pub pool_auth: Pubkey,
    pub vault_a: Pubkey,
    pub vault_b: Pubkey,
}

/// Unified PDA builder for all AMM addresses
pub struct PdaBuilder {
    cache: PdaCache,
    pub program_id: Pubkey,
}

impl PdaBuilder {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            cache: PdaCache::new(),
            program_id,
        }
    }

    pub fn pool(&self, pair: &TokenPair) -> (Pubkey, u8) {
        let (mint_a, mint_b) = (pair.mint_a(), pair.mint_b());
        let key = format!("pool:{}:{}", mint_a, mint_b);
        self.cache.get_or_compute(&key, || {
            Pubkey::find_program_address(
                &[seeds::POOL, mint_a.as_ref(), mint_b.as_ref()],
                &self.program_id,
            )
        })
    }

    pub fn lp_mint(&self, pool: &Pubkey) -> (Pubkey, u8) {
        self.pool_role("lp_mint", seeds::LP_MINT, pool)
    }

    pub fn pool_authority(&self, pool: &Pubkey) -> (Pubkey, u8) {
        self.pool_role("pool_auth", seeds::POOL_AUTHORITY, pool)
    }

    pub fn vault_a(&self, pool: &Pubkey) -> (Pubkey, u8) {
        self.pool_role("vault_a", seeds::VAULT_A, pool)
    }

    pub fn vault_b(&self, pool: &Pubkey) -> (Pubkey, u8) {
        self.pool_role("vault_b", seeds::VAULT_B, pool)
    }

    /// Associated token account of `owner` for `mint`
    pub fn owned_token_account(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        get_associated_token_address(owner, mint)
    }

    /// Pool-derived accounts for an existing pool key
    pub fn pool_accounts(&self, pool: &Pubkey) -> PoolAddresses {
        PoolAddresses {
            pool: *pool,
            lp_mint: self.lp_mint(pool).0,
            pool_auth: self.pool_authority(pool).0,
            vault_a: self.vault_a(pool).0,
            vault_b: self.vault_b(pool).0,
        }
    }

    /// Pool key plus every pool-derived account for a pair
    pub fn pool_addresses(&self, pair: &TokenPair) -> PoolAddresses {
        let (pool, _) = self.pool(pair);
        self.pool_accounts(&pool)
    }

    fn pool_role(&self, role: &str, seed: &[u8], pool: &Pubkey) -> (Pubkey, u8) {
        let key = format!("{}:{}", role, pool);
        self.cache.get_or_compute(&key, || {
            Pubkey::find_program_address(&[seed, pool.as_ref()], &self.program_id)
        })
    }
}
