//! Previous-transaction lookup.
//!
//! Verification and fee calculation need the outputs an input spends. They
//! are obtained through the `TxFetcher` trait, so callers decide where
//! transactions come from. Two implementations are provided: an in-memory
//! map and an LRU cache that wraps any other fetcher.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use log::debug;
use lru::LruCache;

use btc_primitives::Network;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Default number of transactions held by a `CachingFetcher`.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Source of previous transactions, looked up by id.
pub trait TxFetcher {
    /// Fetch the transaction with id `txid` (display-order hex) on `network`.
    fn fetch(&self, txid: &str, network: Network) -> Result<Transaction, TransactionError>;
}

/// Transactions held in memory, keyed by their own id.
#[derive(Clone, Debug, Default)]
pub struct MemoryFetcher {
    txs: HashMap<(Network, String), Transaction>,
}

impl MemoryFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `tx` under its computed id and network.
    pub fn insert(&mut self, tx: Transaction) {
        self.txs.insert((tx.network(), tx.id()), tx);
    }

    /// Number of stored transactions.
    pub fn len(&self) -> usize {
        self.txs.len()
    }

    /// Whether no transactions are stored.
    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }
}

impl TxFetcher for MemoryFetcher {
    fn fetch(&self, txid: &str, network: Network) -> Result<Transaction, TransactionError> {
        self.txs
            .get(&(network, txid.to_ascii_lowercase()))
            .cloned()
            .ok_or_else(|| {
                TransactionError::FetchError(format!("transaction {} not found on {}", txid, network))
            })
    }
}

/// Settings for a `CachingFetcher`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Maximum number of transactions kept. Zero is treated as one.
    pub cache_capacity: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Caches the results of another fetcher.
///
/// Every transaction obtained from the inner fetcher has its id checked
/// against the one requested before it is cached or returned. The cache is
/// behind a mutex, so a `CachingFetcher` can be shared between threads when
/// the inner fetcher can.
pub struct CachingFetcher<F> {
    inner: F,
    cache: Mutex<LruCache<(Network, String), Transaction>>,
}

impl<F: TxFetcher> CachingFetcher<F> {
    /// Wrap `inner` with a cache of the default capacity.
    pub fn new(inner: F) -> Self {
        Self::with_config(inner, FetcherConfig::default())
    }

    /// Wrap `inner` with a cache sized by `config`.
    pub fn with_config(inner: F, config: FetcherConfig) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        CachingFetcher {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Fetch from the inner fetcher, bypassing and then refreshing the cache.
    ///
    /// # Arguments
    /// * `txid` - Id of the transaction, as display-order hex.
    /// * `network` - Network to look on.
    ///
    /// # Returns
    /// The transaction, the inner fetcher's error, or `FetchError` if the
    /// returned transaction has a different id.
    pub fn fetch_fresh(&self, txid: &str, network: Network) -> Result<Transaction, TransactionError> {
        let key = (network, txid.to_ascii_lowercase());
        let tx = self.inner.fetch(txid, network)?.with_network(network);
        let actual = tx.id();
        if actual != key.1 {
            return Err(TransactionError::FetchError(format!(
                "fetched transaction has id {}, requested {}",
                actual, key.1
            )));
        }
        debug!("cached transaction {} ({})", key.1, network);
        self.lock().put(key, tx.clone());
        Ok(tx)
    }

    /// Number of transactions currently cached.
    pub fn cached_len(&self) -> usize {
        self.lock().len()
    }

    /// The wrapped fetcher.
    pub fn inner(&self) -> &F {
        &self.inner
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<(Network, String), Transaction>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F: TxFetcher> TxFetcher for CachingFetcher<F> {
    fn fetch(&self, txid: &str, network: Network) -> Result<Transaction, TransactionError> {
        let key = (network, txid.to_ascii_lowercase());
        if let Some(tx) = self.lock().get(&key) {
            debug!("cache hit for transaction {}", key.1);
            return Ok(tx.clone());
        }
        debug!("cache miss for transaction {}", key.1);
        self.fetch_fresh(txid, network)
    }
}
