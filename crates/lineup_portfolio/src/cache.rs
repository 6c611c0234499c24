//! Process-wide scenario cache with lazy generation and `Arc` sharing.
//!
//! # Caching Strategy
//!
//! - Double-check locking prevents two callers generating the same key
//! - A miss invokes the supplier once and logs at info level
//! - Hits return the cached `Arc` without logging
//! - A poisoned lock is recovered, since entries are only ever inserted whole

use crate::error::PortfolioError;
use lineup_core::ScenarioMatrix;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

type CacheKey = (String, usize);

/// Thread-safe cache of scenario matrices keyed by `(race_id, n_scenarios)`.
///
/// # Example
///
/// ```rust
/// use lineup_core::ScenarioMatrix;
/// use lineup_portfolio::ScenarioCache;
/// use std::sync::Arc;
///
/// let cache = ScenarioCache::new();
/// let supplier = |n: usize| ScenarioMatrix::new(n, 2, vec![1.0; n * 2]);
///
/// let first = cache.get("daytona", 100, supplier).unwrap();
/// let second = cache.get("daytona", 100, supplier).unwrap();
///
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.size(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ScenarioCache {
    entries: RwLock<HashMap<CacheKey, Arc<ScenarioMatrix>>>,
}

impl ScenarioCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves or generates the matrix for `(race_id, n_scenarios)`.
    ///
    /// On a miss `supplier(n_scenarios)` is called while the write lock is
    /// held, so concurrent callers for the same key wait for one generation
    /// instead of racing.
    ///
    /// # Errors
    ///
    /// - `PortfolioError::ScenarioSupplier` if the supplier fails
    /// - `PortfolioError::InvalidInput` if it returns a matrix with a
    ///   different number of scenarios than requested
    ///
    /// Failed generations are not cached.
    pub fn get<F, E>(
        &self,
        race_id: &str,
        n_scenarios: usize,
        supplier: F,
    ) -> Result<Arc<ScenarioMatrix>, PortfolioError>
    where
        F: FnOnce(usize) -> Result<ScenarioMatrix, E>,
        E: Display,
    {
        let key = (race_id.to_string(), n_scenarios);

        // Fast path: read lock check
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(matrix) = entries.get(&key) {
                return Ok(Arc::clone(matrix));
            }
        }

        // Slow path: write lock with double-check
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(matrix) = entries.get(&key) {
            return Ok(Arc::clone(matrix));
        }

        info!(race_id, n_scenarios, "generating scenarios");
        let matrix = supplier(n_scenarios).map_err(|e| PortfolioError::ScenarioSupplier {
            race_id: race_id.to_string(),
            n_scenarios,
            message: e.to_string(),
        })?;
        if matrix.n_scenarios() != n_scenarios {
            return Err(PortfolioError::invalid_input(format!(
                "supplier for '{}' returned {} scenarios, expected {}",
                race_id,
                matrix.n_scenarios(),
                n_scenarios
            )));
        }

        let matrix = Arc::new(matrix);
        entries.insert(key, Arc::clone(&matrix));
        Ok(matrix)
    }

    /// True if `(race_id, n_scenarios)` is cached.
    pub fn contains(&self, race_id: &str, n_scenarios: usize) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(race_id.to_string(), n_scenarios))
    }

    /// Drops every cached matrix.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached matrices.
    pub fn size(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
