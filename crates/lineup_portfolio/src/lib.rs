//! # lineup_portfolio
//!
//! Top layer of the lineup workspace: turns a candidate pool and a scenario
//! matrix into a portfolio of compliant, diverse, exposure-bounded lineups.
//!
//! ## Modules
//!
//! - `cache`: `ScenarioCache`, lazily generated matrices shared via `Arc`
//! - `config`: `PortfolioConfig`, TOML file with `LINEUP_*` overrides
//! - `generator`: `PortfolioGenerator`, one solve per lineup slot
//! - `export`: headerless CSV of lineup display names
//!
//! ## Example
//!
//! ```rust
//! use lineup_core::{Candidate, ScenarioMatrix};
//! use lineup_portfolio::{export_lineups, PortfolioConfig, PortfolioGenerator, ScenarioCache};
//!
//! let pool: Vec<Candidate> = (0..6)
//!     .map(|i| {
//!         Candidate::new(format!("d{}", i), 10.0, format!("t{}", i % 3))
//!             .with_display_name(format!("Driver {}", i))
//!     })
//!     .collect();
//!
//! let cache = ScenarioCache::new();
//! let scenarios = cache
//!     .get("race-1", 50, |n| {
//!         let rows = (0..n).map(|s| (0..6).map(|c| ((s * 7 + c * 3) % 11) as f64).collect()).collect();
//!         ScenarioMatrix::from_rows(rows)
//!     })
//!     .unwrap();
//!
//! let config = PortfolioConfig {
//!     n_lineups: 2,
//!     required_size: 3,
//!     budget_cap: 40.0,
//!     min_stack: 1,
//!     max_stack: 2,
//!     ..PortfolioConfig::default()
//! };
//! let result = PortfolioGenerator::new(config).unwrap().generate(&pool, &scenarios).unwrap();
//! assert_eq!(result.len(), 2);
//!
//! let csv = export_lineups(&result.lineups, &pool, 3).unwrap();
//! assert_eq!(csv.lines().count(), 2);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod cache;
pub mod config;
mod error;
pub mod export;
pub mod generator;

pub use cache::ScenarioCache;
pub use config::{AlphaWeight, ConfigError, PortfolioConfig};
pub use error::PortfolioError;
pub use export::{export_lineups, write_lineups};
pub use generator::{GeneratorState, PortfolioGenerator, PortfolioResult, PortfolioStatus};
