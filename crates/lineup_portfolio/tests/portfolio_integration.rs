//! End-to-end portfolio generation over a seeded scenario supplier.

use lineup_core::validity::ValidityKernel;
use lineup_core::{Candidate, EntityId, GroupId, Lineup, ScenarioMatrix, ShapeError};
use lineup_optimiser::ComplianceRules;
use lineup_portfolio::{
    export_lineups, PortfolioConfig, PortfolioGenerator, PortfolioResult, PortfolioStatus,
    ScenarioCache,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::sync::Arc;

const N_DRIVERS: usize = 18;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Six teams of three; costs rise with skill.
fn field() -> Vec<Candidate> {
    (0..N_DRIVERS)
        .map(|i| {
            Candidate::new(format!("d{:02}", i), 5_000.0 + 350.0 * i as f64, format!("team{}", i % 6))
                .with_display_name(format!("Driver {:02}", i))
        })
        .collect()
}

/// Seeded simulator: skill plus uniform noise plus occasional upside spikes,
/// every outcome moved by `shift`.
fn simulate_field(
    seed: u64,
    n_drivers: usize,
    shift: f64,
) -> impl Fn(usize) -> Result<ScenarioMatrix, ShapeError> {
    move |n_scenarios| {
        let mut rng = StdRng::seed_from_u64(seed);
        let rows = (0..n_scenarios)
            .map(|_| {
                (0..n_drivers)
                    .map(|c| {
                        let skill = 10.0 + c as f64;
                        let spike = if rng.gen_bool(0.05) { 40.0 } else { 0.0 };
                        skill + rng.gen::<f64>() * 15.0 + spike + shift
                    })
                    .collect()
            })
            .collect();
        ScenarioMatrix::from_rows(rows)
    }
}

fn simulate(seed: u64) -> impl Fn(usize) -> Result<ScenarioMatrix, ShapeError> {
    simulate_field(seed, N_DRIVERS, 0.0)
}

const LARGE_FIELD: usize = 40;

/// Ten teams of four; costs rise with skill.
fn large_field() -> Vec<Candidate> {
    (0..LARGE_FIELD)
        .map(|i| {
            Candidate::new(format!("d{:02}", i), 4_000.0 + 120.0 * i as f64, format!("team{}", i % 10))
                .with_display_name(format!("Driver {:02}", i))
        })
        .collect()
}

fn stacked_config() -> PortfolioConfig {
    PortfolioConfig {
        n_lineups: 8,
        required_size: 6,
        budget_cap: 50_000.0,
        min_stack: 2,
        max_stack: 3,
        max_entity_exposure: 0.5,
        max_group_exposure: 0.5,
        diversity_weight: 0.5,
        time_limit_ms: 10_000,
        ..PortfolioConfig::default()
    }
}

fn group_counts<'a>(lineup: &Lineup, pool: &'a [Candidate]) -> BTreeMap<&'a GroupId, usize> {
    let mut counts = BTreeMap::new();
    for c in pool.iter().filter(|c| lineup.contains(&c.id)) {
        *counts.entry(&c.group).or_default() += 1;
    }
    counts
}

fn config() -> PortfolioConfig {
    PortfolioConfig {
        n_lineups: 6,
        required_size: 6,
        budget_cap: 50_000.0,
        min_stack: 1,
        max_stack: 2,
        max_entity_exposure: 0.6,
        max_group_exposure: 1.0,
        diversity_weight: 0.5,
        time_limit_ms: 5_000,
        ..PortfolioConfig::default()
    }
}

fn run(config: PortfolioConfig) -> anyhow::Result<PortfolioResult> {
    let cache = ScenarioCache::new();
    let scenarios = cache.get("phoenix", 400, simulate(config.random_seed))?;
    let generator = PortfolioGenerator::new(config)?;
    Ok(generator.generate(&field(), &scenarios)?)
}

#[test]
fn test_every_lineup_is_compliant() -> anyhow::Result<()> {
    init_tracing();
    let config = config();
    let result = run(config.clone())?;
    assert!(!result.is_empty());

    let pool = field();
    let rules = ComplianceRules::new(
        config.required_size,
        config.budget_cap,
        config.min_stack,
        config.max_stack,
    )?;
    let kernel = ValidityKernel::new(pool.len())?;
    for lineup in &result.lineups {
        let validation = rules.validate_lineup(lineup.entity_ids(), &pool);
        assert!(validation.valid, "{:?}", validation.errors);

        let unique: HashSet<&EntityId> = lineup.entity_ids().iter().collect();
        assert_eq!(unique.len(), config.required_size);
        assert!(lineup.total_cost() <= config.budget_cap);

        let positions: Vec<i64> = lineup
            .entity_ids()
            .iter()
            .map(|id| pool.iter().position(|c| &c.id == id).map_or(0, |p| p as i64 + 1))
            .collect();
        assert!(!kernel.is_impossible_state(&positions, None, None));

        let metrics = lineup.metrics().expect("accepted lineups carry metrics");
        assert!(metrics.cvar >= metrics.var);
        assert_eq!(metrics.alpha, config.metrics_alpha);
    }
    Ok(())
}

#[test]
fn test_entity_exposure_never_exceeds_cap() -> anyhow::Result<()> {
    let config = config();
    let result = run(config.clone())?;

    let mut counts: BTreeMap<&EntityId, usize> = BTreeMap::new();
    for lineup in &result.lineups {
        for id in lineup.entity_ids() {
            *counts.entry(id).or_default() += 1;
        }
    }
    let allowed = (config.max_entity_exposure * config.n_lineups as f64).floor() as usize;
    for (id, count) in counts {
        assert!(count <= allowed, "{} used {} times", id, count);
    }
    if result.status == PortfolioStatus::Complete {
        assert!(result.exposure_violations.is_empty());
        assert!(result.exposure.max_exposure <= config.max_entity_exposure + 1e-12);
    }
    Ok(())
}

#[test]
fn test_lineups_are_distinct_and_diversity_reported() -> anyhow::Result<()> {
    let result = run(config())?;
    let sets: HashSet<Vec<&EntityId>> = result
        .lineups
        .iter()
        .map(|l| {
            let mut ids: Vec<&EntityId> = l.entity_ids().iter().collect();
            ids.sort();
            ids
        })
        .collect();
    assert_eq!(sets.len(), result.len());
    assert_eq!(result.diversity.n_lineups, result.len());
    if result.len() > 1 {
        assert!(result.diversity.max_similarity < 1.0);
    }
    Ok(())
}

#[test]
fn test_identical_seed_reproduces_portfolio() -> anyhow::Result<()> {
    let a = run(config())?;
    let b = run(config())?;
    assert_eq!(a.len(), b.len());
    for (x, y) in a.lineups.iter().zip(&b.lineups) {
        assert_eq!(x.entity_ids(), y.entity_ids());
        assert_eq!(x.metrics().map(|m| m.cvar), y.metrics().map(|m| m.cvar));
    }
    Ok(())
}

#[test]
fn test_export_matches_portfolio() -> anyhow::Result<()> {
    let config = config();
    let result = run(config.clone())?;
    let pool = field();
    let names: HashSet<&str> = pool.iter().filter_map(|c| c.display_name()).collect();

    let csv = export_lineups(&result.lineups, &pool, config.required_size)?;
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), result.len());
    for row in rows {
        let cells: Vec<&str> = row.split(',').collect();
        assert_eq!(cells.len(), config.required_size);
        assert!(cells.iter().all(|cell| names.contains(cell)));
    }
    Ok(())
}

#[test]
fn test_cache_reuses_matrix_across_runs() -> anyhow::Result<()> {
    let cache = ScenarioCache::new();
    let first = cache.get("phoenix", 400, simulate(42))?;
    let again = cache.get("phoenix", 400, simulate(7))?;
    let bigger = cache.get("phoenix", 800, simulate(42))?;
    assert!(Arc::ptr_eq(&first, &again));
    assert!(!Arc::ptr_eq(&first, &bigger));
    assert_eq!(cache.size(), 2);

    let generator = PortfolioGenerator::new(config())?;
    let a = generator.generate(&field(), &first)?;
    let b = generator.generate(&field(), &again)?;
    assert_eq!(a.lineups, b.lineups);
    Ok(())
}

#[test]
fn test_config_file_drives_generation() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        r#"
n_lineups = 3
required_size = 6
budget_cap = 50000.0
max_stack = 2
time_limit_ms = 5000
random_seed = 11

[[alpha_weights]]
alpha = 0.9
weight = 1.0
"#
    )?;
    let config = PortfolioConfig::load_and_validate(file.path())?;
    let result = run(config)?;
    assert_eq!(result.status, PortfolioStatus::Complete);
    assert_eq!(result.len(), 3);
    Ok(())
}

#[test]
fn test_impossible_budget_returns_empty_portfolio() -> anyhow::Result<()> {
    let result = run(PortfolioConfig {
        budget_cap: 1_000.0,
        ..config()
    })?;
    assert!(result.is_empty());
    assert_eq!(result.status, PortfolioStatus::Infeasible);
    assert_eq!(result.exposure.max_holder, None);
    Ok(())
}

#[test]
fn test_large_field_honours_stacking_band_and_group_cap() -> anyhow::Result<()> {
    init_tracing();
    let config = stacked_config();
    let pool = large_field();
    let cache = ScenarioCache::new();
    let scenarios = cache.get("daytona", 400, simulate_field(7, LARGE_FIELD, 0.0))?;
    let result = PortfolioGenerator::new(config.clone())?.generate(&pool, &scenarios)?;
    assert!(result.len() >= 2, "only {} lineups ({})", result.len(), result.status);

    let mut team_usage: BTreeMap<&GroupId, usize> = BTreeMap::new();
    for (k, lineup) in result.lineups.iter().enumerate() {
        assert!(lineup.total_cost() <= config.budget_cap);
        let teams = group_counts(lineup, &pool);
        assert_eq!(teams.values().sum::<usize>(), config.required_size);
        for (team, &picked) in &teams {
            assert!(
                (config.min_stack..=config.max_stack).contains(&picked),
                "lineup {} takes {} from {}",
                k,
                picked,
                team
            );
            // A team at its cap over the lineups so far sits this one out.
            if k > 0 {
                let so_far = team_usage.get(team).copied().unwrap_or(0);
                assert!((so_far as f64) / (k as f64) < config.max_group_exposure);
            }
        }
        for team in teams.into_keys() {
            *team_usage.entry(team).or_default() += 1;
        }
    }

    let allowed = (config.max_group_exposure * config.n_lineups as f64).floor() as usize;
    for (team, used) in &team_usage {
        assert!(*used <= allowed, "{} used in {} lineups", team, used);
    }
    if result.status.is_complete() {
        assert!(result.exposure_violations.is_empty());
    }
    Ok(())
}

#[test]
fn test_shifted_outcomes_leave_portfolio_unchanged() -> anyhow::Result<()> {
    let config = stacked_config();
    let pool = large_field();
    let cache = ScenarioCache::new();
    let plain = cache.get("plain", 400, simulate_field(11, LARGE_FIELD, 0.0))?;
    let shifted = cache.get("shifted", 400, simulate_field(11, LARGE_FIELD, -60.0))?;

    let generator = PortfolioGenerator::new(config)?;
    let a = generator.generate(&pool, &plain)?;
    let b = generator.generate(&pool, &shifted)?;

    assert_ne!(a.status, PortfolioStatus::TimeLimit);
    assert_eq!(a.status, b.status);
    assert_eq!(a.len(), b.len());
    for (x, y) in a.lineups.iter().zip(&b.lineups) {
        assert_eq!(x.entity_ids(), y.entity_ids());
    }
    Ok(())
}
