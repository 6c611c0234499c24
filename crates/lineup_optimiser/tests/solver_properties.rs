//! The MILP solve agrees with exhaustive enumeration on small models;
//! Jaccard similarity stays a symmetric score in [0, 1].

use lineup_optimiser::diversity::jaccard;
use lineup_optimiser::model::{Model, Sense};
use lineup_optimiser::solver::{MilpSolver, SolveStatus};
use proptest::prelude::*;

/// Best objective over every feasible assignment, if any.
fn brute_force(model: &Model) -> Option<f64> {
    let n = model.n_vars();
    let mut best: Option<f64> = None;
    for mask in 0u32..(1 << n) {
        let values: Vec<bool> = (0..n).map(|i| mask & (1 << i) != 0).collect();
        if model.is_feasible(&values, 1e-9) {
            let obj = model.evaluate(&values);
            best = Some(best.map_or(obj, |b: f64| b.max(obj)));
        }
    }
    best
}

fn build(scores: &[i32], costs: &[u32], size: usize, cap: u32, fixed: &[bool]) -> Model {
    let mut model = Model::new();
    let vars: Vec<_> = (0..scores.len())
        .map(|i| model.add_binary(format!("x{}", i)))
        .collect();
    for (i, &v) in vars.iter().enumerate() {
        model.set_objective(v, f64::from(scores[i])).unwrap();
        if fixed[i] {
            model.fix_to_zero(v).unwrap();
        }
    }
    model
        .add_constraint(
            "size",
            vars.iter().map(|&v| (v, 1.0)).collect(),
            Sense::Eq,
            size as f64,
        )
        .unwrap();
    model
        .add_constraint(
            "budget",
            vars.iter().zip(costs).map(|(&v, &c)| (v, f64::from(c))).collect(),
            Sense::Le,
            f64::from(cap),
        )
        .unwrap();
    model
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_matches_brute_force(
        items in prop::collection::vec((-5i32..40, 1u32..20, any::<bool>()), 1..11),
        size in 1usize..5,
        cap in 5u32..60,
    ) {
        let scores: Vec<i32> = items.iter().map(|t| t.0).collect();
        let costs: Vec<u32> = items.iter().map(|t| t.1).collect();
        // Fix roughly one in four variables.
        let fixed: Vec<bool> = items.iter().map(|t| t.2 && t.0 % 4 == 0).collect();
        let model = build(&scores, &costs, size, cap, &fixed);

        let solution = MilpSolver::with_defaults().solve(&model).unwrap();
        match brute_force(&model) {
            Some(best) => {
                prop_assert_eq!(solution.status, SolveStatus::Optimal);
                prop_assert!((solution.objective - best).abs() < 1e-6);
                prop_assert!(model.is_feasible(&solution.values, 1e-9));
            }
            None => prop_assert_eq!(solution.status, SolveStatus::Infeasible),
        }
    }
}

proptest! {
    #[test]
    fn prop_jaccard_bounded_and_symmetric(
        a in prop::collection::vec(0u8..20, 0..12),
        b in prop::collection::vec(0u8..20, 0..12),
    ) {
        let ab = jaccard(&a, &b);
        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert_eq!(ab, jaccard(&b, &a));
        if !a.is_empty() {
            prop_assert_eq!(jaccard(&a, &a), 1.0);
        }
    }
}
