//! 0-1 integer program: binary variables, linear rows, linear objective.

use crate::solver::SolverError;
use std::fmt;

/// Handle to a binary variable inside a [`Model`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    /// Column index of the variable.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Row sense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    /// `activity <= rhs`
    Le,
    /// `activity >= rhs`
    Ge,
    /// `activity == rhs`
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Le => write!(f, "<="),
            Sense::Ge => write!(f, ">="),
            Sense::Eq => write!(f, "=="),
        }
    }
}

/// A named linear row over binary variables.
///
/// Terms are merged per variable and zero coefficients dropped, so each
/// variable appears at most once.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearConstraint {
    name: String,
    terms: Vec<(VarId, f64)>,
    sense: Sense,
    rhs: f64,
}

impl LinearConstraint {
    /// Row name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Merged `(variable, coefficient)` terms, ordered by variable.
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// Row sense.
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Right-hand side.
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Row activity under a full assignment.
    pub fn activity(&self, values: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| values.get(v.0).copied().unwrap_or(false))
            .map(|(_, a)| a)
            .sum()
    }

    /// True if the assignment satisfies the row within `tol`.
    pub fn is_satisfied(&self, values: &[bool], tol: f64) -> bool {
        let act = self.activity(values);
        match self.sense {
            Sense::Le => act <= self.rhs + tol,
            Sense::Ge => act >= self.rhs - tol,
            Sense::Eq => (act - self.rhs).abs() <= tol,
        }
    }
}

/// Binary maximisation model.
///
/// # Examples
///
/// ```
/// use lineup_optimiser::model::{Model, Sense};
///
/// let mut model = Model::new();
/// let a = model.add_binary("a");
/// let b = model.add_binary("b");
/// model.set_objective(a, 3.0).unwrap();
/// model.set_objective(b, 2.0).unwrap();
/// model
///     .add_constraint("pick_one", vec![(a, 1.0), (b, 1.0)], Sense::Eq, 1.0)
///     .unwrap();
///
/// assert_eq!(model.n_vars(), 2);
/// assert_eq!(model.n_constraints(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    names: Vec<String>,
    objective: Vec<f64>,
    fixed_zero: Vec<bool>,
    constraints: Vec<LinearConstraint>,
}

impl Model {
    /// Empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binary variable with objective coefficient zero.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        let id = VarId(self.names.len());
        self.names.push(name.into());
        self.objective.push(0.0);
        self.fixed_zero.push(false);
        id
    }

    /// Number of variables.
    pub fn n_vars(&self) -> usize {
        self.names.len()
    }

    /// Number of rows.
    pub fn n_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Handle for the variable at `index`, if it exists.
    pub fn var(&self, index: usize) -> Option<VarId> {
        (index < self.names.len()).then_some(VarId(index))
    }

    /// Variable name.
    pub fn name(&self, var: VarId) -> Option<&str> {
        self.names.get(var.0).map(String::as_str)
    }

    fn check_var(&self, var: VarId) -> Result<(), SolverError> {
        if var.0 >= self.names.len() {
            return Err(SolverError::invalid_model(format!(
                "variable index {} out of range ({} variables)",
                var.0,
                self.names.len()
            )));
        }
        Ok(())
    }

    /// Set the objective coefficient of `var`.
    pub fn set_objective(&mut self, var: VarId, coeff: f64) -> Result<(), SolverError> {
        self.check_var(var)?;
        if !coeff.is_finite() {
            return Err(SolverError::invalid_model(format!(
                "objective coefficient for '{}' is not finite",
                self.names[var.0]
            )));
        }
        self.objective[var.0] = coeff;
        Ok(())
    }

    /// Objective coefficients indexed by variable.
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// Add a linear row.
    ///
    /// # Errors
    ///
    /// `SolverError::InvalidModel` for unknown variables or non-finite
    /// coefficients.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: Vec<(VarId, f64)>,
        sense: Sense,
        rhs: f64,
    ) -> Result<(), SolverError> {
        let name = name.into();
        if !rhs.is_finite() {
            return Err(SolverError::invalid_model(format!(
                "row '{}' has non-finite rhs",
                name
            )));
        }
        let mut dense = vec![0.0; self.names.len()];
        for (var, coeff) in terms {
            self.check_var(var)?;
            if !coeff.is_finite() {
                return Err(SolverError::invalid_model(format!(
                    "row '{}' has non-finite coefficient",
                    name
                )));
            }
            dense[var.0] += coeff;
        }
        let terms = dense
            .into_iter()
            .enumerate()
            .filter(|(_, a)| *a != 0.0)
            .map(|(i, a)| (VarId(i), a))
            .collect();

        self.constraints.push(LinearConstraint {
            name,
            terms,
            sense,
            rhs,
        });
        Ok(())
    }

    /// All rows in insertion order.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Force `var` to zero in every solution.
    pub fn fix_to_zero(&mut self, var: VarId) -> Result<(), SolverError> {
        self.check_var(var)?;
        self.fixed_zero[var.0] = true;
        Ok(())
    }

    /// True if `var` was fixed to zero.
    pub fn is_fixed_zero(&self, var: VarId) -> bool {
        self.fixed_zero.get(var.0).copied().unwrap_or(false)
    }

    pub(crate) fn fixed_zero_mask(&self) -> &[bool] {
        &self.fixed_zero
    }

    /// Objective value of a full assignment.
    pub fn evaluate(&self, values: &[bool]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .filter(|(_, &v)| v)
            .map(|(c, _)| c)
            .sum()
    }

    /// True if the assignment honours every row and every zero fixing.
    pub fn is_feasible(&self, values: &[bool], tol: f64) -> bool {
        values.len() == self.n_vars()
            && !self
                .fixed_zero
                .iter()
                .zip(values)
                .any(|(&fixed, &v)| fixed && v)
            && self.constraints.iter().all(|c| c.is_satisfied(values, tol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_merged_and_zero_dropped() {
        let mut m = Model::new();
        let a = m.add_binary("a");
        let b = m.add_binary("b");
        m.add_constraint("r", vec![(b, 1.0), (a, 2.0), (b, -1.0), (a, 0.5)], Sense::Le, 3.0)
            .unwrap();
        assert_eq!(m.constraints()[0].terms(), &[(a, 2.5)]);
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let mut m = Model::new();
        let _ = m.add_binary("a");
        let mut other = Model::new();
        let _ = other.add_binary("x");
        let stray = other.add_binary("y");
        assert!(m.add_constraint("r", vec![(stray, 1.0)], Sense::Le, 1.0).is_err());
        assert!(m.set_objective(stray, 1.0).is_err());
        assert!(m.fix_to_zero(stray).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut m = Model::new();
        let a = m.add_binary("a");
        assert!(m.set_objective(a, f64::NAN).is_err());
        assert!(m.add_constraint("r", vec![(a, 1.0)], Sense::Le, f64::INFINITY).is_err());
    }

    #[test]
    fn test_feasibility_and_evaluation() {
        let mut m = Model::new();
        let a = m.add_binary("a");
        let b = m.add_binary("b");
        m.set_objective(a, 4.0).unwrap();
        m.set_objective(b, 1.5).unwrap();
        m.add_constraint("one", vec![(a, 1.0), (b, 1.0)], Sense::Eq, 1.0)
            .unwrap();
        assert!(m.is_feasible(&[true, false], 1e-9));
        assert!(!m.is_feasible(&[true, true], 1e-9));
        assert_eq!(m.evaluate(&[false, true]), 1.5);

        m.fix_to_zero(a).unwrap();
        assert!(m.is_fixed_zero(a));
        assert!(!m.is_feasible(&[true, false], 1e-9));
    }
}
