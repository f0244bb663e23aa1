use chrono::NaiveDate;
use good_lp::{default_solver, Solution, SolverModel};
use shared::{DomainError, DomainResult};
use std::collections::HashMap;

use super::model::ModelParts;

/// The solver's chosen category per (employee, working date). Pairs absent
/// from the map are unassigned (projected as off).
pub type AssignedMap = HashMap<(i64, NaiveDate), i64>;

/// Hand the assembled model to the solver and extract the selected
/// assignments. Anything short of a feasible solution surfaces as
/// `Infeasible`; nothing has been persisted at this point.
pub fn solve_model(parts: ModelParts) -> DomainResult<AssignedMap> {
    let ModelParts {
        vars,
        objective,
        constraints,
        x,
    } = parts;

    let mut problem = vars.minimise(objective).using(default_solver);
    for constraint in constraints {
        problem = problem.with(constraint);
    }

    let solution = problem
        .solve()
        .map_err(|e| DomainError::Infeasible(e.to_string()))?;

    let mut assigned = AssignedMap::new();
    for (&(employee_id, date, category_id), var) in &x {
        if solution.value(*var) > 0.5 {
            assigned.insert((employee_id, date), category_id);
        }
    }
    Ok(assigned)
}
