use chrono::NaiveDate;
use good_lp::{constraint, variable, variables, Constraint, Expression, ProblemVariables, Variable};
use std::collections::HashMap;

use crate::domain::entities::{job_category::one_per_day, WorkTarget};
use crate::domain::nlp::edits::{AdjustAction, AdjustEdit};

use super::problem::{OffCalendar, ProblemInstance};

// Objective weights.
const WORK_DAYS_WEIGHT: i32 = 10;
const FAIRNESS_WEIGHT: i32 = 5;
const BALANCE_WEIGHT: i32 = 1;
const PRIORITY_WEIGHT: i32 = 2;
const SHORTAGE_WEIGHT: i32 = 100;

/// The assembled constraint model, ready for the solver driver. `x` keys are
/// (employee id, working date, category id); variables exist only for those
/// triples, so non-working dates are never modelled.
pub struct ModelParts {
    pub vars: ProblemVariables,
    pub objective: Expression,
    pub constraints: Vec<Constraint>,
    pub x: HashMap<(i64, NaiveDate, i64), Variable>,
}

/// Translate a problem instance (plus optional aggregate adjustment hints)
/// into binary decision variables, linear constraints, and the weighted
/// objective.
///
/// All headcount quantities are doubled so half-day contributions stay in
/// integer arithmetic: a requirement of 1.5 becomes 3, a half-day worker
/// supplies 1 unit, a full-day worker 2.
pub fn build_model(
    instance: &ProblemInstance,
    off: &OffCalendar,
    adjustments: &[AdjustEdit],
) -> ModelParts {
    let mut vars = variables!();
    let mut constraints: Vec<Constraint> = Vec::new();
    let mut objective_terms: Vec<Expression> = Vec::new();

    let category_ids = instance.category_ids_in_use();
    let working_dates = &instance.working_dates;

    // x[e, d, j] = 1 iff employee e performs category j on date d
    let mut x: HashMap<(i64, NaiveDate, i64), Variable> = HashMap::new();
    for employee in &instance.employees {
        for &date in working_dates {
            for &j in &category_ids {
                x.insert((employee.id, date, j), vars.add(variable().binary()));
            }
        }
    }

    // work[e, d] = 1 iff e works at all on d, tied to the per-category vars
    let mut work: HashMap<(i64, NaiveDate), Variable> = HashMap::new();
    for employee in &instance.employees {
        for &date in working_dates {
            let w = vars.add(variable().binary());
            let day_total: Expression = category_ids
                .iter()
                .map(|&j| x[&(employee.id, date, j)])
                .sum();
            // at most one category per employee per day
            constraints.push(constraint!(day_total.clone() <= 1));
            constraints.push(constraint!(w == day_total));
            work.insert((employee.id, date), w);
        }
    }

    // a requested full day off means no work at all that day
    for employee in &instance.employees {
        for &date in working_dates {
            if off.is_full_off(employee.id, date) {
                let w = work[&(employee.id, date)];
                constraints.push(constraint!(w == 0));
            }
        }
    }

    // only qualified categories may be assigned
    for employee in &instance.employees {
        for &date in working_dates {
            for &j in &category_ids {
                if !instance.is_qualified(employee.id, j) {
                    let v = x[&(employee.id, date, j)];
                    constraints.push(constraint!(v == 0));
                }
            }
        }
    }

    // one-per-day categories take exactly one full-day employee per
    // working date; half-day workers are excluded from them
    for &date in working_dates {
        for &j in category_ids.iter().filter(|&&j| one_per_day(j)) {
            for employee in &instance.employees {
                if instance.is_qualified(employee.id, j)
                    && off.half_off_period(employee.id, date).is_some()
                {
                    let v = x[&(employee.id, date, j)];
                    constraints.push(constraint!(v == 0));
                }
            }
            let staffed: Expression = instance
                .employees
                .iter()
                .filter(|e| instance.is_qualified(e.id, j))
                .map(|e| x[&(e.id, date, j)])
                .sum();
            constraints.push(constraint!(staffed == 1));
        }
    }

    // Soft requirement satisfaction: shortage slack per (date, category),
    // penalized heavily so the model stays feasible under staff shortage
    let requirements = instance.requirements_by_date();
    for &date in working_dates {
        let Some(rows) = requirements.get(&date) else {
            continue;
        };
        for &(j, required) in rows {
            if one_per_day(j) {
                continue; // staffed exactly by the one-per-day constraint
            }
            let scaled_req = (required * 2.0).round() as i32;
            let supply: Expression = instance
                .employees
                .iter()
                .filter(|e| instance.is_qualified(e.id, j))
                .map(|e| off.hc_factor(e.id, date) * x[&(e.id, date, j)])
                .sum();
            let shortage = vars.add(variable().clamp(0, scaled_req));
            constraints.push(constraint!(supply + shortage >= scaled_req));
            objective_terms.push(SHORTAGE_WEIGHT * shortage);
        }
    }

    // Doubled total work days per employee (full day = 2, half day = 1)
    let scaled_total = working_dates.len() as i32 * 2;
    let mut total_work: HashMap<i64, Variable> = HashMap::new();
    for employee in &instance.employees {
        let tw = vars.add(variable().clamp(0, scaled_total));
        let supplied: Expression = working_dates
            .iter()
            .map(|&d| off.hc_factor(employee.id, d) * work[&(employee.id, d)])
            .sum();
        constraints.push(constraint!(tw == supplied));
        total_work.insert(employee.id, tw);
    }

    // Deviation from each employee's requested work days
    for employee in &instance.employees {
        let tw = total_work[&employee.id];
        match instance.work_targets.get(&employee.id) {
            Some(WorkTarget::Max) => {
                // maximise work days: penalize every missed half-day unit
                let missed = vars.add(variable().clamp(0, scaled_total));
                constraints.push(constraint!(missed + tw == scaled_total));
                objective_terms.push(WORK_DAYS_WEIGHT * missed);
            }
            Some(WorkTarget::Days(days)) => {
                let target = *days as i32 * 2;
                let deviation = vars.add(variable().min(0));
                constraints.push(constraint!(deviation >= tw - target));
                constraints.push(constraint!(deviation >= target - tw));
                objective_terms.push(WORK_DAYS_WEIGHT * deviation);
            }
            None => {}
        }
    }

    // Fairness: minimize the spread of total work days across the roster
    if instance.employees.len() > 1 {
        let max_work = vars.add(variable().clamp(0, scaled_total));
        let min_work = vars.add(variable().clamp(0, scaled_total));
        for employee in &instance.employees {
            let tw = total_work[&employee.id];
            constraints.push(constraint!(max_work >= tw));
            constraints.push(constraint!(min_work <= tw));
        }
        objective_terms.push(FAIRNESS_WEIGHT * (max_work - min_work));
    }

    // Category balance per employee across their qualified categories
    for employee in &instance.employees {
        let qualified = instance.qualified_categories(employee.id);
        if qualified.len() < 2 {
            continue;
        }
        let horizon = working_dates.len() as i32;
        let max_count = vars.add(variable().clamp(0, horizon));
        let min_count = vars.add(variable().clamp(0, horizon));
        for &j in qualified {
            let count: Expression = working_dates
                .iter()
                .map(|&d| x[&(employee.id, d, j)])
                .sum();
            constraints.push(constraint!(max_count >= count.clone()));
            constraints.push(constraint!(min_count <= count));
        }
        objective_terms.push(BALANCE_WEIGHT * (max_count - min_count));
    }

    // Priority cost: lower category ids are cheaper, so skilled roles win
    // whenever the solver has a choice
    for employee in &instance.employees {
        for &date in working_dates {
            for &j in &category_ids {
                let weight = PRIORITY_WEIGHT * j as i32;
                objective_terms.push(weight * x[&(employee.id, date, j)]);
            }
        }
    }

    apply_adjustments(instance, &category_ids, &x, &mut constraints, adjustments);

    let objective: Expression = objective_terms.into_iter().sum();

    ModelParts {
        vars,
        objective,
        constraints,
        x,
    }
}

/// Fold aggregate adjustment hints into per-(employee, category) monthly
/// count bounds. Hints naming an unknown employee or category are advisory
/// and dropped.
fn apply_adjustments(
    instance: &ProblemInstance,
    category_ids: &[i64],
    x: &HashMap<(i64, NaiveDate, i64), Variable>,
    constraints: &mut Vec<Constraint>,
    adjustments: &[AdjustEdit],
) {
    for edit in adjustments {
        let Some(employee_id) = instance.employee_id_by_name(&edit.employee_name) else {
            tracing::warn!(
                "Dropping adjustment for unknown employee {:?}",
                edit.employee_name
            );
            continue;
        };
        let Some(category_id) = instance
            .category_id_by_name(&edit.job_type)
            .filter(|id| category_ids.contains(id))
        else {
            tracing::warn!("Dropping adjustment for unknown category {:?}", edit.job_type);
            continue;
        };

        let count: Expression = instance
            .working_dates
            .iter()
            .map(|&d| x[&(employee_id, d, category_id)])
            .sum();

        match (edit.action, edit.amount) {
            (AdjustAction::Increase, Some(amount)) if amount != 0 => {
                constraints.push(constraint!(count >= amount as i32));
            }
            (AdjustAction::Decrease, Some(amount)) if amount != 0 => {
                constraints.push(constraint!(count <= amount.max(0) as i32));
            }
            (AdjustAction::Set, Some(amount)) => {
                constraints.push(constraint!(count == amount as i32));
            }
            _ => {}
        }
    }
}
