use shared::{OffPeriod, WorkType};

use crate::domain::entities::DayAssignment;

use super::problem::{OffCalendar, ProblemInstance};
use super::solver::AssignedMap;

/// Project solver values onto one assignment per (employee, date) of the
/// target month. Half-day requests flip the scheduled half: am off means the
/// afternoon is worked, pm off means the morning is.
pub fn project_assignments(
    instance: &ProblemInstance,
    off: &OffCalendar,
    assigned: &AssignedMap,
) -> Vec<DayAssignment> {
    let mut out = Vec::with_capacity(instance.employees.len() * instance.all_dates.len());
    for employee in &instance.employees {
        for &date in &instance.all_dates {
            if !instance.is_working_date(date) {
                out.push(DayAssignment::off(employee.id, date));
                continue;
            }
            match assigned.get(&(employee.id, date)) {
                Some(&category_id) => {
                    let work_type = match off.half_off_period(employee.id, date) {
                        Some(OffPeriod::Am) => WorkType::AfternoonHalf,
                        Some(OffPeriod::Pm) => WorkType::MorningHalf,
                        _ => WorkType::Full,
                    };
                    out.push(DayAssignment::working(
                        employee.id,
                        date,
                        category_id,
                        work_type,
                    ));
                }
                None => out.push(DayAssignment::off(employee.id, date)),
            }
        }
    }
    out
}
