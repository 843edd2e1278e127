use time::Date;

use super::{AssignmentId, ProjectCodeId, UserId};

/// Grant of a project code to an employee for a date range.
///
/// The range includes both `start_date` and `end_date`; an absent end date
/// means the assignment is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectAssignment {
    pub id: AssignmentId,
    pub employee_id: UserId,
    pub project_code_id: ProjectCodeId,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub assigned_by: UserId,
}

impl ProjectAssignment {
    /// Whether `date` falls within the assignment.
    pub fn covers(&self, date: Date) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| end >= date)
    }

    /// Whether this assignment shares at least one day with `[start, end]`.
    pub fn overlaps(&self, start: Date, end: Option<Date>) -> bool {
        let starts_before_other_ends = end.map_or(true, |end| self.start_date <= end);
        let other_starts_before_self_ends = self.end_date.map_or(true, |own| start <= own);
        starts_before_other_ends && other_starts_before_self_ends
    }
}

/// Data for creating a new assignment.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub employee_id: UserId,
    pub project_code_id: ProjectCodeId,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

impl NewAssignment {
    pub fn new(
        employee_id: impl Into<UserId>,
        project_code_id: impl Into<ProjectCodeId>,
        start_date: Date,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            project_code_id: project_code_id.into(),
            start_date,
            end_date: None,
        }
    }

    pub fn until(mut self, end_date: Date) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn assignment(start: Date, end: Option<Date>) -> ProjectAssignment {
        ProjectAssignment {
            id: AssignmentId::new(1),
            employee_id: UserId::new(1),
            project_code_id: ProjectCodeId::new(1),
            start_date: start,
            end_date: end,
            assigned_by: UserId::new(2),
        }
    }

    #[test]
    fn covers_both_boundaries() {
        let a = assignment(date!(2025 - 01 - 01), Some(date!(2025 - 01 - 31)));

        assert!(a.covers(date!(2025 - 01 - 01)));
        assert!(a.covers(date!(2025 - 01 - 31)));
        assert!(!a.covers(date!(2024 - 12 - 31)));
        assert!(!a.covers(date!(2025 - 02 - 01)));
    }

    #[test]
    fn open_assignment_covers_everything_after_start() {
        let a = assignment(date!(2025 - 01 - 01), None);

        assert!(a.covers(date!(2030 - 06 - 15)));
        assert!(!a.covers(date!(2024 - 12 - 31)));
    }

    #[test]
    fn overlap_detection() {
        let january = assignment(date!(2025 - 01 - 01), Some(date!(2025 - 01 - 31)));

        assert!(january.overlaps(date!(2025 - 01 - 31), None));
        assert!(january.overlaps(date!(2024 - 12 - 01), Some(date!(2025 - 01 - 01))));
        assert!(!january.overlaps(date!(2025 - 02 - 01), None));
        assert!(!january.overlaps(date!(2024 - 12 - 01), Some(date!(2024 - 12 - 31))));

        let open = assignment(date!(2025 - 03 - 01), None);
        assert!(open.overlaps(date!(2026 - 01 - 01), Some(date!(2026 - 01 - 02))));
        assert!(!open.overlaps(date!(2025 - 01 - 01), Some(date!(2025 - 02 - 28))));
    }
}
