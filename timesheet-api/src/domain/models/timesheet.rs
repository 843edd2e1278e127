use std::{fmt, iter::Sum, ops::Add};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::{Date, OffsetDateTime};

use super::{ProjectCodeId, TimesheetId, UserId};
use crate::domain::{TimesheetError, TimesheetResult};

/// Hours worked, stored as hundredths of an hour.
///
/// Matches the `NUMERIC(4,2)` column: two decimal places, no floating point
/// drift when summing a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hours(i32);

impl Hours {
    pub const ZERO: Hours = Hours(0);
    /// Upper bound for a single entry and for one employee's day.
    pub const MAX_PER_DAY: Hours = Hours(24 * 100);

    pub fn from_hundredths(hundredths: i32) -> Self {
        Self(hundredths)
    }

    pub fn whole(hours: i32) -> Self {
        Self(hours * 100)
    }

    /// Parse a decimal hour value, rejecting more than two decimal places.
    pub fn try_from_f64(value: f64) -> TimesheetResult<Self> {
        if !value.is_finite() {
            return Err(TimesheetError::validation("hours must be a finite number"));
        }

        let scaled = value * 100.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 {
            return Err(TimesheetError::validation(
                "hours may have at most two decimal places",
            ));
        }
        if rounded.abs() > f64::from(i32::MAX) {
            return Err(TimesheetError::validation("hours out of range"));
        }

        Ok(Self(rounded as i32))
    }

    pub fn hundredths(self) -> i32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// `0 < hours <= 24`.
    pub fn is_valid_entry(self) -> bool {
        self.0 > 0 && self <= Self::MAX_PER_DAY
    }
}

impl Add for Hours {
    type Output = Hours;

    fn add(self, rhs: Self) -> Self::Output {
        Hours(self.0 + rhs.0)
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Hours::ZERO, Add::add)
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Lifecycle state of a timesheet.
///
/// Stored as its variant name in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum TimesheetStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

/// Something a user tries to do with a timesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TimesheetAction {
    Edit,
    Delete,
    Submit,
    Approve,
    Reject,
}

impl TimesheetStatus {
    /// The status after `action`, or `None` when the action is not allowed.
    pub fn transition(self, action: TimesheetAction) -> Option<TimesheetStatus> {
        use TimesheetAction::*;
        use TimesheetStatus::*;

        match (self, action) {
            (Draft, Edit | Delete) => Some(Draft),
            (Draft, Submit) => Some(Submitted),
            (Draft, Approve | Reject) => None,
            (Submitted, Approve) => Some(Approved),
            (Submitted, Reject) => Some(Rejected),
            (Submitted, Edit | Delete | Submit) => None,
            (Approved | Rejected, Edit | Delete | Submit | Approve | Reject) => None,
        }
    }

    /// Like [`transition`](Self::transition) but as an `InvalidState` error.
    pub fn require(self, action: TimesheetAction) -> TimesheetResult<TimesheetStatus> {
        self.transition(action).ok_or_else(|| {
            TimesheetError::invalid_state(format!(
                "cannot {action} a timesheet that is {}",
                self.to_string().to_lowercase()
            ))
        })
    }

    pub fn is_final(self) -> bool {
        matches!(self, TimesheetStatus::Approved | TimesheetStatus::Rejected)
    }
}

/// One employee's hours against one project code on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timesheet {
    pub id: TimesheetId,
    pub employee_id: UserId,
    pub project_code_id: ProjectCodeId,
    pub work_date: Date,
    pub hours: Hours,
    pub description: String,
    pub status: TimesheetStatus,
    /// Required when the timesheet was rejected.
    pub manager_comments: Option<String>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Timesheet {
    /// Hours that count towards the daily cap: submitted and approved ones.
    pub fn counted_hours(&self) -> Hours {
        match self.status {
            TimesheetStatus::Submitted | TimesheetStatus::Approved => self.hours,
            TimesheetStatus::Draft | TimesheetStatus::Rejected => Hours::ZERO,
        }
    }

    pub fn apply_entry(&mut self, entry: &TimesheetEntry) {
        self.project_code_id = entry.project_code_id;
        self.work_date = entry.work_date;
        self.hours = entry.hours;
        self.description = entry.description.clone();
    }
}

/// Employee input for creating or editing a timesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimesheetEntry {
    pub project_code_id: ProjectCodeId,
    pub work_date: Date,
    pub hours: Hours,
    pub description: String,
}

impl TimesheetEntry {
    pub fn new(project_code_id: impl Into<ProjectCodeId>, work_date: Date, hours: Hours) -> Self {
        Self {
            project_code_id: project_code_id.into(),
            work_date,
            hours,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Data for inserting a timesheet row.
#[derive(Debug, Clone)]
pub struct NewTimesheet {
    pub employee_id: UserId,
    pub entry: TimesheetEntry,
    pub status: TimesheetStatus,
}

/// Review outcome written by a manager.
#[derive(Debug, Clone)]
pub struct Review {
    pub status: TimesheetStatus,
    pub reviewer: UserId,
    pub comments: Option<String>,
    pub reviewed_at: OffsetDateTime,
}

impl Timesheet {
    pub fn apply_review(&mut self, review: Review) {
        self.status = review.status;
        self.reviewed_by = Some(review.reviewer);
        self.reviewed_at = Some(review.reviewed_at);
        self.manager_comments = review.comments;
    }
}
