use crate::network::{Connection, LineIndex, Timestamp};
use crate::selector::TimeField;
use crate::utils::END_OF_DAY;

pub type PathfindingCost = f64;

// Whole minutes from `from` to `to`, truncated toward zero. Negative when `to` is earlier.
pub fn elapsed_minutes(from: Timestamp, to: Timestamp) -> i64 {
    (i64::from(to) - i64::from(from)) / 60
}

/// Minutes spent between the clock and the connection time.
///
/// A connection that is not ahead of the clock is assumed to run after midnight. Its cost is the
/// size of the backwards gap plus the minutes left until 23:59:59. This is not a true day-wrapped
/// duration, only an approximation for single-day timetables.
pub fn time_cost(time: Timestamp, connection_time: Timestamp) -> PathfindingCost {
    let minutes = elapsed_minutes(time, connection_time);
    let minutes = if minutes > 0 {
        minutes
    } else {
        minutes.abs() + elapsed_minutes(time.min(END_OF_DAY), END_OF_DAY)
    };
    minutes as PathfindingCost
}

pub fn change_cost(line: Option<LineIndex>, connection: &Connection) -> PathfindingCost {
    if line == Some(connection.line) {
        0.
    } else {
        1.
    }
}

/// Edge cost function used by the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CostModel {
    ElapsedTime(TimeField),
    LineChanges,
}

impl CostModel {
    pub fn edge_cost(self, time: Timestamp, line: Option<LineIndex>, connection: &Connection) -> PathfindingCost {
        match self {
            CostModel::ElapsedTime(field) => time_cost(time, field.of(connection)),
            CostModel::LineChanges => change_cost(line, connection),
        }
    }

    // Whether cost can only grow along a path in step with the clock, so stopping at the first
    // settled target is safe.
    pub fn is_time_monotone(self) -> bool {
        matches!(self, CostModel::ElapsedTime(_))
    }
}
