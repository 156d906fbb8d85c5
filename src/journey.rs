use std::fmt::Display;

use crate::cost::PathfindingCost;
use crate::network::{ConnectionIndex, LineIndex, StopIndex, Timestamp, TransitGraph};
use crate::search::{Predecessor, PredecessorMap};
use crate::utils;

// One stop on an itinerary, with the time and accumulated cost recorded when it was reached.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub stop: StopIndex,
    pub time: Timestamp,
    pub cost: PathfindingCost,
    // Connection used to get here, `None` for the first step.
    pub connection: Option<ConnectionIndex>,
}

// Consecutive connections ridden on one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leg {
    pub line: LineIndex,
    pub boarded_stop: StopIndex,
    pub boarded_time: Timestamp,
    pub arrival_stop: StopIndex,
    pub arrival_time: Timestamp,
    pub num_connections: usize,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum JourneyError {
    #[error("No journey found.")]
    NotReachable,
    #[error("Infinite loop in journey reconstruction.")]
    InfiniteLoop,
}

pub type JourneyResult<'a> = Result<Journey<'a>, JourneyError>;

pub struct Journey<'a> {
    pub steps: Vec<Step>,
    pub network: &'a TransitGraph,
}

/// Walks the predecessor map back from `end` to `start` and returns the stops in travel order.
///
/// Fails with [`JourneyError::NotReachable`] as soon as a stop on the way back has no recorded
/// predecessor. The walk visits each reached stop at most once.
pub fn reconstruct<'a>(
    network: &'a TransitGraph,
    predecessors: &PredecessorMap,
    start: StopIndex,
    end: StopIndex,
) -> JourneyResult<'a> {
    let max_steps = predecessors.len();
    let mut steps = Vec::new();
    let mut current_stop = end;

    loop {
        if current_stop == start {
            steps.push(Step {
                stop: start,
                time: predecessors.start_time(),
                cost: 0.,
                connection: None,
            });
            break;
        }
        if steps.len() >= max_steps {
            log::error!(
                "Predecessor cycle while walking back from {} to {}.",
                network.get_stop(end).name,
                network.get_stop(start).name
            );
            return Err(JourneyError::InfiniteLoop);
        }

        match predecessors.get(current_stop) {
            Some(Predecessor::Via(entry)) => {
                steps.push(Step {
                    stop: current_stop,
                    time: entry.arrival_time,
                    cost: entry.cost,
                    connection: Some(entry.connection),
                });
                current_stop = entry.predecessor;
            }
            // A start marker on another stop means the map belongs to a different query.
            Some(Predecessor::Start) | None => return Err(JourneyError::NotReachable),
        }
    }

    steps.reverse();
    Ok(Journey { steps, network })
}

impl<'a> Journey<'a> {
    pub fn start_stop(&self) -> Option<StopIndex> {
        self.steps.first().map(|step| step.stop)
    }

    pub fn end_stop(&self) -> Option<StopIndex> {
        self.steps.last().map(|step| step.stop)
    }

    pub fn arrival_time(&self) -> Option<Timestamp> {
        self.steps.last().map(|step| step.time)
    }

    pub fn total_cost(&self) -> PathfindingCost {
        self.steps.last().map_or(0., |step| step.cost)
    }

    pub fn legs(&self) -> Vec<Leg> {
        let mut legs: Vec<Leg> = Vec::new();
        for (previous, step) in self.steps.iter().zip(self.steps.iter().skip(1)) {
            let Some(connection_idx) = step.connection else {
                continue;
            };
            let connection = self.network.get_connection(connection_idx);

            match legs.last_mut() {
                Some(leg) if leg.line == connection.line && leg.arrival_stop == previous.stop => {
                    leg.arrival_stop = step.stop;
                    leg.arrival_time = connection.arrival_time;
                    leg.num_connections += 1;
                }
                _ => legs.push(Leg {
                    line: connection.line,
                    boarded_stop: previous.stop,
                    boarded_time: connection.departure_time,
                    arrival_stop: step.stop,
                    arrival_time: connection.arrival_time,
                    num_connections: 1,
                }),
            }
        }
        legs
    }

    pub fn num_line_changes(&self) -> usize {
        self.legs().len().saturating_sub(1)
    }

    // Number of times the clock goes backwards between consecutive steps.
    pub fn num_midnight_wraps(&self) -> usize {
        self.steps
            .windows(2)
            .filter(|pair| pair[1].time < pair[0].time)
            .count()
    }
}

impl Display for Journey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "-----------------------------------------------")?;
        let legs = self.legs();
        if legs.is_empty() {
            writeln!(f)?;
            writeln!(f, "No travel needed.")?;
        } else {
            for leg in legs.iter() {
                writeln!(f)?;
                writeln!(f,
                         "Board at {} at {} ({} line).",
                         self.network.get_stop(leg.boarded_stop).name,
                         utils::get_short_time_str(leg.boarded_time),
                         self.network.line_name(leg.line),
                )?;
                writeln!(f,
                         "Arrive at {} at {}.",
                         self.network.get_stop(leg.arrival_stop).name,
                         utils::get_short_time_str(leg.arrival_time)
                )?;
            }
            writeln!(f)?;
            writeln!(f, "Line changes: {}, total cost: {}.", legs.len() - 1, self.total_cost())?;
        }
        writeln!(f, "-----------------------------------------------")?;
        Ok(())
    }
}
