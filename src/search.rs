use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt::Display;
use std::str::FromStr;

use crate::cost::{CostModel, PathfindingCost};
use crate::network::{ConnectionIndex, LineIndex, Stop, StopIndex, Timestamp, TransitGraph};
use crate::selector::{Selector, TimeField};

// Heuristic weight used when none is given, matching the usual A* time-criteria runs.
pub const DEFAULT_HEURISTIC_WEIGHT: PathfindingCost = 10.;

/// Estimate of the remaining cost from a candidate stop to the target stop.
pub type Heuristic = fn(&Stop, &Stop) -> PathfindingCost;

pub fn no_heuristic(_: &Stop, _: &Stop) -> PathfindingCost {
    0.
}

// Taxicab distance in degrees of latitude and longitude.
pub fn manhattan_distance(a: &Stop, b: &Stop) -> PathfindingCost {
    (a.latitude - b.latitude).abs() + (a.longitude - b.longitude).abs()
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Unknown stop: {0}.")]
    UnknownStop(String),
    #[error("Heuristic weight must be finite and non-negative, got {0}.")]
    InvalidHeuristicWeight(PathfindingCost),
}

/// A frontier element. Clock and line travel with the cost so the selector can make time and
/// continuity aware choices at each expansion.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub stop: StopIndex,
    pub cost: PathfindingCost,
    pub time: Timestamp,
    pub line: Option<LineIndex>,
}

/// Parameters of the generic best-first search.
///
/// `early_termination` stops the search the first time the target leaves the frontier. That only
/// yields optimal paths when the heuristic never overestimates and the cost grows with the clock.
/// It is unsafe with [`CostModel::LineChanges`].
#[derive(Clone, Copy, Debug)]
pub struct SearchConfig {
    pub selector: Selector,
    pub cost_model: CostModel,
    pub heuristic: Heuristic,
    pub heuristic_weight: PathfindingCost,
    pub early_termination: bool,
}

/// Optimisation criterion of a journey query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Criterion {
    /// Earliest arrival without a heuristic.
    Dijkstra,
    /// Earliest arrival, A* guided by the spatial distance to the target.
    EarliestArrival,
    /// Fewest line changes, keeping to the current line whenever possible.
    MinimizeTransfers,
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [Criterion::Dijkstra, Criterion::EarliestArrival, Criterion::MinimizeTransfers];

    pub fn config(self, heuristic_weight: PathfindingCost) -> SearchConfig {
        match self {
            Criterion::Dijkstra => SearchConfig {
                selector: Selector::EarliestFeasible(TimeField::Arrival),
                cost_model: CostModel::ElapsedTime(TimeField::Arrival),
                heuristic: no_heuristic,
                heuristic_weight: 1.,
                early_termination: true,
            },
            Criterion::EarliestArrival => SearchConfig {
                selector: Selector::EarliestFeasible(TimeField::Arrival),
                cost_model: CostModel::ElapsedTime(TimeField::Arrival),
                heuristic: manhattan_distance,
                heuristic_weight,
                early_termination: true,
            },
            Criterion::MinimizeTransfers => SearchConfig {
                selector: Selector::SameLinePreferred(TimeField::Arrival),
                cost_model: CostModel::LineChanges,
                heuristic: manhattan_distance,
                heuristic_weight,
                early_termination: false,
            },
        }
    }
}

impl FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "dijkstra" => Ok(Criterion::Dijkstra),
            "t" | "time" | "earliest-arrival" => Ok(Criterion::EarliestArrival),
            "p" | "transfers" | "minimize-transfers" => Ok(Criterion::MinimizeTransfers),
            other => Err(format!(
                "unknown criterion \"{other}\" (expected dijkstra, earliest-arrival or minimize-transfers)"
            )),
        }
    }
}

impl Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Criterion::Dijkstra => "dijkstra",
            Criterion::EarliestArrival => "earliest-arrival",
            Criterion::MinimizeTransfers => "minimize-transfers",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub start: StopIndex,
    pub end: StopIndex,
    pub start_time: Timestamp,
    pub criterion: Criterion,
    pub heuristic_weight: PathfindingCost,
}

impl Query {
    pub fn from_names(
        network: &TransitGraph,
        start: &str,
        end: &str,
        start_time: Timestamp,
        criterion: Criterion,
        heuristic_weight: PathfindingCost,
    ) -> Result<Self, QueryError> {
        let resolve = |name: &str| {
            network
                .get_stop_idx(name)
                .ok_or_else(|| QueryError::UnknownStop(name.to_owned()))
        };
        Ok(Self {
            start: resolve(start)?,
            end: resolve(end)?,
            start_time,
            criterion,
            heuristic_weight,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PredecessorEntry {
    pub predecessor: StopIndex,
    pub arrival_time: Timestamp,
    pub cost: PathfindingCost,
    pub connection: ConnectionIndex,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predecessor {
    Start,
    Via(PredecessorEntry),
}

/// How each reached stop was best reached during one query.
#[derive(Clone, Debug)]
pub struct PredecessorMap {
    pub(crate) start: StopIndex,
    pub(crate) start_time: Timestamp,
    pub(crate) entries: HashMap<StopIndex, Predecessor>,
    pub(crate) labels_expanded: usize,
}

impl PredecessorMap {
    fn new(start: StopIndex, start_time: Timestamp) -> Self {
        Self {
            start,
            start_time,
            entries: HashMap::from([(start, Predecessor::Start)]),
            labels_expanded: 0,
        }
    }

    pub fn start(&self) -> StopIndex { self.start }

    pub fn start_time(&self) -> Timestamp { self.start_time }

    pub fn get(&self, stop: StopIndex) -> Option<&Predecessor> { self.entries.get(&stop) }

    pub fn is_reached(&self, stop: StopIndex) -> bool { self.entries.contains_key(&stop) }

    pub fn cost_to(&self, stop: StopIndex) -> Option<PathfindingCost> {
        self.get(stop).map(|predecessor| match predecessor {
            Predecessor::Start => 0.,
            Predecessor::Via(entry) => entry.cost,
        })
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn labels_expanded(&self) -> usize { self.labels_expanded }
}

struct FrontierEntry {
    priority: PathfindingCost,
    sequence: u64,
    label: Label,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap pops the lowest priority, oldest entry first.
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

// Runs one of the standing criteria.
pub fn find_path(network: &TransitGraph, query: &Query) -> Result<PredecessorMap, QueryError> {
    let config = query.criterion.config(query.heuristic_weight);
    search(network, query.start, query.end, query.start_time, &config)
}

/// Label-correcting best-first search from `start` towards `end`.
///
/// With a zero heuristic this is Dijkstra, otherwise weighted A*. Stops that were never reached
/// have no entry in the returned map.
pub fn search(
    network: &TransitGraph,
    start: StopIndex,
    end: StopIndex,
    start_time: Timestamp,
    config: &SearchConfig,
) -> Result<PredecessorMap, QueryError> {
    for stop in [start, end] {
        if !network.contains_stop(stop) {
            return Err(QueryError::UnknownStop(format!("#{stop}")));
        }
    }
    let weight = config.heuristic_weight;
    if !weight.is_finite() || weight < 0. {
        return Err(QueryError::InvalidHeuristicWeight(weight));
    }
    if config.early_termination && !config.cost_model.is_time_monotone() {
        log::warn!(
            "Early termination with {:?} may return a suboptimal path.",
            config.cost_model
        );
    }

    let target = network.get_stop(end);
    let priority_of = |stop: StopIndex, cost: PathfindingCost| {
        cost + weight * (config.heuristic)(network.get_stop(stop), target)
    };

    let mut predecessors = PredecessorMap::new(start, start_time);
    let mut best_cost = HashMap::from([(start, 0.)]);
    let mut frontier = BinaryHeap::new();
    let mut sequence = 0;
    frontier.push(FrontierEntry {
        priority: priority_of(start, 0.),
        sequence,
        label: Label {
            stop: start,
            cost: 0.,
            time: start_time,
            line: None,
        },
    });

    while let Some(FrontierEntry { label, .. }) = frontier.pop() {
        predecessors.labels_expanded += 1;
        if config.early_termination && label.stop == end {
            break;
        }

        for &next in network.direct_neighbours(label.stop) {
            if next == label.stop {
                continue;
            }

            let connection_idx = match config.selector.select(network, label.stop, next, label.time, label.line) {
                Ok(connection_idx) => connection_idx,
                Err(e) => {
                    log::trace!("{e}");
                    continue;
                }
            };
            let connection = network.get_connection(connection_idx);
            let new_cost = label.cost + config.cost_model.edge_cost(label.time, label.line, connection);

            if best_cost.get(&next).is_some_and(|&cost| new_cost >= cost) {
                continue;
            }
            best_cost.insert(next, new_cost);

            sequence += 1;
            frontier.push(FrontierEntry {
                priority: priority_of(next, new_cost),
                sequence,
                label: Label {
                    stop: next,
                    cost: new_cost,
                    time: connection.arrival_time,
                    line: Some(connection.line),
                },
            });

            // Never point a stop back at the stop it was itself reached from.
            let links_back = matches!(
                predecessors.get(label.stop),
                Some(Predecessor::Via(entry)) if entry.predecessor == next
            );
            if !links_back {
                predecessors.entries.insert(
                    next,
                    Predecessor::Via(PredecessorEntry {
                        predecessor: label.stop,
                        arrival_time: connection.arrival_time,
                        cost: new_cost,
                        connection: connection_idx,
                    }),
                );
            }
        }
    }

    log::debug!(
        "Searched from {} to {}: expanded {} labels, reached {} stops, target {}.",
        network.get_stop(start).name,
        target.name,
        predecessors.labels_expanded,
        predecessors.len(),
        if predecessors.is_reached(end) { "reached" } else { "not reached" }
    );

    Ok(predecessors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ConnectionRecord;
    use crate::utils::parse_clock;

    fn clock(s: &str) -> Timestamp {
        parse_clock(s).unwrap()
    }

    // (line, departure, arrival, origin, destination), stops laid out on a diagonal.
    fn network(stops: &[&str], connections: &[(&str, &str, &str, &str, &str)]) -> TransitGraph {
        let stops: Vec<_> = stops
            .iter()
            .enumerate()
            .map(|(i, &name)| Stop::new(name, 51. + i as f64 * 0.001, 17. + i as f64 * 0.001))
            .collect();
        let find = |name: &str| stops.iter().find(|s| s.name.as_ref() == name).unwrap().clone();
        let records: Vec<_> = connections
            .iter()
            .map(|&(line, departure, arrival, origin, destination)| ConnectionRecord {
                line: line.to_owned(),
                departure_time: clock(departure),
                arrival_time: clock(arrival),
                origin: find(origin),
                destination: find(destination),
            })
            .collect();
        TransitGraph::new(stops.clone(), &records)
    }

    fn query(network: &TransitGraph, from: &str, to: &str, time: &str, criterion: Criterion) -> PredecessorMap {
        let query = Query::from_names(network, from, to, clock(time), criterion, 1.).unwrap();
        find_path(network, &query).unwrap()
    }

    #[test]
    fn seeds_start_with_terminal_marker() {
        let network = network(&["A", "B"], &[]);
        let map = query(&network, "A", "B", "08:00", Criterion::Dijkstra);
        assert_eq!(map.get(0), Some(&Predecessor::Start));
        assert_eq!(map.cost_to(0), Some(0.));
        assert!(!map.is_reached(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.start_time(), clock("08:00"));
    }

    #[test]
    fn dijkstra_prefers_earlier_arrival_over_fewer_hops() {
        let network = network(
            &["A", "B", "C"],
            &[
                ("direct", "08:00", "09:30", "A", "C"),
                ("1", "08:00", "08:10", "A", "B"),
                ("2", "08:20", "08:40", "B", "C"),
            ],
        );
        let map = query(&network, "A", "C", "07:50", Criterion::Dijkstra);
        assert_eq!(map.cost_to(2), Some(50.));
        let Some(Predecessor::Via(entry)) = map.get(2) else { panic!("C not reached") };
        assert_eq!(entry.predecessor, 1);
        assert_eq!(entry.arrival_time, clock("08:40"));
    }

    #[test]
    fn transfers_search_counts_boardings() {
        let network = network(
            &["A", "B", "C"],
            &[
                ("1", "08:00", "08:10", "A", "B"),
                ("1", "08:15", "08:40", "B", "C"),
                ("2", "08:12", "08:30", "B", "C"),
            ],
        );
        let map = query(&network, "A", "C", "07:50", Criterion::MinimizeTransfers);
        assert_eq!(map.cost_to(1), Some(1.));
        assert_eq!(map.cost_to(2), Some(1.));
        let Some(Predecessor::Via(entry)) = map.get(2) else { panic!("C not reached") };
        assert_eq!(network.line_name(network.get_connection(entry.connection).line), "1");
    }

    #[test]
    fn self_loops_are_skipped() {
        let network = network(
            &["A", "B"],
            &[("loop", "08:00", "08:05", "A", "A"), ("1", "08:00", "08:10", "A", "B")],
        );
        let map = query(&network, "A", "B", "07:00", Criterion::Dijkstra);
        assert_eq!(map.get(0), Some(&Predecessor::Start));
        assert_eq!(map.cost_to(1), Some(70.));
    }

    #[test]
    fn two_cycle_keeps_start_terminal() {
        let network = network(
            &["A", "B"],
            &[("1", "08:00", "08:10", "A", "B"), ("2", "08:11", "08:12", "B", "A")],
        );
        let config = SearchConfig {
            early_termination: false,
            ..Criterion::Dijkstra.config(0.)
        };
        let map = search(&network, 0, 1, clock("08:00"), &config).unwrap();
        assert_eq!(map.get(0), Some(&Predecessor::Start));
        assert!(matches!(map.get(1), Some(Predecessor::Via(entry)) if entry.predecessor == 0));
    }

    #[test]
    fn rejects_unknown_stops_and_bad_weights() {
        let network = network(&["A", "B"], &[]);
        assert_eq!(
            Query::from_names(&network, "A", "Nowhere", 0, Criterion::Dijkstra, 1.),
            Err(QueryError::UnknownStop("Nowhere".to_owned()))
        );
        let config = Criterion::Dijkstra.config(1.);
        assert!(matches!(search(&network, 0, 9, 0, &config), Err(QueryError::UnknownStop(_))));

        let config = Criterion::EarliestArrival.config(-1.);
        assert_eq!(
            search(&network, 0, 1, 0, &config).unwrap_err(),
            QueryError::InvalidHeuristicWeight(-1.)
        );
        let config = Criterion::EarliestArrival.config(PathfindingCost::NAN);
        assert!(search(&network, 0, 1, 0, &config).is_err());
    }

    #[test]
    fn criteria_parse_from_cli_names() {
        assert_eq!("t".parse::<Criterion>(), Ok(Criterion::EarliestArrival));
        assert_eq!("p".parse::<Criterion>(), Ok(Criterion::MinimizeTransfers));
        assert_eq!("D".parse::<Criterion>(), Ok(Criterion::Dijkstra));
        for criterion in Criterion::ALL {
            assert_eq!(criterion.to_string().parse::<Criterion>(), Ok(criterion));
        }
        assert!("fastest".parse::<Criterion>().is_err());
    }

    #[test]
    fn transfer_search_never_terminates_early() {
        assert!(!Criterion::MinimizeTransfers.config(1.).early_termination);
        assert!(Criterion::EarliestArrival.config(1.).early_termination);
        assert_eq!((Criterion::Dijkstra.config(5.).heuristic)(&Stop::new("A", 0., 0.), &Stop::new("B", 3., 4.)), 0.);
        assert_eq!(manhattan_distance(&Stop::new("A", 0., 0.), &Stop::new("B", 3., -4.)), 7.);
    }

    #[test]
    fn frontier_pops_lowest_priority_then_oldest() {
        let label = |stop| Label { stop, cost: 0., time: 0, line: None };
        let mut heap = BinaryHeap::new();
        heap.push(FrontierEntry { priority: 5., sequence: 0, label: label(0) });
        heap.push(FrontierEntry { priority: 1., sequence: 2, label: label(1) });
        heap.push(FrontierEntry { priority: 1., sequence: 1, label: label(2) });
        let order: Vec<_> = std::iter::from_fn(|| heap.pop().map(|e| e.label.stop)).collect();
        assert_eq!(order, [2, 1, 0]);
    }
}
