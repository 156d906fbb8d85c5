use crate::network::{Connection, ConnectionIndex, LineIndex, StopIndex, Timestamp, TransitGraph};

// Gap given to a connection whose relevant time is not after the current clock.
// Such connections are only taken when nothing on the edge is still ahead of the clock.
pub const NO_FORWARD_GAP: Timestamp = Timestamp::MAX;

/// Which clock field of a connection the selector and the cost model look at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeField {
    Arrival,
    Departure,
}

impl TimeField {
    pub fn of(self, connection: &Connection) -> Timestamp {
        match self {
            TimeField::Arrival => connection.arrival_time,
            TimeField::Departure => connection.departure_time,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No connection from stop {origin} to stop {destination}.")]
    NoFeasibleConnection {
        origin: StopIndex,
        destination: StopIndex,
    },
}

/// Policy for picking one scheduled connection when a search crosses an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector {
    /// Smallest strictly positive gap between the clock and the connection's time field.
    EarliestFeasible(TimeField),
    /// Stay on the current line whenever it serves the edge, whatever its timing.
    /// Falls back to [`Selector::EarliestFeasible`] otherwise.
    SameLinePreferred(TimeField),
}

impl Selector {
    pub fn time_field(self) -> TimeField {
        match self {
            Selector::EarliestFeasible(field) | Selector::SameLinePreferred(field) => field,
        }
    }

    pub fn select(
        self,
        network: &TransitGraph,
        origin: StopIndex,
        destination: StopIndex,
        time: Timestamp,
        line: Option<LineIndex>,
    ) -> Result<ConnectionIndex, SelectionError> {
        let candidates = network.connections_between(origin, destination);
        let field = self.time_field();

        let chosen = match (self, line) {
            (Selector::SameLinePreferred(_), Some(line)) => earliest_feasible(
                network,
                candidates
                    .iter()
                    .copied()
                    .filter(|&c| network.get_connection(c).line == line),
                field,
                time,
            )
            .or_else(|| earliest_feasible(network, candidates.iter().copied(), field, time)),
            _ => earliest_feasible(network, candidates.iter().copied(), field, time),
        };

        chosen.ok_or(SelectionError::NoFeasibleConnection { origin, destination })
    }
}

pub fn forward_gap(connection_time: Timestamp, time: Timestamp) -> Timestamp {
    if connection_time > time {
        connection_time - time
    } else {
        NO_FORWARD_GAP
    }
}

// Ties on the gap go to the earliest absolute time, then to the line name, then to load order.
fn earliest_feasible(
    network: &TransitGraph,
    candidates: impl Iterator<Item = ConnectionIndex>,
    field: TimeField,
    time: Timestamp,
) -> Option<ConnectionIndex> {
    candidates.min_by(|&a, &b| {
        let (ca, cb) = (network.get_connection(a), network.get_connection(b));
        let (ta, tb) = (field.of(ca), field.of(cb));
        forward_gap(ta, time)
            .cmp(&forward_gap(tb, time))
            .then(ta.cmp(&tb))
            .then_with(|| network.line_name(ca.line).cmp(network.line_name(cb.line)))
            .then(a.cmp(&b))
    })
}
