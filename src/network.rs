use std::collections::HashMap;

pub type Timestamp = u32;
pub type StopIndex = u32;
pub type LineIndex = u32;
pub type ConnectionIndex = u32;

// Stops are identified by name when the network is loaded. The index handed out for a name is the
// stop's identity from then on, so coordinates are only display/heuristic data.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub name: Box<str>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Stop {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

// One scheduled trip segment between two adjacent stops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub line: LineIndex,
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
    pub origin: StopIndex,
    pub destination: StopIndex,
}

// A connection as it comes out of a loader, with its endpoints given as stops.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionRecord {
    pub line: String,
    pub departure_time: Timestamp,
    pub arrival_time: Timestamp,
    pub origin: Stop,
    pub destination: Stop,
}

/// Mutable load phase of a [`TransitGraph`].
///
/// Stops must be registered before any connection that references them. A connection whose
/// origin or destination is unknown is dropped.
#[derive(Default)]
pub struct GraphBuilder {
    stops: Vec<Stop>,
    stop_index: HashMap<Box<str>, StopIndex>,
    lines: Vec<Box<str>>,
    line_index: HashMap<Box<str>, LineIndex>,
    connections: Vec<Connection>,
    edges: HashMap<(StopIndex, StopIndex), Vec<ConnectionIndex>>,
    num_dropped: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // Registering a name twice keeps the first index but takes the latest coordinates.
    pub fn add_stop(&mut self, stop: Stop) -> StopIndex {
        if let Some(&stop_idx) = self.stop_index.get(&stop.name) {
            let existing = &mut self.stops[stop_idx as usize];
            if existing.latitude != stop.latitude || existing.longitude != stop.longitude {
                log::warn!(
                    "Stop \"{}\" registered again at ({}, {}), previously ({}, {}). Stops are keyed by name, keeping the latest coordinates.",
                    stop.name,
                    stop.latitude,
                    stop.longitude,
                    existing.latitude,
                    existing.longitude
                );
            }
            *existing = stop;
            return stop_idx;
        }

        let stop_idx = self.stops.len() as StopIndex;
        self.stop_index.insert(stop.name.clone(), stop_idx);
        self.stops.push(stop);
        stop_idx
    }

    pub fn add_connection(&mut self, record: &ConnectionRecord) -> Option<ConnectionIndex> {
        let (Some(&origin), Some(&destination)) = (
            self.stop_index.get(record.origin.name.as_ref()),
            self.stop_index.get(record.destination.name.as_ref()),
        ) else {
            self.num_dropped += 1;
            log::debug!(
                "Dropping {} connection {} -> {}: endpoint not registered.",
                record.line,
                record.origin.name,
                record.destination.name
            );
            return None;
        };

        let line = self.intern_line(&record.line);
        let connection = Connection {
            line,
            departure_time: record.departure_time,
            arrival_time: record.arrival_time,
            origin,
            destination,
        };

        let pair = self.edges.entry((origin, destination)).or_default();
        // Parallel connections form a set, an identical one is not stored twice.
        if let Some(&existing) = pair
            .iter()
            .find(|&&idx| self.connections[idx as usize] == connection)
        {
            return Some(existing);
        }

        let connection_idx = self.connections.len() as ConnectionIndex;
        self.connections.push(connection);
        pair.push(connection_idx);
        Some(connection_idx)
    }

    pub fn num_dropped(&self) -> usize {
        self.num_dropped
    }

    fn intern_line(&mut self, line: &str) -> LineIndex {
        if let Some(&line_idx) = self.line_index.get(line) {
            return line_idx;
        }
        let line_idx = self.lines.len() as LineIndex;
        self.lines.push(line.into());
        self.line_index.insert(line.into(), line_idx);
        line_idx
    }

    pub fn build(self) -> TransitGraph {
        let Self {
            stops,
            stop_index,
            lines,
            connections,
            mut edges,
            num_dropped,
            ..
        } = self;

        if num_dropped > 0 {
            log::warn!("Dropped {num_dropped} connections with unregistered endpoints.");
        }

        let mut neighbours = vec![Vec::new(); stops.len()];
        for (&(origin, destination), candidates) in edges.iter_mut() {
            neighbours[origin as usize].push(destination);

            // Keep candidate order independent of insertion order.
            candidates.sort_unstable_by(|&a, &b| {
                let (a, b) = (&connections[a as usize], &connections[b as usize]);
                a.arrival_time
                    .cmp(&b.arrival_time)
                    .then(a.departure_time.cmp(&b.departure_time))
                    .then_with(|| lines[a.line as usize].cmp(&lines[b.line as usize]))
            });
        }
        for stop_neighbours in neighbours.iter_mut() {
            stop_neighbours.sort_unstable();
            stop_neighbours.dedup();
        }

        let graph = TransitGraph {
            stops,
            stop_index,
            lines,
            connections,
            edges,
            neighbours,
        };
        log::debug!(
            "Built transit graph with {} stops, {} connections and {} lines.",
            graph.num_stops(),
            graph.num_connections(),
            graph.num_lines()
        );
        graph
    }
}

/// Read-only transit network.
///
/// Only [`GraphBuilder`] can change a network. Once built, a graph has no mutating methods and can
/// be shared between threads running independent queries.
pub struct TransitGraph {
    stops: Vec<Stop>,
    stop_index: HashMap<Box<str>, StopIndex>,
    lines: Vec<Box<str>>,
    connections: Vec<Connection>,
    edges: HashMap<(StopIndex, StopIndex), Vec<ConnectionIndex>>,
    neighbours: Vec<Vec<StopIndex>>,
}

impl TransitGraph {
    // Registers every stop, then every connection. Connections with unknown endpoints are dropped.
    pub fn new(stops: impl IntoIterator<Item = Stop>, connections: &[ConnectionRecord]) -> Self {
        let mut builder = GraphBuilder::new();
        for stop in stops {
            builder.add_stop(stop);
        }
        for connection in connections {
            builder.add_connection(connection);
        }
        builder.build()
    }

    pub fn num_stops(&self) -> usize { self.stops.len() }

    pub fn num_connections(&self) -> usize { self.connections.len() }

    pub fn num_lines(&self) -> usize { self.lines.len() }

    pub fn stops(&self) -> &[Stop] { &self.stops }

    pub fn contains_stop(&self, stop: StopIndex) -> bool { (stop as usize) < self.stops.len() }

    pub fn get_stop(&self, stop: StopIndex) -> &Stop { &self.stops[stop as usize] }

    pub fn get_connection(&self, connection: ConnectionIndex) -> &Connection {
        &self.connections[connection as usize]
    }

    pub fn line_name(&self, line: LineIndex) -> &str { &self.lines[line as usize] }

    pub fn get_stop_idx(&self, name: &str) -> Option<StopIndex> {
        self.stop_index.get(name).copied()
    }

    pub fn lookup(&self, name: &str) -> Option<&Stop> {
        self.get_stop_idx(name).map(|stop| self.get_stop(stop))
    }

    pub fn direct_neighbours(&self, stop: StopIndex) -> &[StopIndex] {
        self.neighbours
            .get(stop as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // Every scheduled connection from `origin` to `destination`, ordered by arrival time.
    pub fn connections_between(&self, origin: StopIndex, destination: StopIndex) -> &[ConnectionIndex] {
        self.edges
            .get(&(origin, destination))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn random_stop_idx(&self, rng: &mut fastrand::Rng) -> Option<StopIndex> {
        if self.stops.is_empty() {
            None
        } else {
            Some(rng.usize(..self.stops.len()) as StopIndex)
        }
    }

    pub fn print_stats(&self) {
        println!(
            "Network with {} stops, {} lines and {} connections.",
            self.num_stops(),
            self.num_lines(),
            self.num_connections()
        );
    }
}
