use rayon::prelude::*;

use transit::network::{ConnectionRecord, Stop, Timestamp};
use transit::search::QueryError;
use transit::{find_path, utils, PredecessorMap, Query, TransitGraph};

// Synthetic networks and scenarios shared by the benchmarks, demos and integration tests.

pub fn clock(s: &str) -> Timestamp {
    utils::parse_clock(s).unwrap()
}

pub fn connection(line: &str, departure: &str, arrival: &str, origin: &Stop, destination: &Stop) -> ConnectionRecord {
    timed_connection(line, clock(departure), clock(arrival), origin, destination)
}

pub fn timed_connection(line: &str, departure: Timestamp, arrival: Timestamp, origin: &Stop, destination: &Stop) -> ConnectionRecord {
    ConnectionRecord {
        line: line.to_owned(),
        departure_time: departure,
        arrival_time: arrival,
        origin: origin.clone(),
        destination: destination.clone(),
    }
}

fn abc_stops() -> [Stop; 3] {
    [
        Stop::new("A", 51.100, 17.000),
        Stop::new("B", 51.105, 17.010),
        Stop::new("C", 51.110, 17.020),
    ]
}

// A -> B on line 1, then B -> C on line 1 (arrives first) or line 2.
pub fn get_example_network() -> TransitGraph {
    let [a, b, c] = abc_stops();
    let connections = [
        connection("1", "08:00", "08:10", &a, &b),
        connection("1", "08:15", "08:25", &b, &c),
        connection("2", "08:12", "08:30", &b, &c),
    ];
    TransitGraph::new([a, b, c], &connections)
}

// Same stops, but staying on line 1 now arrives ten minutes after switching to line 2.
pub fn get_continuation_network() -> TransitGraph {
    let [a, b, c] = abc_stops();
    let connections = [
        connection("1", "08:00", "08:10", &a, &b),
        connection("1", "08:15", "08:40", &b, &c),
        connection("2", "08:12", "08:30", &b, &c),
    ];
    TransitGraph::new([a, b, c], &connections)
}

pub fn get_example_start_time() -> Timestamp {
    clock("07:50")
}

// Minutes reserved for the arrivals at each stop of a banded network.
pub const BAND_MINUTES: u32 = 100;

fn band_time(rng: &mut fastrand::Rng, band: usize) -> Timestamp {
    (band as u32 * BAND_MINUTES + rng.u32(..BAND_MINUTES - 10)) * 60
}

fn random_stops(rng: &mut fastrand::Rng, num_stops: usize) -> Vec<Stop> {
    // Coordinates stay within a few hundredths of a degree so a weighted Manhattan distance is
    // worth less than a minute of travel.
    (0..num_stops)
        .map(|i| Stop::new(&format!("S{i}"), 51. + rng.f64() * 0.05, 17. + rng.f64() * 0.05))
        .collect()
}

/// Random acyclic network over `num_stops` stops named `S0..`.
///
/// Edges only go from a lower to a higher stop number, and every connection into stop `j` arrives
/// inside the `j`-th band of [`BAND_MINUTES`]. A search from `S0` at midnight therefore never
/// has to wrap past the end of the day, and all times are whole minutes.
pub fn random_banded_network(rng: &mut fastrand::Rng, num_stops: usize, edge_probability: f64, num_lines: usize) -> TransitGraph {
    assert!(num_stops * BAND_MINUTES as usize <= 24 * 60, "Too many stops for one day of bands.");
    let stops = random_stops(rng, num_stops);

    let mut connections = Vec::new();
    for origin in 0..num_stops {
        for destination in (origin + 1)..num_stops {
            if rng.f64() >= edge_probability {
                continue;
            }
            for _ in 0..rng.usize(1..=3) {
                let arrival = band_time(rng, destination);
                let departure = arrival - rng.u32(1..=20) * 60;
                let line = format!("L{}", rng.usize(..num_lines.max(1)));
                connections.push(timed_connection(&line, departure, arrival, &stops[origin], &stops[destination]));
            }
        }
    }
    TransitGraph::new(stops, &connections)
}

/// Chain `S0 -> S1 -> ... ` where every line runs a single trip over the whole chain.
pub fn random_line_chain(rng: &mut fastrand::Rng, num_stops: usize, num_lines: usize) -> TransitGraph {
    assert!(num_stops * BAND_MINUTES as usize <= 24 * 60, "Too many stops for one day of bands.");
    let stops = random_stops(rng, num_stops);

    let mut connections = Vec::new();
    for line in 0..num_lines {
        let line = format!("L{line}");
        for origin in 0..num_stops.saturating_sub(1) {
            let arrival = band_time(rng, origin + 1);
            let departure = arrival - rng.u32(1..=20) * 60;
            connections.push(timed_connection(&line, departure, arrival, &stops[origin], &stops[origin + 1]));
        }
    }
    TransitGraph::new(stops, &connections)
}

/// Square grid of stops with a line along every row and column, both directions.
///
/// Each line runs `trips` trips from 06:00, one every `headway_minutes`, taking two minutes per hop.
pub fn grid_network(size: usize, trips: usize, headway_minutes: u32) -> TransitGraph {
    let stop_at = |row: usize, col: usize| Stop::new(&format!("G{row}-{col}"), 51. + row as f64 * 0.005, 17. + col as f64 * 0.008);
    let stops: Vec<_> = (0..size)
        .flat_map(|row| (0..size).map(move |col| (row, col)))
        .map(|(row, col)| stop_at(row, col))
        .collect();

    let mut routes: Vec<(String, Vec<usize>)> = Vec::new();
    for i in 0..size {
        let row: Vec<_> = (0..size).map(|col| i * size + col).collect();
        let col: Vec<_> = (0..size).map(|row| row * size + i).collect();
        routes.push((format!("R{i}"), row.clone()));
        routes.push((format!("R{i}'"), row.into_iter().rev().collect()));
        routes.push((format!("C{i}"), col.clone()));
        routes.push((format!("C{i}'"), col.into_iter().rev().collect()));
    }

    let mut connections = Vec::new();
    for (line, route) in routes.iter() {
        for trip in 0..trips {
            let mut time = (6 * 60 + trip as u32 * headway_minutes) * 60;
            for hop in route.windows(2) {
                let departure = time % utils::SECONDS_PER_DAY;
                time += 2 * 60;
                let arrival = time % utils::SECONDS_PER_DAY;
                connections.push(timed_connection(line, departure, arrival, &stops[hop[0]], &stops[hop[1]]));
            }
        }
    }
    TransitGraph::new(stops, &connections)
}

pub fn get_example_scenario() -> (TransitGraph, Timestamp) {
    (grid_network(12, 40, 15), clock("08:30"))
}

// Runs independent queries against one shared network in parallel.
pub fn par_find_paths(network: &TransitGraph, queries: &[Query]) -> Vec<Result<PredecessorMap, QueryError>> {
    queries.par_iter().map(|query| find_path(network, query)).collect()
}
