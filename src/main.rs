use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;

use transit::cost::PathfindingCost;
use transit::network::Timestamp;
use transit::search::DEFAULT_HEURISTIC_WEIGHT;
use transit::{find_path, loader, reconstruct, utils, Criterion, Query, TransitGraph};

#[derive(Parser, Debug)]
#[command(author, version, about = "Journey planning over a timetabled stop network", long_about = None)]
struct Args {
    /// Connections CSV (line, departure_time, arrival_time, start_stop, end_stop and coordinates)
    #[arg(short, long)]
    connections: PathBuf,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Plan a single journey
    Query {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Departure time, HH:MM or HH:MM:SS
        #[arg(long, value_parser = parse_clock_arg)]
        time: Timestamp,
        #[arg(long, default_value_t = Criterion::EarliestArrival)]
        criterion: Criterion,
        #[arg(long, default_value_t = DEFAULT_HEURISTIC_WEIGHT)]
        weight: PathfindingCost,
        #[arg(long, default_value_t = 1)]
        iterations: u32,
    },
    /// Time queries for every stop pair in a CSV file
    Benchmark {
        #[arg(long)]
        pairs: PathBuf,
        #[arg(long, value_parser = parse_clock_arg, default_value = "13:00:00")]
        time: Timestamp,
        #[arg(long, default_value_t = Criterion::EarliestArrival)]
        criterion: Criterion,
        #[arg(long, default_value_t = DEFAULT_HEURISTIC_WEIGHT)]
        weight: PathfindingCost,
        #[arg(long, default_value_t = 20)]
        iterations: u32,
    },
    /// Write random stop pairs for the benchmark
    ExportPairs {
        #[arg(long, default_value_t = 100)]
        count: usize,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_clock_arg(s: &str) -> Result<Timestamp, String> {
    utils::parse_clock(s).map_err(|e| e.to_string())
}

fn time_query(network: &TransitGraph, query: &Query, iterations: u32) -> Result<Duration, Box<dyn std::error::Error>> {
    let iterations = iterations.max(1);
    let query_start = Instant::now();
    for _ in 0..iterations {
        find_path(network, query)?;
    }
    Ok(query_start.elapsed() / iterations)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let network = loader::load_graph(&args.connections)?;
    network.print_stats();
    println!();

    match args.cmd {
        Command::Query { from, to, time, criterion, weight, iterations } => {
            let query = Query::from_names(&network, &from, &to, time, criterion, weight)?;
            println!("Start: {} at time {}", from, utils::get_time_str(time));
            println!("End: {}", to);
            println!("Criterion: {criterion}");
            println!();

            let elapsed = time_query(&network, &query, iterations)?;
            let predecessors = find_path(&network, &query)?;
            println!("Query took {elapsed:?} ({} labels expanded)", predecessors.labels_expanded());
            match reconstruct(&network, &predecessors, query.start, query.end) {
                Ok(journey) => println!("{journey}"),
                Err(e) => println!("{e}"),
            }
        }
        Command::Benchmark { pairs, time, criterion, weight, iterations } => {
            let pairs = loader::read_stop_pairs(File::open(&pairs)?)?;
            let mut total = Duration::ZERO;
            let mut measured = 0;
            for (from, to) in pairs {
                let query = match Query::from_names(&network, &from, &to, time, criterion, weight) {
                    Ok(query) => query,
                    Err(e) => {
                        log::warn!("Skipping pair: {e}");
                        continue;
                    }
                };
                println!("Path from {from} to {to}");
                let average = time_query(&network, &query, iterations)?;
                println!("Average duration: {average:?}");
                total += average;
                measured += 1;
            }
            if measured > 0 {
                println!("Total average duration: {:?}", total / measured);
            } else {
                println!("No pairs measured.");
            }
        }
        Command::ExportPairs { count, output, seed } => {
            let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
            let mut pairs = Vec::with_capacity(count);
            for _ in 0..count {
                let (Some(from), Some(to)) = (network.random_stop_idx(&mut rng), network.random_stop_idx(&mut rng)) else {
                    break;
                };
                let pair = (network.get_stop(from).name.to_string(), network.get_stop(to).name.to_string());
                println!("{} -> {}", pair.0, pair.1);
                pairs.push(pair);
            }
            loader::write_stop_pairs(File::create(&output)?, &pairs)?;
            println!("Wrote {} pairs to {}.", pairs.len(), output.display());
        }
    }

    Ok(())
}
