use transit::search::DEFAULT_HEURISTIC_WEIGHT;
use transit::{find_path, reconstruct, Criterion, Query};

use dev_utils::get_example_scenario;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (network, start_time) = get_example_scenario();
    network.print_stats();

    let query = Query::from_names(&network, "G0-0", "G11-11", start_time, Criterion::EarliestArrival, DEFAULT_HEURISTIC_WEIGHT)?;
    let predecessors = find_path(&network, &query)?;

    if let Ok(journey) = reconstruct(&network, &predecessors, query.start, query.end) {
        println!("{journey}");
    } else {
        println!("No journey found.");
    }

    Ok(())
}
