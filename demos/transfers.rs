use transit::search::DEFAULT_HEURISTIC_WEIGHT;
use transit::{find_path, reconstruct, Criterion, Query};

use dev_utils::{get_continuation_network, get_example_start_time};

// Compares the fastest journey with the one that avoids changing lines.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let network = get_continuation_network();
    network.print_stats();

    for criterion in [Criterion::EarliestArrival, Criterion::MinimizeTransfers] {
        let query = Query::from_names(&network, "A", "C", get_example_start_time(), criterion, DEFAULT_HEURISTIC_WEIGHT)?;
        let predecessors = find_path(&network, &query)?;
        let journey = reconstruct(&network, &predecessors, query.start, query.end)?;
        println!();
        println!("Criterion: {criterion} ({} line changes)", journey.num_line_changes());
        println!("{journey}");
    }

    Ok(())
}
