use dev_utils::{
    clock, connection, get_continuation_network, get_example_network, get_example_start_time, grid_network,
    par_find_paths, timed_connection,
};
use transit::search::{QueryError, DEFAULT_HEURISTIC_WEIGHT};
use transit::{find_path, reconstruct, Criterion, Journey, JourneyError, Query, Stop, TransitGraph};

fn plan<'a>(network: &'a TransitGraph, from: &str, to: &str, time: &str, criterion: Criterion) -> Result<Journey<'a>, JourneyError> {
    let query = Query::from_names(network, from, to, clock(time), criterion, DEFAULT_HEURISTIC_WEIGHT).unwrap();
    let predecessors = find_path(network, &query).unwrap();
    reconstruct(network, &predecessors, query.start, query.end)
}

fn stop_names(journey: &Journey) -> Vec<String> {
    journey
        .steps
        .iter()
        .map(|step| journey.network.get_stop(step.stop).name.to_string())
        .collect()
}

fn line_names(journey: &Journey) -> Vec<String> {
    journey
        .legs()
        .iter()
        .map(|leg| journey.network.line_name(leg.line).to_owned())
        .collect()
}

#[test]
fn earliest_arrival_stays_on_the_faster_line() {
    let network = get_example_network();
    for criterion in [Criterion::Dijkstra, Criterion::EarliestArrival] {
        let journey = plan(&network, "A", "C", "07:50", criterion).unwrap();
        assert_eq!(stop_names(&journey), ["A", "B", "C"], "{criterion}");
        assert_eq!(line_names(&journey), ["1"], "{criterion}");
        assert_eq!(journey.arrival_time(), Some(clock("08:25")), "{criterion}");
        assert_eq!(journey.total_cost(), 35., "{criterion}");
    }
}

#[test]
fn transfer_minimizing_keeps_line_one() {
    let network = get_example_network();
    let journey = plan(&network, "A", "C", "07:50", Criterion::MinimizeTransfers).unwrap();
    assert_eq!(stop_names(&journey), ["A", "B", "C"]);
    assert_eq!(line_names(&journey), ["1"]);
    assert_eq!(journey.num_line_changes(), 0);
    assert_eq!(journey.arrival_time(), Some(clock("08:25")));
    // Boarding the first line is the only change-cost paid.
    assert_eq!(journey.total_cost(), 1.);
}

#[test]
fn continuity_is_bought_with_time() {
    let network = get_continuation_network();

    let fastest = plan(&network, "A", "C", "07:50", Criterion::EarliestArrival).unwrap();
    assert_eq!(line_names(&fastest), ["1", "2"]);
    assert_eq!(fastest.num_line_changes(), 1);
    assert_eq!(fastest.arrival_time(), Some(clock("08:30")));

    let continuous = plan(&network, "A", "C", "07:50", Criterion::MinimizeTransfers).unwrap();
    assert_eq!(line_names(&continuous), ["1"]);
    assert_eq!(continuous.num_line_changes(), 0);
    assert_eq!(continuous.arrival_time(), Some(clock("08:40")));
}

#[test]
fn stop_without_incoming_connections_is_not_reachable() {
    let network = get_example_network();
    for criterion in Criterion::ALL {
        assert_eq!(plan(&network, "C", "A", "07:50", criterion).err(), Some(JourneyError::NotReachable));
        assert_eq!(plan(&network, "B", "A", "07:50", criterion).err(), Some(JourneyError::NotReachable));
    }

    let a = Stop::new("A", 0., 0.);
    let b = Stop::new("B", 0., 0.01);
    let island = Stop::new("Island", 1., 1.);
    let network = TransitGraph::new([a.clone(), b.clone(), island], &[connection("1", "08:00", "08:10", &a, &b)]);
    let query = Query::from_names(&network, "A", "Island", clock("07:00"), Criterion::MinimizeTransfers, 1.).unwrap();
    let predecessors = find_path(&network, &query).unwrap();
    assert!(!predecessors.is_reached(query.end));
    assert_eq!(reconstruct(&network, &predecessors, query.start, query.end).err(), Some(JourneyError::NotReachable));
}

#[test]
fn unknown_stop_is_reported_before_searching() {
    let network = get_example_network();
    let result = Query::from_names(&network, "A", "Z", get_example_start_time(), Criterion::Dijkstra, 1.);
    assert_eq!(result, Err(QueryError::UnknownStop("Z".to_owned())));
}

#[test]
fn late_trip_wraps_past_midnight_once() {
    let x = Stop::new("X", 0., 0.);
    let y = Stop::new("Y", 0., 0.01);
    let z = Stop::new("Z", 0., 0.02);
    let network = TransitGraph::new(
        [x.clone(), y.clone(), z.clone()],
        &[
            connection("N", "23:50", "23:55", &x, &y),
            // A 24:05 departure, folded onto the same day.
            timed_connection("N", clock("00:05"), clock("00:15"), &y, &z),
        ],
    );

    for criterion in Criterion::ALL {
        let journey = plan(&network, "X", "Z", "23:40", criterion).unwrap();
        assert_eq!(stop_names(&journey), ["X", "Y", "Z"]);
        assert_eq!(journey.num_midnight_wraps(), 1);
        assert!(journey.steps.iter().all(|step| step.cost >= 0.));
    }
    let journey = plan(&network, "X", "Z", "23:40", Criterion::Dijkstra).unwrap();
    // 15 minutes to Y, then 1420 minutes back plus 4 to the end of the day.
    assert_eq!(journey.total_cost(), 15. + 1424.);
}

#[test]
fn grid_queries_match_when_run_in_parallel() {
    let network = grid_network(6, 10, 20);
    let mut rng = fastrand::Rng::with_seed(7);
    let queries: Vec<_> = (0..32)
        .map(|i| Query {
            start: network.random_stop_idx(&mut rng).unwrap(),
            end: network.random_stop_idx(&mut rng).unwrap(),
            start_time: clock("08:30"),
            criterion: Criterion::ALL[i % 3],
            heuristic_weight: 1.,
        })
        .collect();

    let parallel = par_find_paths(&network, &queries);
    let shared = &network;
    std::thread::scope(|scope| {
        let handles: Vec<_> = queries
            .iter()
            .map(|query| scope.spawn(move || find_path(shared, query).unwrap()))
            .collect();
        for ((query, handle), parallel) in queries.iter().zip(handles).zip(parallel) {
            let threaded = handle.join().unwrap();
            let sequential = find_path(shared, query).unwrap();
            let parallel = parallel.unwrap();
            assert_eq!(threaded.cost_to(query.end), sequential.cost_to(query.end));
            assert_eq!(parallel.cost_to(query.end), sequential.cost_to(query.end));
        }
    });
}

#[test]
fn grid_journey_reaches_the_far_corner() {
    let network = grid_network(6, 10, 20);
    let journey = plan(&network, "G0-0", "G5-5", "08:30", Criterion::MinimizeTransfers).unwrap();
    assert_eq!(journey.start_stop(), network.get_stop_idx("G0-0"));
    assert_eq!(journey.end_stop(), network.get_stop_idx("G5-5"));
    // One row line and one column line are enough to cross the grid.
    assert_eq!(journey.num_line_changes(), 1);

    // Every trip reaches the far corner at ten past a twenty minute slot; 08:50 would need a
    // trip that left the start corner before 08:30.
    let journey = plan(&network, "G0-0", "G5-5", "08:30", Criterion::Dijkstra).unwrap();
    assert_eq!(journey.arrival_time(), Some(clock("09:10")));
    assert_eq!(journey.num_midnight_wraps(), 0);
}
