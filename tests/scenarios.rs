use std::fs;

use u_arc_routing::constructive::{solve, RouteBuilder};
use u_arc_routing::distance::ShortestPaths;
use u_arc_routing::error::{Infeasibility, ParseError};
use u_arc_routing::evaluation::SolutionEvaluator;
use u_arc_routing::io::{
    load_instance, parse_instance, read_references, save_solution, write_solution, ReadOptions,
    Reference,
};
use u_arc_routing::models::{GraphBuilder, Requirement, ServiceId, Stop};

const TWO_ROUTES: &str = "\
Name:\t\ttwo-routes
Capacity:\t10
Depot Node:\t1
#Required N:\t1
#Required E:\t1

ReN.\tDEMAND\tS. COST
N2\t5\t2

ReE.\tFrom N.\tTo N.\tT. COST\tDEMAND\tS. COST
E1\t3\t4\t4\t6\t1

EDGE\tFROM N.\tTO N.\tT. COST
NrE1\t1\t2\t3
NrE2\t2\t3\t2
NrE3\t1\t4\t9
";

#[test]
fn capacity_forces_two_routes() {
    let graph = parse_instance(TWO_ROUTES, ReadOptions::strict())
        .expect("parses")
        .build()
        .expect("valid");
    let paths = ShortestPaths::compute(&graph);
    let solution = RouteBuilder::new(&graph, &paths).build().expect("feasible");

    assert_eq!(solution.num_routes(), 2);

    let first = &solution.routes()[0];
    assert_eq!(first.demand(), 5);
    assert_eq!(first.cost(), 3 + 2 + 3);

    // Entry via 3 (d = 5) beats entry via 4 (d = 9).
    let second = &solution.routes()[1];
    assert_eq!(second.demand(), 6);
    assert_eq!(
        second.stops(),
        &[
            Stop::DepotVisit,
            Stop::EdgeService {
                id: ServiceId::new(2),
                from: 3,
                to: 4
            },
            Stop::DepotVisit,
        ]
    );
    let expected = paths.distance(1, 3).expect("reachable")
        + 4
        + 1
        + paths.distance(4, 1).expect("reachable");
    assert_eq!(second.cost(), expected);
    assert_eq!(solution.total_cost(), 8 + expected);
    assert_eq!(solution.total_cost(), 27);

    let evaluator = SolutionEvaluator::new(&graph, &paths);
    assert!(evaluator.evaluate(&solution).is_empty());
}

#[test]
fn unreachable_required_node_is_infeasible() {
    let mut builder = GraphBuilder::new();
    builder.add_edge(1, 2, 3, None);
    builder.add_edge(8, 9, 1, None);
    builder
        .require_vertex(9, Requirement::new(1, 1))
        .expect("first time");
    builder.set_depot(1).set_capacity(10);
    let graph = builder.build().expect("valid");

    let err = solve(&graph).expect_err("vertex 9 is cut off from the depot");
    assert_eq!(
        err.reasons,
        vec![Infeasibility::UnreachableServices {
            services: vec![ServiceId::new(1)]
        }]
    );
    assert_eq!(err.partial.num_routes(), 0);
    assert_eq!(err.partial.total_cost(), 0);
}

#[test]
fn solution_file_round_trip_through_disk() {
    let dir = std::env::temp_dir().join(format!("u-arc-routing-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");

    let instance = dir.join("two-routes.dat");
    fs::write(&instance, TWO_ROUTES).expect("write instance");
    let references = dir.join("references.txt");
    fs::write(&references, "# name total best\ntwo-routes 1500 700\nbroken row\n")
        .expect("write references");

    let graph = load_instance(&instance, ReadOptions::default()).expect("loads");
    assert_eq!(graph.name(), Some("two-routes"));
    let solution = solve(&graph).expect("feasible");

    let table = read_references(&references).expect("reads");
    assert_eq!(table.len(), 1);
    let reference = table.get("two-routes").copied();
    assert_eq!(reference, Some(Reference(1500, 700)));

    let out = dir.join("sol-two-routes.dat");
    save_solution(&out, &solution, graph.depot(), reference).expect("writes");
    let text = fs::read_to_string(&out).expect("read back");

    let mut expected = Vec::new();
    write_solution(&mut expected, &solution, graph.depot(), reference).expect("in memory");
    assert_eq!(text.as_bytes(), expected.as_slice());
    assert_eq!(
        text,
        "27\n2\n1500\n700\n\
         0 1 1 5 8 3 (D 0,1,1) (S 1,2,2) (D 0,1,1)\n\
         0 1 2 6 19 3 (D 0,1,1) (S 2,3,4) (D 0,1,1)\n"
    );

    fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn missing_instance_file_is_io_error() {
    let missing = std::env::temp_dir().join("u-arc-routing-does-not-exist.dat");
    assert!(matches!(
        load_instance(missing, ReadOptions::default()),
        Err(ParseError::Io(_))
    ));
}

#[test]
fn mixed_graph_with_arcs() {
    let text = "\
Capacity: 4
Depot Node: 1
ReA. FROM TO COST DEMAND S. COST
A1 2 3 5 2 1
A2 3 1 2 2 1
ARC FROM TO COST
NrA1 1 2 1
NrA2 3 2 1
";
    let graph = parse_instance(text, ReadOptions::strict())
        .expect("parses")
        .build()
        .expect("valid");
    let paths = ShortestPaths::compute(&graph);
    let solution = RouteBuilder::new(&graph, &paths).build().expect("feasible");

    // 1 -> 2 (1), serve 2 -> 3 (5 + 1), serve 3 -> 1 (2 + 1), already home.
    assert_eq!(solution.num_routes(), 1);
    assert_eq!(solution.total_cost(), 10);
    assert_eq!(
        SolutionEvaluator::new(&graph, &paths).expand_route(&solution.routes()[0]),
        Some(vec![1, 2, 3, 1])
    );
}
