mod common;

use geo::{LineString, coord};
use lineroute_core::{Error, GraphConfig, build_graph, lines_from_geojson_str};

use common::{build, grid_lines, random_lines, vertex};

#[test]
fn rebuilding_is_idempotent() {
    let lines = random_lines(7, 40, 25);
    let first = build(&lines);
    let second = build(&lines);

    assert_eq!(first.vertex_count(), second.vertex_count());
    assert_eq!(first.edge_count(), second.edge_count());
    for ((id_a, a), (id_b, b)) in first.vertices().zip(second.vertices()) {
        assert_eq!(id_a, id_b);
        assert_eq!(a.key, b.key);
        let weights_a: Vec<f64> = first.edges(id_a).map(|(_, _, e)| e.weight).collect();
        let weights_b: Vec<f64> = second.edges(id_b).map(|(_, _, e)| e.weight).collect();
        assert_eq!(weights_a, weights_b);
    }
}

#[test]
fn lines_sharing_one_coordinate_meet_at_one_vertex() {
    let graph = build(&[
        LineString::from(vec![(30.0, 50.0), (30.005, 50.002), (30.01, 50.0)]),
        LineString::from(vec![(30.01, 50.0), (30.015, 49.998), (30.02, 50.0)]),
    ]);
    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.edge_count(), 4);

    let shared = vertex(&graph, 30.01, 50.0);
    let incoming: Vec<_> = graph
        .vertices()
        .flat_map(|(id, _)| graph.edges(id).map(move |(_, target, _)| (id, target)))
        .filter(|&(_, target)| target == shared)
        .map(|(source, _)| source)
        .collect();
    assert_eq!(incoming.len(), 2);
    assert_ne!(incoming[0], incoming[1]);
}

#[test]
fn straight_kilometer_line() {
    // 0.008_993 degrees of latitude is about 1000 m
    let graph = build(&[LineString::from(vec![
        (30.0, 50.0),
        (30.0, 50.003),
        (30.0, 50.006),
        (30.0, 50.008_993),
    ])]);
    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.edge_count(), 2);

    let start = vertex(&graph, 30.0, 50.0);
    let end = vertex(&graph, 30.0, 50.008_993);
    let forward: Vec<_> = graph.edges(start).collect();
    let backward: Vec<_> = graph.edges(end).collect();
    assert_eq!(forward.len(), 1);
    assert_eq!(backward.len(), 1);
    assert!((forward[0].2.weight - 1000.0).abs() < 1.0, "{}", forward[0].2.weight);
    assert_eq!(forward[0].2.weight, backward[0].2.weight);
    assert_eq!(forward[0].2.geometry.0.len(), 4);
}

#[test]
fn random_graphs_are_symmetric_with_positive_weights() {
    for seed in 0..5 {
        let graph = build(&random_lines(seed, 30, 20));
        assert!(graph.is_symmetric(), "seed {seed}");
        for (id, _) in graph.vertices() {
            for (_, _, edge) in graph.edges(id) {
                assert!(edge.weight > 0.0);
            }
        }
    }
}

#[test]
fn grid_has_expected_shape() {
    let graph = build(&grid_lines(4, 0.001));
    assert_eq!(graph.vertex_count(), 16);
    // 2 * 4 lines * 3 segments, mirrored
    assert_eq!(graph.edge_count(), 48);
    let corner = vertex(&graph, 30.0, 50.0);
    let center = vertex(&graph, 30.001, 50.001);
    assert_eq!(graph.degree(corner), 2);
    assert_eq!(graph.degree(center), 4);

    let summary = graph.summary();
    assert_eq!(summary.vertices, 16);
    assert!(summary.total_length_m > 0.0);
}

#[test]
fn coarser_precision_merges_close_points() {
    let lines = vec![
        LineString::from(vec![(30.0, 50.0), (30.01, 50.0)]),
        LineString::from(vec![(30.010_04, 50.000_03), (30.02, 50.0)]),
    ];
    let fine = build(&lines);
    assert_eq!(fine.vertex_count(), 4);

    let coarse = build_graph(&lines, &GraphConfig { coordinate_precision: 3 }).unwrap();
    assert_eq!(coarse.vertex_count(), 3);
    assert!(coarse.vertex_at(coord! { x: 30.01, y: 50.0 }).is_some());
}

#[test]
fn geojson_feature_collection_ingestion() {
    let input = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "main" },
                "geometry": { "type": "LineString", "coordinates": [[30.0, 50.0], [30.01, 50.0]] }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [30.0, 50.0] }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "LineString", "coordinates": [[30.01, 50.0], [30.01, 50.01]] }
            }
        ]
    }"#;

    let lines = lines_from_geojson_str(input).unwrap();
    assert_eq!(lines.len(), 2);
    let graph = build(&lines);
    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.degree(vertex(&graph, 30.01, 50.0)), 2);
}

#[test]
fn malformed_geojson_is_a_hard_error() {
    assert!(matches!(
        lines_from_geojson_str("{ not json"),
        Err(Error::GeoJson(_))
    ));
}

#[test]
fn invalid_coordinates_are_rejected() {
    let result = build_graph(
        &[LineString::from(vec![(200.0, 50.0), (30.0, 50.0)])],
        &GraphConfig::default(),
    );
    assert!(matches!(
        result,
        Err(Error::InvalidGeometry {
            feature: 0,
            position: 0,
            ..
        })
    ));
}
