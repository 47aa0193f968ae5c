use geo::{Coord, LineString, Point};
use hashbrown::HashMap;
use log::{info, trace, warn};

use crate::config::GraphConfig;
use crate::geodesy::haversine;
use crate::model::{CoordKey, RouteGraph};
use crate::{Error, VertexId};

/// Builds the routing graph from line features
///
/// A coordinate becomes a vertex when it is a line endpoint or is shared by
/// at least two point occurrences. Interior points are absorbed into the
/// geometry of the edges between consecutive vertices.
///
/// # Errors
///
/// Returns an error if a coordinate is not finite or lies outside the valid
/// longitude/latitude range, or if the configuration is invalid
pub fn build_graph(lines: &[LineString<f64>], config: &GraphConfig) -> Result<RouteGraph, Error> {
    config.validate()?;
    validate_lines(lines)?;

    let precision = config.coordinate_precision;
    let keys = discover_vertices(lines, precision);
    let point_count: usize = lines.iter().map(|line| line.0.len()).sum();

    let mut graph = RouteGraph::with_capacity(precision, keys.len(), point_count.min(keys.len() * 4));
    for key in keys {
        graph.add_vertex(key);
    }

    for line in lines {
        emit_edges(&mut graph, line);
    }

    if graph.has_edges() {
        let summary = graph.summary();
        info!(
            "Built routing graph: {} lines, {} vertices, {} edges, {:.0} m of network",
            lines.len(),
            summary.vertices,
            summary.edges,
            summary.total_length_m
        );
    } else {
        warn!(
            "No edges derived from {} line features, graph is empty",
            lines.len()
        );
    }

    Ok(graph)
}

fn validate_lines(lines: &[LineString<f64>]) -> Result<(), Error> {
    for (feature, line) in lines.iter().enumerate() {
        for (position, coord) in line.coords().enumerate() {
            let reason = if !coord.x.is_finite() || !coord.y.is_finite() {
                "coordinate is not finite"
            } else if !(-180.0..=180.0).contains(&coord.x) {
                "longitude out of range"
            } else if !(-90.0..=90.0).contains(&coord.y) {
                "latitude out of range"
            } else {
                continue;
            };
            return Err(Error::InvalidGeometry {
                feature,
                position,
                reason: reason.to_string(),
            });
        }
    }
    Ok(())
}

/// Counts point occurrences per rounded key; endpoints count twice more.
/// Returns the keys reaching two, in first-occurrence order.
fn discover_vertices(lines: &[LineString<f64>], precision: u8) -> Vec<CoordKey> {
    let mut counts: HashMap<CoordKey, u32> = HashMap::new();
    let mut order = Vec::new();

    for line in lines {
        let Some(last) = line.0.len().checked_sub(1) else {
            continue;
        };
        for (i, coord) in line.coords().enumerate() {
            let key = CoordKey::new(*coord, precision);
            let count = counts.entry(key).or_insert_with(|| {
                order.push(key);
                0
            });
            *count += 1;
            if i == 0 {
                *count += 1;
            }
            if i == last {
                *count += 1;
            }
        }
    }

    order
        .into_iter()
        .filter(|key| counts.get(key).is_some_and(|&count| count >= 2))
        .collect()
}

/// Walks a line, emitting an edge (and its mirror) between consecutive
/// vertex hits. Points that hit a vertex are replaced by the vertex
/// position so weights are never shorter than the vertex-to-vertex arc.
fn emit_edges(graph: &mut RouteGraph, line: &LineString<f64>) {
    let mut start: Option<VertexId> = None;
    let mut prev: Option<Point<f64>> = None;
    let mut weight = 0.0;
    let mut segment: Vec<Coord<f64>> = Vec::new();

    for coord in line.coords() {
        let hit = graph.vertex_at(*coord);
        let point = hit
            .and_then(|vertex| graph.vertex_point(vertex))
            .unwrap_or_else(|| Point::from(*coord));

        if let Some(prev) = prev {
            weight += haversine(prev, point);
        }
        segment.push(point.into());
        prev = Some(point);

        let Some(vertex) = hit else {
            continue;
        };

        if let Some(from) = start {
            if from == vertex && weight <= 0.0 {
                trace!("Skipping zero-length loop at vertex {}", vertex.index());
            } else {
                graph.add_segment(from, vertex, weight, LineString::new(std::mem::take(&mut segment)));
            }
        }

        start = Some(vertex);
        weight = 0.0;
        segment.clear();
        segment.push(point.into());
    }
}

#[cfg(test)]
mod tests {
    use geo::{coord, line_string};

    use super::*;

    fn build(lines: &[LineString<f64>]) -> RouteGraph {
        build_graph(lines, &GraphConfig::default()).unwrap()
    }

    #[test]
    fn interior_points_are_absorbed() {
        let graph = build(&[line_string![
            (x: 30.0, y: 50.0),
            (x: 30.001, y: 50.0),
            (x: 30.002, y: 50.0),
        ]]);
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 2);

        let start = graph.vertex_at(coord! { x: 30.0, y: 50.0 }).unwrap();
        let (_, _, edge) = graph.edges(start).next().unwrap();
        assert_eq!(edge.geometry.0.len(), 3);
    }

    #[test]
    fn crossing_point_splits_both_lines() {
        let graph = build(&[
            line_string![(x: 30.0, y: 50.0), (x: 30.001, y: 50.0), (x: 30.002, y: 50.0)],
            line_string![(x: 30.001, y: 49.999), (x: 30.001, y: 50.0), (x: 30.001, y: 50.001)],
        ]);
        assert_eq!(graph.vertex_count(), 5);
        assert_eq!(graph.edge_count(), 8);

        let center = graph.vertex_at(coord! { x: 30.001, y: 50.0 }).unwrap();
        assert_eq!(graph.degree(center), 4);
        assert!(graph.is_symmetric());
    }

    #[test]
    fn revisiting_a_vertex_makes_a_self_loop() {
        let graph = build(&[line_string![
            (x: 30.0, y: 50.0),
            (x: 30.001, y: 50.0),
            (x: 30.001, y: 50.001),
            (x: 30.0, y: 50.0),
        ]]);
        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.edge_count(), 2);

        let vertex = graph.vertex_at(coord! { x: 30.0, y: 50.0 }).unwrap();
        for (_, target, edge) in graph.edges(vertex) {
            assert_eq!(target, vertex);
            assert!(edge.weight > 0.0);
        }
    }

    #[test]
    fn single_point_line_has_no_edges() {
        let graph = build(&[line_string![(x: 30.0, y: 50.0)]]);
        assert_eq!(graph.vertex_count(), 1);
        assert!(!graph.has_edges());
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let graph = build(&[]);
        assert!(graph.is_empty());
        assert!(!graph.has_edges());
    }

    #[test]
    fn vertex_hits_snap_to_canonical_position() {
        let graph = build(&[line_string![(x: 30.000_002, y: 50.000_003), (x: 30.01, y: 50.0)]]);
        let start = graph.vertex_at(coord! { x: 30.0, y: 50.0 }).unwrap();
        let (_, _, edge) = graph.edges(start).next().unwrap();
        assert_eq!(edge.geometry.0[0], coord! { x: 30.0, y: 50.0 });
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let result = build_graph(
            &[
                line_string![(x: 30.0, y: 50.0), (x: 30.1, y: 50.0)],
                line_string![(x: 30.0, y: 50.0), (x: 30.1, y: 95.0)],
            ],
            &GraphConfig::default(),
        );
        assert!(matches!(
            result,
            Err(Error::InvalidGeometry {
                feature: 1,
                position: 1,
                ..
            })
        ));

        let result = build_graph(
            &[line_string![(x: f64::NAN, y: 50.0), (x: 30.1, y: 50.0)]],
            &GraphConfig::default(),
        );
        assert!(matches!(result, Err(Error::InvalidGeometry { .. })));
    }
}
