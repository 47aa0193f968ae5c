use geo::{LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, GeometryValue};
use serde_json::{Value, json};

use super::locate::Snap;
use super::route::{AlternativePath, Route};
use crate::Error;
use crate::model::RouteGraph;

impl Route {
    /// Converts the route and its debug payload to a `GeoJSON`
    /// `FeatureCollection`: the route line, the alternative path, both
    /// resolved endpoints and every traversed edge.
    pub fn to_geojson(&self, graph: &RouteGraph) -> Result<FeatureCollection, Error> {
        let mut features = Vec::with_capacity(4 + self.traversed.len());

        features.push(route_feature(self)?);
        if let Some(alternative) = &self.alternative {
            features.push(alternative_feature(alternative)?);
        }
        features.push(endpoint_feature(graph, "start", &self.start)?);
        features.push(endpoint_feature(graph, "finish", &self.finish)?);

        for edge_id in self.traversed.iter() {
            let Some(edge) = graph.edge(edge_id) else {
                continue;
            };
            features.push(feature(
                &edge.geometry,
                json!({
                    "kind": "traversed",
                    "edge": edge_id.index(),
                    "weight": edge.weight,
                }),
            )?);
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self, graph: &RouteGraph) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson(graph)?)
            .map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn route_feature(route: &Route) -> Result<Feature, Error> {
    let stats = serde_json::to_value(route.stats).map_err(|e| Error::GeoJsonError(e.to_string()))?;
    let reports =
        serde_json::to_value(&route.reports).map_err(|e| Error::GeoJsonError(e.to_string()))?;
    let warnings =
        serde_json::to_value(&route.warnings).map_err(|e| Error::GeoJsonError(e.to_string()))?;

    feature(
        &route.geometry,
        json!({
            "kind": "route",
            "distance": route.distance,
            "strategy": route.strategy,
            "attempts": route.attempts,
            "stats": stats,
            "reports": reports,
            "warnings": warnings,
        }),
    )
}

fn alternative_feature(alternative: &AlternativePath) -> Result<Feature, Error> {
    feature(
        &alternative.geometry,
        json!({
            "kind": "alternative",
            "distance": alternative.distance,
            "strategy": alternative.strategy,
        }),
    )
}

fn endpoint_feature(graph: &RouteGraph, role: &str, snap: &Snap) -> Result<Feature, Error> {
    let point = graph
        .vertex_point(snap.vertex)
        .ok_or_else(|| Error::GeoJsonError(format!("{role} vertex is not in the graph")))?;
    let geometry = Geometry::new(GeometryValue::from(&point));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "kind": role,
            "vertex": snap.vertex.index(),
            "snap_distance": snap.distance,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn feature(line: &LineString<f64>, properties: Value) -> Result<Feature, Error> {
    // A route between coincident endpoints is a single coordinate
    let geometry = if line.0.len() == 1 {
        Geometry::new(GeometryValue::from(&Point::from(line.0[0])))
    } else {
        Geometry::new(GeometryValue::from(line))
    };

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": properties,
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use geo::{line_string, point};

    use crate::config::{GraphConfig, RoutingConfig};
    use crate::loading::build_graph;
    use crate::routing::RouteOrchestrator;

    #[test]
    fn exports_route_endpoints_and_traversed_edges() {
        let graph = build_graph(
            &[
                line_string![(x: 30.0, y: 50.0), (x: 30.01, y: 50.0)],
                line_string![(x: 30.01, y: 50.0), (x: 30.01, y: 50.01)],
            ],
            &GraphConfig::default(),
        )
        .unwrap();
        let orchestrator = RouteOrchestrator::new(&graph, RoutingConfig::default()).unwrap();
        let route = orchestrator
            .route(point!(x: 30.0, y: 50.0), point!(x: 30.01, y: 50.01))
            .unwrap();

        let collection = route.to_geojson(&graph).unwrap();
        let kinds: Vec<String> = collection
            .features
            .iter()
            .filter_map(|f| f.property("kind").and_then(|k| k.as_str()).map(str::to_string))
            .collect();
        assert_eq!(kinds[0], "route");
        assert!(kinds.contains(&"start".to_string()));
        assert!(kinds.contains(&"finish".to_string()));
        assert_eq!(
            kinds.iter().filter(|k| *k == "traversed").count(),
            route.traversed.len()
        );

        let text = route.to_geojson_string(&graph).unwrap();
        assert!(text.contains("\"FeatureCollection\""));
        assert!(text.contains("dijkstra_direct"));
    }

    #[test]
    fn coincident_endpoints_export_a_point_route() {
        let graph = build_graph(
            &[line_string![(x: 30.0, y: 50.0), (x: 30.01, y: 50.0)]],
            &GraphConfig::default(),
        )
        .unwrap();
        let orchestrator = RouteOrchestrator::new(&graph, RoutingConfig::default()).unwrap();
        let route = orchestrator
            .route(point!(x: 30.0, y: 50.0), point!(x: 30.0, y: 50.0))
            .unwrap();

        let collection = route.to_geojson(&graph).unwrap();
        let first = serde_json::to_value(&collection.features[0]).unwrap();
        assert_eq!(first["geometry"]["type"], "Point");
        assert_eq!(first["properties"]["distance"], 0.0);
    }
}
