//! Example: Directed network with curved edges
//!
//! Edges of a directed graph are drawn as circular arcs so that
//! reciprocal edges stay visually apart. A custom node generator draws
//! squares instead of the default circles.

use netsvg::{
    NetworkSvg,
    generator::GeneratorSpec,
    graph::{EdgeRef, NetworkGraph},
    layout::CurveRadius,
    network::ExportOptions,
    resolve,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = NetworkGraph::new(true);
    for _ in 0..4 {
        graph.add_vertex([]);
    }
    for (source, target) in [(0, 1), (1, 0), (1, 2), (2, 3), (3, 0), (0, 2)] {
        graph.add_edge(source, target, [])?;
    }
    graph.set_vertex_column("Position", [(50.0, 40.0), (150.0, 40.0), (150.0, 140.0), (50.0, 140.0)]);
    graph.set_vertex_column("Color", ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728"]);
    graph.set_vertex_column("Label", (0..4).map(|i| format!("Node {i}")));

    let mut network = NetworkSvg::builder(&graph)
        .with_size(220.0, 200.0)
        .with_background("#fff")
        .with_directed_curves(true, 0.9)
        .with_node_generator(|vertex, _| {
            let fill = resolve::node_fill(&vertex);
            Some(
                GeneratorSpec::new("rect")
                    .attr("x", -7)
                    .attr("y", -7)
                    .attr("width", 14)
                    .attr("height", 14)
                    .attr("fill", fill)
                    .into(),
            )
        })
        .build()?;

    network.edges().attr("stroke", "#555");
    network.labels().select_all("text").attr("font_size", 12);
    network.save("network_directed_curves.svg", ExportOptions::default())?;

    // Flatter arcs for the long diagonal.
    network.set_curve_radius(CurveRadius::Resolver(Box::new(
        |_: &EdgeRef<'_, NetworkGraph>, length: f32, default: f32| {
            if length > 120.0 { length * 2.0 } else { default }
        },
    )));
    network.save("network_directed_flat.svg", ExportOptions::default())?;

    println!("Wrote network_directed_curves.svg and network_directed_flat.svg");
    Ok(())
}
