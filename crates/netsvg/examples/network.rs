//! Example: Rendering a small labelled network
//!
//! Positions come from `x`/`y` vertex attributes and are fitted into the
//! canvas. Edges take their stroke from the source vertex and nodes are
//! sorted so the largest ones are drawn last.

use netsvg::{
    NetworkSvg,
    graph::{AttrValue, NetworkGraph},
    layout::FitMargin,
    network::{EdgeColorMode, ExportOptions},
    sort::SortSpec,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = NetworkGraph::new(false);
    let cities = [
        ("Lisbon", -9.1, 38.7, "#e45756", 12),
        ("Madrid", -3.7, 40.4, "#f58518", 16),
        ("Paris", 2.35, 48.9, "#4c78a8", 18),
        ("Berlin", 13.4, 52.5, "#54a24b", 15),
        ("Rome", 12.5, 41.9, "#b279a2", 14),
    ];
    for (name, lon, lat, color, size) in cities {
        graph.add_vertex([
            ("label", AttrValue::from(name)),
            ("x", AttrValue::from(lon)),
            // SVG y grows downwards.
            ("y", AttrValue::from(-lat)),
            ("color", AttrValue::from(color)),
            ("size", AttrValue::from(size)),
        ]);
    }
    for (source, target, weight) in [(0, 1, 4), (1, 2, 6), (2, 3, 5), (2, 4, 2), (3, 4, 1), (1, 4, 3)] {
        graph.add_edge(
            source,
            target,
            [("weight", AttrValue::from(weight)), ("use_source_color", AttrValue::from(true))],
        )?;
    }

    let mut network = NetworkSvg::builder(&graph)
        .with_size(640.0, 480.0)
        .with_background("#fdfdfd")
        .with_fit_to_view(true, FitMargin::Uniform(40.0))
        .with_edge_color_mode(EdgeColorMode::LinearGradient)
        .build()?;

    network.sort_nodes(&SortSpec::new().by("size"))?;
    network.edges().attr("stroke_linecap", "round");
    network.set_text_style("text", [("font_size", Some("12px")), ("font_weight", Some("600"))]);

    network.save("network.svg", ExportOptions::default())?;
    println!(
        "Wrote network.svg with {} nodes and {} edges",
        network.nodes().len(),
        network.edges().len()
    );

    Ok(())
}
