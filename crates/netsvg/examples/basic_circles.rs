//! Example: Data-bound circles on a plain canvas
//!
//! This example builds a small SVG document with selections only, without
//! any graph. Radii, positions and colors are derived from bound data
//! through a linear and an ordinal scale.

use netsvg::{
    SvgCanvas,
    scale::{LinearScale, OrdinalScale},
};

#[derive(Debug, Clone)]
struct Planet {
    name: &'static str,
    kind: &'static str,
    radius: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let planets = vec![
        Planet { name: "Mercury", kind: "rocky", radius: 2.4 },
        Planet { name: "Venus", kind: "rocky", radius: 6.1 },
        Planet { name: "Jupiter", kind: "giant", radius: 69.9 },
        Planet { name: "Neptune", kind: "ice", radius: 24.6 },
    ];

    let x = LinearScale::new((0.0, (planets.len() - 1) as f64), (60.0, 420.0))?;
    let r = LinearScale::new((0.0, 70.0), (4.0, 40.0))?;
    let color = OrdinalScale::new([], ["#4C78A8", "#F58518", "#54A24B"])?;

    let canvas = SvgCanvas::new(480.0, 160.0).with_background("#ffffff");
    canvas.add_style("text { font: 11px sans-serif; }");

    let layer = canvas.append("g");
    layer.attr("transform", "translate(0,70)");
    for _ in &planets {
        layer.append("circle");
        layer.append("text");
    }

    let circles = layer.select_all("circle").data(planets.clone())?;
    circles
        .attr_fn("cx", |_, i, _| Some(x.apply(i as f64).to_string()))
        .attr_fn("r", |planet, _, _| planet.map(|p| r.apply(p.radius).to_string()))
        .attr_fn("fill", |planet, _, _| planet.map(|p| color.apply(p.kind).to_string()))
        .style("fill_opacity", 0.8);

    layer
        .select_all("text")
        .data(planets)?
        .attr_fn("x", |_, i, _| Some(x.apply(i as f64).to_string()))
        .attr("y", 62)
        .attr("text_anchor", "middle")
        .text_fn(|planet, _, _| planet.map(|p| p.name.to_string()));

    println!("Planet kinds in color order: {:?}", color.domain());
    canvas.save("basic_circles.svg", true)?;
    println!("Wrote basic_circles.svg");

    Ok(())
}
