//! NetSvg - A declarative SVG builder with a graph-to-diagram compiler.
//!
//! Two layers of API are provided:
//!
//! - [`SvgCanvas`] and [`Selection`] build arbitrary SVG documents with
//!   chainable, data-bound calls in the style of d3 selections.
//! - [`NetworkSvg`] turns a [`graph::Graph`] into a styled diagram with
//!   separate edge, node and label layers.
//!
//! # Examples
//!
//! ```
//! use netsvg::{NetworkSvg, graph::NetworkGraph, network::ExportOptions};
//!
//! let mut graph = NetworkGraph::ring(4, true);
//! graph.set_vertex_column("x", [0.0, 100.0, 100.0, 0.0]);
//! graph.set_vertex_column("y", [0.0, 0.0, 100.0, 100.0]);
//!
//! let network = NetworkSvg::builder(&graph)
//!     .with_directed_curves(true, 2.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(network.edges().len(), 4);
//! let svg = network.to_svg(ExportOptions::default());
//! assert!(svg.contains("<path"));
//! ```

pub mod canvas;
pub mod config;
pub mod generator;
pub mod graph;
pub mod layout;
pub mod network;
pub mod resolve;
pub mod selection;
pub mod sort;

mod error;

pub use netsvg_core::{color, dom, geometry, scale};

pub use canvas::SvgCanvas;
pub use error::NetSvgError;
pub use network::{NetworkSvg, NetworkSvgBuilder};
pub use selection::{Attr, Selection};
