//! CLI logic for the NetSvg renderer.
//!
//! This module contains the core CLI logic: load a graph file, compile it
//! into a network diagram and write the SVG.

pub mod error_adapter;
pub mod input;

mod args;
mod config;
mod error;

pub use args::Args;
pub use error::CliError;

use log::info;

use netsvg::NetworkSvg;

/// Run the NetSvg CLI application
///
/// This function reads the input graph, renders it with the loaded
/// configuration and writes the resulting SVG to the output file.
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Graph file errors
/// - Diagram build errors
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Rendering graph"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let graph = input::load_graph(&args.input)?;

    let network = NetworkSvg::builder(&graph).with_config(&app_config)?.build()?;
    network.save(&args.output, app_config.export().options())?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
