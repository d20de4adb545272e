//! Command-line arguments of `netsvg`.
//!
//! The tool reads one graph file and writes one SVG document. Rendering
//! options come from a TOML configuration file, see [`crate::config`].

use clap::Parser;

const GRAPH_FILE_HELP: &str = "\
A graph file is TOML with `[[nodes]]` and `[[edges]]` tables:

    directed = true

    [[nodes]]
    id = \"a\"
    position = [0, 0]
    label = \"A\"

    [[nodes]]
    position = [100, 40]

    [[edges]]
    source = \"a\"   # an `id`
    target = 1     # or a zero-based node index
    weight = 2

Every other key becomes a node or edge attribute. Every node needs a
position: a `Position`/`position`/`positions` pair, or `x`/`X` and `y`/`Y`.";

/// Renders a graph file into a layered network SVG
#[derive(Parser, Debug)]
#[command(author, version, about, after_long_help = GRAPH_FILE_HELP)]
pub struct Args {
    /// Graph file (TOML) whose edges name nodes by `id` or by index
    #[arg(value_name = "GRAPH")]
    pub input: String,

    /// Where to write the SVG document
    #[arg(short, long, value_name = "SVG", default_value = "out.svg")]
    pub output: String,

    /// Rendering configuration (TOML); searched in the usual places when omitted
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["netsvg", "graph.toml"]).unwrap();
        assert_eq!(args.input, "graph.toml");
        assert_eq!(args.output, "out.svg");
        assert_eq!(args.config, None);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_long_help_describes_graph_files() {
        let err = Args::try_parse_from(["netsvg", "--help"]).unwrap_err();
        let help = err.to_string();
        assert!(help.contains("[[edges]]"), "{help}");
        assert!(help.contains("zero-based node index"), "{help}");
    }

    #[test]
    fn test_requires_input() {
        assert!(Args::try_parse_from(["netsvg", "-o", "x.svg"]).is_err());
    }
}
