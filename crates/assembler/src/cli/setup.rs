use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "assembler", bin_name = "assembler", version)]
#[command(about = "Inspect scene attributes and assemble them into JSON documents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Read configuration from this file instead of the user config directory
    #[arg(long, global = true, value_name = "PATH", help_heading = "Options")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List nodes and their attribute values
    Inspect {
        /// Scene description (JSON)
        scene: PathBuf,

        /// List every node, not just the selection
        #[arg(short, long)]
        all: bool,

        /// Include hidden attributes
        #[arg(long)]
        hidden: bool,

        /// Leave out non-keyable attributes
        #[arg(long)]
        hide_non_keyable: bool,

        /// Only attributes with an incoming connection
        #[arg(long)]
        connected_only: bool,

        /// Case-insensitive search on node.attribute names
        #[arg(short, long, value_name = "TERM")]
        search: Option<String>,
    },

    /// Assemble nodes and attributes into a JSON document
    Export {
        /// Scene description (JSON)
        scene: PathBuf,

        /// Add a node with its attributes (repeatable). Defaults to the selection.
        #[arg(short, long = "node", value_name = "NAME")]
        nodes: Vec<String>,

        /// Add a single attribute as NODE.ATTR (repeatable)
        #[arg(short, long = "attr", value_name = "NODE.ATTR")]
        attrs: Vec<String>,

        /// Expand multi-valued containers across lines
        #[arg(short, long)]
        indent: bool,

        /// Spaces per nesting level
        #[arg(long, value_name = "N")]
        indent_size: Option<usize>,

        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_export_with_repeated_flags() {
        let cli = Cli::try_parse_from([
            "assembler", "export", "scene.json", "-n", "pCube1", "--node", "pSphere1", "--attr",
            "persp.focalLength", "--indent", "--indent-size", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                nodes,
                attrs,
                indent,
                indent_size,
                output,
                ..
            } => {
                assert_eq!(nodes, vec!["pCube1", "pSphere1"]);
                assert_eq!(attrs, vec!["persp.focalLength"]);
                assert!(indent);
                assert_eq!(indent_size, Some(2));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_inspect_filters() {
        let cli = Cli::try_parse_from([
            "assembler", "inspect", "scene.json", "--all", "--hidden", "--search", "trans", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Inspect {
                all, hidden, search, ..
            } => {
                assert!(all);
                assert!(hidden);
                assert_eq!(search.as_deref(), Some("trans"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn scene_is_required() {
        assert!(Cli::try_parse_from(["assembler", "export"]).is_err());
    }
}
