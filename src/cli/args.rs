//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::core::{BuildMode, ComponentKind};

/// Default config file name, searched upward from the working directory.
pub const DEFAULT_CONFIG: &str = "hotpatch.toml";

/// Hot module replacement for component-based UIs
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: hotpatch.toml)
    #[arg(short = 'C', long, global = true, default_value = DEFAULT_CONFIG, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Build mode override (development, production); `HOTPATCH_MODE` is used when absent
    #[arg(short, long, global = true)]
    pub mode: Option<BuildMode>,

    /// Print debug output
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Watch component sources and push hot updates over WebSocket
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Instrument component files and print or write the result
    #[command(visible_alias = "t")]
    Transform {
        /// Files to instrument
        #[arg(value_name = "PATH", required = true, value_hint = clap::ValueHint::FilePath)]
        paths: Vec<PathBuf>,

        /// Output directory (prints to stdout when omitted)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: Option<PathBuf>,
    },

    /// Classify the change between two versions of a component
    #[command(visible_alias = "c")]
    Classify {
        /// Previous version of the declaration
        #[arg(value_hint = clap::ValueHint::FilePath)]
        old: PathBuf,

        /// Edited version of the declaration
        #[arg(value_hint = clap::ValueHint::FilePath)]
        new: PathBuf,

        /// Component shape (function, class)
        #[arg(short, long, default_value = "function")]
        kind: ComponentKind,

        /// Only compare this component when the files hold several
        #[arg(short, long)]
        name: Option<String>,
    },
}

impl Cli {
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["hotpatch", "serve", "-p", "9000"]);
        assert!(cli.is_serve());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG));
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000), .. }));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from(["hotpatch", "transform", "a.jsx", "--mode", "prod", "-V"]);
        assert_eq!(cli.mode, Some(BuildMode::Production));
        assert!(cli.verbose);
        let Commands::Transform { paths, output } = cli.command else {
            panic!("expected transform");
        };
        assert_eq!(paths, [PathBuf::from("a.jsx")]);
        assert!(output.is_none());
    }

    #[test]
    fn test_parse_classify() {
        let cli = Cli::parse_from(["hotpatch", "classify", "old.jsx", "new.jsx", "-k", "class"]);
        let Commands::Classify { kind, name, .. } = cli.command else {
            panic!("expected classify");
        };
        assert_eq!(kind, ComponentKind::Class);
        assert!(name.is_none());
    }

    #[test]
    fn test_transform_requires_paths() {
        assert!(Cli::try_parse_from(["hotpatch", "transform"]).is_err());
    }
}
