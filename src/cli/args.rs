//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use clap::{Args, Parser, Subcommand};

use crate::core::types::{NodeId, NodeKind};

/// Cadastre - administrative hierarchy with approval-gated transfers
///
/// Every invocation starts from the same deterministic sample hierarchy.
#[derive(Parser, Debug)]
#[command(name = "cad")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display the location hierarchy
    #[command(
        name = "tree",
        long_about = "Display the location hierarchy as an indented tree.\n\n\
            Each line shows a location's name, id, level, food quantity and a \
            count of its direct children.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Countries only
    cad tree --depth 0

    # One state and its cities
    cad tree --node s-c1-1 --depth 1

    # Include transfer codes
    cad tree --node ci-s-c2-3-1 --codes

READING THE OUTPUT:
    State 1.1 (s-c1-1) state, food 100, 3 cities
      City 1.1 (ci-s-c1-1-1) city, food 50, 2 districts"
    )]
    Tree {
        /// Start at this location instead of every country
        #[arg(long, value_name = "ID")]
        node: Option<NodeId>,

        /// Levels to show below the start
        #[arg(long, value_name = "N")]
        depth: Option<usize>,

        /// Append each location's transfer code
        #[arg(long)]
        codes: bool,
    },

    /// List the direct children of a location
    #[command(
        name = "children",
        after_help = "\
WORKFLOW EXAMPLES:
    cad children c1
    cad children ci-s-c1-1-1 --kind district"
    )]
    Children {
        /// Location id
        id: NodeId,

        /// Only children of this level
        #[arg(long)]
        kind: Option<NodeKind>,
    },

    /// Print the parent of a location
    #[command(name = "parent")]
    Parent {
        /// Location id
        id: NodeId,
    },

    /// Derive the transfer code of a location or partial path
    #[command(
        name = "code",
        long_about = "Derive the 10-digit transfer code for a location.\n\n\
            The code is 1 country digit, 2 state digits, 3 city digits and 4 block \
            digits. Each field is the 1-based position among siblings, or zeros when \
            that level is not selected. Districts contribute no digits.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Code of one location
    cad code b-d-ci-s-c1-1-1-1-2

    # Code of a partial path chosen level by level
    cad code --country c2 --state s-c2-3"
    )]
    Code {
        /// Location id; conflicts with path flags
        #[arg(conflicts_with_all = ["country", "state", "city", "district", "block"])]
        id: Option<NodeId>,

        #[command(flatten)]
        path: PathArgs,
    },

    /// Submit a transfer request and optionally resolve it
    #[command(
        name = "transfer",
        long_about = "Submit a request to move a location, with its whole subtree, \
            beneath any location on a higher level.\n\n\
            The request is validated like a form submission: both ends must exist, \
            differ, and by default sit in different countries, and a reason is \
            required. Pass --approve or --reject to resolve it in the same run.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Queue a request and show it
    cad transfer s-c1-1 c2 --reason rebalance

    # Move a state to another country and merge its food into the target
    cad transfer s-c1-1 c2 --reason rebalance --resources --approve

    # Allow a move inside one country
    cad transfer ci-s-c1-1-1 s-c1-2 --reason split --allow-same-country --approve"
    )]
    Transfer {
        /// Location to move
        source: NodeId,

        /// New parent location
        target: NodeId,

        /// Why the transfer is needed
        #[arg(long)]
        reason: String,

        /// Add the source's food to the target on approval
        #[arg(long)]
        resources: bool,

        /// Identity recorded on the request
        #[arg(long, value_name = "NAME")]
        requested_by: Option<String>,

        /// Allow source and target in the same country
        #[arg(long)]
        allow_same_country: bool,

        /// Approve the request immediately
        #[arg(long, conflicts_with = "reject")]
        approve: bool,

        /// Reject the request immediately
        #[arg(long)]
        reject: bool,
    },

    /// Interactive shell over one in-memory hierarchy
    #[command(
        name = "session",
        long_about = "Start a line-oriented shell that keeps one hierarchy and request \
            queue alive across commands. Reads from stdin until `quit` or end of input.",
        after_help = "\
SESSION COMMANDS:
    tree [ID]                               show the hierarchy
    show ID                                 show one location
    submit SOURCE TARGET [--resources] REASON...
    pending | requests                      list pending or all requests
    approve REQ | reject REQ                resolve by id or id prefix
    verify                                  check hierarchy invariants
    help | quit"
    )]
    Session,

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        after_help = "\
KEYS:
    requested_by                     identity recorded on requests
    alerts.default_duration_ms       alert display time (1-60000)
    policy.require_cross_country     reject same-country transfers
    policy.transfer_resources        default for --resources"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for cad commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    cad completion bash > ~/.local/share/bash-completion/completions/cad
    cad completion zsh > ~/.zfunc/_cad"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// One optional id per level, shallowest first.
#[derive(Args, Debug, Clone, Default)]
pub struct PathArgs {
    #[arg(long, value_name = "ID")]
    pub country: Option<NodeId>,
    #[arg(long, value_name = "ID")]
    pub state: Option<NodeId>,
    #[arg(long, value_name = "ID")]
    pub city: Option<NodeId>,
    #[arg(long, value_name = "ID")]
    pub district: Option<NodeId>,
    #[arg(long, value_name = "ID")]
    pub block: Option<NodeId>,
}

impl PathArgs {
    /// Chosen levels, shallowest first.
    pub fn levels(&self) -> Vec<(NodeKind, &NodeId)> {
        [
            (NodeKind::Country, &self.country),
            (NodeKind::State, &self.state),
            (NodeKind::City, &self.city),
            (NodeKind::District, &self.district),
            (NodeKind::Block, &self.block),
        ]
        .into_iter()
        .filter_map(|(kind, id)| id.as_ref().map(|id| (kind, id)))
        .collect()
    }
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_transfer() {
        let cli = Cli::try_parse_from([
            "cad", "transfer", "s-c1-1", "c2", "--reason", "rebalance", "--resources", "--approve",
        ])
        .unwrap();
        match cli.command {
            Command::Transfer {
                source,
                target,
                reason,
                resources,
                approve,
                reject,
                ..
            } => {
                assert_eq!(source.as_str(), "s-c1-1");
                assert_eq!(target.as_str(), "c2");
                assert_eq!(reason, "rebalance");
                assert!(resources && approve && !reject);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn approve_conflicts_with_reject() {
        let result = Cli::try_parse_from([
            "cad", "transfer", "a", "b", "--reason", "x", "--approve", "--reject",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn kind_filter_parses_case_insensitively() {
        let cli = Cli::try_parse_from(["cad", "children", "c1", "--kind", "State"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Children {
                kind: Some(NodeKind::State),
                ..
            }
        ));
    }

    #[test]
    fn path_levels_in_order() {
        let cli =
            Cli::try_parse_from(["cad", "code", "--state", "s-c2-3", "--country", "c2"]).unwrap();
        let Command::Code { id, path } = cli.command else {
            panic!("expected code command");
        };
        assert!(id.is_none());
        let levels: Vec<_> = path.levels().into_iter().map(|(k, _)| k).collect();
        assert_eq!(levels, vec![NodeKind::Country, NodeKind::State]);
    }

    #[test]
    fn global_flags_anywhere() {
        let cli = Cli::try_parse_from(["cad", "tree", "--json", "-q"]).unwrap();
        assert!(cli.json);
        assert!(cli.quiet);
    }
}
