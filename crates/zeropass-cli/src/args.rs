//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use zeropass_core::Action;

#[derive(Parser, Debug)]
#[command(name = "zeropass")]
#[command(about = "ZeroPass - client for the zero-trust firewall simulator")]
#[command(
    long_about = r#"ZeroPass - client for the zero-trust firewall simulator

USAGE:
  zeropass health [--probe]          # Backend status
  zeropass rules list                # Rule sets owned by this client
  zeropass simulate --rule-set <id>  # Evaluate a synthetic request
  zeropass scenarios test <id> --rule-set <id>
  zeropass recover                   # Re-own rule sets from earlier identities
  zeropass recover --force           # ...even if this session has rule sets

Configuration is read from zeropass_config.json (or --config), then
ZEROPASS_* environment variables, then the flags below."#
)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, env = "ZEROPASS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding identity and cache state
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check backend health
    Health {
        /// Only test connectivity, under the configured probe timeout
        #[arg(long)]
        probe: bool,
    },

    /// Manage rule sets
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Evaluate a synthetic request against a rule set
    Simulate(SimulateArgs),

    /// Show or clear evaluation logs
    Logs {
        /// Number of entries to fetch
        #[arg(long)]
        limit: Option<usize>,

        /// Clear all logs instead of listing them
        #[arg(long, conflicts_with = "limit")]
        clear: bool,
    },

    /// Rule templates
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },

    /// Exploit scenarios
    Scenarios {
        #[command(subcommand)]
        action: ScenariosAction,
    },

    /// Inspect or reset the anonymous client identity
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },

    /// Inspect or rename the current session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Inspect or clear cached listings
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Recover rule sets cached under earlier identities
    Recover {
        /// Recover even when this session already has rule sets
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List rule sets
    List,

    /// Show one rule set
    Show { id: String },

    /// Create a rule set, or replace one with --replace
    Create(CreateRuleArgs),

    /// Delete a rule set
    Delete { id: String },

    /// Re-list rule sets periodically until interrupted
    Watch {
        /// Seconds between refreshes (defaults to the configured poll interval)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Args, Debug)]
pub struct CreateRuleArgs {
    /// Read the whole rule set from a JSON file
    #[arg(long, conflicts_with_all = ["name", "cidr", "rate_limit"])]
    pub file: Option<PathBuf>,

    /// Rule set id (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Display name
    #[arg(long, required_unless_present = "file")]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Action when no rule decides
    #[arg(long, value_enum, default_value = "allow")]
    pub default_action: ActionArg,

    /// CIDR block for the IP rule (repeatable)
    #[arg(long)]
    pub cidr: Vec<String>,

    /// Whether listed CIDRs are allowed or blocked
    #[arg(long, value_enum, default_value = "allow")]
    pub ip_action: ActionArg,

    /// Requests allowed per window
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub window: u32,

    /// Replace an existing rule set owned by this client
    #[arg(long)]
    pub replace: bool,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Rule set to evaluate against
    #[arg(long)]
    pub rule_set: String,

    /// Client IP of the synthetic request
    #[arg(long, default_value = "127.0.0.1")]
    pub ip: String,

    #[arg(long, default_value = "GET")]
    pub method: String,

    #[arg(long, default_value = "/")]
    pub path: String,

    /// Request headers as a JSON object; malformed input is ignored
    #[arg(long)]
    pub headers_json: Option<String>,

    /// Bearer token presented by the request
    #[arg(long)]
    pub jwt: Option<String>,

    /// OAuth2 scope held by the caller (repeatable)
    #[arg(long)]
    pub scope: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum TemplatesAction {
    /// List templates
    List,

    /// Create a rule set from a template
    Apply {
        template_id: String,

        /// Name for the new rule set
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScenariosAction {
    /// List scenarios
    List,

    /// Run a scenario against a rule set
    Test {
        scenario_id: String,

        #[arg(long)]
        rule_set: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum IdentityAction {
    /// Show the current identity
    Show,

    /// Forget the identity; the next command gets a new one
    Reset {
        /// Also delete everything cached for the old identity
        #[arg(long)]
        purge: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionAction {
    /// Show the session record
    Show,

    /// Rename the session
    Rename { name: String },
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cached entries and counters
    Stats,

    /// Drop cached entries for the current identity
    Clear {
        /// Only keys containing this substring
        #[arg(long)]
        pattern: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionArg {
    Allow,
    Block,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Allow => Action::Allow,
            ActionArg::Block => Action::Block,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "zeropass",
            "rules",
            "list",
            "--api-url",
            "http://10.0.0.5:8000",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.5:8000"));
        assert!(matches!(
            cli.command,
            Commands::Rules {
                action: RulesAction::List
            }
        ));
    }

    #[test]
    fn test_create_requires_name_or_file() {
        assert!(Cli::try_parse_from(["zeropass", "rules", "create"]).is_err());
        assert!(Cli::try_parse_from(["zeropass", "rules", "create", "--file", "rs.json"]).is_ok());

        let cli = Cli::try_parse_from([
            "zeropass",
            "rules",
            "create",
            "--name",
            "Office",
            "--cidr",
            "10.0.0.0/8",
            "--cidr",
            "192.168.0.0/16",
            "--default-action",
            "block",
        ])
        .unwrap();
        let Commands::Rules {
            action: RulesAction::Create(args),
        } = cli.command
        else {
            panic!("expected rules create");
        };
        assert_eq!(args.cidr.len(), 2);
        assert_eq!(Action::from(args.default_action), Action::Block);
    }

    #[test]
    fn test_logs_clear_conflicts_with_limit() {
        assert!(Cli::try_parse_from(["zeropass", "logs", "--clear", "--limit", "5"]).is_err());
    }

    #[test]
    fn test_recover_is_gated_unless_forced() {
        let cli = Cli::try_parse_from(["zeropass", "recover"]).unwrap();
        assert!(matches!(cli.command, Commands::Recover { force: false }));

        let cli = Cli::try_parse_from(["zeropass", "recover", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Recover { force: true }));
    }
}
