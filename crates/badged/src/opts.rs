use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Struct that gets generated from `RawOpt`.
#[derive(Debug, PartialEq)]
pub struct Opt {
    pub log_debug: bool,
    pub config_path: Option<PathBuf>,
    pub action: Action,
}

#[derive(Parser, Debug, PartialEq)]
#[command(version, about)]
pub(super) struct RawOpt {
    /// Write out debug logs.
    #[arg(long = "debug", global = true)]
    log_debug: bool,

    /// Override the path to the configuration file (badged.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Action {
    /// Read events as JSON lines from stdin and print the main menu whenever it changes. This is the default.
    #[command(name = "run", alias = "r")]
    Run,

    /// Refresh the badge once for the configured account and print the main menu.
    #[command(name = "show", alias = "s")]
    Show,

    /// Generate a shell completion script
    #[command(name = "shell-completions")]
    ShellCompletions {
        #[arg(short, long)]
        shell: clap_complete::Shell,
    },
}

impl Opt {
    pub fn from_env() -> Self {
        let raw: RawOpt = RawOpt::parse();
        raw.into()
    }
}

impl From<RawOpt> for Opt {
    fn from(other: RawOpt) -> Self {
        let RawOpt { action, log_debug, config } = other;
        Opt { action: action.unwrap_or(Action::Run), log_debug, config_path: config }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Opt {
        RawOpt::try_parse_from(std::iter::once("badged").chain(args.iter().copied())).unwrap().into()
    }

    #[test]
    fn test_default_action_is_run() {
        assert_eq!(parse(&[]), Opt { log_debug: false, config_path: None, action: Action::Run });
    }

    #[test]
    fn test_global_flags() {
        assert_eq!(
            parse(&["show", "--debug", "-c", "/tmp/badged.json"]),
            Opt { log_debug: true, config_path: Some("/tmp/badged.json".into()), action: Action::Show }
        );
        assert_eq!(
            parse(&["shell-completions", "--shell", "bash"]).action,
            Action::ShellCompletions { shell: clap_complete::Shell::Bash }
        );
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(RawOpt::try_parse_from(["badged", "frobnicate"]).is_err());
    }
}
