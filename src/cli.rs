//! CLI parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::output::OutputFormat;
use crate::policy::PlanRequest;

/// Run a command with restricted filesystem access
#[derive(Parser, Debug)]
#[command(name = "cage")]
#[command(about = "Run a command with filesystem writes (and optionally reads) restricted")]
#[command(override_usage = "cage [OPTIONS] [--] <COMMAND> [ARGS]...")]
#[command(version)]
pub struct Cli {
    /// Allow writes to PATH (repeatable)
    #[arg(long = "allow", value_name = "PATH")]
    pub allow: Vec<String>,

    /// Allow reads from PATH in strict mode (repeatable)
    #[arg(long = "allow-read", value_name = "PATH")]
    pub allow_read: Vec<String>,

    /// Deny reads and writes under PATH or glob (repeatable)
    #[arg(long = "deny", value_name = "PATH")]
    pub deny: Vec<String>,

    /// Deny reads under PATH or glob (repeatable)
    #[arg(long = "deny-read", value_name = "PATH")]
    pub deny_read: Vec<String>,

    /// Deny writes under PATH or glob (repeatable)
    #[arg(long = "deny-write", value_name = "PATH")]
    pub deny_write: Vec<String>,

    /// Apply a named preset (repeatable)
    #[arg(short = 'p', long = "preset", value_name = "NAME")]
    pub presets: Vec<String>,

    /// Deny reads outside system directories and allowed paths
    #[arg(long)]
    pub strict: bool,

    /// Allow writes to the login keychain (macOS)
    #[arg(long)]
    pub allow_keychain: bool,

    /// Allow writes to the git common directory of the working tree
    #[arg(long)]
    pub allow_git: bool,

    /// Disable all restrictions
    #[arg(long)]
    pub allow_all: bool,

    /// Ignore the default presets from the config file
    #[arg(long)]
    pub no_defaults: bool,

    /// List available presets and exit
    #[arg(long)]
    pub list_presets: bool,

    /// Show a preset after inheritance and exit
    #[arg(long, value_name = "NAME")]
    pub show_preset: Option<String>,

    /// With --show-preset, show the preset as written instead of resolved
    #[arg(long, requires = "show_preset")]
    pub raw: bool,

    /// Output format for --show-preset and --dry-run
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Path to the presets file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show the sandbox that would be applied without running the command
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Command and arguments to run
    #[arg(trailing_var_arg = true, value_name = "COMMAND")]
    pub args: Vec<String>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// The plan request for the command to run, if one was given.
    pub fn plan_request(&self) -> Option<PlanRequest> {
        let (command, args) = self.args.split_first()?;
        Some(PlanRequest {
            presets: self.presets.clone(),
            no_defaults: self.no_defaults,
            allow: self.allow.clone(),
            allow_read: self.allow_read.clone(),
            deny: self.deny.clone(),
            deny_read: self.deny_read.clone(),
            deny_write: self.deny_write.clone(),
            strict: self.strict,
            allow_keychain: self.allow_keychain,
            allow_git: self.allow_git,
            allow_all: self.allow_all,
            command: command.clone(),
            args: args.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cage").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_and_command() {
        let cli = parse(&[
            "--allow",
            ".",
            "--allow",
            "/tmp",
            "-p",
            "npm",
            "--preset",
            "builtin:secure",
            "--deny-read",
            "/home/*/secrets",
            "--strict",
            "npm",
            "install",
        ]);
        let request = cli.plan_request().unwrap();
        assert_eq!(request.allow, vec![".", "/tmp"]);
        assert_eq!(request.presets, vec!["npm", "builtin:secure"]);
        assert_eq!(request.deny_read, vec!["/home/*/secrets"]);
        assert!(request.strict);
        assert_eq!(request.command, "npm");
        assert_eq!(request.args, vec!["install"]);
    }

    #[test]
    fn test_command_flags_pass_through() {
        let cli = parse(&["--allow", ".", "ls", "-la", "--color"]);
        let request = cli.plan_request().unwrap();
        assert_eq!(request.command, "ls");
        assert_eq!(request.args, vec!["-la", "--color"]);
        assert!(!cli.debug);
    }

    #[test]
    fn test_double_dash() {
        let cli = parse(&["--dry-run", "--", "grep", "--allow", "x"]);
        assert!(cli.dry_run);
        let request = cli.plan_request().unwrap();
        assert_eq!(request.command, "grep");
        assert_eq!(request.args, vec!["--allow", "x"]);
        assert!(request.allow.is_empty());
    }

    #[test]
    fn test_no_command() {
        let cli = parse(&["--list-presets"]);
        assert!(cli.list_presets);
        assert!(cli.plan_request().is_none());
    }

    #[test]
    fn test_show_preset_format() {
        let cli = parse(&["--show-preset", "builtin:secure", "--raw", "--format", "yaml"]);
        assert_eq!(cli.show_preset.as_deref(), Some("builtin:secure"));
        assert!(cli.raw);
        assert_eq!(cli.format, OutputFormat::Yaml);
    }

    #[test]
    fn test_raw_requires_show_preset() {
        let result = Cli::try_parse_from(["cage", "--raw", "ls"]);
        assert!(result.is_err());
    }
}
