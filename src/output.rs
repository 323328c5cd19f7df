//! Rendering for the informational commands: preset listing, preset
//! inspection and dry runs.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use clap::ValueEnum;
use serde::Serialize;

use crate::config::{AllowPath, Config, Preset, PresetRules, BUILTIN_PREFIX};
use crate::error::{ConfigError, SandboxError};
use crate::policy::{resolve_preset, SandboxPlan};
use crate::sandbox::PolicyCompiler;

/// Output format for `--show-preset` and `--dry-run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Yaml,
    Json,
}

/// Lines printed by `--list-presets`.
pub fn render_preset_list(config: &Config) -> String {
    let names = config.list_presets();
    if names.is_empty() {
        return "No presets available\n".to_string();
    }

    let mut out = String::from("Available presets:\n");
    for name in names {
        let _ = writeln!(out, "  - {}", name);
    }
    out
}

/// Render a preset for `--show-preset`.
///
/// Resolved output flattens inheritance and reports the ancestry; `raw` shows
/// the preset exactly as declared.
pub fn render_preset(
    config: &Config,
    name: &str,
    raw: bool,
    format: OutputFormat,
) -> Result<String, SandboxError> {
    let (preset, chain) = if raw {
        let preset = config
            .get_preset(name)
            .ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))?;
        (preset.clone(), Vec::new())
    } else {
        let resolved = resolve_preset(config, name)?;
        let preset = Preset {
            extends: Vec::new(),
            rules: resolved.rules,
        };
        (preset, resolved.ancestors)
    };
    let preset = sorted(preset);

    match format {
        OutputFormat::Text => Ok(preset_text(name, &preset, &chain)),
        OutputFormat::Yaml => {
            let mut out = String::new();
            if !chain.is_empty() {
                let _ = writeln!(out, "# Extends: {}", chain.join(" → "));
            }
            out.push_str(&serde_yaml::to_string(&preset_document(name, preset))?);
            Ok(out)
        }
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(&preset_document(name, preset))?;
            out.push('\n');
            Ok(out)
        }
    }
}

type PresetDocument = BTreeMap<&'static str, BTreeMap<String, Preset>>;

/// A config document holding just `preset`, loadable as a presets file.
fn preset_document(name: &str, preset: Preset) -> PresetDocument {
    let short = name.strip_prefix(BUILTIN_PREFIX).unwrap_or(name).to_string();
    BTreeMap::from([("presets", BTreeMap::from([(short, preset)]))])
}

fn sorted(mut preset: Preset) -> Preset {
    let rules = &mut preset.rules;
    for list in [
        &mut rules.allow,
        &mut rules.read,
        &mut rules.deny,
        &mut rules.deny_read,
        &mut rules.deny_write,
    ] {
        list.sort_by(|a, b| a.path.cmp(&b.path));
    }
    preset
}

fn preset_text(name: &str, preset: &Preset, chain: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Preset: {}", name);
    let _ = writeln!(out, "{}", "=".repeat(40));

    if !chain.is_empty() {
        let _ = writeln!(out, "Extends: {}", chain.join(" → "));
    }
    if !preset.extends.is_empty() {
        let _ = writeln!(out, "Extends: {}", preset.extends.join(", "));
    }

    let rules: &PresetRules = &preset.rules;
    for (flag, set) in [
        ("skip-defaults", rules.skip_defaults),
        ("strict", rules.strict),
        ("allow-keychain", rules.allow_keychain),
        ("allow-git", rules.allow_git),
    ] {
        if set {
            let _ = writeln!(out, "{}: true", flag);
        }
    }

    for (label, paths) in [
        ("allow", &rules.allow),
        ("read", &rules.read),
        ("deny", &rules.deny),
        ("deny-read", &rules.deny_read),
        ("deny-write", &rules.deny_write),
    ] {
        write_path_list(&mut out, label, paths);
    }
    out
}

fn write_path_list(out: &mut String, label: &str, paths: &[AllowPath]) {
    if paths.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}:", label);
    for path in paths {
        if path.resolve_symlinks {
            let _ = writeln!(out, "  - {} (eval-symlinks)", path.path);
        } else {
            let _ = writeln!(out, "  - {}", path.path);
        }
    }
}

#[derive(Serialize)]
struct DryRunReport<'a, P: Serialize> {
    platform: &'static str,
    technology: &'static str,
    plan: &'a SandboxPlan,
    policy: &'a P,
}

/// Render `--dry-run` output for `plan` compiled by `compiler`.
pub fn render_dry_run<C: PolicyCompiler>(
    compiler: &C,
    plan: &SandboxPlan,
    format: OutputFormat,
) -> Result<String, SandboxError> {
    let policy = compiler.compile(plan);
    let platform = compiler.platform();
    let report = DryRunReport {
        platform: platform.name(),
        technology: platform.technology(),
        plan,
        policy: &policy,
    };

    match format {
        OutputFormat::Text => {
            let mut out = compiler.describe(plan, &policy);
            let _ = writeln!(out);
            let _ = writeln!(out, "Command: {}", command_line(plan));
            Ok(out)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&report)?),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(&report)?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// The plan's command line, quoted for a POSIX shell.
pub fn command_line(plan: &SandboxPlan) -> String {
    shell_words::join(std::iter::once(&plan.command).chain(plan.args.iter()))
}
