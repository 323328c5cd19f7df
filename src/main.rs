//! CLI entry point for cage.

use std::process::ExitCode;

use anyhow::Context;
use clap::CommandFactory;

use cage::cli::Cli;
use cage::config::load_config;
use cage::output::{render_preset, render_preset_list};
use cage::policy::build_plan;
use cage::sandbox::{dry_run_native, launch_native};
use cage::utils::{git_common_dir, init_debug_logging};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    init_debug_logging(cli.debug);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("cage: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config.as_deref()).context("error loading config")?;

    if cli.list_presets {
        print!("{}", render_preset_list(&config));
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(name) = &cli.show_preset {
        print!("{}", render_preset(&config, name, cli.raw, cli.format)?);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(request) = cli.plan_request() else {
        eprintln!("{}", Cli::command().render_usage());
        return Ok(ExitCode::from(1));
    };

    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let plan = build_plan(&config, &request, &cwd, git_common_dir)?;
    tracing::debug!("Sandbox plan: {:?}", plan);

    if cli.dry_run {
        print!("{}", dry_run_native(&plan, cli.format)?);
        return Ok(ExitCode::SUCCESS);
    }

    match launch_native(&plan)? {}
}
