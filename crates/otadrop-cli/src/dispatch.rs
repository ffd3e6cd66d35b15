use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::CommandFactory;
use otadrop_core::{EventLog, PipelineOutcome, StatusEvent, StatusSink};
use otadrop_installer::StagingLayout;
use otadrop_pipeline::{locate_candidate, run_pipeline, PipelineContext};

use crate::config::{build_surface, identity_from_host, load_config, DEFAULT_CONFIG_PATH};
use crate::render::{
    current_output_style, render_outcome_line, render_section_header, render_status_line,
    TerminalSink,
};
use crate::report::{render_json_report, RunReport};
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Run {
            config,
            dry_run,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            let identity = identity_from_host(&config);
            let ctx = PipelineContext::new(config, identity);

            if dry_run {
                return run_gate_check(&ctx);
            }

            let surface = build_surface(&ctx.config.platform);
            if json {
                let mut log = EventLog::new();
                let outcome = run_pipeline(&ctx, &surface, &mut log);
                let report = RunReport {
                    outcome,
                    events: log.events(),
                };
                println!("{}", render_json_report(&report)?);
                return Ok(outcome_exit_code(outcome));
            }

            let style = current_output_style();
            if let Some(header) = render_section_header(style, "update run") {
                println!("{header}");
            }
            let mut sink = TerminalSink::new(style);
            let outcome = run_pipeline(&ctx, &surface, &mut sink);
            drop(sink);
            println!(
                "{}",
                render_outcome_line(style, outcome.as_str(), outcome.is_failure())
            );
            Ok(outcome_exit_code(outcome))
        }
        Commands::Doctor { config } => run_doctor(config.as_deref()),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "otadrop",
                &mut std::io::stdout(),
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_gate_check(ctx: &PipelineContext) -> Result<ExitCode> {
    let style = current_output_style();
    if let Some(header) = render_section_header(style, "dry run") {
        println!("{header}");
    }

    let mut sink = TerminalSink::new(style);
    let Some(candidate) = locate_candidate(&ctx.config.source_dir, &ctx.naming(), &mut sink)
    else {
        println!(
            "{}",
            render_outcome_line(style, PipelineOutcome::NoCandidateFound.as_str(), false)
        );
        return Ok(ExitCode::SUCCESS);
    };

    if ctx.identity.wrapped_version_marker().is_none() {
        sink.record(StatusEvent::MissingVersionMarker);
    }
    if ctx.identity.is_already_applied(&candidate.name) {
        sink.record(StatusEvent::AlreadyUpgraded {
            name: candidate.name.clone(),
        });
        println!(
            "{}",
            render_outcome_line(style, PipelineOutcome::AlreadyUpgraded.as_str(), false)
        );
        return Ok(ExitCode::SUCCESS);
    }

    let staged_path = StagingLayout::new(&ctx.config.staging_dir).staged_path(&candidate.name);
    println!(
        "{}",
        render_status_line(
            style,
            "ok",
            &format!(
                "dry run: would stage {} at {} and invoke the platform installer",
                candidate.name,
                staged_path.display()
            )
        )
    );
    Ok(ExitCode::SUCCESS)
}

fn run_doctor(config_path: Option<&Path>) -> Result<ExitCode> {
    let style = current_output_style();
    let resolved_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = load_config(config_path)?;
    let identity = identity_from_host(&config);

    if let Some(header) = render_section_header(style, "doctor") {
        println!("{header}");
    }
    println!(
        "{}",
        render_status_line(style, "step", &format!("config: {}", resolved_path.display()))
    );
    println!(
        "{}",
        render_status_line(
            style,
            "step",
            &format!(
                "device: model '{}', build version '{}'",
                identity.model, identity.build_version
            )
        )
    );

    match fs::read_dir(&config.source_dir) {
        Ok(entries) => {
            let count = entries.filter_map(|entry| entry.ok()).count();
            println!(
                "{}",
                render_status_line(
                    style,
                    "ok",
                    &format!(
                        "source dir: {} ({count} entries)",
                        config.source_dir.display()
                    )
                )
            );
        }
        Err(err) => println!(
            "{}",
            render_status_line(
                style,
                "warn",
                &format!(
                    "source dir {} is not enumerable: {err}",
                    config.source_dir.display()
                )
            )
        ),
    }

    if config.staging_dir.is_dir() {
        println!(
            "{}",
            render_status_line(
                style,
                "ok",
                &format!("staging dir: {}", config.staging_dir.display())
            )
        );
    } else {
        println!(
            "{}",
            render_status_line(
                style,
                "warn",
                &format!(
                    "staging dir {} is missing; it is created on first run",
                    config.staging_dir.display()
                )
            )
        );
    }

    let surface = build_surface(&config.platform);
    match surface.load_trusted_keys() {
        Ok(keys) => println!(
            "{}",
            render_status_line(
                style,
                if keys.is_empty() { "warn" } else { "ok" },
                &format!(
                    "trust store: {} ({} keys)",
                    config.platform.trusted_keys_dir.display(),
                    keys.len()
                )
            )
        ),
        Err(err) => println!(
            "{}",
            render_status_line(style, "warn", &format!("trust store: {err:#}"))
        ),
    }

    println!(
        "{}",
        render_status_line(
            style,
            "step",
            &format!("recovery control dir: {}", config.platform.control_dir.display())
        )
    );

    Ok(ExitCode::SUCCESS)
}

pub(crate) fn outcome_exit_code(outcome: PipelineOutcome) -> ExitCode {
    if outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
