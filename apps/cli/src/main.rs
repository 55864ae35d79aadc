// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spacemark CLI: room matching and door numbering on JSON model snapshots.
//!
//! Usage:
//!   spacemark resolve <model.json> [--link NAME] [--rooms 1,2,...]
//!   spacemark spaces <model.json> [--link NAME] [--parameter NAME] [--blank-only] [--output FILE]
//!   spacemark number-doors <model.json> [--doors 1,2,...] [--dry-run] [--output FILE]
//!
//! Results are printed as JSON on stdout; logs go to stderr (`RUST_LOG`).

use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use spacemark_core::{Document, Element, ElementId, ElementKind, Phase, RoomId};
use spacemark_engine::{
    assign_door_marks, assign_spaces, ensure_doors, plan_door_marks, resolve_batch,
    resolve_batch_in_link, RoomMatch, RoomResolver,
};
use spacemark_geometry::BoxKernel;

mod config;

use config::Config;

const DEFAULT_SPACE_PARAMETER: &str = "Space";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Resolve,
    Spaces,
    NumberDoors,
}

#[derive(Debug, Default)]
struct Options {
    link: Option<String>,
    rooms: Option<Vec<RoomId>>,
    doors: Option<Vec<ElementId>>,
    parameter: Option<String>,
    blank_only: bool,
    dry_run: bool,
    output: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,spacemark=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return Ok(());
    }

    let command = match args[1].as_str() {
        "resolve" => Command::Resolve,
        "spaces" => Command::Spaces,
        "number-doors" => Command::NumberDoors,
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    };
    let model_path = &args[2];
    let options = parse_options(&args[3..])?;
    let config = Config::from_env();

    tracing::info!(
        command = ?command,
        model = %model_path,
        offset = config.offset,
        project_to_level = config.project_to_level,
        worker_threads = config.worker_threads,
        "Starting spacemark"
    );

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
    {
        tracing::warn!(error = %e, "Could not configure worker threads");
    }

    let json = fs::read_to_string(model_path)
        .with_context(|| format!("Cannot read model '{model_path}'"))?;
    let kernel = BoxKernel::new();
    let mut doc = Document::from_json(&json, &kernel)
        .with_context(|| format!("Cannot load model '{model_path}'"))?;
    let phase = select_phase(&doc, &config)?;

    match command {
        Command::Resolve => {
            let matches = resolve(&doc, &kernel, &phase, &config, &options)?;
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        Command::Spaces => {
            let matches = resolve(&doc, &kernel, &phase, &config, &options)?;
            let parameter = options
                .parameter
                .as_deref()
                .unwrap_or(DEFAULT_SPACE_PARAMETER);
            let written = assign_spaces(&mut doc, &matches, parameter, options.blank_only)?;
            tracing::info!(written, parameter, "Spaces assigned");
            println!("{}", serde_json::to_string_pretty(&matches)?);
            write_output(&doc, &kernel, options.output.as_deref())?;
        }
        Command::NumberDoors => {
            let all_doors = doc.door_ids();
            let to_label = options.doors.clone().unwrap_or_else(|| all_doors.clone());
            ensure_doors(&doc, &to_label, &phase)?;

            let mark_options = config.mark_options();
            let plan = plan_door_marks(&doc, &to_label, &phase, &all_doors, &mark_options);
            if !options.dry_run {
                assign_door_marks(&mut doc, &to_label, &phase, &all_doors, &mark_options);
                write_output(&doc, &kernel, options.output.as_deref())?;
            }
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }

    Ok(())
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--link" => options.link = Some(value(args, &mut i)?.to_string()),
            "--rooms" => {
                options.rooms = Some(parse_ids(value(args, &mut i)?)?.into_iter().map(RoomId).collect())
            }
            "--doors" => {
                options.doors = Some(
                    parse_ids(value(args, &mut i)?)?
                        .into_iter()
                        .map(ElementId)
                        .collect(),
                )
            }
            "--parameter" => options.parameter = Some(value(args, &mut i)?.to_string()),
            "--output" => options.output = Some(value(args, &mut i)?.to_string()),
            "--blank-only" => options.blank_only = true,
            "--dry-run" => options.dry_run = true,
            other => {
                print_usage();
                bail!("Unknown option: {other}");
            }
        }
        i += 1;
    }
    Ok(options)
}

/// Value following the flag at `i`; advances `i` onto it.
fn value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .with_context(|| format!("Missing value for {flag}"))
}

fn parse_ids(list: &str) -> Result<Vec<u64>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().with_context(|| format!("Invalid id '{s}'")))
        .collect()
}

fn select_phase(doc: &Document, config: &Config) -> Result<Phase> {
    match (&config.phase, doc.last_phase()) {
        (Some(name), _) => Ok(Phase::new(name.clone())),
        (None, Some(phase)) => Ok(phase.clone()),
        (None, None) => bail!("Model has no phases; set SPACEMARK_PHASE"),
    }
}

/// Elements worth matching to rooms.
fn placed_elements(doc: &Document) -> Vec<&Element> {
    doc.elements()
        .iter()
        .filter(|e| !matches!(e.kind, ElementKind::Annotation))
        .collect()
}

fn resolve(
    doc: &Document,
    kernel: &BoxKernel,
    phase: &Phase,
    config: &Config,
    options: &Options,
) -> Result<Vec<RoomMatch>> {
    let elements = placed_elements(doc);
    let resolver = RoomResolver::new(doc, kernel);
    let resolve_options = config.resolve_options();
    let candidates = options.rooms.as_deref();

    let matches = match &options.link {
        Some(name) => {
            let link = doc
                .link(name)
                .with_context(|| format!("No linked model named '{name}'"))?;
            resolve_batch_in_link(&resolver, &elements, phase, link, candidates, &resolve_options)
        }
        None => resolve_batch(&resolver, &elements, phase, candidates, &resolve_options),
    };
    Ok(matches)
}

fn write_output(doc: &Document, kernel: &BoxKernel, output: Option<&str>) -> Result<()> {
    let Some(path) = output else {
        return Ok(());
    };
    fs::write(path, doc.to_json(kernel)?).with_context(|| format!("Cannot write '{path}'"))?;
    tracing::info!(path, "Model written");
    Ok(())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  spacemark resolve <model.json> [--link NAME] [--rooms 1,2,...]");
    eprintln!(
        "  spacemark spaces <model.json> [--link NAME] [--parameter NAME] [--blank-only] [--output FILE]"
    );
    eprintln!("  spacemark number-doors <model.json> [--doors 1,2,...] [--dry-run] [--output FILE]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SPACEMARK_OFFSET            outline growth for room matching (default 1.0)");
    eprintln!("  SPACEMARK_PROJECT_TO_LEVEL  stretch outlines to the level elevation (default true)");
    eprintln!("  SPACEMARK_MARK_PREFIX       door mark prefix");
    eprintln!("  SPACEMARK_MARK_SEPARATOR    text between room number and suffix");
    eprintln!("  SPACEMARK_MARK_SUFFIXES     comma-separated suffixes (default A..Z)");
    eprintln!("  SPACEMARK_WORKER_THREADS    batch matching threads (default: CPU count)");
    eprintln!("  SPACEMARK_PHASE             phase name (default: the model's last phase)");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_id_lists() {
        let options = parse_options(&args(&[
            "--doors",
            "1, 2,3",
            "--blank-only",
            "--parameter",
            "Room Number",
        ]))
        .unwrap();

        assert_eq!(
            options.doors,
            Some(vec![ElementId(1), ElementId(2), ElementId(3)])
        );
        assert!(options.blank_only);
        assert_eq!(options.parameter.as_deref(), Some("Room Number"));
    }

    #[test]
    fn rejects_missing_values_and_unknown_flags() {
        assert!(parse_options(&args(&["--link"])).is_err());
        assert!(parse_options(&args(&["--rooms", "1,x"])).is_err());
        assert!(parse_options(&args(&["--fast"])).is_err());
    }
}
