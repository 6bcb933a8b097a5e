//! Command dispatch: load configuration, build the index, run the
//! requested operation, render the outcome.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use crate::cli::args::{
    AddCommand, Arguments, Command, CommonArgs, KeysCommand, RenameCommand, ReportCommand,
    SearchCommand, WatchCommand,
};
use crate::cli::exit_status::ExitStatus;
use crate::config::{self, CONFIG_FILE_NAME, Config, DisplayMode};
use crate::core::cancel::CancelToken;
use crate::core::index::{IndexOptions, TranslationIndex};
use crate::core::matching;
use crate::core::rename;
use crate::core::report::CoverageReport;
use crate::core::watch;
use crate::core::writer;
use crate::utils::ellipsize;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };
    let Some(command) = args.command else {
        return Ok(ExitStatus::Success);
    };

    match command {
        Command::Keys(cmd) => keys(cmd),
        Command::Search(cmd) => search(cmd),
        Command::Report(cmd) => report(cmd),
        Command::Rename(cmd) => rename_key(cmd),
        Command::Add(cmd) => add(cmd),
        Command::Watch(cmd) => watch_command(cmd),
        Command::Init => init(),
    }
}

fn load_project(common: &CommonArgs) -> Result<(Config, TranslationIndex)> {
    let loaded = config::load_config(&common.root)?;
    let config = loaded.config;
    let index = TranslationIndex::with_options(
        &common.root,
        IndexOptions {
            extra_excludes: config.excludes.clone(),
            functions: config.function_names(),
            framework_override: config.framework,
        },
    );
    index.initialize();
    Ok((config, index))
}

fn display_locale(common: &CommonArgs, config: &Config) -> Option<String> {
    common
        .display_locale
        .clone()
        .or_else(|| config.display_locale().map(|l| l.to_string()))
}

fn print_warnings(index: &TranslationIndex, verbose: bool) {
    if !verbose {
        return;
    }
    for warning in index.warnings() {
        eprintln!(
            "{} {}: {}",
            "warning:".bold().yellow(),
            warning.file.display(),
            warning.error
        );
    }
}

fn keys(cmd: KeysCommand) -> Result<ExitStatus> {
    let (config, index) = load_project(&cmd.common)?;
    print_warnings(&index, cmd.common.verbose);
    let locale = display_locale(&cmd.common, &config);

    let keys = match &cmd.prefix {
        Some(prefix) => index.find_keys_by_prefix(prefix),
        None => index.get_all_keys(),
    };
    for key in &keys {
        match index.get_translation(key, locale.as_deref()) {
            Some(entry) if config.display_mode == DisplayMode::TranslationOnly => {
                println!("{}", ellipsize(&entry.value, 80));
            }
            Some(entry) => println!("{}  {}", key, ellipsize(&entry.value, 60).dimmed()),
            None => println!("{}", key),
        }
    }
    println!(
        "{} keys, {} locales ({})",
        keys.len(),
        index.get_available_locales().len(),
        index.framework()
    );
    Ok(ExitStatus::Success)
}

fn search(cmd: SearchCommand) -> Result<ExitStatus> {
    let (config, index) = load_project(&cmd.common)?;
    print_warnings(&index, cmd.common.verbose);
    let locale = display_locale(&cmd.common, &config);

    let keys = index.get_all_keys();
    let namespace = cmd.namespace.as_deref().unwrap_or("");
    let lookup = |key: &str| {
        index
            .get_translation(key, locale.as_deref())
            .map(|entry| entry.value)
    };
    let ranked = matching::rank(&cmd.query, &keys, namespace, &lookup);

    if ranked.is_empty() {
        println!("no keys match '{}'", cmd.query);
        return Ok(ExitStatus::Failure);
    }
    for result in ranked.iter().take(cmd.limit) {
        let value = lookup(&result.key).unwrap_or_default();
        println!("{:>4}  {}  {}", result.score, result.key, ellipsize(&value, 48).dimmed());
    }
    Ok(ExitStatus::Success)
}

fn report(cmd: ReportCommand) -> Result<ExitStatus> {
    let (config, index) = load_project(&cmd.common)?;
    print_warnings(&index, cmd.common.verbose);

    let reference = cmd
        .reference_locale
        .clone()
        .unwrap_or_else(|| config.reference_locale.clone());
    let coverage = CoverageReport::build(&index, &reference);
    print!("{}", coverage.render());

    if cmd.missing {
        for locale in &coverage.locales {
            if locale.missing.is_empty() {
                continue;
            }
            println!("missing in {}:", locale.locale);
            for key in &locale.missing {
                println!("  {}", key);
            }
        }
    }

    let has_gaps = !coverage.orphaned.is_empty()
        || coverage.locales.iter().any(|l| !l.missing.is_empty());
    Ok(if has_gaps {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    })
}

fn rename_key(cmd: RenameCommand) -> Result<ExitStatus> {
    let (_, index) = load_project(&cmd.common)?;
    print_warnings(&index, cmd.common.verbose);

    let plan = rename::plan(&index, &cmd.old_key, &cmd.new_key, &CancelToken::new())?;
    for (path, reason) in &plan.skipped {
        eprintln!(
            "{} {}: {}",
            "skipped:".bold().yellow(),
            path.display(),
            reason
        );
    }
    if plan.files.is_empty() {
        println!(
            "nothing to rename: no declarations or usages of '{}' found",
            cmd.old_key
        );
        return Ok(ExitStatus::Failure);
    }

    if !cmd.apply {
        println!(
            "would rewrite {} sites in {} files (dry run, pass --apply to rewrite):",
            plan.edit_count(),
            plan.files.len()
        );
        for file in &plan.files {
            println!("  {} ({} edits)", file.path.display(), file.edits.len());
        }
        return Ok(ExitStatus::Success);
    }

    let outcome = rename::apply(&index, &plan);
    for path in &outcome.updated {
        println!("{} {}", "updated".green(), path.display());
    }
    for (path, error) in &outcome.failed {
        eprintln!("{} {}: {}", "failed:".bold().red(), path.display(), error);
    }
    Ok(if outcome.failed.is_empty() {
        ExitStatus::Success
    } else {
        ExitStatus::Failure
    })
}

fn add(cmd: AddCommand) -> Result<ExitStatus> {
    let (_, index) = load_project(&cmd.common)?;
    print_warnings(&index, cmd.common.verbose);

    let value = cmd.value.as_deref().unwrap_or("");
    let outcomes = writer::create_key(&index, &cmd.key, value)?;
    if outcomes.is_empty() {
        println!(
            "no translation file matches '{}'; create the locale file first",
            cmd.key
        );
        return Ok(ExitStatus::Failure);
    }
    for outcome in &outcomes {
        println!(
            "{} {} ({})",
            "added to".green(),
            outcome.file.display(),
            outcome.locale
        );
    }
    Ok(ExitStatus::Success)
}

fn watch_command(cmd: WatchCommand) -> Result<ExitStatus> {
    let (_, index) = load_project(&cmd.common)?;
    print_warnings(&index, cmd.common.verbose);

    let index = Arc::new(index);
    println!(
        "watching {} ({} keys); press Ctrl-C to stop",
        cmd.common.root.display(),
        index.get_all_keys().len()
    );
    watch::watch_project(
        &index,
        Duration::from_millis(cmd.debounce_ms),
        &CancelToken::new(),
    )?;
    Ok(ExitStatus::Success)
}

fn init() -> Result<ExitStatus> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE_NAME);
    }
    fs::write(config_path, config::default_config_json()?)?;
    println!("created {}", CONFIG_FILE_NAME);
    Ok(ExitStatus::Success)
}
