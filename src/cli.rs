use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::fetch::{http_client, DumpClient};
use crate::mapdata::{assemble, write_map_data};
use crate::preload::preload;
use crate::temples::{
    build_temples, curated_names, load_static_module, mark_focus, read_sheet,
    reconcile_with_report, write_static_module,
};

pub const USAGE: &str =
    "usage: grepomap <build-temples|merge-temples|mark-focus|map-data|preload> [args]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    BuildTemples,
    MergeTemples,
    MarkFocus,
    MapData,
    Preload,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("build-temples") => Some(Command::BuildTemples),
        Some("merge-temples") => Some(Command::MergeTemples),
        Some("mark-focus") => Some(Command::MarkFocus),
        Some("map-data") => Some(Command::MapData),
        Some("preload") => Some(Command::Preload),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };

    match command {
        Command::BuildTemples => report("build-temples", handle_build_temples(args, &config)),
        Command::MergeTemples => report("merge-temples", handle_merge_temples(args, &config)),
        Command::MarkFocus => report("mark-focus", handle_mark_focus(args, &config)),
        Command::MapData => report("map-data", handle_map_data(args, config)),
        Command::Preload => handle_preload(args, &config),
    }
}

fn report(job: &str, result: Result<(), Box<dyn Error>>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{job} failed: {err}");
            1
        }
    }
}

fn sheet_path(args: &[String], config: &Config) -> PathBuf {
    args.get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.sheet.path.clone())
}

fn handle_build_temples(args: &[String], config: &Config) -> Result<(), Box<dyn Error>> {
    let sheet = sheet_path(args, config);
    let rows = read_sheet(&sheet, &config.sheet)?;
    let temples = build_temples(&rows);
    write_static_module(&config.static_module, &temples)?;
    println!(
        "Wrote {} ({} temples)",
        config.static_module.display(),
        temples.len()
    );
    Ok(())
}

fn handle_merge_temples(args: &[String], config: &Config) -> Result<(), Box<dyn Error>> {
    let sheet = sheet_path(args, config);
    let existing = load_static_module(&config.static_module)?;
    let rows = read_sheet(&sheet, &config.sheet)?;
    let merged = reconcile_with_report(existing, &rows);
    write_static_module(&config.static_module, &merged.temples)?;

    let r = &merged.report;
    println!(
        "Wrote {} ({} temples): added={}, refreshed={}, id_changes={}, skipped={}, dropped_focus={}, unkeyed={}",
        config.static_module.display(),
        merged.temples.len(),
        r.added,
        r.refreshed,
        r.id_changes,
        r.skipped_existing,
        r.dropped_focus,
        r.unkeyed
    );
    Ok(())
}

fn handle_mark_focus(args: &[String], config: &Config) -> Result<(), Box<dyn Error>> {
    let sheet = sheet_path(args, config);
    let temples = load_static_module(&config.static_module)?;
    let curated = curated_names(&temples);
    let marked = mark_focus(&sheet, &curated, &config.sheet)?;
    println!(
        "Marked {marked} row(s) as focus in {} ({} curated temples)",
        sheet.display(),
        curated.len()
    );
    Ok(())
}

fn handle_map_data(args: &[String], mut config: Config) -> Result<(), Box<dyn Error>> {
    if let Some(world) = args.get(2) {
        config.world = world.clone();
    }
    let temples = load_static_module(&config.static_module)?;
    let base_url = config.world_data_url();
    let client = DumpClient::new(base_url.as_str(), Duration::from_secs(config.timeout_secs))?;

    let runtime = tokio::runtime::Runtime::new()?;
    let dump = runtime.block_on(client.fetch_world())?;

    let data = assemble(dump.players, dump.alliances, dump.towns, temples);
    write_map_data(&config.map_data, &data)?;
    println!(
        "Wrote {} for {}: {} temples, {} alliances, {} players",
        config.map_data.display(),
        config.world,
        data.temples.len(),
        data.alliances.len(),
        data.players.len()
    );
    Ok(())
}

fn handle_preload(args: &[String], config: &Config) -> i32 {
    let sources: Vec<String> = args.iter().skip(2).cloned().collect();
    if sources.is_empty() {
        eprintln!("usage: grepomap preload <url-or-path>...");
        return 2;
    }

    let outcome = http_client(Duration::from_secs(config.timeout_secs))
        .map_err(|err| Box::new(err) as Box<dyn Error>)
        .and_then(|client| {
            let runtime = tokio::runtime::Runtime::new()?;
            Ok(runtime.block_on(preload(&client, &sources)))
        });

    match outcome {
        Ok(cache) => {
            println!(
                "Preloaded {}/{} asset(s)",
                cache.loaded.len(),
                sources.len()
            );
            for src in &cache.missing {
                println!("missing: {src}");
            }
            0
        }
        Err(err) => {
            eprintln!("preload failed: {err}");
            1
        }
    }
}
