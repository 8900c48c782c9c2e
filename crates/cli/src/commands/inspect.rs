use super::test_results::display_location;
use blazebridge_bep::{ParseMode, ParsedBepOutput};
use blazebridge_config::Config;
use std::path::Path;

pub fn execute(config: &Config, bep_file: &Path, best_effort: bool) -> eyre::Result<()> {
    let mode = ParseMode::from_best_effort(config.bep.best_effort || best_effort);
    let parsed = ParsedBepOutput::parse_file(bep_file, config.bep.max_message_bytes, mode)?;

    let metadata = parsed.build_metadata();
    println!("Build {}", metadata.uuid.as_deref().unwrap_or("<unknown>"));
    if let Some(command) = &metadata.command {
        println!("  command: {command}");
    }
    match (&metadata.overall_success, &metadata.exit_status) {
        (Some(success), Some(exit)) => {
            println!("  finished: success={success} exit={} ({})", exit.name, exit.code)
        }
        (Some(success), None) => println!("  finished: success={success}"),
        _ => println!("  finished: <no finished event>"),
    }
    println!("  events: {}", parsed.event_count());
    if let Some(reason) = parsed.truncation() {
        println!("  truncated: {reason}");
    }
    if parsed.overwritten_targets() > 0 {
        println!("  targets completed more than once: {}", parsed.overwritten_targets());
    }

    println!("Configurations:");
    for (id, configuration) in parsed.configurations() {
        println!("  {id}: {}", configuration.mnemonic);
    }

    println!("Targets:");
    for (key, target) in parsed.target_results() {
        let status = if target.success { "ok" } else { "failed" };
        println!("  {key} {status}");
        for group in target.output_groups.keys() {
            let files = parsed.output_group_files(key, group)?;
            println!("    {group} ({} files)", files.len());
            for file in &files {
                println!("      {}", display_location(file));
            }
        }
    }
    Ok(())
}
