use blazebridge_bep::{
    BepTestFinderStrategy, OutputFile, TestResult, TestResultFinderStrategy, TestResults,
};
use blazebridge_config::Config;
use eyre::eyre;
use serde_json::json;
use std::path::Path;

pub fn execute(
    config: &Config,
    bep_file: &Path,
    keep: bool,
    best_effort: bool,
    as_json: bool,
) -> eyre::Result<()> {
    let mut bep = config.bep.clone();
    bep.best_effort |= best_effort;

    let mut finder = BepTestFinderStrategy::for_file(bep_file, &bep);
    if keep {
        finder = finder.retain_output_file();
    }
    let results = finder.find_test_results();
    finder.delete_temporary_output_files();

    let TestResults::Results(results) = results else {
        return Err(eyre!(
            "no test results could be read from '{}'",
            bep_file.display()
        ));
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&to_json(&results))?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No test outputs reported.");
    }
    for result in &results {
        println!("{} ({})", result.label, result.configuration_mnemonic);
        for file in &result.output_files {
            println!("  {}", display_location(file));
        }
    }
    Ok(())
}

pub(crate) fn display_location(file: &OutputFile) -> String {
    if let Some(path) = file.local_path() {
        return path.display().to_string();
    }
    file.uri.clone().unwrap_or_else(|| file.relative_path())
}

fn to_json(results: &[TestResult]) -> serde_json::Value {
    results
        .iter()
        .map(|result| {
            json!({
                "label": result.label,
                "configuration": result.configuration_mnemonic,
                "files": result
                    .output_files
                    .iter()
                    .map(display_location)
                    .collect::<Vec<_>>(),
            })
        })
        .collect()
}
