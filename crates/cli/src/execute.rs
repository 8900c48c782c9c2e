use crate::commands::Commands;
use blazebridge_config::Config;

impl Commands {
    pub fn execute(self, config: &Config) -> eyre::Result<()> {
        match self {
            Commands::TestResults {
                bep_file,
                keep,
                best_effort,
                json,
            } => crate::commands::test_results::execute(config, &bep_file, keep, best_effort, json),
            Commands::Inspect {
                bep_file,
                best_effort,
            } => crate::commands::inspect::execute(config, &bep_file, best_effort),
        }
    }
}
