use clap::Subcommand;
use std::path::PathBuf;

pub mod inspect;
pub mod test_results;

#[derive(Subcommand)]
pub enum Commands {
    /// List the test outputs reported in a BEP file.
    ///
    /// The file is treated as temporary build output and deleted after it is
    /// read unless --keep is given.
    #[command(visible_alias = "tr")]
    TestResults {
        /// File written with --build_event_binary_file
        bep_file: PathBuf,

        /// Leave the BEP file in place
        #[arg(long)]
        keep: bool,

        /// Report what was read before a corrupted or truncated tail
        #[arg(long)]
        best_effort: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show targets, output groups and resolved files of a BEP file
    Inspect {
        /// File written with --build_event_binary_file
        bep_file: PathBuf,

        /// Report what was read before a corrupted or truncated tail
        #[arg(long)]
        best_effort: bool,
    },
}
