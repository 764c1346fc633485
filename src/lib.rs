pub mod cli;
pub mod config;
pub mod diff; // Change-reason engine
pub mod equivalence;
pub mod lexicon; // Normalization tables
pub mod models;
pub mod parser;

use tracing_subscriber::EnvFilter;

pub use diff::{get_change_reason, ChangeReasoner, ChangeReport};
pub use equivalence::{
    freq_numeric, normalize_administration, normalize_frequency, normalize_indication_text,
    normalize_time_of_day, same_drug_core, tod_changed,
};
pub use lexicon::Lexicon;
pub use models::ParsedOrder;
pub use parser::{parse_order, parse_quantity, OrderParser};

/// Binary entry point: logging, optional lexicon overlay, one command.
pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let lexicon = match cli::load_lexicon() {
        Ok(lexicon) => lexicon,
        Err(e) => {
            tracing::error!("Failed to load lexicon: {e}");
            std::process::exit(1);
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    match cli::execute(&args, &lexicon) {
        Ok(output) => println!("{output}"),
        Err(e @ cli::CliError::Usage) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
