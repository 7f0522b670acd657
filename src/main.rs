use clap::Parser;
use interpro_precalc::utils::{logger, validation::Validate};
use interpro_precalc::{app, CliConfig, LookupError};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    let settings = match cli.resolve().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed");
            fail(e)
        }
    };

    tracing::info!(
        "Looking up {} against {} (max_per_query={}, sleep={}s)",
        settings.input,
        settings.endpoint,
        settings.max_per_query,
        settings.sleep_seconds
    );

    match app::run(&settings).await {
        Ok(summary) => {
            tracing::info!(
                "✅ Wrote {} matches for {} sequences in {} batches ({} skipped)",
                summary.matches_written,
                summary.sequences,
                summary.batches,
                summary.skipped_batches
            );
        }
        Err(e) => fail(e),
    }
}

fn fail(e: LookupError) -> ! {
    tracing::error!(
        "❌ Lookup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    std::process::exit(e.exit_code());
}
