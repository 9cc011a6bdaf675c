use clap::Parser;
use map_watch::report::{html, table};
use map_watch::utils::error::{ErrorCategory, ErrorSeverity};
use map_watch::utils::logger;
use map_watch::{CliConfig, RunOutcome, WatchError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting map-watch");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = match config.to_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    match map_watch::app::run(&settings).await {
        Ok(RunOutcome::TemplateCreated(path)) => {
            println!(
                "No {} file found. Creating one with a template, enter your own data and re-run.",
                path.display()
            );
        }
        Ok(RunOutcome::NoLocations) => {
            println!("No updates to report.");
        }
        Ok(RunOutcome::Completed(report)) => {
            println!("{}", table::render_table(&report.results));

            if !config.no_report {
                match html::write_report(&settings.report_path, &report.results).await {
                    Ok(Some(path)) if !config.no_open => html::open_in_browser(&path),
                    Ok(Some(path)) => println!("📁 Comparison saved to: {}", path.display()),
                    Ok(None) => {}
                    Err(e) => tracing::warn!("⚠️  Could not write HTML report: {}", e),
                }
            }

            let failed = report.failed().count();
            if failed > 0 {
                eprintln!("⚠️  {} location(s) could not be updated", failed);
                std::process::exit(2);
            }
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: WatchError) -> ! {
    if e.category() == ErrorCategory::Configuration {
        // 設定問題只顯示簡短提示
        tracing::debug!("Configuration problem: {:?}", e);
        println!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
