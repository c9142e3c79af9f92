use clap::Parser;
use nyc311_etl::core::window;
use nyc311_etl::utils::error::ErrorSeverity;
use nyc311_etl::utils::{logger, validation::Validate};
use nyc311_etl::{CliConfig, EtlEngine, LocalStorage, ServiceRequestPipeline, Settings, SocrataClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting nyc311-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證設定
    let settings = match Settings::resolve(&cli).and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No request will be sent");
        perform_dry_run(&settings)?;
        return Ok(());
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let hours = settings.hours;
    let output = settings.output_path.clone();
    let pipeline = ServiceRequestPipeline::new(LocalStorage::default(), settings);
    let engine = EtlEngine::new_with_monitoring(pipeline, cli.monitor);

    match engine.run(hours, output.as_deref()).await {
        Ok(table) => {
            tracing::info!(
                "✅ ETL process completed: {} records, {} columns",
                table.len(),
                table.columns().len()
            );
            if output.is_none() {
                println!("💡 Pass --output <path> to save the records as CSV");
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn perform_dry_run(settings: &Settings) -> anyhow::Result<()> {
    let window = window::rolling_window(settings.hours, settings.origin.timezone)?;
    let client = SocrataClient::new(settings.endpoint.as_str(), settings.limit);
    let url = client.request_url(&window.utc_start_iso)?;

    println!("📋 Dry run summary");
    println!("  Lookback:      {} hours", window.hours);
    println!(
        "  Window start:  {} ({})",
        window.local_start.format("%Y-%m-%d %H:%M:%S %Z"),
        settings.origin.timezone
    );
    println!("  UTC boundary:  {}", window.utc_start_iso);
    println!("  Request:       GET {}", url);
    println!(
        "  Output:        {}",
        settings.output_path.as_deref().unwrap_or("(not saved)")
    );
    Ok(())
}
