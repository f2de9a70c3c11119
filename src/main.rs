use clap::Parser;
use llm_twin_etl::config::Command;
use llm_twin_etl::export::export_collections;
use llm_twin_etl::infrastructure::db;
use llm_twin_etl::utils::error::ErrorSeverity;
use llm_twin_etl::utils::{logger, validation::Validate};
use llm_twin_etl::{
    CliConfig, DigitalDataEtl, EtlEngine, EtlError, EtlRunConfig, LocalStorage, Result, Settings,
};

#[tokio::main]
async fn main() {
    // .env 不存在時直接略過
    dotenvy::dotenv().ok();

    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting llm-twin CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(config).await {
        report_failure(&e);

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,   // 重試錯誤
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        };
        std::process::exit(exit_code);
    }
}

async fn run(config: CliConfig) -> Result<()> {
    let settings = Settings::load(&config.settings)?;

    match config.command {
        Command::RunEtl {
            config: run_config,
            report_dir,
            monitor,
            no_progress,
        } => {
            let run_config = EtlRunConfig::from_file(&run_config)?;
            run_config.validate()?;

            if monitor {
                tracing::info!("🔍 System monitoring enabled");
            }

            let storage = LocalStorage::new(report_dir);
            let pipeline = DigitalDataEtl::from_settings(&settings, run_config, storage)
                .await?
                .with_progress(!no_progress);

            let engine = EtlEngine::new_with_monitoring(pipeline, monitor);
            let report_path = engine.run().await?;

            tracing::info!("✅ ETL process completed successfully!");
            println!("✅ ETL process completed successfully!");
            println!("📁 Run report saved to: {}", report_path);
        }
        Command::ExportData { output, filename } => {
            let store = db::connect(&settings).await?;
            let storage = LocalStorage::new(output);

            let archive = export_collections(store.as_ref(), &storage, &filename).await?;
            println!("📦 Data warehouse exported to: {}", archive);
        }
        Command::ExportSettings { path } => {
            let path = path.unwrap_or(config.settings);
            if settings.export(&path)? {
                println!("🔐 Settings written to {}", path.display());
            } else {
                println!("⚠️  {} already exists, nothing written", path.display());
            }
        }
        Command::CheckDb => {
            let store = db::connect(&settings).await?;
            let collections = store.collections().await?;
            println!("✅ Document store is reachable");
            if collections.is_empty() {
                println!("   (no collections yet)");
            }
            for collection in collections {
                println!("   - {}", collection);
            }
        }
        Command::Hello => {
            println!("👋 Hello from llm-twin {}", env!("CARGO_PKG_VERSION"));
            for (key, value) in settings.to_values() {
                println!("   {} = {}", key, value);
            }
        }
    }

    Ok(())
}

fn report_failure(e: &EtlError) {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
}
