use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "llm_twin_etl=info";
const VERBOSE_DIRECTIVES: &str = "llm_twin_etl=debug,info";

/// `RUST_LOG` wins over the built-in directives.
fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

pub fn init_cli_logger(verbose: bool) {
    let (filter, layer) = if verbose {
        // 詳細模式顯示模組名稱，方便分辨是哪個爬蟲
        (env_filter(VERBOSE_DIRECTIVES), fmt::layer().with_target(true))
    } else {
        (env_filter(DEFAULT_DIRECTIVES), fmt::layer().with_target(false))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer.with_thread_ids(false).compact())
        .init();
}

/// 容器內執行時使用 JSON 格式，方便日誌收集
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_DIRECTIVES))
        .with(
            fmt::layer()
                .with_target(true)
                .json()
                .with_current_span(false),
        )
        .init();
}
