use configs::AppConfig;
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn load_config() -> Option<AppConfig> {
    // 提前加载 .env，使得 RUST_LOG、SERVER_PORT 等环境变量生效
    dotenv().ok();
    match AppConfig::load_or_env() {
        Ok(cfg) => {
            common::utils::logging::init_logging(cfg.logging.json);
            info!(service = "server", event = "logger_init", json = cfg.logging.json, "tracing subscriber initialized");
            Some(cfg)
        }
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "server", event = "config_invalid", error = %e, "failed to load configuration");
            None
        }
    }
}

fn main() -> std::process::ExitCode {
    let Some(cfg) = load_config() else {
        return std::process::ExitCode::FAILURE;
    };

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志
    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "server",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "server",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        data_dir = %cfg.storage.data_dir.display(),
        "issue tracker starting"
    );

    // Ctrl+C 触发优雅停机，正在处理的请求完成后退出
    let shutdown = async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!(service = "server", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
        }
    };

    match rt.block_on(server::run(cfg, shutdown)) {
        Ok(()) => {
            info!(service = "server", event = "stop", %service_id, pid, "server stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "server", event = "run_failed", error = %e, "server::run returned error");
            std::process::ExitCode::FAILURE
        }
    }
}
