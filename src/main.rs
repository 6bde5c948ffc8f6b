use clap::Parser;
use log::{debug, info, warn};
use rust_rtsp_grabber::brute::CancelToken;
use rust_rtsp_grabber::cli::{Cli, handle_cli};
use std::error::Error;
use std::path::Path;
use std::time::Instant;

const LOG_CONFIG_FILE: &str = "log4rs.yaml";

// 初始化日志：优先使用 log4rs 配置文件，不存在或无效时回退到 env_logger
fn init_logging() {
    if Path::new(LOG_CONFIG_FILE).exists() {
        match log4rs::init_file(LOG_CONFIG_FILE, Default::default()) {
            Ok(()) => return,
            Err(e) => eprintln!("Failed to initialize log4rs from {}: {}", LOG_CONFIG_FILE, e),
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

// 主函数
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // 记录开始时间
    let start_time = Instant::now();
    init_logging();

    // Ctrl-C 取消当前运行，已派发的尝试会被中止并释放资源
    let cancel = CancelToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining trials");
            ctrl_c_cancel.cancel();
        }
    });

    // 处理命令行参数
    let cli = Cli::parse();
    debug!("{:?}", cli);
    handle_cli(cli, cancel).await?;

    // 计算并输出总耗时
    info!("Total execution time: {:?}", start_time.elapsed());
    Ok(())
}
