use crate::brute::cancel::CancelToken;
use crate::brute::report::RunReport;
use crate::brute::result_collector::{latest_run_dir, list_images};
use crate::brute::runner::ScanRunner;
use crate::capture::{CaptureProvider, CaptureReply, CaptureRequest, FfmpegCapture};
use crate::config::config::{
    DEFAULT_CAPTURE_TIMEOUT_SECS, DEFAULT_MAX_RATE, DEFAULT_OUTPUT_DIR, DEFAULT_SCAN_TIMEOUT_MS,
    ScanArgs, load_and_merge_config,
};
use crate::discovery::{DiscoveryProvider, DiscoveryRequest, MasscanDiscovery};
use crate::errors::errors::RtspError;
use crate::iterator::port_parser::parse_ports;
use clap::Parser;
use colored::Colorize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

// 定义命令行参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub enum Cli {
    /// 发现主机并对每个主机枚举路由和凭据，保存抓到的图像
    Scan(ScanArgs),
    /// 仅进行主机发现，输出端口开放的主机
    Discover {
        /// 扫描的端口，如 554 或 554,8554
        #[arg(short, long)]
        ports: String,
        /// IP范围，如 192.168.1.1-192.168.1.255
        #[arg(long)]
        range: Option<String>,
        /// 等待时间(毫秒)
        #[arg(short = 't', long, default_value_t = DEFAULT_SCAN_TIMEOUT_MS)]
        scan_timeout_ms: u64,
        /// 发包速率(包/秒)
        #[arg(long, default_value_t = DEFAULT_MAX_RATE)]
        max_rate: u32,
        /// masscan 可执行文件路径
        #[arg(long, default_value = "masscan")]
        masscan_path: String,
    },
    /// 使用单个凭据从一个流地址抓取一帧图像
    Capture {
        /// RTSP URL
        rtsp_url: String,
        /// 用户名 (留空表示无需认证)
        #[arg(default_value = "")]
        username: String,
        /// 密码 (留空表示无需认证)
        #[arg(default_value = "")]
        password: String,
        /// 图像保存路径
        #[arg(short, long, default_value = "frame.jpg")]
        output: String,
        /// 超时时间(秒)
        #[arg(long, default_value_t = DEFAULT_CAPTURE_TIMEOUT_SECS)]
        capture_timeout_secs: u64,
        /// ffmpeg 可执行文件路径
        #[arg(long, default_value = "ffmpeg")]
        ffmpeg_path: String,
    },
    /// 列出一次运行保存的图像，默认为最近一次运行
    Images {
        /// 运行目录
        run_dir: Option<String>,
        /// 图片输出目录
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: String,
    },
}

/// 按配置文件和命令行参数执行一次完整运行
pub async fn run_scan(args: &ScanArgs, cancel: CancelToken) -> Result<RunReport, RtspError> {
    let config = load_and_merge_config(args)?;
    ScanRunner::from_config(config)
        .with_cancel_token(cancel)
        .run()
        .await
}

// 输出运行结果
fn print_report(report: &RunReport) {
    let stats = &report.stats;
    println!(
        "{} {} hosts, {} trials ({} dispatched, {} failed, {} timed out, {} skipped)",
        "Run finished:".bold(),
        report.host_count,
        report.trial_space,
        stats.dispatched,
        stats.failed,
        stats.timed_out,
        stats.skipped
    );
    for failure in &stats.persist_failures {
        println!(
            "{} {}: {}",
            "Not saved:".yellow(),
            failure.host,
            failure.reason
        );
    }
    if report.cancelled {
        println!("{}", "Run cancelled before all trials completed".yellow());
    }
    print_images(&report.run_dir, &report.images);
}

fn print_images(run_dir: &Path, images: &[PathBuf]) {
    if images.is_empty() {
        println!("{} {}", "No images captured in".red(), run_dir.display());
        return;
    }
    println!(
        "{} {} images in {}",
        "Success:".green().bold(),
        images.len(),
        run_dir.display()
    );
    for image in images {
        println!("  {}", image.display());
    }
}

async fn discover(
    ports: &str,
    range: Option<String>,
    scan_timeout_ms: u64,
    max_rate: u32,
    masscan_path: &str,
    cancel: CancelToken,
) -> Result<(), RtspError> {
    let request = DiscoveryRequest {
        ports: parse_ports(ports)?,
        range,
        timeout: Duration::from_millis(scan_timeout_ms),
        max_rate,
    };
    let discovery = MasscanDiscovery::new(masscan_path);
    let hosts = tokio::select! {
        _ = cancel.cancelled() => return Err(RtspError::Cancelled),
        hosts = discovery.discover(&request) => hosts?,
    };

    if hosts.is_empty() {
        println!("{}", "No hosts found".yellow());
    }
    for host in hosts {
        println!("{}", host);
    }
    Ok(())
}

async fn capture_single(
    rtsp_url: String,
    username: String,
    password: String,
    output: &str,
    timeout: Duration,
    ffmpeg_path: &str,
) -> Result<(), RtspError> {
    let request = CaptureRequest {
        address: rtsp_url,
        username: Some(username).filter(|u| !u.is_empty()),
        password: Some(password).filter(|p| !p.is_empty()),
        timeout,
    };
    log::debug!("Capturing a frame from {}", request.address);

    let capture = FfmpegCapture::new(ffmpeg_path);
    match tokio::time::timeout(timeout, capture.capture(&request)).await {
        Err(_) => Err(RtspError::CaptureError(format!(
            "no frame from {} within {:?}",
            request.address, timeout
        ))),
        Ok(reply) => match reply? {
            CaptureReply::Frame(frame) => {
                tokio::fs::write(output, &frame).await?;
                println!(
                    "{} {} bytes saved to {}",
                    "Success:".green().bold(),
                    frame.len(),
                    output
                );
                Ok(())
            }
            CaptureReply::Invalid(reason) => Err(RtspError::CaptureError(format!(
                "{} rejected: {}",
                request.address, reason
            ))),
        },
    }
}

async fn show_images(run_dir: Option<String>, output_dir: &str) -> Result<(), RtspError> {
    let run_dir = match run_dir {
        Some(dir) => PathBuf::from(dir),
        None => match latest_run_dir(Path::new(output_dir)).await? {
            Some(dir) => dir,
            None => {
                println!("{} {}", "No runs found in".yellow(), output_dir);
                return Ok(());
            }
        },
    };
    let images = list_images(&run_dir).await?;
    print_images(&run_dir, &images);
    Ok(())
}

// 处理命令行参数并执行相应的操作
pub async fn handle_cli(cli: Cli, cancel: CancelToken) -> Result<(), Box<dyn Error>> {
    match cli {
        Cli::Scan(args) => {
            log::debug!("RTSP grabber started in scan mode");
            let report = run_scan(&args, cancel).await.inspect_err(|e| {
                log::error!("Scan failed: {}", e);
            })?;
            print_report(&report);
        }
        Cli::Discover {
            ports,
            range,
            scan_timeout_ms,
            max_rate,
            masscan_path,
        } => {
            discover(&ports, range, scan_timeout_ms, max_rate, &masscan_path, cancel).await?;
        }
        Cli::Capture {
            rtsp_url,
            username,
            password,
            output,
            capture_timeout_secs,
            ffmpeg_path,
        } => {
            log::debug!("Username: {}", username);
            log::debug!("Password: {}", "*".repeat(password.len()));
            capture_single(
                rtsp_url,
                username,
                password,
                &output,
                Duration::from_secs(capture_timeout_secs),
                &ffmpeg_path,
            )
            .await?;
        }
        Cli::Images {
            run_dir,
            output_dir,
        } => {
            show_images(run_dir, &output_dir).await?;
        }
    }
    Ok(())
}
