use crate::brute::cancel::CancelToken;
use crate::brute::orchestrator::CaptureOrchestrator;
use crate::brute::report::{RunReport, RunStats};
use crate::brute::result_collector::{ResultCollector, run_label_now};
use crate::capture::{CaptureProvider, FfmpegCapture};
use crate::config::config::AppConfig;
use crate::discovery::{DiscoveryProvider, DiscoveryRequest, MasscanDiscovery};
use crate::errors::errors::RtspError;
use crate::iterator::host_reader::Host;
use crate::iterator::loader::load_inputs;
use crate::iterator::port_parser::parse_ports;
use crate::iterator::trial_iterator::TrialSpace;
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;
use timing_macro::timing;

/// 一次完整运行：读取输入 → 主机发现（可选）→ 生成尝试空间 → 并发抓图 → 汇总结果
pub struct ScanRunner {
    config: AppConfig,
    discovery: Arc<dyn DiscoveryProvider>,
    capture: Arc<dyn CaptureProvider>,
    cancel: CancelToken,
    run_label: Option<String>,
}

impl ScanRunner {
    pub fn new(
        config: AppConfig,
        discovery: Arc<dyn DiscoveryProvider>,
        capture: Arc<dyn CaptureProvider>,
    ) -> Self {
        ScanRunner {
            config,
            discovery,
            capture,
            cancel: CancelToken::new(),
            run_label: None,
        }
    }

    /// 使用 masscan 和 ffmpeg 的默认实现
    pub fn from_config(config: AppConfig) -> Self {
        let discovery = Arc::new(MasscanDiscovery::new(&config.masscan_path));
        let capture = Arc::new(FfmpegCapture::new(&config.ffmpeg_path));
        ScanRunner::new(config, discovery, capture)
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 指定运行目录名，默认使用运行开始时的时间戳
    pub fn with_run_label(mut self, run_label: &str) -> Self {
        self.run_label = Some(run_label.to_string());
        self
    }

    #[timing("scan run")]
    pub async fn run(&self) -> Result<RunReport, RtspError> {
        let start_time = Instant::now();
        let run_label = self.run_label.clone().unwrap_or_else(run_label_now);

        // 配置错误在任何尝试之前返回
        self.config.validate()?;
        let inputs = load_inputs(&self.config)?;
        let collector = Arc::new(ResultCollector::new(&self.config.output_dir, &run_label));
        let hosts = match self.resolve_hosts(inputs.hosts).await? {
            Some(hosts) => hosts,
            None => {
                // 发现阶段被取消：不创建运行目录，返回空报告
                warn!("Run cancelled during discovery, no trials dispatched");
                let report = RunReport {
                    run_dir: collector.run_dir().to_path_buf(),
                    host_count: 0,
                    trial_space: 0,
                    stats: RunStats::default(),
                    images: Vec::new(),
                    elapsed: start_time.elapsed(),
                    cancelled: true,
                };
                report.log_summary();
                return Ok(report);
            }
        };

        collector.create_run_dir().await?;

        let space = TrialSpace::new(hosts, inputs.routes, inputs.credentials);
        info!(
            "Total hosts: {}, total trials: {}",
            space.hosts().len(),
            space.len()
        );

        let orchestrator = CaptureOrchestrator::new(self.capture.clone())
            .with_max_concurrent(self.config.max_concurrent)
            .with_timeout(self.config.capture_timeout())
            .with_policy(self.config.policy)
            .with_cancel_token(self.cancel.clone());
        let stats = orchestrator.run(space.iter(), collector.clone()).await;

        let images = match collector.list().await {
            Ok(images) => images,
            Err(e) => {
                warn!(
                    "Failed to list {}: {}, reporting saved images only",
                    collector.run_dir().display(),
                    e
                );
                stats.saved.values().cloned().collect()
            }
        };

        let report = RunReport {
            run_dir: collector.run_dir().to_path_buf(),
            host_count: space.hosts().len(),
            trial_space: space.len(),
            stats,
            images,
            elapsed: start_time.elapsed(),
            cancelled: self.cancel.is_cancelled(),
        };
        report.log_summary();
        Ok(report)
    }

    // 显式主机列表优先；没有主机列表时才进行主机发现。发现期间被取消时返回 None
    async fn resolve_hosts(
        &self,
        hosts: Option<Vec<Host>>,
    ) -> Result<Option<Vec<Host>>, RtspError> {
        if let Some(hosts) = hosts {
            if self.config.ports.is_some() || self.config.range.is_some() {
                info!("Host list provided, skipping discovery");
            }
            if hosts.is_empty() {
                warn!("Host list is empty, nothing to try");
            }
            return Ok(Some(hosts));
        }

        let ports = self.config.ports.as_deref().ok_or_else(|| {
            RtspError::ConfigError(
                "ports are required for discovery when no host list is given".to_string(),
            )
        })?;
        let request = DiscoveryRequest {
            ports: parse_ports(ports)?,
            range: self.config.range.clone(),
            timeout: self.config.scan_timeout(),
            max_rate: self.config.max_rate,
        };
        info!("Discovering hosts on ports {:?}", request.ports);

        let hosts = tokio::select! {
            _ = self.cancel.cancelled() => return Ok(None),
            hosts = self.discovery.discover(&request) => hosts?,
        };
        if hosts.is_empty() {
            warn!("Discovery found no hosts");
        }
        Ok(Some(hosts))
    }
}
