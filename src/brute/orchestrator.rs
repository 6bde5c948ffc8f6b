use crate::brute::cancel::CancelToken;
use crate::brute::report::{RunStats, TrialState};
use crate::brute::result_collector::ResultCollector;
use crate::capture::{CaptureProvider, CaptureReply};
use crate::errors::errors::RtspError;
use crate::iterator::host_reader::Host;
use crate::iterator::trial_iterator::Trial;
use clap::ValueEnum;
use futures::stream::{self, StreamExt};
use log::{debug, error, info, trace, warn};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::{self, error::Elapsed};

pub const DEFAULT_MAX_CONCURRENT: u32 = 4;
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

/// 同一主机出现成功结果后的处理策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HostPolicy {
    /// 图片保存成功后跳过该主机剩余的尝试，每个主机只保存一张图片。
    ///
    /// 同一主机的写入依次进行：写入失败时主机不会被标记，
    /// 正在进行或之后成功的尝试仍会再次写入。
    #[default]
    FirstSuccess,
    /// 尝试所有组合，后成功的结果覆盖先前保存的图片
    Exhaustive,
}

/// 单次抓图的结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    Success(Host, Vec<u8>),
    Failure(Host, String),
    Timeout(Host),
}

/// 将抓图工具的返回（含超时）归类
pub fn classify(
    host: &Host,
    result: Result<Result<CaptureReply, RtspError>, Elapsed>,
) -> CaptureOutcome {
    match result {
        Err(_) => CaptureOutcome::Timeout(host.clone()),
        Ok(Err(e)) => CaptureOutcome::Failure(host.clone(), e.to_string()),
        Ok(Ok(CaptureReply::Invalid(reason))) => CaptureOutcome::Failure(host.clone(), reason),
        Ok(Ok(CaptureReply::Frame(frame))) if frame.is_empty() => {
            CaptureOutcome::Failure(host.clone(), "empty frame".to_string())
        }
        Ok(Ok(CaptureReply::Frame(frame))) => CaptureOutcome::Success(host.clone(), frame),
    }
}

// 所有尝试任务共享的上下文
struct TrialContext {
    capture: Arc<dyn CaptureProvider>,
    collector: Arc<ResultCollector>,
    policy: HostPolicy,
    timeout: Duration,
    cancel: CancelToken,
    // 已经成功保存图片的主机（first-success 策略）
    saved_hosts: Mutex<HashSet<Host>>,
    // 每个主机一把写入锁，保证同一主机的写入依次进行
    write_locks: Mutex<HashMap<Host, Arc<AsyncMutex<()>>>>,
    dispatched: AtomicUsize,
}

impl TrialContext {
    fn is_saved(&self, host: &Host) -> bool {
        let saved = self.saved_hosts.lock().unwrap_or_else(|e| e.into_inner());
        saved.contains(host)
    }

    fn mark_saved(&self, host: &Host) {
        let mut saved = self.saved_hosts.lock().unwrap_or_else(|e| e.into_inner());
        saved.insert(host.clone());
    }

    fn write_lock(&self, host: &Host) -> Arc<AsyncMutex<()>> {
        let mut locks = self.write_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(host.clone()).or_default().clone()
    }

    /// 执行一次尝试：Pending → Dispatched → {Succeeded | Failed | TimedOut}
    async fn execute(&self, trial: &Trial) -> TrialState {
        if self.cancel.is_cancelled() {
            return TrialState::Cancelled;
        }
        if self.policy == HostPolicy::FirstSuccess && self.is_saved(&trial.host) {
            debug!("Skipping {} as an image was already captured", trial);
            return TrialState::Skipped;
        }

        let request = trial.capture_request(self.timeout);
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        debug!("Trying {}", trial);

        // 超时由调度器强制执行；超时或取消时抓图future被丢弃，
        // 其临时文件和子进程随之释放
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!("Cancelled while trying {}", trial);
                return TrialState::Cancelled;
            }
            result = time::timeout(self.timeout, self.capture.capture(&request)) => {
                classify(&trial.host, result)
            }
        };

        self.collect(trial, outcome).await
    }

    async fn collect(&self, trial: &Trial, outcome: CaptureOutcome) -> TrialState {
        match outcome {
            CaptureOutcome::Timeout(_) => {
                debug!("Timed out after {:?}: {}", self.timeout, trial);
                TrialState::TimedOut
            }
            CaptureOutcome::Failure(_, reason) => {
                debug!("Failed attempt {}: {}", trial, reason);
                TrialState::Failed(reason)
            }
            CaptureOutcome::Success(host, frame) => match self.policy {
                HostPolicy::Exhaustive => self.save(trial, &host, &frame).await,
                HostPolicy::FirstSuccess => {
                    let lock = self.write_lock(&host);
                    let _guard = lock.lock().await;
                    if self.is_saved(&host) {
                        debug!("Discarding duplicate success for {}", host);
                        return TrialState::Skipped;
                    }
                    let state = self.save(trial, &host, &frame).await;
                    if matches!(state, TrialState::Succeeded(_)) {
                        self.mark_saved(&host);
                    }
                    state
                }
            },
        }
    }

    async fn save(&self, trial: &Trial, host: &Host, frame: &[u8]) -> TrialState {
        match self.collector.persist(host, frame).await {
            Ok(path) => {
                info!("Captured {} -> {}", trial, path.display());
                TrialState::Succeeded(path)
            }
            Err(e) => {
                warn!("Captured {} but failed to save image: {}", trial, e);
                TrialState::PersistFailed(e.to_string())
            }
        }
    }
}

/// 抓图调度器 - 以有界并发执行尝试空间中的每一次尝试
pub struct CaptureOrchestrator {
    capture: Arc<dyn CaptureProvider>,
    max_concurrent: u32,
    timeout: Duration,
    policy: HostPolicy,
    cancel: CancelToken,
}

impl CaptureOrchestrator {
    pub fn new(capture: Arc<dyn CaptureProvider>) -> Self {
        CaptureOrchestrator {
            capture,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout: DEFAULT_CAPTURE_TIMEOUT,
            policy: HostPolicy::default(),
            cancel: CancelToken::new(),
        }
    }

    /// 设置最大并发数，至少为1
    pub fn with_max_concurrent(mut self, max_concurrent: u32) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// 设置单次抓图超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: HostPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 执行所有尝试并等待每一个结果。
    ///
    /// 尝试按需从迭代器中取出，同时运行的尝试不超过 `max_concurrent` 个；
    /// 取消后不再派发新的尝试。单个尝试的失败或超时不影响其他尝试。
    pub async fn run<I>(&self, trials: I, collector: Arc<ResultCollector>) -> RunStats
    where
        I: IntoIterator<Item = Trial>,
    {
        info!(
            "Max concurrent attempts: {}, capture timeout: {:?}, policy: {:?}",
            self.max_concurrent, self.timeout, self.policy
        );

        let context = Arc::new(TrialContext {
            capture: self.capture.clone(),
            collector,
            policy: self.policy,
            timeout: self.timeout,
            cancel: self.cancel.clone(),
            saved_hosts: Mutex::new(HashSet::new()),
            write_locks: Mutex::new(HashMap::new()),
            dispatched: AtomicUsize::new(0),
        });

        let cancel = self.cancel.clone();
        let mut results = stream::iter(trials)
            .take_while(move |_| futures::future::ready(!cancel.is_cancelled()))
            .map(|trial| {
                let context = context.clone();
                trace!("Dispatching {}", trial);
                tokio::spawn(async move {
                    let state = context.execute(&trial).await;
                    (trial, state)
                })
            })
            .buffer_unordered(self.max_concurrent as usize);

        let mut stats = RunStats::default();
        while let Some(joined) = results.next().await {
            match joined {
                Ok((trial, state)) => stats.record(&trial, &state),
                Err(e) => {
                    error!("Trial task failed: {:?}", e);
                    stats.record_panic();
                }
            }
        }

        stats.dispatched = context.dispatched.load(Ordering::SeqCst);
        stats
    }
}
