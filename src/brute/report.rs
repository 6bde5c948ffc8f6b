use crate::iterator::host_reader::Host;
use crate::iterator::trial_iterator::Trial;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// 一次尝试的最终状态
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrialState {
    /// 抓图成功，图片已保存
    Succeeded(PathBuf),
    /// 流无效、认证失败或抓图工具出错
    Failed(String),
    /// 超过单次超时仍无应答
    TimedOut,
    /// 该主机已有成功结果，跳过（仅 first-success 策略）
    Skipped,
    /// 运行被取消
    Cancelled,
    /// 抓图成功但保存图片失败
    PersistFailed(String),
}

/// 保存失败的记录，在最终报告中列出
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistFailure {
    pub host: Host,
    pub reason: String,
}

// 运行统计
#[derive(Clone, Debug, Default)]
pub struct RunStats {
    /// 从尝试空间中取出的尝试数
    pub generated: usize,
    /// 实际调用了抓图工具的尝试数
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub skipped: usize,
    pub cancelled: usize,
    /// 任务本身异常退出的次数
    pub panicked: usize,
    pub persist_failures: Vec<PersistFailure>,
    /// 主机 → 已保存图片路径
    pub saved: BTreeMap<Host, PathBuf>,
}

impl RunStats {
    pub fn record(&mut self, trial: &Trial, state: &TrialState) {
        self.generated += 1;
        match state {
            TrialState::Succeeded(path) => {
                self.succeeded += 1;
                self.saved.insert(trial.host.clone(), path.clone());
            }
            TrialState::Failed(_) => self.failed += 1,
            TrialState::TimedOut => self.timed_out += 1,
            TrialState::Skipped => self.skipped += 1,
            TrialState::Cancelled => self.cancelled += 1,
            TrialState::PersistFailed(reason) => self.persist_failures.push(PersistFailure {
                host: trial.host.clone(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn record_panic(&mut self) {
        self.generated += 1;
        self.panicked += 1;
    }
}

/// 一次运行的汇总结果
#[derive(Clone, Debug)]
pub struct RunReport {
    /// 本次运行的图片目录
    pub run_dir: PathBuf,
    pub host_count: usize,
    /// 主机 × 路由 × 凭据
    pub trial_space: usize,
    pub stats: RunStats,
    /// 运行结束时目录中实际存在的图片
    pub images: Vec<PathBuf>,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl RunReport {
    pub fn log_summary(&self) {
        let stats = &self.stats;
        log::info!("Run completed in {:?}", self.elapsed);
        log::info!(
            "Trials: {} of {} generated, {} dispatched, {} succeeded, {} failed, {} timed out, {} skipped",
            stats.generated,
            self.trial_space,
            stats.dispatched,
            stats.succeeded,
            stats.failed,
            stats.timed_out,
            stats.skipped
        );
        if self.elapsed.as_secs_f64() > 0.0 {
            log::info!(
                "Throughput: {:.2} attempts/second",
                stats.dispatched as f64 / self.elapsed.as_secs_f64()
            );
        }
        for failure in &stats.persist_failures {
            log::warn!("Failed to save image for {}: {}", failure.host, failure.reason);
        }
        if self.cancelled {
            log::warn!("Run was cancelled, {} trials were not completed", stats.cancelled);
        }
        log::info!("{} images in {}", self.images.len(), self.run_dir.display());
    }
}
