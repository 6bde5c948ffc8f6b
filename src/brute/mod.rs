// 定义brute模块的子模块
pub mod cancel;
pub mod orchestrator;
pub mod report;
pub mod result_collector;
pub mod runner;

// 重新导出子模块中的类型，方便外部使用
pub use cancel::CancelToken;
pub use orchestrator::{CaptureOrchestrator, CaptureOutcome, HostPolicy};
pub use report::{RunReport, RunStats, TrialState};
pub use result_collector::ResultCollector;
pub use runner::ScanRunner;
