// 抓图：由外部工具从流地址获取一帧图像
pub mod ffmpeg;

pub use ffmpeg::FfmpegCapture;

use crate::errors::errors::RtspError;
use async_trait::async_trait;
use std::time::Duration;

/// 一次抓图请求
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureRequest {
    /// 完整的流地址，不含凭据
    pub address: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 建议给抓图工具的超时；实际超时由调度器强制执行
    pub timeout: Duration,
}

/// 抓图工具的应答
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureReply {
    /// 成功获取的图像数据
    Frame(Vec<u8>),
    /// 工具识别出流无效（认证失败、无数据等），附带原因
    Invalid(String),
}

/// 抓图工具接口。返回 Err 表示工具本身出错（如无法启动），
/// 调度器同样将其记为一次失败的尝试。
#[async_trait]
pub trait CaptureProvider: Send + Sync {
    async fn capture(&self, request: &CaptureRequest) -> Result<CaptureReply, RtspError>;
}
