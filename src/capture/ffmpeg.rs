use crate::capture::{CaptureProvider, CaptureReply, CaptureRequest};
use crate::errors::errors::RtspError;
use async_trait::async_trait;
use rand::Rng;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use url::Url;

/// ffmpeg 在流无效时输出的标记
pub const INVALID_DATA_MARKER: &str = "Invalid data found";
const UNAUTHORIZED_MARKER: &str = "401 Unauthorized";

// 随机User-Agent列表
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "LibVLC/3.0.18 (LIVE555 Streaming Media v2016.11.28)",
    "Lavf/60.3.100",
];

// 随机选择一个User-Agent
pub fn select_random_user_agent() -> &'static str {
    let user_agent = {
        let mut rng = rand::thread_rng();
        USER_AGENTS[rng.r#gen_range(0..USER_AGENTS.len())]
    };
    log::trace!("Selected User-Agent: {}", user_agent);
    user_agent
}

/// 将凭据写入URL的userinfo部分（自动进行百分号编码）
pub fn build_stream_url(request: &CaptureRequest) -> Result<String, RtspError> {
    let mut url = Url::parse(&request.address).map_err(|_| RtspError::UrlParseError)?;
    if let Some(username) = &request.username {
        url.set_username(username)
            .map_err(|_| RtspError::UrlParseError)?;
    }
    if let Some(password) = &request.password {
        url.set_password(Some(password))
            .map_err(|_| RtspError::UrlParseError)?;
    }
    Ok(url.to_string())
}

/// 构建ffmpeg参数：通过TCP拉流，只输出一帧JPEG到 output
pub fn ffmpeg_args(url: &str, output: &Path, timeout: Duration, user_agent: &str) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-rtsp_transport".to_string(),
        "tcp".to_string(),
        "-user_agent".to_string(),
        user_agent.to_string(),
        // 套接字超时，单位为微秒
        "-timeout".to_string(),
        timeout.as_micros().to_string(),
        "-i".to_string(),
        url.to_string(),
        "-frames:v".to_string(),
        "1".to_string(),
        "-f".to_string(),
        "image2".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// 根据ffmpeg的退出状态和错误输出判断流是否无效
pub fn classify_ffmpeg_output(success: bool, stderr: &str) -> Option<String> {
    if stderr.contains(INVALID_DATA_MARKER) {
        return Some(INVALID_DATA_MARKER.to_string());
    }
    if stderr.contains(UNAUTHORIZED_MARKER) {
        return Some("unauthorized".to_string());
    }
    if !success {
        let reason = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("ffmpeg exited with failure")
            .trim()
            .to_string();
        return Some(reason);
    }
    None
}

/// 基于ffmpeg子进程的抓图实现
///
/// 需要 ffmpeg 5.0 及以上：RTSP 的 `-timeout` 自 5.0 起才是套接字读写超时，
/// 更早的版本中它表示监听超时（读写超时为 `-stimeout`）。
#[derive(Clone, Debug)]
pub struct FfmpegCapture {
    ffmpeg_path: String,
}

impl FfmpegCapture {
    pub fn new(ffmpeg_path: &str) -> Self {
        FfmpegCapture {
            ffmpeg_path: ffmpeg_path.to_string(),
        }
    }
}

impl Default for FfmpegCapture {
    fn default() -> Self {
        FfmpegCapture::new("ffmpeg")
    }
}

#[async_trait]
impl CaptureProvider for FfmpegCapture {
    async fn capture(&self, request: &CaptureRequest) -> Result<CaptureReply, RtspError> {
        let url = build_stream_url(request)?;

        // 临时文件在离开作用域（包括超时导致的future被丢弃）时自动删除
        let frame_file = tempfile::Builder::new()
            .prefix("rtsp-frame-")
            .suffix(".jpg")
            .tempfile()?;

        let args = ffmpeg_args(
            &url,
            frame_file.path(),
            request.timeout,
            select_random_user_agent(),
        );
        log::trace!("Running {} for {}", self.ffmpeg_path, request.address);

        // 子进程在future被丢弃时会被杀死
        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                RtspError::CaptureError(format!("failed to run {}: {}", self.ffmpeg_path, e))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if let Some(reason) = classify_ffmpeg_output(output.status.success(), &stderr) {
            log::debug!("ffmpeg rejected {}: {}", request.address, reason);
            return Ok(CaptureReply::Invalid(reason));
        }

        let frame = tokio::fs::read(frame_file.path()).await?;
        if frame.is_empty() {
            return Ok(CaptureReply::Invalid("empty frame".to_string()));
        }
        Ok(CaptureReply::Frame(frame))
    }
}
