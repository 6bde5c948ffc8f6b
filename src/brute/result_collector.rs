use crate::errors::errors::RtspError;
use crate::iterator::host_reader::Host;
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 运行目录名的时间格式，精确到秒
pub const RUN_DIR_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
pub const IMAGE_EXTENSION: &str = "jpg";

/// 以当前本地时间生成运行目录名
pub fn run_label_now() -> String {
    Local::now().format(RUN_DIR_FORMAT).to_string()
}

/// 结果收集器 - 将成功的抓图写入 `<output_dir>/<run_label>/<host>.jpg`
#[derive(Clone, Debug)]
pub struct ResultCollector {
    run_dir: PathBuf,
}

impl ResultCollector {
    pub fn new(output_dir: impl AsRef<Path>, run_label: &str) -> Self {
        ResultCollector {
            run_dir: output_dir.as_ref().join(run_label),
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn image_path(&self, host: &Host) -> PathBuf {
        self.run_dir
            .join(format!("{}.{}", host.file_stem(), IMAGE_EXTENSION))
    }

    pub async fn create_run_dir(&self) -> Result<(), RtspError> {
        tokio::fs::create_dir_all(&self.run_dir).await?;
        log::debug!("Run directory {} ready", self.run_dir.display());
        Ok(())
    }

    /// 保存一张图片。先写入同目录的临时文件再原子替换，
    /// 同一主机的并发写入不会产生损坏的文件（后写入者覆盖）。
    pub async fn persist(&self, host: &Host, frame: &[u8]) -> Result<PathBuf, RtspError> {
        self.create_run_dir().await?;
        let run_dir = self.run_dir.clone();
        let path = self.image_path(host);
        let frame = frame.to_vec();

        let target = path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), RtspError> {
            let mut staged = tempfile::Builder::new()
                .prefix(".partial-")
                .tempfile_in(&run_dir)?;
            staged.write_all(&frame)?;
            staged
                .persist(&target)
                .map_err(|e| RtspError::IoError(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| RtspError::IoError(std::io::Error::other(e)))??;

        Ok(path)
    }

    /// 列出运行目录中实际存在的图片（以文件系统为准）
    pub async fn list(&self) -> Result<Vec<PathBuf>, RtspError> {
        list_images(&self.run_dir).await
    }
}

/// 列出目录中的普通文件，按路径排序。目录不存在时返回空列表。
/// 隐藏文件（包括未完成的临时文件）不计入结果。
pub async fn list_images(dir: &Path) -> Result<Vec<PathBuf>, RtspError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && entry.file_type().await?.is_file() {
            images.push(entry.path());
        }
    }
    images.sort();
    Ok(images)
}

/// 查找输出目录下最新的运行目录（目录名按时间格式排序即时间顺序）
pub async fn latest_run_dir(output_dir: &Path) -> Result<Option<PathBuf>, RtspError> {
    let mut entries = match tokio::fs::read_dir(output_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut latest: Option<PathBuf> = None;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let path = entry.path();
        if latest.as_ref().is_none_or(|current| path > *current) {
            latest = Some(path);
        }
    }
    Ok(latest)
}
