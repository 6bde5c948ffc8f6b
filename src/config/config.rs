use crate::brute::orchestrator::{DEFAULT_CAPTURE_TIMEOUT, DEFAULT_MAX_CONCURRENT, HostPolicy};
use crate::errors::errors::RtspError;
use clap::Args;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_CAPTURE_TIMEOUT_SECS: u64 = DEFAULT_CAPTURE_TIMEOUT.as_secs();
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_MAX_RATE: u32 = 1000;
pub const DEFAULT_OUTPUT_DIR: &str = "images";

/// scan 子命令的参数，未给出的项由配置文件补充
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// 配置文件路径
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,
    /// 包含主机地址的文件路径，提供时跳过主机发现 (与hosts二选一)
    #[arg(long, conflicts_with = "hosts")]
    pub hosts_file: Option<String>,
    /// 逗号分隔的主机字符串 (与hosts_file二选一)
    #[arg(long, conflicts_with = "hosts_file")]
    pub hosts: Option<String>,
    /// 包含流路径模板的文件路径
    #[arg(short, long)]
    pub routes_file: Option<String>,
    /// 包含 username:password 的文件路径
    #[arg(long, conflicts_with_all = ["users_file", "passwords_file"])]
    pub credentials_file: Option<String>,
    /// 包含用户名的文件路径 (需同时提供passwords_file)
    #[arg(long, requires = "passwords_file")]
    pub users_file: Option<String>,
    /// 包含密码的文件路径 (需同时提供users_file)
    #[arg(long, requires = "users_file")]
    pub passwords_file: Option<String>,
    /// 主机发现使用的端口，如 554 或 554,8554
    #[arg(short, long)]
    pub ports: Option<String>,
    /// 主机发现的IP范围，如 192.168.1.1-192.168.1.255
    #[arg(long)]
    pub range: Option<String>,
    /// 主机发现的等待时间(毫秒)
    #[arg(short = 't', long)]
    pub scan_timeout_ms: Option<u64>,
    /// 主机发现的发包速率(包/秒)
    #[arg(long)]
    pub max_rate: Option<u32>,
    /// 单次抓图的超时时间(秒)
    #[arg(long)]
    pub capture_timeout_secs: Option<u64>,
    /// 最大并发尝试数
    #[arg(short, long)]
    pub max_concurrent: Option<u32>,
    /// 图片输出目录
    #[arg(short, long)]
    pub output_dir: Option<String>,
    /// 同一主机成功后的处理策略
    #[arg(long, value_enum)]
    pub policy: Option<HostPolicy>,
    /// ffmpeg 可执行文件路径
    #[arg(long)]
    pub ffmpeg_path: Option<String>,
    /// masscan 可执行文件路径
    #[arg(long)]
    pub masscan_path: Option<String>,
}

impl Default for ScanArgs {
    fn default() -> Self {
        ScanArgs {
            config: DEFAULT_CONFIG_FILE.to_string(),
            hosts_file: None,
            hosts: None,
            routes_file: None,
            credentials_file: None,
            users_file: None,
            passwords_file: None,
            ports: None,
            range: None,
            scan_timeout_ms: None,
            max_rate: None,
            capture_timeout_secs: None,
            max_concurrent: None,
            output_dir: None,
            policy: None,
            ffmpeg_path: None,
            masscan_path: None,
        }
    }
}

/// 从配置文件中读取的配置内容
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 包含主机地址的文件路径
    pub hosts_file: Option<String>,
    /// 逗号分隔的主机字符串
    pub hosts_string: Option<String>,
    /// 包含流路径模板的文件路径
    pub routes_file: Option<String>,
    /// 包含 username:password 的文件路径
    pub credentials_file: Option<String>,
    pub users_file: Option<String>,
    pub passwords_file: Option<String>,
    /// 主机发现使用的端口
    pub ports: Option<String>,
    /// 主机发现的IP范围
    pub range: Option<String>,
    pub scan_timeout_ms: u64,
    pub max_rate: u32,
    pub capture_timeout_secs: u64,
    /// 最大并发尝试数
    pub max_concurrent: u32,
    pub output_dir: String,
    pub policy: HostPolicy,
    pub ffmpeg_path: String,
    pub masscan_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            hosts_file: None,
            hosts_string: None,
            routes_file: None,
            credentials_file: None,
            users_file: None,
            passwords_file: None,
            ports: None,
            range: None,
            scan_timeout_ms: DEFAULT_SCAN_TIMEOUT_MS,
            max_rate: DEFAULT_MAX_RATE,
            capture_timeout_secs: DEFAULT_CAPTURE_TIMEOUT_SECS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            policy: HostPolicy::default(),
            ffmpeg_path: "ffmpeg".to_string(),
            masscan_path: "masscan".to_string(),
        }
    }
}

impl AppConfig {
    /// 从配置文件中加载配置
    pub fn load_from_file(path: &Path) -> Result<Self, RtspError> {
        let config_content = std::fs::read_to_string(path)?;
        toml::from_str(&config_content).map_err(|e| {
            RtspError::ConfigError(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// 合并配置文件和命令行参数，命令行参数优先级更高。
    /// 命令行给出主机或凭据来源时，整体替换配置文件中的同类来源。
    pub fn merge_with_args(self, args: &ScanArgs) -> Self {
        let (hosts_file, hosts_string) = if args.hosts_file.is_some() || args.hosts.is_some() {
            (args.hosts_file.clone(), args.hosts.clone())
        } else {
            (self.hosts_file, self.hosts_string)
        };

        let (credentials_file, users_file, passwords_file) = if args.credentials_file.is_some()
            || args.users_file.is_some()
            || args.passwords_file.is_some()
        {
            (
                args.credentials_file.clone(),
                args.users_file.clone(),
                args.passwords_file.clone(),
            )
        } else {
            (self.credentials_file, self.users_file, self.passwords_file)
        };

        AppConfig {
            hosts_file,
            hosts_string,
            routes_file: args.routes_file.clone().or(self.routes_file),
            credentials_file,
            users_file,
            passwords_file,
            ports: args.ports.clone().or(self.ports),
            range: args.range.clone().or(self.range),
            scan_timeout_ms: args.scan_timeout_ms.unwrap_or(self.scan_timeout_ms),
            max_rate: args.max_rate.unwrap_or(self.max_rate),
            capture_timeout_secs: args
                .capture_timeout_secs
                .unwrap_or(self.capture_timeout_secs),
            max_concurrent: args.max_concurrent.unwrap_or(self.max_concurrent),
            output_dir: args.output_dir.clone().unwrap_or(self.output_dir),
            policy: args.policy.unwrap_or(self.policy),
            ffmpeg_path: args.ffmpeg_path.clone().unwrap_or(self.ffmpeg_path),
            masscan_path: args.masscan_path.clone().unwrap_or(self.masscan_path),
        }
    }

    /// 检查数值类配置项
    pub fn validate(&self) -> Result<(), RtspError> {
        if self.max_concurrent == 0 {
            return Err(RtspError::ConfigError(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.capture_timeout_secs == 0 {
            return Err(RtspError::ConfigError(
                "capture_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.max_rate == 0 {
            return Err(RtspError::ConfigError("max_rate must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs(self.capture_timeout_secs)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }
}

/// 加载配置文件并与命令行参数合并。
/// 使用默认路径且文件不存在时静默回退到默认值。
pub fn load_and_merge_config(args: &ScanArgs) -> Result<AppConfig, RtspError> {
    let config_path = Path::new(&args.config);
    let config = if config_path.exists() {
        let config = AppConfig::load_from_file(config_path)?;
        log::debug!("Loaded config file {}: {:?}", config_path.display(), config);
        config
    } else if args.config == DEFAULT_CONFIG_FILE {
        log::debug!("No {} found, using default values", DEFAULT_CONFIG_FILE);
        AppConfig::default()
    } else {
        return Err(RtspError::ConfigError(format!(
            "config file {} not found",
            args.config
        )));
    };

    let merged_config = config.merge_with_args(args);
    log::debug!("{:?}", merged_config);
    merged_config.validate()?;
    Ok(merged_config)
}
