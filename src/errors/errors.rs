use std::error::Error as StdError;
use std::fmt;
use std::io;

// 端口规范解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    // 端口号无效 (非数字或超出范围)
    InvalidPortNumber(String),
    // 端口范围格式错误 (如 1-2-3)
    InvalidPortRangeFormat(String),
    // 端口范围起点大于终点
    InvalidPortRange(u16, u16),
    // 空的端口规范
    EmptyPortSpec,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidPortNumber(e) => write!(f, "Invalid port number: {}", e),
            ParseError::InvalidPortRangeFormat(e) => write!(f, "Invalid port range format: {}", e),
            ParseError::InvalidPortRange(start, end) => {
                write!(f, "Invalid port range: {} is greater than {}", start, end)
            }
            ParseError::EmptyPortSpec => write!(f, "Empty port specification"),
        }
    }
}

impl StdError for ParseError {}

pub type Result<T> = std::result::Result<T, ParseError>;

// 定义RTSP错误类型
#[derive(Debug)]
pub enum RtspError {
    // 运行被取消
    Cancelled,
    // URL解析错误
    UrlParseError,

    // 配置错误 (缺少必需的文件或参数)
    ConfigError(String),
    // 必需的输入列表为空 (路由或凭据)
    EmptyInput(&'static str),
    // 凭据行缺少冒号分隔符
    InvalidCredential { line: usize, content: String },
    InvalidHost(String),
    InvalidArgument(String),
    InvalidPorts(ParseError),

    // 主机发现失败
    DiscoveryError(String),
    // 抓图工具本身的错误 (无法启动子进程等)
    CaptureError(String),
    IoError(io::Error),
}

impl RtspError {
    /// 是否属于配置类错误，这类错误会在任何尝试开始之前终止运行
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RtspError::ConfigError(_)
                | RtspError::EmptyInput(_)
                | RtspError::InvalidCredential { .. }
                | RtspError::InvalidHost(_)
                | RtspError::InvalidArgument(_)
                | RtspError::InvalidPorts(_)
        )
    }
}

impl fmt::Display for RtspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtspError::Cancelled => write!(f, "Operation cancelled"),
            RtspError::UrlParseError => write!(f, "Failed to parse RTSP URL"),
            RtspError::ConfigError(e) => write!(f, "Configuration error: {}", e),
            RtspError::EmptyInput(what) => write!(f, "Configuration error: no {} to try", what),
            RtspError::InvalidCredential { line, content } => write!(
                f,
                "Malformed credential on line {}: {:?} (expected username:password)",
                line, content
            ),
            RtspError::InvalidHost(e) => write!(f, "Invalid host: {}", e),
            RtspError::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
            RtspError::InvalidPorts(e) => write!(f, "Invalid ports: {}", e),
            RtspError::DiscoveryError(e) => write!(f, "Discovery error: {}", e),
            RtspError::CaptureError(e) => write!(f, "Capture error: {}", e),
            RtspError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl StdError for RtspError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            RtspError::IoError(e) => Some(e),
            RtspError::InvalidPorts(e) => Some(e),
            _ => None,
        }
    }
}

// 从IO错误转换
impl From<io::Error> for RtspError {
    fn from(error: io::Error) -> Self {
        RtspError::IoError(error)
    }
}

impl From<ParseError> for RtspError {
    fn from(error: ParseError) -> Self {
        RtspError::InvalidPorts(error)
    }
}
