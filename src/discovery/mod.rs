// 主机发现：由外部扫描器给出端口开放的主机
pub mod masscan;

pub use masscan::MasscanDiscovery;

use crate::errors::errors::RtspError;
use crate::iterator::host_reader::Host;
use async_trait::async_trait;
use std::time::Duration;

/// RTSP 默认端口，在该端口上发现的主机不附带端口号
pub const DEFAULT_RTSP_PORT: u16 = 554;

/// 一次主机发现请求
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub ports: Vec<u16>,
    /// IP范围表达式，原样交给扫描器
    pub range: Option<String>,
    /// 扫描结束后等待响应的时间
    pub timeout: Duration,
    /// 发包速率(包/秒)
    pub max_rate: u32,
}

/// 主机发现接口。返回空列表是正常结果，不是错误。
#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    async fn discover(&self, request: &DiscoveryRequest) -> Result<Vec<Host>, RtspError>;
}

/// 由发现结果中的 (地址, 端口) 构造主机
pub fn host_for_open_port(address: &str, port: u16) -> Result<Host, RtspError> {
    if port == DEFAULT_RTSP_PORT {
        Host::new(address)
    } else if address.contains(':') {
        // IPv6地址带端口时需要方括号
        Host::new(&format!("[{}]:{}", address, port))
    } else {
        Host::new(&format!("{}:{}", address, port))
    }
}
