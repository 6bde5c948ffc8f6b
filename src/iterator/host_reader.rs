use crate::errors::errors::RtspError;
use crate::iterator::read_lines_from_file;
use std::collections::HashSet;
use std::fmt::Display;
use std::net::Ipv6Addr;

/// 目标主机：IP地址或主机名，可带 `:端口`。以字符串本身作为标识。
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Host(String);

impl Host {
    pub fn new(host: &str) -> Result<Self, RtspError> {
        let trimmed = host.trim();
        if trimmed.is_empty() {
            return Err(RtspError::InvalidHost("empty host entry".to_string()));
        }
        if trimmed.contains(char::is_whitespace) || trimmed.contains('/') {
            return Err(RtspError::InvalidHost(format!(
                "{:?} is not an address or hostname",
                trimmed
            )));
        }
        Ok(Host(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 用于拼接URL的形式，IPv6字面量需要加方括号
    pub fn authority(&self) -> String {
        if self.0.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", self.0)
        } else {
            self.0.clone()
        }
    }

    /// 用作图片文件名的形式，替换文件名中不允许出现的字符
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                c => c,
            })
            .collect()
    }
}

impl Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 定义主机数据源类型
#[derive(Clone, Debug)]
pub enum HostSource {
    FilePath(String),
    // 逗号分隔的主机字符串
    HostString(String),
}

// 主机读取器 - 支持文件和字符串两种数据源
#[derive(Clone, Debug)]
pub struct HostReader {
    source: HostSource,
}

impl HostReader {
    // 从文件路径创建主机读取器
    pub fn from_file(hosts_file: &str) -> Self {
        HostReader {
            source: HostSource::FilePath(hosts_file.to_string()),
        }
    }

    // 从主机字符串创建主机读取器
    pub fn from_string(hosts: &str) -> Self {
        HostReader {
            source: HostSource::HostString(hosts.to_string()),
        }
    }

    /// 读取主机列表，去重并保持首次出现的顺序。
    /// 空列表是合法的：后续的尝试空间为空。
    pub fn read_hosts(&self) -> Result<Vec<Host>, RtspError> {
        let entries = match &self.source {
            HostSource::FilePath(file_path) => read_lines_from_file(file_path)?
                .into_iter()
                .map(|(_, line)| line.trim().to_string())
                .collect::<Vec<_>>(),
            HostSource::HostString(hosts) => hosts
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect(),
        };

        let hosts = entries
            .iter()
            .map(|entry| Host::new(entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(dedup_hosts(hosts))
    }
}

/// 去重，保持首次出现的顺序
pub fn dedup_hosts(hosts: Vec<Host>) -> Vec<Host> {
    let mut seen = HashSet::with_capacity(hosts.len());
    hosts
        .into_iter()
        .filter(|host| seen.insert(host.clone()))
        .collect()
}
