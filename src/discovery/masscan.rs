use crate::discovery::{DiscoveryProvider, DiscoveryRequest, host_for_open_port};
use crate::errors::errors::RtspError;
use crate::iterator::host_reader::{Host, dedup_hosts};
use crate::iterator::port_parser::format_ports;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// 将毫秒超时换算为 masscan `--wait` 使用的秒数（向上取整，至少1秒）
pub fn wait_seconds(request: &DiscoveryRequest) -> u64 {
    let millis = request.timeout.as_millis() as u64;
    millis.div_ceil(1000).max(1)
}

/// 构建masscan参数，结果以列表格式输出到标准输出
pub fn masscan_args(request: &DiscoveryRequest) -> Vec<String> {
    let mut args = vec![
        format!("-p{}", format_ports(&request.ports)),
        "--max-rate".to_string(),
        request.max_rate.to_string(),
        "--wait".to_string(),
        wait_seconds(request).to_string(),
        "-oL".to_string(),
        "-".to_string(),
    ];
    if let Some(range) = &request.range {
        args.push("--range".to_string());
        args.push(range.clone());
    }
    args
}

/// 解析masscan列表格式的输出，例如：
///
/// ```text
/// #masscan
/// open tcp 554 192.168.1.10 1700000000
/// # end
/// ```
///
/// 只保留请求中端口的开放记录，结果去重并保持出现顺序。
pub fn parse_masscan_list(output: &str, ports: &[u16]) -> Result<Vec<Host>, RtspError> {
    let mut hosts = Vec::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["open", "tcp", port, address, ..] => {
                let port = port.parse::<u16>().map_err(|_| {
                    RtspError::DiscoveryError(format!("malformed masscan line: {}", line))
                })?;
                if ports.contains(&port) {
                    hosts.push(host_for_open_port(address, port)?);
                }
            }
            _ => log::trace!("Ignoring masscan line: {}", line),
        }
    }
    Ok(dedup_hosts(hosts))
}

/// 基于masscan子进程的主机发现实现
#[derive(Clone, Debug)]
pub struct MasscanDiscovery {
    masscan_path: String,
}

impl MasscanDiscovery {
    pub fn new(masscan_path: &str) -> Self {
        MasscanDiscovery {
            masscan_path: masscan_path.to_string(),
        }
    }
}

impl Default for MasscanDiscovery {
    fn default() -> Self {
        MasscanDiscovery::new("masscan")
    }
}

#[async_trait]
impl DiscoveryProvider for MasscanDiscovery {
    async fn discover(&self, request: &DiscoveryRequest) -> Result<Vec<Host>, RtspError> {
        if request.ports.is_empty() {
            return Err(RtspError::DiscoveryError("no ports to scan".to_string()));
        }
        let args = masscan_args(request);
        log::info!("Running {} {}", self.masscan_path, args.join(" "));

        let output = Command::new(&self.masscan_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                RtspError::DiscoveryError(format!("failed to run {}: {}", self.masscan_path, e))
            })?;

        if !output.status.success() {
            return Err(RtspError::DiscoveryError(format!(
                "{} exited with {}: {}",
                self.masscan_path,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let hosts = parse_masscan_list(&String::from_utf8_lossy(&output.stdout), &request.ports)?;
        log::info!("Discovery found {} hosts", hosts.len());
        Ok(hosts)
    }
}
