use std::collections::HashSet;

use crate::errors::errors::{ParseError, Result};

/// 端口规范
#[derive(Debug, Clone)]
enum PortSpec {
    /// 单个端口 (如 554)
    Single(u16),
    /// 端口范围 (如 8000-8010)
    Range(u16, u16),
    /// 多个端口或范围 (如 554,8554,8000-8010)
    Multiple(Vec<PortSpec>),
}

/// 端口解析器
struct PortParser;

impl PortParser {
    /// 解析端口规范
    fn parse(input: &str) -> Result<PortSpec> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::EmptyPortSpec);
        }

        // 处理花括号表达式
        if input.starts_with('{') && input.ends_with('}') {
            return Self::parse(&input[1..input.len() - 1]);
        }

        // 处理多个选择项
        if input.contains(',') {
            let specs = input
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(Self::parse)
                .collect::<Result<Vec<_>>>()?;

            if specs.is_empty() {
                return Err(ParseError::EmptyPortSpec);
            }
            return Ok(PortSpec::Multiple(specs));
        }

        // 处理范围
        if let Some((start, end)) = input.split_once('-') {
            if end.contains('-') {
                return Err(ParseError::InvalidPortRangeFormat(input.to_string()));
            }
            let start = Self::parse_port(start)?;
            let end = Self::parse_port(end)?;
            if start > end {
                return Err(ParseError::InvalidPortRange(start, end));
            }
            return Ok(PortSpec::Range(start, end));
        }

        Ok(PortSpec::Single(Self::parse_port(input)?))
    }

    // 端口0不可扫描，同样视为无效
    fn parse_port(input: &str) -> Result<u16> {
        match input.trim().parse::<u16>() {
            Ok(0) | Err(_) => Err(ParseError::InvalidPortNumber(input.trim().to_string())),
            Ok(port) => Ok(port),
        }
    }
}

/// 展开端口规范为具体端口列表
fn expand_port_spec(spec: &PortSpec, ports: &mut Vec<u16>) {
    match spec {
        PortSpec::Single(port) => ports.push(*port),
        PortSpec::Range(start, end) => ports.extend(*start..=*end),
        PortSpec::Multiple(specs) => {
            for spec in specs {
                expand_port_spec(spec, ports);
            }
        }
    }
}

/// 解析发现阶段使用的端口列表，如 "554"、"554,8554"、"8000-8002"、"{554,8554}"。
/// 返回去重后的端口，保持首次出现的顺序。
pub fn parse_ports(input: &str) -> Result<Vec<u16>> {
    let spec = PortParser::parse(input)?;
    let mut expanded = Vec::new();
    expand_port_spec(&spec, &mut expanded);

    let mut seen = HashSet::with_capacity(expanded.len());
    expanded.retain(|port| seen.insert(*port));
    Ok(expanded)
}

/// 将端口列表格式化为 masscan `-p` 参数使用的逗号分隔形式
pub fn format_ports(ports: &[u16]) -> String {
    ports
        .iter()
        .map(|port| port.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
