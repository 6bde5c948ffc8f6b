// 输入列表的读取与尝试空间的生成
pub mod credential_reader;
pub mod host_reader;
pub mod loader;
pub mod port_parser;
pub mod route_reader;
pub mod trial_iterator;

pub use credential_reader::{Credential, CredentialReader};
pub use host_reader::{Host, HostReader};
pub use loader::{InputSet, load_inputs};
pub use route_reader::{Route, RouteReader};
pub use trial_iterator::{Trial, TrialIterator, TrialSpace};

use crate::errors::errors::RtspError;
use std::fs::File;
use std::io::{BufRead, BufReader};

// 辅助函数：从文件读取有效行，返回 (行号, 去掉行尾\r的原始内容)。
// 空白行和以 # 开头的注释行被跳过。
pub(crate) fn read_lines_from_file(file_path: &str) -> Result<Vec<(usize, String)>, RtspError> {
    let file = File::open(file_path)
        .map_err(|e| RtspError::ConfigError(format!("cannot open {}: {}", file_path, e)))?;
    let reader = BufReader::new(file);
    let mut lines = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(RtspError::IoError)?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        lines.push((index + 1, line.to_string()));
    }

    Ok(lines)
}
