use crate::errors::errors::RtspError;
use crate::iterator::host_reader::Host;
use crate::iterator::read_lines_from_file;
use std::fmt::Display;

/// 流路径模板中主机的占位符
pub const HOST_PLACEHOLDER: &str = "{host}";

/// 流路径模板，与主机组合成完整的RTSP地址
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Route(String);

impl Route {
    pub fn new(route: &str) -> Self {
        Route(route.trim().to_string())
    }

    /// 构建完整的流地址。
    ///
    /// 含有 `{host}` 占位符的路由是完整模板，直接替换；
    /// 其余视为路径，拼接为 `rtsp://<host>/<path>`。
    pub fn stream_address(&self, host: &Host) -> String {
        if self.0.contains(HOST_PLACEHOLDER) {
            return self.0.replace(HOST_PLACEHOLDER, &host.authority());
        }
        format!(
            "rtsp://{}/{}",
            host.authority(),
            self.0.trim_start_matches('/')
        )
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 路由读取器
#[derive(Clone, Debug)]
pub struct RouteReader {
    file_path: String,
}

impl RouteReader {
    pub fn from_file(routes_file: &str) -> Self {
        RouteReader {
            file_path: routes_file.to_string(),
        }
    }

    /// 读取路由列表，空列表是配置错误
    pub fn read_routes(&self) -> Result<Vec<Route>, RtspError> {
        let routes: Vec<Route> = read_lines_from_file(&self.file_path)?
            .iter()
            .map(|(_, line)| Route::new(line))
            .collect();

        if routes.is_empty() {
            return Err(RtspError::EmptyInput("routes"));
        }
        Ok(routes)
    }
}
