use crate::capture::CaptureRequest;
use crate::iterator::credential_reader::Credential;
use crate::iterator::host_reader::Host;
use crate::iterator::route_reader::Route;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

/// 一次尝试：(主机, 路由, 凭据)
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Trial {
    pub host: Host,
    pub route: Route,
    pub credential: Credential,
}

impl Trial {
    pub fn stream_address(&self) -> String {
        self.route.stream_address(&self.host)
    }

    /// 构建交给抓图工具的请求
    pub fn capture_request(&self, timeout: Duration) -> CaptureRequest {
        CaptureRequest {
            address: self.stream_address(),
            username: self.credential.username().map(str::to_string),
            password: self.credential.password().map(str::to_string),
            timeout,
        }
    }
}

impl Display for Trial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} with {}", self.stream_address(), self.credential)
    }
}

/// 尝试空间：主机 × 路由 × 凭据 的笛卡尔积，不会被展开存储
#[derive(Clone, Debug)]
pub struct TrialSpace {
    hosts: Arc<Vec<Host>>,
    routes: Arc<Vec<Route>>,
    credentials: Arc<Vec<Credential>>,
}

impl TrialSpace {
    pub fn new(hosts: Vec<Host>, routes: Vec<Route>, credentials: Vec<Credential>) -> Self {
        TrialSpace {
            hosts: Arc::new(hosts),
            routes: Arc::new(routes),
            credentials: Arc::new(credentials),
        }
    }

    /// 尝试总数（溢出时饱和）
    pub fn len(&self) -> usize {
        self.hosts
            .len()
            .saturating_mul(self.routes.len())
            .saturating_mul(self.credentials.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// 每次调用都从头开始生成
    pub fn iter(&self) -> TrialIterator {
        TrialIterator {
            space: self.clone(),
            host_index: 0,
            route_index: 0,
            cred_index: 0,
        }
    }
}

impl IntoIterator for &TrialSpace {
    type Item = Trial;
    type IntoIter = TrialIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// 尝试迭代器 - 按 主机 → 路由 → 凭据 的顺序惰性生成组合
#[derive(Clone, Debug)]
pub struct TrialIterator {
    space: TrialSpace,
    host_index: usize,
    route_index: usize,
    cred_index: usize,
}

impl TrialIterator {
    fn remaining(&self) -> usize {
        let routes = self.space.routes.len();
        let creds = self.space.credentials.len();
        if self.space.is_empty() || self.host_index >= self.space.hosts.len() {
            return 0;
        }
        let per_host = routes.saturating_mul(creds);
        let hosts_left = self.space.hosts.len() - self.host_index;
        let consumed = self.route_index * creds + self.cred_index;
        hosts_left.saturating_mul(per_host).saturating_sub(consumed)
    }
}

impl Iterator for TrialIterator {
    type Item = Trial;

    fn next(&mut self) -> Option<Self::Item> {
        if self.space.is_empty() || self.host_index >= self.space.hosts.len() {
            return None;
        }

        let trial = Trial {
            host: self.space.hosts[self.host_index].clone(),
            route: self.space.routes[self.route_index].clone(),
            credential: self.space.credentials[self.cred_index].clone(),
        };

        // 更新索引，准备下一次迭代
        self.cred_index += 1;
        if self.cred_index >= self.space.credentials.len() {
            self.cred_index = 0;
            self.route_index += 1;
            if self.route_index >= self.space.routes.len() {
                self.route_index = 0;
                self.host_index += 1;
            }
        }

        Some(trial)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}
