// 测试共用的假抓图工具、假主机发现和文件辅助函数
#![allow(dead_code)]

use async_trait::async_trait;
use rust_rtsp_grabber::capture::{CaptureProvider, CaptureReply, CaptureRequest};
use rust_rtsp_grabber::discovery::{DiscoveryProvider, DiscoveryRequest};
use rust_rtsp_grabber::errors::RtspError;
use rust_rtsp_grabber::iterator::Host;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn Fn(&CaptureRequest) -> Result<CaptureReply, RtspError> + Send + Sync>;

/// 可配置应答和延迟的假抓图工具，记录调用次数和最大并发数
pub struct FakeCapture {
    responder: Responder,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<CaptureRequest>>,
}

impl FakeCapture {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CaptureRequest) -> Result<CaptureReply, RtspError> + Send + Sync + 'static,
    {
        FakeCapture {
            responder: Box::new(responder),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 总是返回由地址决定的图像数据
    pub fn always_succeeds() -> Self {
        FakeCapture::new(|request| Ok(CaptureReply::Frame(frame_for(&request.address))))
    }

    pub fn always_invalid() -> Self {
        FakeCapture::new(|_| Ok(CaptureReply::Invalid("Invalid data found".to_string())))
    }

    /// 仅当用户名和密码匹配时成功
    pub fn accepts(username: &'static str, password: &'static str) -> Self {
        FakeCapture::new(move |request| {
            if request.username.as_deref() == Some(username)
                && request.password.as_deref() == Some(password)
            {
                Ok(CaptureReply::Frame(frame_for(&request.address)))
            } else {
                Ok(CaptureReply::Invalid("401 Unauthorized".to_string()))
            }
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CaptureRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaptureProvider for FakeCapture {
    async fn capture(&self, request: &CaptureRequest) -> Result<CaptureReply, RtspError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let reply = (self.responder)(request);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }
}

/// 模拟抓图期间持有的资源（临时文件、子进程句柄）
pub struct ResourceGuard {
    live: Arc<AtomicUsize>,
}

impl ResourceGuard {
    pub fn acquire(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        ResourceGuard { live: live.clone() }
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 永远不返回的抓图工具
pub struct HangingCapture {
    pub live_resources: Arc<AtomicUsize>,
    pub calls: AtomicUsize,
}

impl HangingCapture {
    pub fn new() -> Self {
        HangingCapture {
            live_resources: Arc::new(AtomicUsize::new(0)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn live_resources(&self) -> usize {
        self.live_resources.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureProvider for HangingCapture {
    async fn capture(&self, _request: &CaptureRequest) -> Result<CaptureReply, RtspError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _guard = ResourceGuard::acquire(&self.live_resources);
        futures::future::pending::<()>().await;
        unreachable!("pending future never completes")
    }
}

// 假主机发现的应答方式
enum DiscoveryBehavior {
    Hosts(Vec<Host>),
    Fail(String),
    Hang,
}

/// 返回固定主机列表（或失败、永不返回）的假主机发现
pub struct FakeDiscovery {
    behavior: DiscoveryBehavior,
    calls: AtomicUsize,
    requests: Mutex<Vec<DiscoveryRequest>>,
}

impl FakeDiscovery {
    fn with_behavior(behavior: DiscoveryBehavior) -> Self {
        FakeDiscovery {
            behavior,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn new(hosts: &[&str]) -> Self {
        FakeDiscovery::with_behavior(DiscoveryBehavior::Hosts(
            hosts.iter().map(|h| Host::new(h).unwrap()).collect(),
        ))
    }

    /// 扫描器出错，例如无法启动或非零退出
    pub fn failing(reason: &str) -> Self {
        FakeDiscovery::with_behavior(DiscoveryBehavior::Fail(reason.to_string()))
    }

    pub fn hanging() -> Self {
        FakeDiscovery::with_behavior(DiscoveryBehavior::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<DiscoveryRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiscoveryProvider for FakeDiscovery {
    async fn discover(&self, request: &DiscoveryRequest) -> Result<Vec<Host>, RtspError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match &self.behavior {
            DiscoveryBehavior::Hosts(hosts) => Ok(hosts.clone()),
            DiscoveryBehavior::Fail(reason) => Err(RtspError::DiscoveryError(reason.clone())),
            DiscoveryBehavior::Hang => {
                futures::future::pending::<()>().await;
                unreachable!("pending future never completes")
            }
        }
    }
}

/// 由地址生成确定的图像数据
pub fn frame_for(address: &str) -> Vec<u8> {
    let mut frame = vec![0xFF, 0xD8];
    frame.extend_from_slice(address.as_bytes());
    frame.extend_from_slice(&[0xFF, 0xD9]);
    frame
}

// 测试辅助函数：在目录中创建文件并写入内容，返回路径字符串
pub fn write_file(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path.to_str().unwrap().to_string()
}

pub fn hosts(entries: &[&str]) -> Vec<Host> {
    entries.iter().map(|h| Host::new(h).unwrap()).collect()
}
