use std::sync::Arc;
use tokio::sync::watch;

/// 运行级别的取消信号。克隆后共享同一状态，取消后不可恢复。
#[derive(Clone, Debug)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        CancelToken {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn cancel(&self) {
        if !self.sender.send_replace(true) {
            log::debug!("Cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// 等待取消信号
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // 发送端与自身共存，wait_for 不会因通道关闭而返回
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        CancelToken::new()
    }
}
