//! 面向管理员的提示消息
//!
//! 认证成功/失败等事件既写日志，也记录在缓冲区中，由 Admin API 取走。

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info, warn};

/// 缓冲区容量上限，超出时丢弃最旧的消息
const MAX_NOTICES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Status,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct Notices {
    entries: Mutex<Vec<Notice>>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: NoticeLevel, message: String) {
        let mut entries = self.entries.lock();
        if entries.len() >= MAX_NOTICES {
            entries.remove(0);
        }
        entries.push(Notice {
            level,
            message,
            created_at: Utc::now(),
        });
    }

    pub fn status(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.push(NoticeLevel::Status, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.push(NoticeLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.push(NoticeLevel::Error, message);
    }

    /// 取出并清空全部消息
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
