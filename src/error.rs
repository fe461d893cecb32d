//! 存储层错误类型
use thiserror::Error;

/// Errors raised by the persistence port, the remote table and the duty store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 本地文件读写失败
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 编解码失败
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP 传输层失败（连接、超时等）
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// 远端返回非 2xx 状态
    #[error("remote error {status}: {message}")]
    Remote { status: u16, message: String },

    /// 需要登录的操作在未登录状态下调用
    #[error("not signed in")]
    NotAuthenticated,

    /// 未配置远端地址
    #[error("remote backend is not configured (run `dtk config remote <url> <anon-key>`)")]
    RemoteNotConfigured,

    /// 新建 duty 的表单不合法
    #[error("invalid duty: {0}")]
    InvalidDraft(String),

    #[error("duty {0} not found")]
    NotFound(i64),
}

pub type Result<T> = std::result::Result<T, StoreError>;
