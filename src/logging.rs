//! 日志初始化：终端被 TUI 占用，日志写到数据目录下的文件
use anyhow::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "dtk.log";
pub const LOG_ENV: &str = "DTK_LOG";

/// 过滤规则：DTK_LOG 优先，其次是配置里的级别
pub fn build_filter(config_level: &str) -> EnvFilter {
    filter_from(std::env::var(LOG_ENV).ok().as_deref(), config_level)
}

/// 非法的规则依次回退，最后是 info
fn filter_from(env_value: Option<&str>, config_level: &str) -> EnvFilter {
    env_value
        .ok_or(())
        .and_then(|v| EnvFilter::try_new(v).map_err(|_| ()))
        .or_else(|_| EnvFilter::try_new(config_level))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_LEVEL))
}

pub fn init(data_dir: &Path, config_level: &str) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(config_level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("初始化日志失败: {}", e))?;

    tracing::debug!(dir = %data_dir.display(), "logging initialised");
    Ok(())
}
