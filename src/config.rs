//! 应用配置管理
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// 远端服务；未配置时只能使用本地模式
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    /// tracing 过滤级别（可被 DTK_LOG 覆盖）
    #[serde(default)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// 项目地址，例如 https://xyz.supabase.co
    pub url: String,
    /// 公开的 anon key
    pub anon_key: String,
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// 数据目录：~/.duty-tracker
pub fn get_data_dir() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".duty-tracker")
}

/// 获取配置文件路径
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// 加载配置
pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        // 配置文件不存在，返回默认配置
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("无法解析配置文件 {}", path.display()))?;

    Ok(config)
}

/// 保存配置
pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &get_config_path())
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    // 确保目录存在
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;

    Ok(())
}

/// 更新远端服务配置
pub fn set_remote(url: String, anon_key: String) -> Result<()> {
    let url = url.trim().trim_end_matches('/').to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("远端地址必须以 http:// 或 https:// 开头: {}", url);
    }

    let mut config = load_config()?;
    config.remote = Some(RemoteConfig { url, anon_key });
    save_config(&config)?;
    println!("✓ 远端服务已设置");
    Ok(())
}

/// 更新日志级别
pub fn set_log_level(level: String) -> Result<()> {
    let mut config = load_config()?;
    config.log_level = Some(level);
    save_config(&config)?;
    println!("✓ 日志级别已设置为: {}", config.log_level());
    Ok(())
}

/// 显示当前配置
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    println!("当前配置:");
    match &config.remote {
        Some(remote) => {
            println!("  远端地址:   {}", remote.url);
            println!("  anon key:   {}", mask(&remote.anon_key));
        }
        None => println!("  远端地址:   (未配置，仅本地模式)"),
    }
    println!("  日志级别:   {}", config.log_level());
    println!();
    println!("配置文件: {}", get_config_path().display());
    println!("数据目录: {}", get_data_dir().display());
    Ok(())
}

/// 只显示 key 的前几位
fn mask(key: &str) -> String {
    let visible: String = key.chars().take(6).collect();
    if key.chars().count() > 6 {
        format!("{}…", visible)
    } else {
        visible
    }
}
