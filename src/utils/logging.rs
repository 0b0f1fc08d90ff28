//! 日志工具模块
//!
//! 提供日志初始化与运行日志文件的辅助函数

use anyhow::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::Provider;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则默认 info，verbose 时为 debug。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ragrace_arena={0},ragrace={0},warn", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化运行日志文件，表头记录本次对比的 provider 与页码范围
pub fn init_log_file(log_file_path: &str, providers: &[Provider], page_number: Option<u32>) -> Result<()> {
    let names: Vec<&str> = providers.iter().map(|p| p.display_name()).collect();
    let scope = match page_number {
        Some(page) => format!("第 {} 页", page),
        None => "整份文档".to_string(),
    };
    let log_header = format!(
        "{}\n批量对比日志 - {}\nprovider: {} | 范围: {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        names.join(", "),
        scope,
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `api_base_url`: 后端地址
/// - `max_concurrent`: 最大并发数
pub fn log_startup(api_base_url: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量解析对比模式");
    info!("🌐 后端地址: {}", api_base_url);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
