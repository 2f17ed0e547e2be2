use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

/// 初始化 tracing 订阅器
///
/// 日志级别由 `RUST_LOG` 控制，未设置时为 `info`；`verbose` 为真时默认 `debug`。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// 初始化日志文件（写入带时间戳的文件头）
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n文档抽取日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 文档问答抽取模式");
    info!("🤖 QA 模型: {}", config.qa_model_name);
    info!("📄 PDF 模式: {:?} (渲染宽度 {}px)", config.pdf_mode, config.pdf_render_width);
    info!(
        "🎯 默认导出目标: {}.{}.{}",
        config.default_database, config.default_schema, config.default_table
    );
    if config.fail_fast {
        info!("⛔ FAIL_FAST 已开启：任一文档失败将中止整批");
    }
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `processed`: 成功处理的文档数
/// - `total`: 上传的文档总数
/// - `exported`: 导出的行数（未导出为 None）
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(processed: usize, total: usize, exported: Option<usize>, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", processed, total);
    info!("⏭️ 跳过: {}", total.saturating_sub(processed));
    match exported {
        Some(rows) => info!("📤 已导出: {} 行", rows),
        None => info!("📤 未导出"),
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("发票总金额是多少", 4), "发票总金...");
        assert_eq!(truncate_text("total", 10), "total");
    }

    #[test]
    fn test_init_log_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        init_log_file(path.to_str().unwrap()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("文档抽取日志"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
