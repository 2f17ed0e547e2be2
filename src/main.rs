use std::path::PathBuf;

use anyhow::Result;
use docqa_export::utils::logging;
use docqa_export::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 任务文件：命令行第一个参数优先，其次 JOB_FILE
    let job_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.job_file));

    // 初始化并运行应用
    let mut app = App::initialize(config).await?;
    app.run(&job_path).await?;

    Ok(())
}
