use crate::models::document::{MediaType, UploadedDocument};
use crate::models::job::Job;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载任务描述
pub async fn load_job(toml_file_path: &Path) -> Result<Job> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut job: Job = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    // 记录任务文件所在目录，便于解析相对路径
    job.base_dir = toml_file_path.parent().map(Path::to_path_buf);

    Ok(job)
}

/// 读取单个文件为上传文档，媒体类型由扩展名推断
pub async fn load_document(path: &Path) -> Result<UploadedDocument> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("无法读取文件: {}", path.display()))?;

    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    Ok(UploadedDocument::new(name, MediaType::from_path(path), bytes))
}

/// 读取任务中的所有文件；读取失败的文件记录警告后跳过
pub async fn load_documents(job: &Job) -> Vec<UploadedDocument> {
    let mut documents = Vec::new();

    for path in job.resolved_files() {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_document(&path).await {
            Ok(document) => {
                tracing::info!(
                    "成功加载 {} ({}, {} 字节)",
                    document.name(),
                    document.media_type(),
                    document.bytes().len()
                );
                documents.push(document);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    documents
}
