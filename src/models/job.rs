use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 任务描述（从 TOML 文件加载）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    /// 本批要处理的文件
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// 问题与目标列
    #[serde(default)]
    pub questions: Vec<JobQuestion>,
    /// 导出目标（未设置则使用默认值）
    #[serde(default)]
    pub target: Option<JobTarget>,
    /// 生成结果表后要应用的单元格修改
    #[serde(default)]
    pub edits: Vec<CellEdit>,
    /// 是否导出到 Snowflake
    #[serde(default)]
    pub export: bool,
    /// 任务文件所在目录，用于解析相对路径
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobQuestion {
    pub question: String,
    pub column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTarget {
    pub database: String,
    pub schema: String,
    pub table: String,
}

/// 单元格修改（行号从 1 开始，列按名称）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellEdit {
    pub row: usize,
    pub column: String,
    pub value: String,
}

impl Job {
    /// 文件的实际路径（相对路径基于任务文件所在目录）
    pub fn resolved_files(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .map(|p| match &self.base_dir {
                Some(base) if p.is_relative() => base.join(p),
                _ => p.clone(),
            })
            .collect()
    }
}
