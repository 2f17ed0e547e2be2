//! 文档处理上下文
//!
//! 封装"我正在处理本批的第几个文档"这一信息，只用于日志和提示

use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct DocumentCtx {
    /// 文档在本批中的序号（从1开始）
    pub index: usize,

    /// 本批文档总数
    pub total: usize,

    /// 文件名
    pub name: String,
}

impl DocumentCtx {
    pub fn new(index: usize, total: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            total,
            name: name.into(),
        }
    }
}

impl Display for DocumentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文档 {}/{} {}]", self.index, self.total, self.name)
    }
}
