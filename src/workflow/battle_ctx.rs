//! 文档上下文
//!
//! 封装"我正在对比哪份已上传的 PDF"这一信息

use std::fmt::Display;

/// 已上传文档的上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCtx {
    /// 后端返回的文件 ID
    pub file_id: String,

    /// 原始文件名
    pub filename: String,

    /// 总页数
    pub page_count: u32,
}

impl DocumentCtx {
    pub fn new(file_id: String, filename: String, page_count: u32) -> Self {
        Self {
            file_id,
            filename,
            page_count,
        }
    }

    /// 页码必须在 [1, page_count] 内
    pub fn contains_page(&self, page_number: u32) -> bool {
        page_number >= 1 && page_number <= self.page_count
    }
}

impl Display for DocumentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文档 {} ID#{} 共{}页]",
            self.filename, self.file_id, self.page_count
        )
    }
}
