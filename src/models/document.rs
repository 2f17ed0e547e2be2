//! 上传文档及其解析结果

use std::fmt;
use std::sync::Arc;

/// 文档声明的媒体类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Jpeg,
    Png,
    /// 其他类型（原样保留声明的字符串，解析时报 UnsupportedFileType）
    Other(String),
}

impl MediaType {
    /// 从 MIME 字符串解析
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "application/pdf" | "pdf" => MediaType::Pdf,
            "image/jpeg" | "image/jpg" | "jpeg" | "jpg" => MediaType::Jpeg,
            "image/png" | "png" => MediaType::Png,
            other => MediaType::Other(other.to_string()),
        }
    }

    /// 根据文件扩展名推断
    pub fn from_path(path: &std::path::Path) -> Self {
        match mime_guess::from_path(path).first() {
            Some(mime) => Self::parse(mime.essence_str()),
            None => MediaType::Other(
                path.extension()
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_default(),
            ),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Other(s) => s,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 上传的文档，接收后不可变
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    name: String,
    media_type: MediaType,
    bytes: Arc<[u8]>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, media_type: MediaType, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// 送入 QA 模型的单页图像
///
/// 对于图片文件是原始字节；对于 PDF 是渲染后的 PNG。
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    /// 页码（从 1 开始）
    pub page_number: u32,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
    /// 图片宽高
    pub dimensions: Option<(u32, u32)>,
}

/// 文档解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentContent {
    PlainText(String),
    SingleImage(PageImage),
    /// 多页文档，按页序排列
    ImageSequence(Vec<PageImage>),
}

impl DocumentContent {
    /// 需要调用 QA 模型的页数
    pub fn page_count(&self) -> usize {
        match self {
            DocumentContent::PlainText(_) | DocumentContent::SingleImage(_) => 1,
            DocumentContent::ImageSequence(pages) => pages.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_media_type_parse() {
        assert_eq!(MediaType::parse("application/pdf"), MediaType::Pdf);
        assert_eq!(MediaType::parse("IMAGE/JPEG"), MediaType::Jpeg);
        assert_eq!(MediaType::parse("image/png"), MediaType::Png);
        assert_eq!(
            MediaType::parse("text/plain"),
            MediaType::Other("text/plain".to_string())
        );
    }

    #[test]
    fn test_media_type_from_path() {
        assert_eq!(MediaType::from_path(Path::new("a/invoice.PDF")), MediaType::Pdf);
        assert_eq!(MediaType::from_path(Path::new("scan.jpg")), MediaType::Jpeg);
        assert_eq!(MediaType::from_path(Path::new("scan.jpeg")), MediaType::Jpeg);
        assert_eq!(MediaType::from_path(Path::new("scan.png")), MediaType::Png);
        assert!(matches!(
            MediaType::from_path(Path::new("notes.txt")),
            MediaType::Other(_)
        ));
    }
}
