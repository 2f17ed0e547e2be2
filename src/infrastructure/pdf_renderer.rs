//! PDF 渲染：把 PDF 的每一页渲染成位图
//!
//! pdfium 是动态库，首次渲染时绑定一次，整个进程共用；找不到库时渲染返回错误，
//! 由调用方跳过该文档。

use std::sync::OnceLock;

use image::RgbaImage;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::DocumentError;

static PDFIUM: OnceLock<Result<Pdfium, String>> = OnceLock::new();

/// PDF 页面渲染能力
pub trait PageRasterizer: Send + Sync {
    /// 按页序渲染每一页，返回的位图数量等于页数
    fn render_pages(&self, name: &str, pdf: &[u8]) -> Result<Vec<RgbaImage>, DocumentError>;
}

/// 基于 pdfium 的渲染实现
pub struct PdfiumRasterizer {
    library_dir: Option<String>,
    target_width: i32,
}

impl PdfiumRasterizer {
    pub fn new(library_dir: Option<String>, target_width: u32) -> Self {
        Self {
            library_dir,
            target_width: i32::try_from(target_width).unwrap_or(i32::MAX),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.pdfium_library_dir.clone(),
            config.pdf_render_width,
        )
    }

    /// 优先绑定配置目录下的 pdfium，失败再尝试系统库；结果只计算一次
    fn pdfium(&self) -> Result<&'static Pdfium, DocumentError> {
        PDFIUM
            .get_or_init(|| {
                if let Some(dir) = &self.library_dir {
                    match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)) {
                        Ok(bindings) => return Ok(Pdfium::new(bindings)),
                        Err(e) => warn!("⚠️ 无法从 {} 加载 pdfium: {:?}", dir, e),
                    }
                }
                Pdfium::bind_to_system_library()
                    .map(Pdfium::new)
                    .map_err(|e| format!("{:?}", e))
            })
            .as_ref()
            .map_err(|message| DocumentError::RendererUnavailable {
                message: message.clone(),
            })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn render_pages(&self, name: &str, pdf: &[u8]) -> Result<Vec<RgbaImage>, DocumentError> {
        let unreadable = |e: PdfiumError| DocumentError::Unreadable {
            name: name.to_string(),
            source: Box::new(e),
        };

        let pdfium = self.pdfium()?;
        let document = pdfium.load_pdf_from_byte_slice(pdf, None).map_err(unreadable)?;

        let config = PdfRenderConfig::new()
            .set_target_width(self.target_width)
            .set_maximum_height(self.target_width.saturating_mul(2));

        let mut images = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let bitmap = page.render_with_config(&config).map_err(unreadable)?;
            let (width, height) = (bitmap.width(), bitmap.height());
            debug!("{}: 第 {} 页渲染为 {}x{}", name, index + 1, width, height);

            let image = u32::try_from(width)
                .ok()
                .zip(u32::try_from(height).ok())
                .and_then(|(w, h)| RgbaImage::from_raw(w, h, bitmap.as_rgba_bytes()))
                .ok_or_else(|| DocumentError::Unreadable {
                    name: name.to_string(),
                    source: format!("第 {} 页位图尺寸无效: {}x{}", index + 1, width, height).into(),
                })?;
            images.push(image);
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_dir_is_reported() {
        let rasterizer = PdfiumRasterizer::new(Some("/nonexistent/pdfium".to_string()), 800);
        // 系统里也可能装有 pdfium，此时这份数据会被判为无法读取
        let err = rasterizer.render_pages("bad.pdf", b"not a pdf").unwrap_err();
        assert!(matches!(
            err,
            DocumentError::RendererUnavailable { .. } | DocumentError::Unreadable { .. }
        ));
    }
}
