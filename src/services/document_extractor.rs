//! 文档解析服务 - 业务能力层
//!
//! 只负责"把一个上传文件变成 QA 模型能用的内容"，不关心问题和流程。
//!
//! - PDF（pages 模式）→ 按页序渲染为 PNG 序列
//! - PDF（text 模式）→ 全文文本
//! - JPEG / PNG → 单张图片（解码文件头校验格式与尺寸）

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use lopdf::Document;
use tracing::{debug, warn};

use crate::config::PdfMode;
use crate::error::DocumentError;
use crate::infrastructure::PageRasterizer;
use crate::models::document::{DocumentContent, MediaType, PageImage, UploadedDocument};

/// 文档解析服务
pub struct DocumentExtractor {
    pdf_mode: PdfMode,
    rasterizer: Arc<dyn PageRasterizer>,
}

impl DocumentExtractor {
    pub fn new(pdf_mode: PdfMode, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        Self {
            pdf_mode,
            rasterizer,
        }
    }

    /// 解析单个上传文档
    pub fn extract(&self, document: &UploadedDocument) -> Result<DocumentContent, DocumentError> {
        match document.media_type() {
            MediaType::Pdf => match self.pdf_mode {
                PdfMode::Pages => self.render_pdf_pages(document).map(DocumentContent::ImageSequence),
                PdfMode::Text => extract_pdf_text(document).map(DocumentContent::PlainText),
            },
            MediaType::Jpeg | MediaType::Png => {
                decode_image(document).map(DocumentContent::SingleImage)
            }
            MediaType::Other(media_type) => Err(DocumentError::UnsupportedFileType {
                name: document.name().to_string(),
                media_type: media_type.clone(),
            }),
        }
    }

    /// 逐页渲染为 PNG；页序必须保留，多页答案按此顺序拼接
    fn render_pdf_pages(&self, document: &UploadedDocument) -> Result<Vec<PageImage>, DocumentError> {
        let page_count = load_pdf(document)?.get_pages().len();
        debug!("{}: 共 {} 页", document.name(), page_count);

        let images = self.rasterizer.render_pages(document.name(), document.bytes())?;
        if images.is_empty() {
            return Err(DocumentError::NoPages {
                name: document.name().to_string(),
            });
        }
        if images.len() != page_count {
            warn!(
                "{}: 页面树有 {} 页，实际渲染 {} 页",
                document.name(),
                page_count,
                images.len()
            );
        }

        images
            .into_iter()
            .zip(1u32..)
            .map(|(image, page_number)| encode_png(document, page_number, image))
            .collect()
    }
}

fn load_pdf(document: &UploadedDocument) -> Result<Document, DocumentError> {
    let pdf = Document::load_mem(document.bytes()).map_err(|e| DocumentError::Unreadable {
        name: document.name().to_string(),
        source: Box::new(e),
    })?;

    if pdf.get_pages().is_empty() {
        return Err(DocumentError::NoPages {
            name: document.name().to_string(),
        });
    }
    Ok(pdf)
}

fn encode_png(
    document: &UploadedDocument,
    page_number: u32,
    image: RgbaImage,
) -> Result<PageImage, DocumentError> {
    let dimensions = image.dimensions();
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|e| DocumentError::Unreadable {
            name: document.name().to_string(),
            source: Box::new(e),
        })?;

    Ok(PageImage {
        page_number,
        media_type: MediaType::Png,
        bytes: bytes.into_inner(),
        dimensions: Some(dimensions),
    })
}

fn extract_pdf_text(document: &UploadedDocument) -> Result<String, DocumentError> {
    let pdf = load_pdf(document)?;
    let page_numbers: Vec<u32> = pdf.get_pages().keys().copied().collect();

    pdf.extract_text(&page_numbers)
        .map_err(|e| DocumentError::Unreadable {
            name: document.name().to_string(),
            source: Box::new(e),
        })
}

fn decode_image(document: &UploadedDocument) -> Result<PageImage, DocumentError> {
    let unreadable = |e: Box<dyn std::error::Error + Send + Sync>| DocumentError::Unreadable {
        name: document.name().to_string(),
        source: e,
    };

    let reader = ImageReader::new(Cursor::new(document.bytes()))
        .with_guessed_format()
        .map_err(|e| unreadable(Box::new(e)))?;

    let detected = match reader.format() {
        Some(ImageFormat::Jpeg) => MediaType::Jpeg,
        Some(ImageFormat::Png) => MediaType::Png,
        other => {
            return Err(DocumentError::UnsupportedFileType {
                name: document.name().to_string(),
                media_type: other
                    .map(|f| format!("{:?}", f).to_lowercase())
                    .unwrap_or_else(|| document.media_type().to_string()),
            })
        }
    };

    if &detected != document.media_type() {
        warn!(
            "{}: 声明类型为 {}，实际内容为 {}",
            document.name(),
            document.media_type(),
            detected
        );
    }

    let dimensions = reader.into_dimensions().map_err(|e| unreadable(Box::new(e)))?;

    Ok(PageImage {
        page_number: 1,
        media_type: detected,
        bytes: document.bytes().to_vec(),
        dimensions: Some(dimensions),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::PdfiumRasterizer;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// 每页渲染成宽度为 10×页码 的白图，用于校验页序
    struct WidthByPage;

    impl PageRasterizer for WidthByPage {
        fn render_pages(&self, name: &str, pdf: &[u8]) -> Result<Vec<RgbaImage>, DocumentError> {
            let pages = Document::load_mem(pdf)
                .map_err(|e| DocumentError::Unreadable {
                    name: name.to_string(),
                    source: Box::new(e),
                })?
                .get_pages()
                .len() as u32;
            Ok((1..=pages)
                .map(|n| RgbaImage::from_pixel(10 * n, 20, image::Rgba([255, 255, 255, 255])))
                .collect())
        }
    }

    fn extractor(pdf_mode: PdfMode) -> DocumentExtractor {
        DocumentExtractor::new(pdf_mode, Arc::new(WidthByPage))
    }

    /// 构造一个每页只有一行文字的 PDF
    fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn encode_image(format: image::ImageFormat) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([255, 255, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut bytes, format)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_pdf_pages_render_to_png_in_order() {
        let doc = UploadedDocument::new("two.pdf", MediaType::Pdf, build_pdf(&["Jan", "2024"]));
        let content = extractor(PdfMode::Pages).extract(&doc).unwrap();

        let pages = match content {
            DocumentContent::ImageSequence(pages) => pages,
            other => panic!("unexpected content: {:?}", other),
        };
        assert_eq!(pages.len(), 2);
        for (i, page) in pages.iter().enumerate() {
            let n = i as u32 + 1;
            assert_eq!(page.page_number, n);
            assert_eq!(page.media_type, MediaType::Png);
            assert_eq!(page.dimensions, Some((10 * n, 20)));

            let decoded = image::load_from_memory(&page.bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (10 * n, 20));
        }
    }

    #[test]
    #[ignore] // 需要本机安装 pdfium
    fn test_pdfium_renders_real_pages() {
        let doc = UploadedDocument::new("two.pdf", MediaType::Pdf, build_pdf(&["Jan", "2024"]));
        let extractor = DocumentExtractor::new(PdfMode::Pages, Arc::new(PdfiumRasterizer::new(None, 600)));

        match extractor.extract(&doc).unwrap() {
            DocumentContent::ImageSequence(pages) => {
                assert_eq!(pages.len(), 2);
                for page in &pages {
                    let decoded = image::load_from_memory_with_format(&page.bytes, ImageFormat::Png).unwrap();
                    assert!(decoded.width() > 0);
                    assert_eq!(page.dimensions, Some((decoded.width(), decoded.height())));
                }
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_pdf_text_mode() {
        let doc = UploadedDocument::new("two.pdf", MediaType::Pdf, build_pdf(&["Jan", "2024"]));
        let content = extractor(PdfMode::Text).extract(&doc).unwrap();
        match content {
            DocumentContent::PlainText(text) => {
                let jan = text.find("Jan").unwrap();
                let year = text.find("2024").unwrap();
                assert!(jan < year);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_jpeg_and_png_decode() {
        for (format, media_type) in [
            (image::ImageFormat::Jpeg, MediaType::Jpeg),
            (image::ImageFormat::Png, MediaType::Png),
        ] {
            let doc = UploadedDocument::new("scan", media_type.clone(), encode_image(format));
            match extractor(PdfMode::Pages).extract(&doc).unwrap() {
                DocumentContent::SingleImage(page) => {
                    assert_eq!(page.media_type, media_type);
                    assert_eq!(page.dimensions, Some((4, 3)));
                }
                other => panic!("unexpected content: {:?}", other),
            }
        }
    }

    #[test]
    fn test_unsupported_type() {
        let doc = UploadedDocument::new("notes.txt", MediaType::parse("text/plain"), b"hi".to_vec());
        let err = extractor(PdfMode::Pages).extract(&doc).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFileType { media_type, .. } if media_type == "text/plain"));
    }

    #[test]
    fn test_corrupt_inputs_are_unreadable() {
        let pdf = UploadedDocument::new("bad.pdf", MediaType::Pdf, b"not a pdf".to_vec());
        assert!(matches!(
            extractor(PdfMode::Pages).extract(&pdf),
            Err(DocumentError::Unreadable { .. })
        ));

        let mut png = encode_image(image::ImageFormat::Png);
        png.truncate(20);
        let png = UploadedDocument::new("bad.png", MediaType::Png, png);
        assert!(extractor(PdfMode::Pages).extract(&png).is_err());
    }
}
