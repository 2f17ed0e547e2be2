//! 暂存上传服务
//!
//! 把上传的原始文件放进仓库的临时 stage。本地临时文件在任何路径上都会被删除。

use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::WarehouseError;
use crate::infrastructure::sql::{self, Identifier};
use crate::infrastructure::warehouse::Warehouse;
use crate::models::document::UploadedDocument;

/// 暂存上传服务
///
/// 只支持仓库返回预签名 URL 的 stage（PUT 直接上传到该 URL）。S3 / AZURE 等需要
/// 客户端持有云凭据的内部 stage 会返回 `WarehouseError::StageUploadUnsupported`，
/// 调用方把它当作警告，文档照常处理。
pub struct Stager {
    warehouse: Arc<dyn Warehouse>,
    stage: Identifier,
}

impl Stager {
    pub fn new(warehouse: Arc<dyn Warehouse>, stage: &str) -> Result<Self, WarehouseError> {
        Ok(Self {
            warehouse,
            stage: Identifier::parse(stage)?,
        })
    }

    pub fn stage(&self) -> &Identifier {
        &self.stage
    }

    /// 上传一个文档到临时 stage
    pub async fn stage_document(&self, document: &UploadedDocument) -> Result<(), WarehouseError> {
        // NamedTempFile 在 drop 时删除，提前返回也不会遗留文件
        let mut file = tempfile::Builder::new()
            .prefix("docqa-")
            .suffix(&file_suffix(document.name()))
            .tempfile()
            .map_err(WarehouseError::StagingFile)?;
        file.write_all(document.bytes()).map_err(WarehouseError::StagingFile)?;
        file.flush().map_err(WarehouseError::StagingFile)?;

        debug!("临时文件: {}", file.path().display());

        self.warehouse
            .query(&sql::create_temporary_stage(&self.stage), &[])
            .await?;
        self.upload(&file).await?;

        info!("📦 [{}] 已暂存到 @{}", document.name(), self.stage);
        Ok(())
    }

    async fn upload(&self, file: &NamedTempFile) -> Result<(), WarehouseError> {
        self.warehouse.put_file(file.path(), &self.stage).await
    }
}

fn file_suffix(name: &str) -> String {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::warehouse::QueryResult;
    use crate::models::document::MediaType;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    struct StageWarehouse {
        statements: Mutex<Vec<String>>,
        seen: Mutex<Vec<(PathBuf, Vec<u8>)>>,
        fail_put: bool,
    }

    impl StageWarehouse {
        fn new(fail_put: bool) -> Arc<Self> {
            Arc::new(Self {
                statements: Mutex::new(Vec::new()),
                seen: Mutex::new(Vec::new()),
                fail_put,
            })
        }
    }

    #[async_trait]
    impl Warehouse for StageWarehouse {
        async fn query(&self, sql: &str, _: &[String]) -> Result<QueryResult, WarehouseError> {
            self.statements.lock().unwrap().push(sql.to_string());
            Ok(QueryResult::default())
        }

        async fn put_file(&self, local_path: &Path, _: &Identifier) -> Result<(), WarehouseError> {
            let bytes = std::fs::read(local_path).unwrap();
            self.seen.lock().unwrap().push((local_path.to_path_buf(), bytes));
            if self.fail_put {
                return Err(WarehouseError::StageUploadUnsupported {
                    location_type: "S3".into(),
                });
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "stage"
        }
    }

    fn invoice() -> UploadedDocument {
        UploadedDocument::new("invoice.pdf", MediaType::Pdf, b"%PDF-1.5".to_vec())
    }

    #[tokio::test]
    async fn test_stage_creates_stage_and_removes_temp_file() {
        let warehouse = StageWarehouse::new(false);
        let stager = Stager::new(warehouse.clone(), "DOCQA_STAGE").unwrap();

        stager.stage_document(&invoice()).await.unwrap();

        assert_eq!(
            warehouse.statements.lock().unwrap()[0],
            "CREATE OR REPLACE TEMPORARY STAGE DOCQA_STAGE"
        );
        let seen = warehouse.seen.lock().unwrap();
        let (path, bytes) = &seen[0];
        assert_eq!(bytes, b"%PDF-1.5");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_upload_still_removes_temp_file() {
        let warehouse = StageWarehouse::new(true);
        let stager = Stager::new(warehouse.clone(), "DOCQA_STAGE").unwrap();

        let err = stager.stage_document(&invoice()).await.unwrap_err();
        assert!(matches!(err, WarehouseError::StageUploadUnsupported { .. }));
        assert!(!warehouse.seen.lock().unwrap()[0].0.exists());
    }

    #[test]
    fn test_invalid_stage_name_rejected() {
        assert!(Stager::new(StageWarehouse::new(false), "my stage").is_err());
    }
}
