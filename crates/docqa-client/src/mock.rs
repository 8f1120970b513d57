//! In-memory backend with canned engineering documents, for demos and offline work.
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use docqa_core::types::{
    AskRequest, AskResponse, FileType, FollowUpRequest, FollowUpResponse, HealthStatus, Percent, QaSource, QueryType,
    SearchRequest, SearchResponse, SearchResult, StructuredData, ThumbnailType, UnitScore, UploadRequest,
    UploadResponse,
};
use docqa_core::{ApiError, Backend};

const FOLLOW_UP_ANSWERS: [&str; 4] = [
    "根据图纸分析，中心距为 42mm，符合 v1.2 工艺规范要求（40-45mm）。[1]",
    "该组件的材质为 6061-T6 铝合金，具有良好的强度和耐腐蚀性。[1]",
    "消息队列模块采用 Kafka 架构，吞吐量可达 100k msg/s，适用于高并发场景。[2]",
    "装配清单中共包含 156 个零部件，主要材料为铝合金与不锈钢。[3]",
];

fn pairs(items: &[(&str, &str)]) -> Vec<StructuredData> {
    items
        .iter()
        .map(|(label, value)| StructuredData { label: (*label).to_string(), value: (*value).to_string() })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn canned(
    id: &str,
    file_name: &str,
    file_path: &str,
    file_type: FileType,
    similarity: u8,
    page: &str,
    date: &str,
    snippet: &str,
    thumbnail_type: ThumbnailType,
    version: &str,
    data: &[(&str, &str)],
) -> SearchResult {
    SearchResult {
        id: id.to_string(),
        file_name: file_name.to_string(),
        file_path: file_path.to_string(),
        file_type,
        similarity: Percent::new(similarity),
        page: Some(page.to_string()),
        date: date.to_string(),
        snippet: snippet.to_string(),
        citation_number: 0,
        thumbnail_type,
        thumbnail_url: None,
        preview_url: None,
        version: version.to_string(),
        structured_data: pairs(data),
    }
}

fn corpus() -> Vec<SearchResult> {
    vec![
        canned(
            "1",
            "MotorBracket_v1.2.dwg",
            "/工程制造/机械零件/电机支架/v1.2/",
            FileType::Cad,
            87,
            "View A",
            "2025-09-21",
            "孔径 Ø8mm；中心距 42mm；材质 6061-T6；适用于标准电机安装，符合 GB/T 规范要求。",
            ThumbnailType::Cad,
            "v1.2",
            &[("孔径", "Ø8mm"), ("中心距", "42mm"), ("材质", "6061-T6"), ("公差等级", "IT7")],
        ),
        canned(
            "2",
            "PlantFlow_v3_arch.pdf",
            "/研发架构/系统架构图/2025Q3/",
            FileType::Flowchart,
            82,
            "Page 12",
            "2025-08-15",
            "消息队列模块采用 Kafka 架构，处理实时数据流，支持高并发场景下的异步通信。",
            ThumbnailType::Pdf,
            "v3.0",
            &[("模块", "消息队列"), ("技术栈", "Apache Kafka"), ("吞吐量", "100k msg/s"), ("部署模式", "分布式集群")],
        ),
        canned(
            "3",
            "Assembly_BOM_2025Q3.xlsx",
            "/工业档案/装配清单/2025/Q3/",
            FileType::Bom,
            78,
            "Sheet 2",
            "2025-07-10",
            "装配清单包含 156 个零部件，主要材料为铝合金与不锈钢，总成本预算 ¥245,600。",
            ThumbnailType::Image,
            "2025Q3",
            &[("零件数量", "156个"), ("主材料", "铝合金/不锈钢"), ("总成本", "¥245,600"), ("周期", "2025Q3")],
        ),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    latency: Duration,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate network latency on every call.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn matches(result: &SearchResult, query: &str) -> bool {
        let q = query.to_lowercase();
        result.file_name.to_lowercase().contains(&q)
            || result.snippet.to_lowercase().contains(&q)
            || result.file_type.label().to_lowercase().contains(&q)
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        self.pause().await;
        let mut results: Vec<SearchResult> = corpus()
            .into_iter()
            .filter(|r| request.query.is_empty() || Self::matches(r, &request.query))
            .collect();
        results.truncate(request.top_k.unwrap_or(10));
        Ok(SearchResponse {
            total_count: results.len(),
            results,
            query_time: 823.0,
            model: request.model,
            strategy: request.strategy,
        })
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, ApiError> {
        self.pause().await;
        Ok(UploadResponse {
            success: true,
            file_id: format!("mock-{}", Utc::now().timestamp_millis()),
            file_name: request.file.file_name.clone(),
            message: Some("文件上传成功（模拟）".to_string()),
        })
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ApiError> {
        self.pause().await;
        let top_k = request.top_k.unwrap_or(3);
        let sources: Vec<QaSource> = corpus()
            .into_iter()
            .filter(|r| Self::matches(r, &request.question))
            .take(top_k)
            .map(|r| QaSource {
                file_id: r.id,
                file_name: r.file_name,
                file_type: r.file_type.label().to_string(),
                similarity: UnitScore::new(f64::from(r.similarity.value()) / 100.0),
                chunk_text: Some(r.snippet),
                extracted_info: None,
            })
            .collect();
        let (answer, confidence, query_type) = match sources.first() {
            Some(first) => (
                format!("参考 {}：{} [1]", first.file_name, first.chunk_text.clone().unwrap_or_default()),
                0.82,
                QueryType::ExactQuery,
            ),
            None => ("未找到与问题相关的文档。".to_string(), 0.2, QueryType::GeneralQuery),
        };
        Ok(AskResponse { answer, sources, confidence: UnitScore::new(confidence), query_type })
    }

    async fn follow_up(&self, request: &FollowUpRequest) -> Result<FollowUpResponse, ApiError> {
        self.pause().await;
        let pick = request.question.chars().count() % FOLLOW_UP_ANSWERS.len();
        Ok(FollowUpResponse {
            answer: FOLLOW_UP_ANSWERS[pick].to_string(),
            citations: vec![1],
            confidence: UnitScore::new(0.9),
        })
    }

    fn preview_url(&self, document_id: &str) -> String {
        format!("/mock-preview/{document_id}")
    }

    fn thumbnail_url(&self, document_id: &str) -> String {
        format!("/mock-thumbnail/{document_id}")
    }

    async fn download(&self, document_id: &str, file_name: &str, dest_dir: &Path) -> Result<PathBuf, ApiError> {
        self.pause().await;
        let io_err = |e: std::io::Error| ApiError::transport(format!("Cannot save download: {e}"));
        tokio::fs::create_dir_all(dest_dir).await.map_err(io_err)?;
        let name = Path::new(file_name)
            .file_name()
            .map_or_else(|| document_id.to_string(), |n| n.to_string_lossy().to_string());
        let target = dest_dir.join(name);
        tokio::fs::write(&target, format!("mock download of {file_name} ({document_id})\n"))
            .await
            .map_err(io_err)?;
        info!(document_id, target = %target.display(), "mock download written");
        Ok(target)
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.pause().await;
        Ok(HealthStatus { status: "ok (mock)".to_string(), timestamp: Utc::now().to_rfc3339() })
    }
}
