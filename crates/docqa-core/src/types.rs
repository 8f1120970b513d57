//! Request/response contracts shared by the transport, the controllers and the view.
//!
//! Field names follow the backend's JSON: search, upload and follow-up payloads are
//! camelCase, the direct-answer (`/ask`) payloads are snake_case.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub type DocumentId = String;

/// Vision-language model used by the backend to answer or rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VlmModel {
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "qwen-vl")]
    QwenVl,
    #[serde(rename = "intern-vl")]
    InternVl,
}

impl VlmModel {
    pub const ALL: [VlmModel; 3] = [VlmModel::Gpt4o, VlmModel::QwenVl, VlmModel::InternVl];

    pub fn as_str(self) -> &'static str {
        match self {
            VlmModel::Gpt4o => "gpt-4o",
            VlmModel::QwenVl => "qwen-vl",
            VlmModel::InternVl => "intern-vl",
        }
    }
}

impl fmt::Display for VlmModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VlmModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VlmModel::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown model '{s}' (expected gpt-4o, qwen-vl or intern-vl)"))
    }
}

/// Retrieval strategy requested from the backend. The client only issues `Vector` today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetrievalStrategy {
    #[default]
    Vector,
    Hybrid,
    TwoStage,
}

impl fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RetrievalStrategy::Vector => "vector",
            RetrievalStrategy::Hybrid => "hybrid",
            RetrievalStrategy::TwoStage => "two-stage",
        })
    }
}

/// Document classification as labelled by the backend. Unknown labels map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileType {
    Cad,
    Pdf,
    Flowchart,
    Bom,
    Architecture,
    EngineeringDrawing,
    Other,
}

impl FileType {
    pub fn label(self) -> &'static str {
        match self {
            FileType::Cad => "CAD",
            FileType::Pdf => "PDF",
            FileType::Flowchart => "流程图",
            FileType::Bom => "BOM",
            FileType::Architecture => "架构图",
            FileType::EngineeringDrawing => "工程图纸",
            FileType::Other => "其他",
        }
    }
}

impl From<String> for FileType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "CAD" => FileType::Cad,
            "PDF" => FileType::Pdf,
            "流程图" => FileType::Flowchart,
            "BOM" => FileType::Bom,
            "架构图" => FileType::Architecture,
            "工程图纸" => FileType::EngineeringDrawing,
            _ => FileType::Other,
        }
    }
}

impl From<FileType> for String {
    fn from(value: FileType) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailType {
    Cad,
    Pdf,
    #[default]
    Image,
}

/// Display-only similarity on a 0–100 integer scale, as attached to search results.
///
/// Not interchangeable with [`UnitScore`]; convert with [`Percent::from_unit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Percent(u8);

impl Percent {
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_unit(score: UnitScore) -> Self {
        Self((score.value() * 100.0).round().clamp(0.0, 100.0) as u8)
    }
}

impl<'de> Deserialize<'de> for Percent {
    // The backend occasionally sends fractional percentages; round them.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Ok(Self(raw.round().clamp(0.0, 100.0) as u8))
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A score on the 0–1 scale (QA source similarity, answer confidence).
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
pub struct UnitScore(f64);

impl UnitScore {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for UnitScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::new(f64::deserialize(deserializer)?))
    }
}

/// Label/value pair extracted from a document by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredData {
    pub label: String,
    pub value: String,
}

impl StructuredData {
    pub fn is_displayable(&self) -> bool {
        !self.label.trim().is_empty() && !self.value.trim().is_empty()
    }
}

/// One ranked hit from `/search`. Never mutated after the response is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: DocumentId,
    pub file_name: String,
    pub file_path: String,
    pub file_type: FileType,
    pub similarity: Percent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub snippet: String,
    /// Assigned by the client from display position; any backend value is overwritten.
    #[serde(default)]
    pub citation_number: u32,
    #[serde(default)]
    pub thumbnail_type: ThumbnailType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub structured_data: Vec<StructuredData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_types: Option<Vec<FileType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub model: VlmModel,
    pub strategy: RetrievalStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    /// Server-side threshold on the 0–1 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub total_count: usize,
    /// Milliseconds spent by the backend.
    #[serde(default)]
    pub query_time: f64,
    pub model: VlmModel,
    pub strategy: RetrievalStrategy,
}

/// A local file selected for upload. Only its size and name are inspected before sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

impl UploadFile {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, file_name, size }
    }

    /// Stat a file on disk.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(Self::new(path, meta.len()))
    }

    /// Lower-cased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file: UploadFile,
    pub metadata: Option<UploadMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file_id: DocumentId,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpRequest {
    pub document_id: DocumentId,
    pub question: String,
    pub model: VlmModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpResponse {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<u32>,
    #[serde(default)]
    pub confidence: UnitScore,
}

/// One exchange in a follow-up dialogue about a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaHistoryItem {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    ExactQuery,
    FilterQuery,
    GeneralQuery,
}

impl QueryType {
    pub fn label(self) -> &'static str {
        match self {
            QueryType::ExactQuery => "精确查询",
            QueryType::FilterQuery => "过滤查询",
            QueryType::GeneralQuery => "通用查询",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

/// Citation-bearing source attached to a direct answer. Its citation number is index + 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaSource {
    pub file_id: DocumentId,
    pub file_name: String,
    #[serde(default)]
    pub file_type: String,
    pub similarity: UnitScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_info: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<QaSource>,
    #[serde(default)]
    pub confidence: UnitScore,
    pub query_type: QueryType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}
