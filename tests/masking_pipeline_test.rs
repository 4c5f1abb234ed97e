//! Integration tests for the text masking engine and the detection workflow

use async_trait::async_trait;
use docmask::detection::{ExternalPiiDetector, PatternRegistry};
use docmask::document::DocumentFormat;
use docmask::domain::{ExternalDetection, ExternalDetectionError, PiiCategory};
use docmask::pipeline::{DetectionWorkflow, MaskingEngine};
use docmask::store::{JsonlResultStore, NullResultStore};
use std::fs::File;
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

struct StubDetector(Result<ExternalDetection, ExternalDetectionError>);

#[async_trait]
impl ExternalPiiDetector for StubDetector {
    async fn detect(
        &self,
        _text: &str,
        _directive: &str,
    ) -> Result<ExternalDetection, ExternalDetectionError> {
        self.0.clone()
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn registry() -> Arc<PatternRegistry> {
    Arc::new(PatternRegistry::default_patterns().unwrap())
}

fn engine_with(result: Result<ExternalDetection, ExternalDetectionError>) -> MaskingEngine {
    MaskingEngine::new(registry(), Arc::new(StubDetector(result)))
}

fn detection(names: &[&str], additional: &[(&str, &[&str])]) -> ExternalDetection {
    let mut detection = ExternalDetection::default();
    if !names.is_empty() {
        detection.standard_personal_info.insert(
            "names".to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
    }
    for (label, values) in additional {
        detection.additional_requested_info.insert(
            label.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
    }
    detection
}

fn write_docx(path: &std::path::Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut zip = ZipWriter::new(File::create(path).unwrap());
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

#[tokio::test]
async fn test_pattern_and_external_literals_combined() {
    let engine = engine_with(Ok(detection(&["김영희"], &[("부서명", &["전략기획팀"])])));

    let masked = engine
        .mask_text("김영희(전략기획팀) 연락처 010-9876-5432", "부서명")
        .await;

    assert_eq!(masked.text, "김**(****) 연락처 010-****-****");
    assert!(!masked.external.is_failed());
}

#[tokio::test]
async fn test_external_failure_degrades_to_patterns() {
    let engine = engine_with(Err(ExternalDetectionError::InvalidResponse(
        "not json".to_string(),
    )));

    let masked = engine
        .mask_text("홍길동 test@example.com", "")
        .await;

    assert_eq!(masked.text, "홍길동 ******@example.com");
    assert!(masked.external.is_failed());
}

#[tokio::test]
async fn test_external_repeats_of_pattern_matches_masked_once() {
    let mut reported = ExternalDetection::default();
    reported
        .standard_personal_info
        .insert("phone".to_string(), vec!["010-1234-5678".to_string()]);
    reported
        .standard_personal_info
        .insert("email".to_string(), vec!["test@example.com".to_string()]);
    let engine = engine_with(Ok(reported));

    let masked = engine
        .mask_text(
            "제 전화번호는 010-1234-5678 이고 이메일은 test@example.com 입니다.",
            "",
        )
        .await;

    assert_eq!(
        masked.text,
        "제 전화번호는 010-****-**** 이고 이메일은 ******@example.com 입니다."
    );
    assert_eq!(masked.targets.len(), 2);
    assert!(masked
        .targets
        .iter()
        .any(|t| t.literal == "010-1234-5678" && t.category == PiiCategory::Phone));
    assert!(masked
        .targets
        .iter()
        .any(|t| t.literal == "test@example.com" && t.category == PiiCategory::Email));
}

#[tokio::test]
async fn test_duplicate_and_redacted_literals_ignored() {
    let engine = engine_with(Ok(detection(&["이순신", " 이순신 ", "***", ""], &[])));

    let masked = engine.mask_text("이순신 장군, 이순신", "").await;

    assert_eq!(masked.text, "이** 장군, 이**");
    assert_eq!(masked.targets.len(), 1);
}

#[tokio::test]
async fn test_overlapping_literals_longest_wins() {
    let engine = engine_with(Ok(detection(
        &[],
        &[("project", &["알파", "알파프로젝트"])],
    )));

    let masked = engine.mask_text("알파프로젝트와 알파", "project").await;

    assert_eq!(masked.text, "****와 ****");
}

#[tokio::test]
async fn test_detection_workflow_persists_record() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("report.docx");
    write_docx(&input, &["담당 홍길동", "전화 010-1234-5678"]);

    let store_path = dir.path().join("data/detections.jsonl");
    let store = Arc::new(JsonlResultStore::new(&store_path).unwrap());

    let engine = Arc::new(engine_with(Err(ExternalDetectionError::Timeout(30))));
    let workflow = DetectionWorkflow::new(engine, store, false);

    let bundle = workflow
        .detect_document(&input, DocumentFormat::Word, "")
        .await
        .unwrap();

    assert_eq!(
        bundle.pattern_detection_results.get(&PiiCategory::Phone).unwrap(),
        &["010-1234-5678".to_string()]
    );
    assert!(bundle.external_detection_results.is_failed());

    let stored = std::fs::read_to_string(&store_path).unwrap();
    let lines: Vec<&str> = stored.lines().collect();
    assert_eq!(lines.len(), 1);

    let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["pattern_detection_results"]["phone"][0], "010-1234-5678");
    assert!(record["external_detection_results"]["error"]
        .as_str()
        .unwrap()
        .contains("30s"));
    assert!(record.get("raw_content").is_none());
}

#[tokio::test]
async fn test_detection_workflow_missing_file() {
    let engine = Arc::new(MaskingEngine::pattern_only(registry()));
    let workflow = DetectionWorkflow::new(engine, Arc::new(NullResultStore), true);

    let result = workflow
        .detect_document(std::path::Path::new("missing.docx"), DocumentFormat::Word, "")
        .await;

    assert!(result.is_err());
}
