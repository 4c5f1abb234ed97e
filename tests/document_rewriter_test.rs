//! Integration tests for in-place masking of Word packages
//!
//! Test documents are assembled in each test with the zip crate so every
//! entry and its compression method is known.

use async_trait::async_trait;
use docmask::config::MaskingConfig;
use docmask::detection::{ExternalPiiDetector, PatternRegistry};
use docmask::document::DocumentRewriter;
use docmask::domain::{DocmaskError, ExternalDetection, ExternalDetectionError};
use docmask::pipeline::MaskingEngine;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const IMAGE_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3, 4];

fn document_xml(paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            format!(
                r#"<w:p><w:pPr><w:jc w:val="left"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
    )
}

fn comments_xml(text: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:comments xmlns:w="{W_NS}"><w:comment w:id="0" w:author="reviewer"><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:comment></w:comments>"#
    )
}

fn write_docx(path: &Path, entries: &[(&str, &[u8], CompressionMethod)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, data, method) in entries {
        let options = SimpleFileOptions::default().compression_method(*method);
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

fn sample_docx(dir: &Path, document: &str, comments: Option<&str>) -> PathBuf {
    let path = dir.join("계약서.docx");
    let content_types = br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#;
    let mut entries: Vec<(&str, &[u8], CompressionMethod)> = vec![
        ("[Content_Types].xml", content_types, CompressionMethod::Deflated),
        ("word/document.xml", document.as_bytes(), CompressionMethod::Deflated),
        ("word/media/image1.png", IMAGE_BYTES, CompressionMethod::Stored),
    ];
    if let Some(comments) = comments {
        entries.push(("word/comments.xml", comments.as_bytes(), CompressionMethod::Deflated));
    }
    write_docx(&path, &entries);
    path
}

fn read_entry(path: &Path, name: &str) -> Option<(Vec<u8>, CompressionMethod)> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).ok()?;
    let method = entry.compression();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    Some((data, method))
}

fn read_text(path: &Path, name: &str) -> String {
    String::from_utf8(read_entry(path, name).unwrap().0).unwrap()
}

fn entry_names(path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

fn rewriter(external: Option<Arc<dyn ExternalPiiDetector>>) -> DocumentRewriter {
    let registry = Arc::new(PatternRegistry::default_patterns().unwrap());
    let engine = match external {
        Some(external) => MaskingEngine::new(registry, external),
        None => MaskingEngine::pattern_only(registry),
    };
    DocumentRewriter::new(Arc::new(engine), &MaskingConfig::default())
}

struct FixedDetector(ExternalDetection);

#[async_trait]
impl ExternalPiiDetector for FixedDetector {
    async fn detect(
        &self,
        _text: &str,
        _directive: &str,
    ) -> Result<ExternalDetection, ExternalDetectionError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[tokio::test]
async fn test_masks_runs_and_preserves_formatting() {
    let dir = TempDir::new().unwrap();
    let input = sample_docx(
        dir.path(),
        &document_xml(&["연락처: 010-1234-5678", "메일 test@example.com 입니다"]),
        None,
    );

    let outcome = rewriter(None).mask_document(&input, "").await.unwrap();

    assert_eq!(outcome.output, dir.path().join("계약서(masked).docx"));
    assert_eq!(outcome.runs_masked(), 2);

    let masked = read_text(&outcome.output, "word/document.xml");
    assert_eq!(
        masked,
        document_xml(&["연락처: 010-****-****", "메일 ******@example.com 입니다"])
    );
}

#[tokio::test]
async fn test_other_entries_copied_unchanged() {
    let dir = TempDir::new().unwrap();
    let input = sample_docx(dir.path(), &document_xml(&["010-1234-5678"]), None);

    let outcome = rewriter(None).mask_document(&input, "").await.unwrap();

    assert_eq!(entry_names(&outcome.output), entry_names(&input));

    let (image, method) = read_entry(&outcome.output, "word/media/image1.png").unwrap();
    assert_eq!(image, IMAGE_BYTES);
    assert_eq!(method, CompressionMethod::Stored);

    assert_eq!(
        read_entry(&outcome.output, "[Content_Types].xml"),
        read_entry(&input, "[Content_Types].xml")
    );
}

#[tokio::test]
async fn test_input_left_untouched() {
    let dir = TempDir::new().unwrap();
    let input = sample_docx(dir.path(), &document_xml(&["010-1234-5678"]), None);
    let before = std::fs::read(&input).unwrap();

    rewriter(None).mask_document(&input, "").await.unwrap();

    assert_eq!(std::fs::read(&input).unwrap(), before);
}

#[tokio::test]
async fn test_comments_are_masked() {
    let dir = TempDir::new().unwrap();
    let input = sample_docx(
        dir.path(),
        &document_xml(&["본문"]),
        Some(&comments_xml("주민번호 990101-1234567")),
    );

    let outcome = rewriter(None).mask_document(&input, "").await.unwrap();

    assert_eq!(outcome.parts.len(), 2);
    assert_eq!(
        read_text(&outcome.output, "word/comments.xml"),
        comments_xml("주민번호 ******-*******")
    );
}

#[tokio::test]
async fn test_external_literals_masked() {
    let dir = TempDir::new().unwrap();
    let input = sample_docx(
        dir.path(),
        &document_xml(&["담당자 홍길동", "알파프로젝트 일정"]),
        None,
    );

    let mut detection = ExternalDetection::default();
    detection
        .standard_personal_info
        .insert("names".to_string(), vec!["홍길동".to_string()]);
    detection.additional_requested_info = BTreeMap::from([(
        "project names".to_string(),
        vec!["알파프로젝트".to_string()],
    )]);

    let outcome = rewriter(Some(Arc::new(FixedDetector(detection))))
        .mask_document(&input, "project names")
        .await
        .unwrap();

    assert!(!outcome.external_degraded());
    assert_eq!(
        read_text(&outcome.output, "word/document.xml"),
        document_xml(&["담당자 홍**", "**** 일정"])
    );
}

#[tokio::test]
async fn test_missing_document_part() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("empty.docx");
    write_docx(
        &input,
        &[("word/media/image1.png", IMAGE_BYTES, CompressionMethod::Stored)],
    );

    let err = rewriter(None).mask_document(&input, "").await.unwrap_err();

    assert!(matches!(err, DocmaskError::MissingDocumentPart(ref part) if part == "word/document.xml"));
    assert!(!dir.path().join("empty(masked).docx").exists());
}

#[tokio::test]
async fn test_malformed_xml_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let input = sample_docx(
        dir.path(),
        &format!(r#"<w:document xmlns:w="{W_NS}"><w:body><w:p><w:r><w:t>010-1234-5678"#),
        None,
    );

    let err = rewriter(None).mask_document(&input, "").await.unwrap_err();

    assert!(matches!(err, DocmaskError::Xml { .. }));
    assert!(!dir.path().join("계약서(masked).docx").exists());
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_non_word_input_rejected() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("sheet.xlsx");
    std::fs::write(&input, b"not used").unwrap();

    let err = rewriter(None).mask_document(&input, "").await.unwrap_err();
    assert!(matches!(err, DocmaskError::UnsupportedFormat(_)));
}

#[tokio::test]
async fn test_masking_twice_is_stable() {
    let dir = TempDir::new().unwrap();
    let input = sample_docx(
        dir.path(),
        &document_xml(&["카드 1234-5678-9012-3456", "주소 서울시 강남구 역삼동"]),
        None,
    );

    let rewriter = rewriter(None);
    let first = rewriter.mask_document(&input, "").await.unwrap();
    let second = rewriter.mask_document(&first.output, "").await.unwrap();

    assert_eq!(second.runs_masked(), 0);
    assert_eq!(
        read_text(&first.output, "word/document.xml"),
        read_text(&second.output, "word/document.xml")
    );
}

#[tokio::test]
async fn test_batch_stops_on_shutdown() {
    use docmask::audit::AuditLogger;
    use docmask::pipeline::MaskingWorkflow;

    let dir = TempDir::new().unwrap();
    let input = sample_docx(dir.path(), &document_xml(&["010-1234-5678"]), None);
    let audit = AuditLogger::new(dir.path().join("masking.log"), false, false).unwrap();
    let workflow = MaskingWorkflow::new(rewriter(None), audit);

    let (_tx, shutdown) = watch::channel(true);
    let report = workflow
        .mask_documents(&[input.clone()], "", &shutdown)
        .await;

    assert!(report.interrupted());
    assert!(report.documents.is_empty());
    assert_eq!(report.skipped, vec![input]);
    assert!(!dir.path().join("계약서(masked).docx").exists());
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    use docmask::audit::AuditLogger;
    use docmask::pipeline::MaskingWorkflow;

    let dir = TempDir::new().unwrap();
    let good = sample_docx(dir.path(), &document_xml(&["010-1234-5678"]), None);
    let missing = dir.path().join("missing.docx");

    let audit_path = dir.path().join("audit/masking.log");
    let audit = AuditLogger::new(audit_path.clone(), true, true).unwrap();
    let workflow = MaskingWorkflow::new(rewriter(None), audit);

    let (_tx, shutdown) = watch::channel(false);
    let report = workflow
        .mask_documents(&[missing.clone(), good.clone()], "", &shutdown)
        .await;

    assert!(!report.interrupted());
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.documents[0].input, missing);
    assert!(report.documents[0].result.is_err());
    assert!(report.documents[1].result.is_ok());

    let audit_log = std::fs::read_to_string(&audit_path).unwrap();
    assert_eq!(audit_log.lines().count(), 1);
    assert!(!audit_log.contains("010-1234-5678"));
}

/// Single stored `word/document.xml` whose central directory entry claims
/// a ZIP64 uncompressed size far beyond the real content
fn write_inflated_size_docx(path: &Path, document: &[u8]) {
    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file("word/document.xml", stored).unwrap();
        zip.write_all(document).unwrap();
        zip.finish().unwrap();
    }
    let crc = ZipArchive::new(std::io::Cursor::new(buffer.into_inner()))
        .unwrap()
        .by_index(0)
        .unwrap()
        .crc32();

    let name = b"word/document.xml";
    let size = document.len() as u32;
    let mut out = Vec::new();

    // local file header
    out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
    for field in [20u16, 0, 0, 0, 0x21] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&(name.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(document);

    // central directory
    let central_start = out.len() as u32;
    out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
    for field in [45u16, 45, 0, 0, 0, 0x21] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    for field in [name.len() as u16, 12, 0, 0, 0] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(&0x0001u16.to_le_bytes());
    out.extend_from_slice(&8u16.to_le_bytes());
    out.extend_from_slice(&0x0FFF_FFFF_FFFF_FFFFu64.to_le_bytes());
    let central_size = out.len() as u32 - central_start;

    // end of central directory
    out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    for field in [0u16, 0, 1, 1] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    out.extend_from_slice(&central_size.to_le_bytes());
    out.extend_from_slice(&central_start.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());

    std::fs::write(path, out).unwrap();
}

#[tokio::test]
async fn test_inflated_declared_size_rejected() {
    use docmask::document::{DocumentFormat, DocumentTextExtractor};

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bomb.docx");
    write_inflated_size_docx(&input, document_xml(&["010-1234-5678"]).as_bytes());

    let err = rewriter(None).mask_document(&input, "").await.unwrap_err();
    assert!(matches!(err, DocmaskError::Archive(_)));
    assert!(!dir.path().join("bomb(masked).docx").exists());

    let err = DocumentTextExtractor::extract(&input, DocumentFormat::Word).unwrap_err();
    assert!(matches!(err, DocmaskError::Archive(_)));
}

#[tokio::test]
async fn test_batch_continues_after_inflated_part() {
    use docmask::audit::AuditLogger;
    use docmask::pipeline::MaskingWorkflow;

    let dir = TempDir::new().unwrap();
    let bomb = dir.path().join("bomb.docx");
    write_inflated_size_docx(&bomb, document_xml(&["010-1234-5678"]).as_bytes());
    let good = sample_docx(dir.path(), &document_xml(&["010-1234-5678"]), None);

    let audit = AuditLogger::new(dir.path().join("masking.log"), false, false).unwrap();
    let workflow = MaskingWorkflow::new(rewriter(None), audit);

    let (_tx, shutdown) = watch::channel(false);
    let report = workflow.mask_documents(&[bomb, good], "", &shutdown).await;

    assert!(matches!(report.documents[0].result, Err(DocmaskError::Archive(_))));
    assert!(report.documents[1].result.is_ok());
}

#[tokio::test]
async fn test_split_runs_and_tracked_deletions_masked() {
    let dir = TempDir::new().unwrap();
    let paragraph = |runs: &str| format!("<w:p>{runs}</w:p>");
    let body = [
        paragraph(
            r#"<w:r><w:t xml:space="preserve">연락처 010-1234-</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>5678</w:t></w:r>"#,
        ),
        paragraph(
            r#"<w:r><w:t xml:space="preserve">담당 홍</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">길동 팀장</w:t></w:r>"#,
        ),
        paragraph(
            r#"<w:r><w:t>변경</w:t></w:r><w:del w:id="1" w:author="kim"><w:r><w:delText>010-9876-5432</w:delText></w:r></w:del>"#,
        ),
    ]
    .concat();
    let document = |body: &str| {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
        )
    };
    let input = sample_docx(dir.path(), &document(&body), None);

    let mut detection = ExternalDetection::default();
    detection
        .standard_personal_info
        .insert("names".to_string(), vec!["홍길동".to_string()]);
    let outcome = rewriter(Some(Arc::new(FixedDetector(detection))))
        .mask_document(&input, "")
        .await
        .unwrap();

    let expected = body
        .replace("연락처 010-1234-</w:t>", "연락처 010-****-****</w:t>")
        .replace("<w:t>5678</w:t>", "<w:t></w:t>")
        .replace("길동 팀장", "** 팀장")
        .replace("010-9876-5432", "010-****-****");
    assert_eq!(read_text(&outcome.output, "word/document.xml"), document(&expected));
    assert_eq!(outcome.runs_masked(), 4);
}
