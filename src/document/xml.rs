//! WordprocessingML text runs
//!
//! Only the character data of `w:t` and `w:delText` elements is touched;
//! every other event is written back exactly as read.

use crate::domain::{DocmaskError, Result};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::Writer;

/// WordprocessingML main namespace
pub const WORDPROCESSING_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Text content of one document part
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PartText {
    /// Character data of every `w:t` and `w:delText`, in document order
    pub runs: Vec<String>,
    /// Paragraph texts in document order (`w:tab` as tab, `w:br`/`w:cr` as newline)
    ///
    /// Tracked deletions are not part of the paragraph text.
    pub paragraphs: Vec<String>,
    /// Deleted text of tracked changes, one entry per `w:delText`
    pub deleted: Vec<String>,
    /// Indices into `runs` that are masked together: the live runs of one
    /// paragraph, or a single deleted or stray run
    pub groups: Vec<Vec<usize>>,
}

impl PartText {
    /// Paragraphs joined by newlines
    pub fn joined(&self) -> String {
        self.paragraphs.join("\n")
    }

    /// Paragraphs followed by deleted text, the input for target resolution
    pub fn searchable(&self) -> String {
        if self.deleted.is_empty() {
            return self.joined();
        }
        let mut text = self.joined();
        for deleted in &self.deleted {
            text.push('\n');
            text.push_str(deleted);
        }
        text
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum WordElement {
    Text,
    DeletedText,
    Paragraph,
    Tab,
    Break,
    Other,
}

impl WordElement {
    fn holds_text(self) -> bool {
        matches!(self, Self::Text | Self::DeletedText)
    }
}

fn classify(ns: &ResolveResult<'_>, local: &[u8]) -> WordElement {
    match ns {
        ResolveResult::Bound(Namespace(uri)) if *uri == WORDPROCESSING_NS => match local {
            b"t" => WordElement::Text,
            b"delText" => WordElement::DeletedText,
            b"p" => WordElement::Paragraph,
            b"tab" => WordElement::Tab,
            b"br" | b"cr" => WordElement::Break,
            _ => WordElement::Other,
        },
        _ => WordElement::Other,
    }
}

fn xml_error(part: &str, message: impl ToString) -> DocmaskError {
    DocmaskError::Xml {
        part: part.to_string(),
        message: message.to_string(),
    }
}

/// Tracks element nesting so truncated documents are rejected
struct Balance {
    depth: usize,
    seen_root: bool,
}

impl Balance {
    fn new() -> Self {
        Self {
            depth: 0,
            seen_root: false,
        }
    }

    fn open(&mut self) {
        self.depth += 1;
        self.seen_root = true;
    }

    fn empty(&mut self) {
        self.seen_root = true;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn finish(&self, part: &str) -> Result<()> {
        if !self.seen_root {
            return Err(xml_error(part, "no root element"));
        }
        if self.depth != 0 {
            return Err(xml_error(part, "unexpected end of document"));
        }
        Ok(())
    }
}

/// Paragraph under construction
#[derive(Default)]
struct OpenParagraph {
    text: String,
    runs: Vec<usize>,
}

/// Collect run and paragraph text of a part
///
/// # Errors
///
/// [`DocmaskError::Xml`] if the part is not well-formed.
pub fn collect_text(xml: &[u8], part: &str) -> Result<PartText> {
    let mut reader = NsReader::from_reader(xml);
    let mut buf = Vec::new();
    let mut balance = Balance::new();
    let mut current = WordElement::Other;
    let mut open_paragraphs: Vec<OpenParagraph> = Vec::new();
    let mut text = PartText::default();

    loop {
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| xml_error(part, e))?;

        let value = match event {
            Event::Start(ref e) => {
                balance.open();
                match classify(&ns, e.local_name().as_ref()) {
                    element if element.holds_text() => current = element,
                    WordElement::Paragraph => open_paragraphs.push(OpenParagraph::default()),
                    WordElement::Tab => push_paragraph_text(&mut open_paragraphs, "\t"),
                    WordElement::Break => push_paragraph_text(&mut open_paragraphs, "\n"),
                    _ => {}
                }
                None
            }
            Event::Empty(ref e) => {
                balance.empty();
                match classify(&ns, e.local_name().as_ref()) {
                    WordElement::Paragraph => text.paragraphs.push(String::new()),
                    WordElement::Tab => push_paragraph_text(&mut open_paragraphs, "\t"),
                    WordElement::Break => push_paragraph_text(&mut open_paragraphs, "\n"),
                    _ => {}
                }
                None
            }
            Event::End(ref e) => {
                balance.close();
                match classify(&ns, e.local_name().as_ref()) {
                    element if element.holds_text() => current = WordElement::Other,
                    WordElement::Paragraph => {
                        if let Some(paragraph) = open_paragraphs.pop() {
                            text.paragraphs.push(paragraph.text);
                            if !paragraph.runs.is_empty() {
                                text.groups.push(paragraph.runs);
                            }
                        }
                    }
                    _ => {}
                }
                None
            }
            Event::Text(ref e) if current.holds_text() => {
                Some(e.unescape().map_err(|e| xml_error(part, e))?.into_owned())
            }
            Event::CData(ref e) if current.holds_text() => {
                Some(String::from_utf8_lossy(e.as_ref()).into_owned())
            }
            Event::Eof => break,
            _ => None,
        };

        if let Some(value) = value {
            let index = text.runs.len();
            match (current, open_paragraphs.last_mut()) {
                (WordElement::Text, Some(paragraph)) => {
                    paragraph.text.push_str(&value);
                    paragraph.runs.push(index);
                }
                (WordElement::DeletedText, _) => {
                    text.deleted.push(value.clone());
                    text.groups.push(vec![index]);
                }
                _ => text.groups.push(vec![index]),
            }
            text.runs.push(value);
        }
        buf.clear();
    }

    balance.finish(part)?;
    Ok(text)
}

fn push_paragraph_text(open_paragraphs: &mut [OpenParagraph], value: &str) {
    if let Some(current) = open_paragraphs.last_mut() {
        current.text.push_str(value);
    }
}

/// Masked value for every run of `text`, index-aligned with `text.runs`
///
/// Each run is masked on its own first. The live runs of a paragraph are
/// then masked as one string so a value split over several runs (a
/// formatting change in the middle of a phone number) is still caught;
/// the change is written back into the runs it came from.
pub fn mask_runs<F>(text: &PartText, mut mask: F) -> Vec<String>
where
    F: FnMut(&str) -> String,
{
    let mut masked: Vec<String> = text
        .runs
        .iter()
        .map(|run| if run.is_empty() { String::new() } else { mask(run) })
        .collect();

    for group in text.groups.iter().filter(|g| g.len() > 1) {
        let pieces: Vec<&str> = group.iter().map(|&i| masked[i].as_str()).collect();
        let joined = pieces.concat();
        let whole = mask(&joined);
        if whole == joined {
            continue;
        }
        let spread = spread_over_runs(&pieces, &joined, &whole);
        for (&index, value) in group.iter().zip(spread) {
            masked[index] = value;
        }
    }

    masked
}

/// Fit `whole`, a rewrite of `joined` (the concatenated `pieces`), back
/// onto the pieces
///
/// Text before and after the changed region stays in its run; the changed
/// region goes to the run it starts in and is removed from the others.
fn spread_over_runs(pieces: &[&str], joined: &str, whole: &str) -> Vec<String> {
    let prefix = common_prefix(joined, whole);
    let suffix = common_suffix(&joined[prefix..], &whole[prefix..]);
    let end = joined.len() - suffix;
    let replacement = &whole[prefix..whole.len() - suffix];

    let mut spread = Vec::with_capacity(pieces.len());
    let mut offset = 0;
    let mut placed = false;
    for (i, piece) in pieces.iter().enumerate() {
        let start = offset;
        let stop = offset + piece.len();
        offset = stop;

        let mut value = String::new();
        if start < prefix {
            value.push_str(&joined[start..stop.min(prefix)]);
        }
        if !placed && (prefix < stop || i + 1 == pieces.len()) {
            value.push_str(replacement);
            placed = true;
        }
        if stop > end {
            value.push_str(&joined[start.max(end)..stop]);
        }
        spread.push(value);
    }
    spread
}

/// Byte length of the longest common prefix, on a char boundary
fn common_prefix(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or(a.len().min(b.len()), |((i, _), _)| i)
}

/// Byte length of the longest common suffix, on a char boundary
fn common_suffix(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len_utf8())
        .sum()
}

/// Mask every non-empty text run with `mask`, paragraph-aware
///
/// Returns the new part bytes and the number of runs whose text changed.
///
/// # Errors
///
/// [`DocmaskError::Xml`] if the part is not well-formed.
pub fn rewrite_text_runs<F>(xml: &[u8], part: &str, mask: F) -> Result<(Vec<u8>, usize)>
where
    F: FnMut(&str) -> String,
{
    let text = collect_text(xml, part)?;
    let masked = mask_runs(&text, mask);
    replace_runs(xml, part, &masked)
}

/// Write `masked[i]` in place of the i-th text run
///
/// `masked` must come from [`mask_runs`] over the same part. Returns the
/// new part bytes and the number of runs whose text changed.
///
/// # Errors
///
/// [`DocmaskError::Xml`] if the part is not well-formed or does not have
/// as many runs as `masked`.
pub fn replace_runs(xml: &[u8], part: &str, masked: &[String]) -> Result<(Vec<u8>, usize)> {
    let mut reader = NsReader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut buf = Vec::new();
    let mut balance = Balance::new();
    let mut in_text = false;
    let mut index = 0;
    let mut changed = 0;

    loop {
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| xml_error(part, e))?;

        let original = match event {
            Event::Eof => break,
            Event::Start(ref e) => {
                balance.open();
                if classify(&ns, e.local_name().as_ref()).holds_text() {
                    in_text = true;
                }
                None
            }
            Event::Empty(_) => {
                balance.empty();
                None
            }
            Event::End(ref e) => {
                balance.close();
                if classify(&ns, e.local_name().as_ref()).holds_text() {
                    in_text = false;
                }
                None
            }
            Event::Text(ref e) if in_text => Some(e.unescape().map_err(|e| xml_error(part, e))?.into_owned()),
            Event::CData(ref e) if in_text => Some(String::from_utf8_lossy(e.as_ref()).into_owned()),
            _ => None,
        };

        if let Some(original) = original {
            let replacement = masked
                .get(index)
                .ok_or_else(|| xml_error(part, "run count changed while masking"))?;
            index += 1;
            if *replacement != original {
                changed += 1;
                let escaped = partial_escape(replacement.as_str());
                writer
                    .write_event(Event::Text(BytesText::from_escaped(escaped)))
                    .map_err(|e| xml_error(part, e))?;
                buf.clear();
                continue;
            }
        }

        writer
            .write_event(event)
            .map_err(|e| xml_error(part, e))?;
        buf.clear();
    }

    balance.finish(part)?;
    if index != masked.len() {
        return Err(xml_error(part, "run count changed while masking"));
    }
    Ok((writer.into_inner(), changed))
}
