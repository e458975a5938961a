//! Input Normalizer: reduces a submission to one plain-text string.
//!
//! An uploaded file always wins over pasted text. Files are dispatched on their
//! declared MIME type; nothing is sniffed from the bytes.

use std::error::Error as StdError;
use std::fmt;
use std::io::{Cursor, Read};

use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;
use zip::ZipArchive;

type Cause = Box<dyn StdError + Send + Sync + 'static>;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MIME: &str = "text/plain";

const DOCX_BODY_PART: &str = "word/document.xml";
const WML_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Ceiling on the decompressed size of `word/document.xml`.
pub const MAX_DOCX_BODY_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Please paste your CV text or upload a file")]
    NoContent,

    #[error("Unsupported file type '{0}'. Upload a PDF, DOCX or TXT file")]
    UnsupportedFileType(String),

    /// `cause` is kept for logs only; it never reaches the response body.
    #[error("Could not read the uploaded {format} file")]
    ExtractionFailed {
        format: DocumentFormat,
        #[source]
        cause: Cause,
    },

    #[error("The submitted CV does not contain any readable text")]
    EmptyContent,
}

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Matches on the MIME essence, ignoring parameters and ASCII case.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(PDF_MIME) {
            Some(Self::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MIME) {
            Some(Self::Docx)
        } else if essence.eq_ignore_ascii_case(TEXT_MIME) {
            Some(Self::PlainText)
        } else {
            None
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::PlainText => "text",
        })
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Bytes,
    pub declared_mime_type: String,
    pub file_name: String,
}

impl UploadedFile {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// A CV submission as received from the form. Both halves may be present.
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    pub raw_text: Option<String>,
    pub uploaded_file: Option<UploadedFile>,
}

#[cfg(test)]
impl SubmissionInput {
    pub fn text(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: Some(raw_text.into()),
            uploaded_file: None,
        }
    }

    pub fn file(file: UploadedFile) -> Self {
        Self {
            raw_text: None,
            uploaded_file: Some(file),
        }
    }
}

/// Normalized CV text. Only [`normalize`] constructs it, so it is never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

/// Produces the plain text to review. The file takes precedence over pasted text.
pub fn normalize(input: SubmissionInput) -> Result<ExtractedText, InputError> {
    let text = match input.uploaded_file {
        Some(file) => extract_file(&file)?,
        None => match input.raw_text {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(InputError::NoContent),
        },
    };

    if text.trim().is_empty() {
        return Err(InputError::EmptyContent);
    }

    Ok(ExtractedText(text))
}

fn extract_file(file: &UploadedFile) -> Result<String, InputError> {
    let format = DocumentFormat::from_mime(&file.declared_mime_type)
        .ok_or_else(|| InputError::UnsupportedFileType(file.declared_mime_type.clone()))?;

    let extracted = match format {
        DocumentFormat::Pdf => extract_pdf(&file.bytes),
        DocumentFormat::Docx => extract_docx(&file.bytes),
        DocumentFormat::PlainText => String::from_utf8(file.bytes.to_vec()).map_err(Cause::from),
    };

    extracted.map_err(|cause| InputError::ExtractionFailed { format, cause })
}

/// All text in the PDF, pages in document order.
fn extract_pdf(bytes: &[u8]) -> Result<String, Cause> {
    decode_guarded(|| pdf_extract::extract_text_from_mem(bytes))
}

/// Runs a decoder that may panic on malformed input, turning the panic into an
/// extraction error so the upload is rejected as bad input.
fn decode_guarded<F, E>(decode: F) -> Result<String, Cause>
where
    F: FnOnce() -> Result<String, E> + std::panic::UnwindSafe,
    E: fmt::Display,
{
    match std::panic::catch_unwind(decode) {
        Ok(result) => result.map_err(|e| Cause::from(e.to_string())),
        Err(_) => Err("decoder panicked on malformed input".into()),
    }
}

/// Raw paragraph text from a DOCX package, formatting discarded.
fn extract_docx(bytes: &[u8]) -> Result<String, Cause> {
    let xml = read_docx_body(bytes, MAX_DOCX_BODY_BYTES)?;
    docx_body_text(&xml)
}

/// Reads `word/document.xml`, refusing to inflate it past `limit` bytes.
fn read_docx_body(bytes: &[u8], limit: u64) -> Result<Vec<u8>, Cause> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let entry = archive.by_name(DOCX_BODY_PART)?;
    if entry.size() > limit {
        return Err(format!("{DOCX_BODY_PART} inflates to {} bytes", entry.size()).into());
    }

    // The declared size is untrusted; cap the actual read as well.
    let mut xml = Vec::new();
    entry.take(limit + 1).read_to_end(&mut xml)?;
    if xml.len() as u64 > limit {
        return Err(format!("{DOCX_BODY_PART} inflates past {limit} bytes").into());
    }
    Ok(xml)
}

/// Walks WordprocessingML by namespace, so any prefix bound to it works.
fn docx_body_text(xml: &[u8]) -> Result<String, Cause> {
    let mut reader = NsReader::from_reader(xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        let (ns, event) = reader.read_resolved_event_into(&mut buf)?;
        let in_wml = matches!(ns, ResolveResult::Bound(Namespace(n)) if n == WML_NS);

        match event {
            Event::Start(e) if in_wml && e.local_name().as_ref() == b"t" => in_text_run = true,
            Event::End(e) if in_wml => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) if in_wml => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text_run => text.push_str(&e.unescape()?),
            Event::CData(e) if in_text_run => {
                text.push_str(&String::from_utf8_lossy(e.into_inner().as_ref()))
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// One-page PDF drawing `text` in Helvetica.
    pub fn pdf_with_text(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
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

    /// Minimal DOCX package whose body has one paragraph per entry.
    pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
            .collect();
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        );
        docx_with_body_xml(&document)
    }

    pub fn docx_with_body_xml(document: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = FileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer
            .write_all(b"<?xml version=\"1.0\"?><Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"/>")
            .unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }
}
