//! PDF inspection for replacement files
//!
//! The controller only needs four facts about an uploaded PDF: whether it is
//! encrypted, which permissions it denies, how many pages it has and its
//! embedded title. [`PdfBackend`] abstracts where those come from;
//! [`LopdfBackend`] reads them with lopdf.

use lopdf::{Dictionary, Document, Object};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PdfInspectionError;

/// Permission bit granting print
pub const PERMISSION_PRINT: i64 = 4;
/// Permission bit granting modification
pub const PERMISSION_MODIFY: i64 = 8;
/// Permission bit granting copy/extract
pub const PERMISSION_COPY: i64 = 16;

/// Something the uploaded PDF denies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Restriction {
    PasswordProtected,
    PrintRestricted,
    CopyRestricted,
    ModifyRestricted,
}

impl Restriction {
    pub fn label(&self) -> &'static str {
        match self {
            Restriction::PasswordProtected => "Password Protected",
            Restriction::PrintRestricted => "Print Restricted",
            Restriction::CopyRestricted => "Copy/Extract Restricted",
            Restriction::ModifyRestricted => "Modification Restricted",
        }
    }
}

/// Label shown for a password-protected file that could not be opened
pub const UNREADABLE_PASSWORD_LABEL: &str = "Password Protected - Cannot preview";

/// An opened PDF
pub trait PdfSource {
    fn page_count(&self) -> u32;

    /// Embedded document title, if any
    fn title(&self) -> Option<String>;

    fn is_encrypted(&self) -> bool;

    /// Raw permission bitset, `None` when the document declares none
    fn permissions(&self) -> Result<Option<i64>, PdfInspectionError>;
}

/// Opens PDF bytes
pub trait PdfBackend {
    type Document: PdfSource;

    fn open(&self, bytes: &[u8]) -> Result<Self::Document, PdfInspectionError>;
}

/// What the inspection learned about a readable document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfInspection {
    pub encrypted: bool,
    pub restrictions: Vec<Restriction>,
    pub page_count: Option<u32>,
    pub title: Option<String>,
}

impl PdfInspection {
    pub fn restriction_labels(&self) -> Vec<String> {
        self.restrictions
            .iter()
            .map(|r| r.label().to_string())
            .collect()
    }
}

/// Three ways opening an uploaded file can go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionOutcome {
    /// Opened with no restrictions; metadata may be used
    Readable(PdfInspection),
    /// Opened, but encrypted or denying permissions; needs acknowledgement
    Restricted(PdfInspection),
    /// Could not be opened at all
    Unreadable { password_required: bool },
}

/// Restrictions implied by the encryption flag and permission bits, in
/// display order. A missing bit means the permission is denied.
pub fn restrictions_from(encrypted: bool, permissions: Option<i64>) -> Vec<Restriction> {
    let mut restrictions = Vec::new();
    if encrypted {
        restrictions.push(Restriction::PasswordProtected);
    }
    if let Some(bits) = permissions {
        if bits & PERMISSION_PRINT == 0 {
            restrictions.push(Restriction::PrintRestricted);
        }
        if bits & PERMISSION_COPY == 0 {
            restrictions.push(Restriction::CopyRestricted);
        }
        if bits & PERMISSION_MODIFY == 0 {
            restrictions.push(Restriction::ModifyRestricted);
        }
    }
    restrictions
}

/// Open `bytes` and classify the result
pub fn inspect<B: PdfBackend>(backend: &B, bytes: &[u8]) -> InspectionOutcome {
    let document = match backend.open(bytes) {
        Ok(document) => document,
        Err(PdfInspectionError::PasswordRequired(reason)) => {
            warn!(%reason, "PDF needs a password");
            return InspectionOutcome::Unreadable {
                password_required: true,
            };
        }
        Err(e) => {
            warn!(error = %e, "PDF could not be opened");
            return InspectionOutcome::Unreadable {
                password_required: false,
            };
        }
    };

    let encrypted = document.is_encrypted();
    let permissions = match document.permissions() {
        Ok(bits) => bits,
        Err(e) => {
            debug!(error = %e, "Could not check permissions");
            None
        }
    };

    let inspection = PdfInspection {
        encrypted,
        restrictions: restrictions_from(encrypted, permissions),
        page_count: Some(document.page_count()),
        title: document.title().filter(|t| !t.trim().is_empty()),
    };

    if inspection.restrictions.is_empty() {
        InspectionOutcome::Readable(inspection)
    } else {
        InspectionOutcome::Restricted(inspection)
    }
}

/// lopdf-backed PDF capability
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

pub struct LopdfSource {
    document: Document,
}

impl PdfBackend for LopdfBackend {
    type Document = LopdfSource;

    fn open(&self, bytes: &[u8]) -> Result<LopdfSource, PdfInspectionError> {
        if !bytes.starts_with(b"%PDF-") {
            return Err(PdfInspectionError::OpenFailed(
                "Not a valid PDF file (missing %PDF- header)".to_string(),
            ));
        }
        match Document::load_mem(bytes) {
            Ok(document) => Ok(LopdfSource { document }),
            Err(e) if has_encrypt_marker(bytes) => {
                Err(PdfInspectionError::PasswordRequired(e.to_string()))
            }
            Err(e) => Err(PdfInspectionError::OpenFailed(e.to_string())),
        }
    }
}

fn has_encrypt_marker(bytes: &[u8]) -> bool {
    bytes.windows(8).any(|w| w == b"/Encrypt")
}

impl LopdfSource {
    fn trailer_dict(&self, key: &[u8]) -> Option<&Dictionary> {
        match self.document.trailer.get(key).ok()? {
            Object::Reference(id) => self.document.get_object(*id).ok()?.as_dict().ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

impl PdfSource for LopdfSource {
    fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    fn title(&self) -> Option<String> {
        let info = self.trailer_dict(b"Info")?;
        let raw = match info.get(b"Title").ok()? {
            Object::Reference(id) => self.document.get_object(*id).ok()?,
            other => other,
        };
        let bytes = raw.as_str().ok()?;
        let title = decode_text_string(bytes);
        (!title.is_empty()).then_some(title)
    }

    fn is_encrypted(&self) -> bool {
        self.document.trailer.get(b"Encrypt").is_ok()
    }

    fn permissions(&self) -> Result<Option<i64>, PdfInspectionError> {
        if !self.is_encrypted() {
            return Ok(None);
        }
        let encrypt = self.trailer_dict(b"Encrypt").ok_or_else(|| {
            PdfInspectionError::Permissions("Encrypt dictionary not found".to_string())
        })?;
        let bits = encrypt
            .get(b"P")
            .and_then(Object::as_i64)
            .map_err(|e| PdfInspectionError::Permissions(e.to_string()))?;
        Ok(Some(bits))
    }
}

/// Decode a PDF text string: UTF-16BE or UTF-8 when marked by a BOM, plain
/// UTF-8 when it validates, otherwise PDFDocEncoding
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units).trim().to_string();
    }
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.trim().to_string(),
        Err(_) => bytes
            .iter()
            .map(|&b| pdf_doc_char(b))
            .collect::<String>()
            .trim()
            .to_string(),
    }
}

/// PDFDocEncoding differs from Latin-1 in 0x18..=0x1F, 0x7F and 0x80..=0xAD
fn pdf_doc_char(byte: u8) -> char {
    const HIGH: [char; 33] = [
        '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}',
        '\u{2044}', '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}',
        '\u{201D}', '\u{2018}', '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}',
        '\u{0141}', '\u{0152}', '\u{0160}', '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}',
        '\u{0153}', '\u{0161}', '\u{017E}', char::REPLACEMENT_CHARACTER, '\u{20AC}',
    ];
    const ACCENTS: [char; 8] = [
        '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}',
        '\u{02DC}',
    ];
    match byte {
        0x18..=0x1F => ACCENTS[usize::from(byte - 0x18)],
        0x80..=0xA0 => HIGH[usize::from(byte - 0x80)],
        0x7F | 0xAD => char::REPLACEMENT_CHARACTER,
        _ => char::from(byte),
    }
}
