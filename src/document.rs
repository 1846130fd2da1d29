//! PDF document collaborator, backed by `lopdf`.
//!
//! The workflow only ever touches one metadata attribute, the `/ModDate`
//! entry of the document information dictionary, so that is all this seam
//! exposes. Dates are exchanged as PDF date strings
//! (`D:YYYYMMDDHHmmSS+HH'mm'`), second precision, system-local timezone.

use std::path::Path;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use lopdf::{Dictionary, Document, Object, StringFormat};
use tracing::debug;

use crate::error::{Error, Result};

/// Seam between the update workflow and the PDF library.
///
/// The handle is owned exclusively by the workflow between `load` and the
/// end of the surrounding scope; dropping it releases the document on every
/// exit path, including a failed save.
pub trait DocumentStore {
    type Handle;

    /// Opens the document at `path`.
    fn load(&self, path: &Path) -> Result<Self::Handle>;

    /// Current modification date of the document, if one is set.
    fn modification_timestamp(&self, handle: &Self::Handle) -> Option<DateTime<FixedOffset>>;

    /// Sets the modification date, creating the Info dictionary if the
    /// document has none.
    fn set_modification_timestamp(&self, handle: &mut Self::Handle, when: DateTime<Local>);

    /// Writes the document back to `path`, overwriting it in place.
    fn save(&self, handle: &mut Self::Handle, path: &Path) -> Result<()>;
}

/// The real store. Stateless; `lopdf::Document` is the handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfStore;

impl DocumentStore for PdfStore {
    type Handle = Document;

    fn load(&self, path: &Path) -> Result<Document> {
        Document::load(path).map_err(|source| Error::document(path, source))
    }

    fn modification_timestamp(&self, handle: &Document) -> Option<DateTime<FixedOffset>> {
        let info = match handle.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => handle.get_object(*id).ok()?.as_dict().ok()?,
            Ok(Object::Dictionary(dict)) => dict,
            _ => return None,
        };
        match info.get(b"ModDate") {
            Ok(Object::String(bytes, _)) => parse_pdf_date(&String::from_utf8_lossy(bytes)),
            _ => None,
        }
    }

    fn set_modification_timestamp(&self, handle: &mut Document, when: DateTime<Local>) {
        let stamp = format_pdf_date(when);
        debug!("setting ModDate to {stamp}");
        let value = Object::String(stamp.into_bytes(), StringFormat::Literal);
        // Only ModDate may change; an Info dictionary stored inline in the
        // trailer is mutated in place so its other entries survive.
        if let Ok(Object::Dictionary(info)) = handle.trailer.get_mut(b"Info") {
            info.set("ModDate", value);
            return;
        }
        let id = match info_reference(handle) {
            Some(id) => id,
            None => {
                let id = handle.add_object(Dictionary::new());
                handle.trailer.set("Info", Object::Reference(id));
                id
            }
        };
        if let Ok(Object::Dictionary(info)) = handle.get_object_mut(id) {
            info.set("ModDate", value);
        }
    }

    fn save(&self, handle: &mut Document, path: &Path) -> Result<()> {
        handle
            .save(path)
            .map(|_| ())
            .map_err(|source| Error::document(path, source))
    }
}

/// Reference to the trailer's Info dictionary, provided it resolves to an
/// actual dictionary. A dangling or malformed entry counts as absent and
/// gets replaced on the next set.
fn info_reference(document: &Document) -> Option<lopdf::ObjectId> {
    match document.trailer.get(b"Info") {
        Ok(Object::Reference(id))
            if matches!(document.get_object(*id), Ok(Object::Dictionary(_))) =>
        {
            Some(*id)
        }
        _ => None,
    }
}

/// Renders `when` as a PDF date string: `D:YYYYMMDDHHmmSS` followed by the
/// UTC offset as `+HH'mm'` (or `-HH'mm'`). Sub-second precision is dropped.
pub fn format_pdf_date(when: DateTime<Local>) -> String {
    let offset = when.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.abs();
    format!(
        "{}{}{:02}'{:02}'",
        when.format("D:%Y%m%d%H%M%S"),
        sign,
        offset / 3600,
        (offset % 3600) / 60,
    )
}

/// Parses a PDF date string. Accepts the form this crate writes plus the
/// common `Z`, offset-less, apostrophe-less (`+0100`) and minute-less
/// (`+01`) endings found in the wild.
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.strip_prefix("D:")?;
    let stamp = raw.get(..14)?;
    let rest = raw.get(14..)?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S").ok()?;
    let offset = match rest.as_bytes().first() {
        None | Some(b'Z') => FixedOffset::east_opt(0)?,
        Some(sign @ (b'+' | b'-')) => {
            let hours = rest.get(1..3)?.parse::<u32>().ok()? as i32;
            let tail = rest.get(3..)?;
            let tail = tail.strip_prefix('\'').unwrap_or(tail);
            let minutes = if tail.is_empty() {
                0
            } else {
                tail.get(..2)?.parse::<u32>().ok()? as i32
            };
            let mut seconds = hours * 3600 + minutes * 60;
            if *sign == b'-' {
                seconds = -seconds;
            }
            FixedOffset::east_opt(seconds)?
        }
        Some(_) => return None,
    };
    offset.from_local_datetime(&naive).single()
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;
    use lopdf::dictionary;

    use super::*;

    fn blank_document() -> Document {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn format_emits_the_expected_shape() {
        let when = Local.with_ymd_and_hms(2024, 5, 17, 10, 4, 9).unwrap();
        let stamp = format_pdf_date(when);
        assert!(stamp.starts_with("D:20240517100409"));
        assert_eq!(stamp.len(), "D:20240517100409+00'00'".len());
        assert!(stamp.ends_with('\''));
    }

    #[test]
    fn format_then_parse_round_trips() {
        let when = Local.with_ymd_and_hms(2023, 12, 31, 23, 59, 58).unwrap();
        let parsed = parse_pdf_date(&format_pdf_date(when)).unwrap();
        assert_eq!(parsed, when);
    }

    #[test]
    fn parse_accepts_utc_and_bare_endings() {
        let utc = parse_pdf_date("D:20240101120000Z").unwrap();
        assert_eq!(utc.hour(), 12);
        let bare = parse_pdf_date("D:20240101120000").unwrap();
        assert_eq!(bare, utc);
    }

    #[test]
    fn parse_accepts_offsets_without_apostrophes() {
        let canonical = parse_pdf_date("D:20240101120000+01'00'").unwrap();
        assert_eq!(parse_pdf_date("D:20240101120000+0100").unwrap(), canonical);
        assert_eq!(parse_pdf_date("D:20240101120000+01").unwrap(), canonical);
        let negative = parse_pdf_date("D:20240101120000-0530").unwrap();
        assert_eq!(negative, parse_pdf_date("D:20240101120000-05'30'").unwrap());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_pdf_date("").is_none());
        assert!(parse_pdf_date("20240101120000").is_none());
        assert!(parse_pdf_date("D:2024").is_none());
        assert!(parse_pdf_date("D:20240101120000#01'00'").is_none());
    }

    #[test]
    fn set_creates_the_info_dictionary_when_missing() {
        let store = PdfStore;
        let mut doc = blank_document();
        assert!(store.modification_timestamp(&doc).is_none());

        let when = Local.with_ymd_and_hms(2022, 8, 1, 6, 30, 0).unwrap();
        store.set_modification_timestamp(&mut doc, when);

        let read_back = store.modification_timestamp(&doc).unwrap();
        assert_eq!(read_back, when);
    }

    #[test]
    fn set_keeps_other_entries_of_an_inline_info_dictionary() {
        let store = PdfStore;
        let mut doc = blank_document();
        doc.trailer.set(
            "Info",
            Object::Dictionary(dictionary! {
                "Title" => Object::String(b"Keep me".to_vec(), StringFormat::Literal),
            }),
        );

        let when = Local.with_ymd_and_hms(2022, 8, 1, 6, 30, 0).unwrap();
        store.set_modification_timestamp(&mut doc, when);

        let info = match doc.trailer.get(b"Info") {
            Ok(Object::Dictionary(dict)) => dict,
            other => panic!("Info should stay inline, got {other:?}"),
        };
        match info.get(b"Title") {
            Ok(Object::String(bytes, _)) => assert_eq!(bytes.as_slice(), b"Keep me"),
            other => panic!("Title should survive a ModDate update, got {other:?}"),
        }
        assert_eq!(store.modification_timestamp(&doc).unwrap(), when);
    }

    #[test]
    fn save_failure_surfaces_as_document_error() {
        let store = PdfStore;
        let mut doc = blank_document();
        let err = store
            .save(&mut doc, Path::new("/no/such/dir/out.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::Document { .. }));
    }

    #[test]
    fn set_overwrites_an_existing_moddate() {
        let store = PdfStore;
        let mut doc = blank_document();
        store.set_modification_timestamp(
            &mut doc,
            Local.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        );
        let later = Local.with_ymd_and_hms(2021, 2, 3, 4, 5, 6).unwrap();
        store.set_modification_timestamp(&mut doc, later);
        assert_eq!(store.modification_timestamp(&doc).unwrap(), later);
    }
}
