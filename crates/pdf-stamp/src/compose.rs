//! Page composition: stamping one document with a prepared overlay

use crate::constants::FIRST_STAMPED_PAGE;
use crate::overlay::OverlayTemplate;
use crate::render::{draw_overlay, embed_page, overlay_resource_names};
use crate::types::{Result, StampError};
use lopdf::{Document, ObjectId};

/// Stamp every page except the first and return the re-encoded document.
///
/// Fails with [`StampError::Load`] when `source` is not a readable PDF.
pub fn compose(source: &[u8], template: &OverlayTemplate) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(source).map_err(StampError::Load)?;
    stamp_document(&mut doc, template)?;

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Draw the overlay onto `doc` in place.
///
/// Returns the 0-based indices of the stamped pages. The template is
/// embedded once per call and only if at least one page qualifies, so a
/// single-page document is left untouched.
pub fn stamp_document(doc: &mut Document, template: &OverlayTemplate) -> Result<Vec<usize>> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    if page_ids.len() <= FIRST_STAMPED_PAGE {
        return Ok(Vec::new());
    }

    let xobject_id = embed_page(doc, template.document(), template.page_id())?;

    let mut stamped = Vec::with_capacity(page_ids.len() - FIRST_STAMPED_PAGE);
    for (index, &page_id) in page_ids.iter().enumerate().skip(FIRST_STAMPED_PAGE) {
        draw_overlay(doc, page_id, xobject_id)?;
        stamped.push(index);
    }

    Ok(stamped)
}

/// 0-based indices of pages carrying the stamp overlay.
///
/// Pages are recognized by an `XObject` resource named with the `RvStamp`
/// prefix. A page that already used such a name before stamping is reported
/// as stamped too.
pub fn stamped_pages(doc: &Document) -> Result<Vec<usize>> {
    let mut stamped = Vec::new();
    for (index, page_id) in doc.get_pages().into_values().enumerate() {
        if !overlay_resource_names(doc, page_id)?.is_empty() {
            stamped.push(index);
        }
    }
    Ok(stamped)
}
