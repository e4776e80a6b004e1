//! Form XObject embedding
//!
//! A page from one document is turned into a Form XObject living inside
//! another document. Embedded objects belong to the target document, so a
//! page must be embedded again for every target.

use crate::constants::TEMPLATE_PAGE_DIMENSIONS;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

// =============================================================================
// XObject Creation
// =============================================================================

/// Embed `page_id` of `source` into `target` as a Form XObject.
///
/// Everything the page references (fonts, images, nested forms) is copied
/// along with it. Returns the ID of the new XObject in `target`.
pub fn embed_page(target: &mut Document, source: &Document, page_id: ObjectId) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;
    let mut copied: HashMap<ObjectId, ObjectId> = HashMap::new();

    let bbox = page_dict
        .get(b"MediaBox")
        .and_then(|obj| obj.as_array())
        .ok()
        .cloned()
        .unwrap_or_else(template_media_box);

    let content = page_content(source, page_dict)?;

    let mut form = Dictionary::new();
    form.set("Type", Object::Name(b"XObject".to_vec()));
    form.set("Subtype", Object::Name(b"Form".to_vec()));
    form.set("FormType", Object::Integer(1));
    form.set("BBox", Object::Array(bbox));

    if let Ok(resources) = page_dict.get(b"Resources") {
        form.set(
            "Resources",
            copy_object_deep(target, source, resources, &mut copied)?,
        );
    }

    Ok(target.add_object(Stream::new(form, content)))
}

fn template_media_box() -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(TEMPLATE_PAGE_DIMENSIONS.0),
        Object::Real(TEMPLATE_PAGE_DIMENSIONS.1),
    ]
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Decoded content of a page, with multiple streams joined by newlines.
fn page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let ids: Vec<ObjectId> = match page_dict.get(b"Contents") {
        Ok(Object::Reference(id)) => vec![*id],
        Ok(Object::Array(refs)) => refs
            .iter()
            .filter_map(|obj| obj.as_reference().ok())
            .collect(),
        _ => return Ok(Vec::new()),
    };

    let mut content = Vec::new();
    for id in ids {
        if let Ok(stream) = doc.get_object(id)?.as_stream() {
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            content.extend_from_slice(&data);
            content.push(b'\n');
        }
    }

    Ok(content)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Copy `obj` from `source` into `target`, following references.
///
/// `copied` maps source IDs to target IDs so shared objects are copied once.
pub fn copy_object_deep(
    target: &mut Document,
    source: &Document,
    obj: &Object,
    copied: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = copied.get(id) {
                return Ok(Object::Reference(new_id));
            }

            // Reserve the ID first so reference cycles terminate
            let new_id = target.new_object_id();
            copied.insert(*id, new_id);

            let copy = copy_object_deep(target, source, source.get_object(*id)?, copied)?;
            target.objects.insert(new_id, copy);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            target, source, dict, copied,
        )?)),
        Object::Array(items) => {
            let items: Result<Vec<_>> = items
                .iter()
                .map(|item| copy_object_deep(target, source, item, copied))
                .collect();
            Ok(Object::Array(items?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(target, source, &stream.dict, copied)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    target: &mut Document,
    source: &Document,
    dict: &Dictionary,
    copied: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut copy = Dictionary::new();
    for (key, value) in dict.iter() {
        copy.set(key.clone(), copy_object_deep(target, source, value, copied)?);
    }
    Ok(copy)
}
