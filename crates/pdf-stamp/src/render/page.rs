//! Drawing an embedded overlay onto an existing page

use crate::constants::{MAX_PAGE_TREE_DEPTH, OVERLAY_RESOURCE_PREFIX};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Draw the Form XObject `xobject_id` over page `page_id` at native size.
///
/// The page's own content is wrapped in `q`/`Q` first, so whatever graphics
/// state it leaves behind does not leak into the overlay.
pub fn draw_overlay(doc: &mut Document, page_id: ObjectId, xobject_id: ObjectId) -> Result<()> {
    let mut resources = page_resources(doc, page_id)?;
    let mut xobjects = match resources.get(b"XObject") {
        Ok(obj) => resolve_dictionary(doc, obj)?,
        Err(_) => Dictionary::new(),
    };

    let name = unused_resource_name(&xobjects);
    xobjects.set(name.as_bytes(), Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut contents = vec![Object::Reference(
        doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec())),
    )];
    contents.extend(page_contents(doc, page_id)?);
    contents.push(Object::Reference(doc.add_object(Stream::new(
        Dictionary::new(),
        format!("\nQ\nq 1 0 0 1 0 0 cm /{} Do Q\n", name).into_bytes(),
    ))));

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Array(contents));

    Ok(())
}

/// Resource names of the stamp XObject on a page, if any
pub fn overlay_resource_names(doc: &Document, page_id: ObjectId) -> Result<Vec<String>> {
    let resources = page_resources(doc, page_id)?;
    let xobjects = match resources.get(b"XObject") {
        Ok(obj) => resolve_dictionary(doc, obj)?,
        Err(_) => return Ok(Vec::new()),
    };

    Ok(xobjects
        .iter()
        .map(|(key, _)| String::from_utf8_lossy(key).into_owned())
        .filter(|name| name.starts_with(OVERLAY_RESOURCE_PREFIX))
        .collect())
}

/// First `RvStamp<n>` not already used by the page
fn unused_resource_name(xobjects: &Dictionary) -> String {
    (0..)
        .map(|n| format!("{}{}", OVERLAY_RESOURCE_PREFIX, n))
        .find(|name| !xobjects.has(name.as_bytes()))
        .unwrap_or_else(|| OVERLAY_RESOURCE_PREFIX.to_string())
}

// =============================================================================
// Page Attributes
// =============================================================================

/// Resources of a page as an owned dictionary.
///
/// Resources may be inline, indirect, or inherited from an ancestor in the
/// page tree. The result is always safe to set back directly on the page.
fn page_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut node = doc.get_dictionary(page_id)?;

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve_dictionary(doc, resources);
        }
        match node.get(b"Parent").and_then(|obj| obj.as_reference()) {
            Ok(parent_id) => node = doc.get_dictionary(parent_id)?,
            Err(_) => break,
        }
    }

    Ok(Dictionary::new())
}

/// Content stream references of a page, flattening an indirect array
fn page_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;

    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => Ok(items.clone()),
            _ => Ok(vec![Object::Reference(*id)]),
        },
        Ok(Object::Array(items)) => Ok(items.clone()),
        _ => Ok(Vec::new()),
    }
}

fn resolve_dictionary(doc: &Document, obj: &Object) -> Result<Dictionary> {
    match obj {
        Object::Dictionary(dict) => Ok(dict.clone()),
        Object::Reference(id) => Ok(doc.get_dictionary(*id)?.clone()),
        _ => Ok(Dictionary::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unused_resource_name_skips_taken() {
        let mut xobjects = Dictionary::new();
        assert_eq!(unused_resource_name(&xobjects), "RvStamp0");

        xobjects.set("RvStamp0", Object::Null);
        xobjects.set("RvStamp1", Object::Null);
        assert_eq!(unused_resource_name(&xobjects), "RvStamp2");
    }
}
