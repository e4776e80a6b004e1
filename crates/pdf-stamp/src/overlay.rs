//! Overlay template construction
//!
//! The overlay is a single letter-sized page holding three red check marks.
//! It is built fresh for every pipeline run and then embedded, unchanged,
//! into every document of that run.

use crate::constants::*;
use crate::types::{Result, StampError};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Which stamp geometry to draw.
///
/// The batch tool and the single-document tool place the top mark and the
/// long stroke differently. Both layouts are kept selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StampVariant {
    /// Top mark at y=620, long stroke reaching 0.845 of the mark size
    #[default]
    Batch,
    /// Top mark at y=720, long stroke reaching 0.8 of the mark size
    Single,
}

impl StampVariant {
    /// Anchor (top-right corner) of each check mark
    pub fn anchors(self) -> [(f32, f32); 3] {
        match self {
            StampVariant::Batch => BATCH_ANCHORS,
            StampVariant::Single => SINGLE_ANCHORS,
        }
    }

    fn long_stroke_dx(self) -> f32 {
        match self {
            StampVariant::Batch => BATCH_LONG_STROKE_DX,
            StampVariant::Single => SINGLE_LONG_STROKE_DX,
        }
    }

    /// Both strokes of every check mark, in drawing order
    pub fn strokes(self) -> Vec<Stroke> {
        self.anchors()
            .iter()
            .flat_map(|&(x, y)| self.check_mark(x, y, MARK_SIZE))
            .collect()
    }

    fn check_mark(self, x: f32, y: f32, size: f32) -> [Stroke; 2] {
        let long = Stroke {
            start: Point { x, y },
            end: Point {
                x: x - size * self.long_stroke_dx(),
                y: y - size * LONG_STROKE_DY,
            },
        };
        let short = Stroke {
            start: Point {
                x: x - size * SHORT_STROKE_START.0,
                y: y - size * SHORT_STROKE_START.1,
            },
            end: Point {
                x: x - size * SHORT_STROKE_END.0,
                y: y - size * SHORT_STROKE_END.1,
            },
        };
        [long, short]
    }
}

/// A point in PDF user space (origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// One straight line segment of a check mark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub start: Point,
    pub end: Point,
}

/// A prepared overlay page, ready to be embedded into target documents.
#[derive(Debug, Clone)]
pub struct OverlayTemplate {
    variant: StampVariant,
    strokes: Vec<Stroke>,
    document: Document,
    page_id: ObjectId,
}

impl OverlayTemplate {
    pub fn variant(&self) -> StampVariant {
        self.variant
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// The single-page document holding the marks
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Object ID of the template page inside [`OverlayTemplate::document`]
    pub fn page_id(&self) -> ObjectId {
        self.page_id
    }
}

/// Build the overlay template for one pipeline run.
///
/// The page is serialized and parsed back before use, so a template that
/// cannot round-trip fails here rather than inside every document.
pub fn build_overlay(variant: StampVariant) -> Result<OverlayTemplate> {
    let strokes = variant.strokes();
    let mut doc = create_template_document(&strokes);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| StampError::OverlayBuild(e.to_string()))?;

    let document =
        Document::load_mem(&bytes).map_err(|e| StampError::OverlayBuild(e.to_string()))?;
    let page_id = document
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| StampError::OverlayBuild("template has no page".to_string()))?;

    log::debug!(
        "Built {:?} overlay template with {} strokes",
        variant,
        strokes.len()
    );

    Ok(OverlayTemplate {
        variant,
        strokes,
        document,
        page_id,
    })
}

fn create_template_document(strokes: &[Stroke]) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        stroke_operations(strokes).into_bytes(),
    ));

    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(TEMPLATE_PAGE_WIDTH_PT),
                Object::Real(TEMPLATE_PAGE_HEIGHT_PT),
            ]),
        ),
        ("Resources", Object::Dictionary(Dictionary::new())),
        ("Contents", Object::Reference(content_id)),
    ]));

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Content stream drawing every stroke in the stamp colour
fn stroke_operations(strokes: &[Stroke]) -> String {
    let mut ops = String::new();

    ops.push_str("q\n");
    ops.push_str(&format!(
        "{} {} {} RG\n",
        STROKE_RGB.0, STROKE_RGB.1, STROKE_RGB.2
    ));
    ops.push_str(&format!("{} w\n", STROKE_WIDTH));

    for stroke in strokes {
        ops.push_str(&format!(
            "{} {} m {} {} l S\n",
            stroke.start.x, stroke.start.y, stroke.end.x, stroke.end.y
        ));
    }

    ops.push_str("Q\n");
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_batch_geometry() {
        let strokes = StampVariant::Batch.strokes();
        assert_eq!(strokes.len(), 6);

        // Top mark, long stroke
        assert_eq!(strokes[0].start, Point { x: 520.0, y: 620.0 });
        assert_close(strokes[0].end.x, 520.0 - 30.0 * 0.845);
        assert_close(strokes[0].end.y, 596.0);

        // Top mark, short stroke
        assert_close(strokes[1].start.x, 496.0);
        assert_close(strokes[1].start.y, 596.0);
        assert_close(strokes[1].end.x, 490.0);
        assert_close(strokes[1].end.y, 602.0);

        assert_eq!(strokes[2].start, Point { x: 520.0, y: 396.0 });
        assert_eq!(strokes[4].start, Point { x: 520.0, y: 100.0 });
    }

    #[test]
    fn test_single_geometry() {
        let strokes = StampVariant::Single.strokes();
        assert_eq!(strokes[0].start, Point { x: 520.0, y: 720.0 });
        assert_close(strokes[0].end.x, 496.0);
        assert_close(strokes[0].end.y, 696.0);

        // The long stroke meets the short one exactly in this layout
        assert_close(strokes[0].end.x, strokes[1].start.x);
        assert_close(strokes[0].end.y, strokes[1].start.y);
    }

    #[test]
    fn test_variants_share_lower_marks() {
        let batch = StampVariant::Batch.anchors();
        let single = StampVariant::Single.anchors();
        assert_ne!(batch[0], single[0]);
        assert_eq!(batch[1..], single[1..]);
    }

    #[test]
    fn test_stroke_operations() {
        let ops = stroke_operations(&StampVariant::Batch.strokes());
        assert!(ops.starts_with("q\n1 0 0 RG\n1.8 w\n"));
        assert_eq!(ops.matches(" l S\n").count(), 6);
        assert!(ops.ends_with("Q\n"));
    }

    #[test]
    fn test_build_overlay() {
        let template = build_overlay(StampVariant::Batch).unwrap();
        assert_eq!(template.variant(), StampVariant::Batch);
        assert_eq!(template.strokes().len(), 6);
        assert_eq!(template.document().get_pages().len(), 1);

        let page = template.document().get_dictionary(template.page_id()).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box.len(), 4);
    }

    #[test]
    fn test_build_overlay_is_deterministic() {
        let a = build_overlay(StampVariant::Single).unwrap();
        let b = build_overlay(StampVariant::Single).unwrap();
        assert_eq!(a.strokes(), b.strokes());
    }
}
