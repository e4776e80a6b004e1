//! Shared constants for PDF stamping
//!
//! Stamp geometry, output naming and packaging names all live here so the
//! two stamp variants can be compared side by side.

// =============================================================================
// Template Page
// =============================================================================

/// Template page width in points (US Letter: 8.5" × 11")
pub const TEMPLATE_PAGE_WIDTH_PT: f32 = 612.0;

/// Template page height in points (US Letter)
pub const TEMPLATE_PAGE_HEIGHT_PT: f32 = 792.0;

/// Template page dimensions as tuple (width, height)
pub const TEMPLATE_PAGE_DIMENSIONS: (f32, f32) = (TEMPLATE_PAGE_WIDTH_PT, TEMPLATE_PAGE_HEIGHT_PT);

// =============================================================================
// Check Marks
// =============================================================================

/// Edge length every check mark is scaled from (points)
pub const MARK_SIZE: f32 = 30.0;

/// Line width of both strokes of a check mark (points)
pub const STROKE_WIDTH: f32 = 1.8;

/// Stroke colour as RGB components (pure red)
pub const STROKE_RGB: (f32, f32, f32) = (1.0, 0.0, 0.0);

/// Anchors used by the batch tool
pub const BATCH_ANCHORS: [(f32, f32); 3] = [(520.0, 620.0), (520.0, 396.0), (520.0, 100.0)];

/// Anchors used by the single-document tool; the top mark sits 100pt higher
pub const SINGLE_ANCHORS: [(f32, f32); 3] = [(520.0, 720.0), (520.0, 396.0), (520.0, 100.0)];

/// Horizontal reach of the long stroke, batch tool
pub const BATCH_LONG_STROKE_DX: f32 = 0.845;

/// Horizontal reach of the long stroke, single-document tool
pub const SINGLE_LONG_STROKE_DX: f32 = 0.8;

/// Vertical reach of the long stroke (both tools)
pub const LONG_STROKE_DY: f32 = 0.8;

/// Where the short stroke starts, as a fraction of the mark size
pub const SHORT_STROKE_START: (f32, f32) = (0.8, 0.8);

/// Where the short stroke ends, as a fraction of the mark size
pub const SHORT_STROKE_END: (f32, f32) = (1.0, 0.6);

// =============================================================================
// Composition
// =============================================================================

/// First 0-based page index that receives the stamp
pub const FIRST_STAMPED_PAGE: usize = 1;

/// Resource name prefix of the embedded stamp XObject
pub const OVERLAY_RESOURCE_PREFIX: &str = "RvStamp";

/// Depth limit when walking the page tree for inherited attributes
pub const MAX_PAGE_TREE_DEPTH: usize = 32;

// =============================================================================
// Input / Output Naming
// =============================================================================

/// Declared type accepted at ingestion
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// File-name suffix accepted at ingestion
pub const PDF_EXTENSION: &str = ".pdf";

/// Inserted before the extension of a stamped file
pub const OUTPUT_SUFFIX: &str = "_rv";

/// Appended to names without any extension
pub const BARE_OUTPUT_SUFFIX: &str = "_checkmarks";

/// File name of a multi-document download
pub const ARCHIVE_NAME: &str = "processed_pdfs.zip";

/// Folder every archive entry is placed in
pub const ARCHIVE_FOLDER: &str = "processed_pdfs";
