//! PDF-level operations for stamping
//!
//! - Embedding a template page as a Form XObject
//! - Drawing that XObject over existing pages
//! - Deep copying PDF objects between documents

mod page;
mod xobject;

pub use page::{draw_overlay, overlay_resource_names};
pub use xobject::{copy_object_deep, embed_page};
