//! Alternate-page rotation for short-edge duplex printing.
//!
//! Pages at odd 0-based positions (2nd, 4th, 6th…) get an extra 180° on
//! their `/Rotate` entry so the back of each sheet reads the right way up
//! once the booklet is flipped.

use crate::error::{BookletError, Result};
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

/// Effective `/Rotate` of a page in degrees, normalised to 0–359.
pub fn page_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    doc.get_dictionary(page_id)
        .ok()
        .and_then(|dict| dict.get(b"Rotate").ok())
        .and_then(|r| r.as_i64().ok())
        .map(|r| r.rem_euclid(360))
        .unwrap_or(0)
}

/// Add 180° to every page at an odd 0-based index. Returns those indices.
pub fn rotate_alternate_pages(doc: &mut Document) -> Result<Vec<usize>> {
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let mut rotated = Vec::with_capacity(pages.len() / 2);

    for (index, page_id) in pages.into_iter().enumerate() {
        if index % 2 == 0 {
            continue;
        }
        let current = page_rotation(doc, page_id);
        let dict = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| BookletError::Internal(format!("page {}: {}", index + 1, e)))?;
        dict.set("Rotate", Object::Integer((current + 180) % 360));
        rotated.push(index);
    }

    debug!("Rotated {} pages by 180°", rotated.len());
    Ok(rotated)
}
