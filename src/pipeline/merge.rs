//! Page-set merging: concatenate converted documents into one.
//!
//! Objects of each document are renumbered past the ones already collected,
//! then a fresh page tree references every page in input order. The page
//! trees and catalogs of the inputs are dropped.

use crate::error::{BookletError, Result};
use lopdf::{dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use tracing::debug;

/// Accumulates page-sets one at a time, so each can be dropped after it is
/// appended.
#[derive(Default)]
pub struct Merger {
    objects: BTreeMap<ObjectId, Object>,
    page_ids: Vec<ObjectId>,
    max_id: u32,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append every page of `doc`, keeping their order. Returns the number of
    /// pages added.
    pub fn append(&mut self, mut doc: Document) -> Result<usize> {
        doc.renumber_objects_with(self.max_id + 1);
        self.max_id = doc.max_id;

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for (id, object) in doc.objects {
            if is_tree_node(&object) {
                continue;
            }
            if self.objects.insert(id, object).is_some() {
                return Err(BookletError::Internal(format!(
                    "object {} {} collided while merging",
                    id.0, id.1
                )));
            }
        }

        debug!("Merged {} pages (total {})", pages.len(), self.page_ids.len() + pages.len());
        let added = pages.len();
        self.page_ids.extend(pages);
        Ok(added)
    }

    /// Build the merged document.
    pub fn finish(self) -> Document {
        let mut merged = Document::with_version("1.5");
        merged.objects.extend(self.objects);
        merged.max_id = self.max_id;

        let pages_id = merged.new_object_id();
        for &page_id in &self.page_ids {
            if let Ok(page) = merged.get_object_mut(page_id).and_then(Object::as_dict_mut) {
                page.set("Parent", pages_id);
            }
        }

        let count = self.page_ids.len() as i64;
        let kids: Vec<Object> = self.page_ids.into_iter().map(Object::Reference).collect();
        merged.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
            }),
        );

        let catalog_id = merged.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        merged.trailer.set("Root", catalog_id);
        merged
    }
}

fn is_tree_node(object: &Object) -> bool {
    let Ok(dict) = object.as_dict() else {
        return false;
    };
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Catalog") | Ok(b"Pages")
    )
}

/// Concatenate `page_sets` in order. An empty input yields a document with
/// no pages.
pub fn merge_page_sets(page_sets: Vec<Document>) -> Result<Document> {
    let mut merger = Merger::new();
    for doc in page_sets {
        merger.append(doc)?;
    }
    Ok(merger.finish())
}
