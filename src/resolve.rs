//! Existence filter: turn expected file names into the keys actually present.
//!
//! Absence is not an error. A probe that answers [`Presence::Missing`] drops
//! the file from the run; only a failing probe (I/O, network) aborts.

use crate::config::BookletConfig;
use crate::error::Result;
use crate::store::{join_key, Presence, Store};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Role of a resolved input in the booklet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Cover,
    Score,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInput {
    pub key: String,
    pub kind: InputKind,
}

/// Ordered inputs of one run; the cover, when present, comes first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInputs {
    pub entries: Vec<ResolvedInput>,
    /// Expected score keys that were not found, in catalog order.
    pub missing: Vec<String>,
    /// A cover key was configured but nothing exists there.
    pub cover_missing: bool,
}

impl ResolvedInputs {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn has_cover(&self) -> bool {
        self.entries
            .first()
            .is_some_and(|e| e.kind == InputKind::Cover)
    }
}

/// Probe the cover and every `{scores_prefix}/{name}` in order and keep the
/// ones that exist.
pub fn resolve_inputs(
    store: &dyn Store,
    config: &BookletConfig,
    filenames: &[String],
) -> Result<ResolvedInputs> {
    let mut resolved = ResolvedInputs::default();

    if let Some(ref cover) = config.cover_key {
        match store.probe(cover)? {
            Presence::Found => {
                debug!("Cover page: {}", cover);
                resolved.entries.push(ResolvedInput {
                    key: cover.clone(),
                    kind: InputKind::Cover,
                });
            }
            Presence::Missing => {
                info!("No cover page at {}, continuing without", store.describe(cover));
                resolved.cover_missing = true;
            }
        }
    }

    for name in filenames {
        let key = join_key(&config.scores_prefix, name);
        match store.probe(&key)? {
            Presence::Found => resolved.entries.push(ResolvedInput {
                key,
                kind: InputKind::Score,
            }),
            Presence::Missing => {
                info!("Skipping missing file {}", store.describe(&key));
                resolved.missing.push(key);
            }
        }
    }

    debug!(
        "Resolved {} inputs ({} missing)",
        resolved.len(),
        resolved.missing.len()
    );
    Ok(resolved)
}
