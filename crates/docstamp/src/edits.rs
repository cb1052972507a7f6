//! Pending text insertions collected during one generation run.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

/// A single insertion of `text` at byte `offset` of `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub path: PathBuf,
    pub offset: u32,
    pub text: String,
}

/// Insertions accumulated by one scope invocation.
///
/// The batch only grows. It is either applied as a whole by a
/// [`crate::host::BatchSink`] or dropped.
#[derive(Debug, Clone, Default)]
pub struct EditBatch {
    edits: Vec<Edit>,
}

impl EditBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<PathBuf>, offset: u32, text: impl Into<String>) {
        self.edits.push(Edit {
            path: path.into(),
            offset,
            text: text.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Edits grouped per file, files in first-touched order.
    pub fn by_file(&self) -> Vec<(&Path, Vec<&Edit>)> {
        let mut order: Vec<&Path> = Vec::new();
        let mut groups: FxHashMap<&Path, Vec<&Edit>> = FxHashMap::default();
        for edit in &self.edits {
            let path = edit.path.as_path();
            groups
                .entry(path)
                .or_insert_with(|| {
                    order.push(path);
                    Vec::new()
                })
                .push(edit);
        }
        order
            .into_iter()
            .map(|path| {
                let edits = groups.remove(path).unwrap_or_default();
                (path, edits)
            })
            .collect()
    }
}

/// Applies insertions to `text`, highest offset first.
///
/// Offsets refer to the original text. Insertions sharing an offset keep
/// their batch order in the output. Offsets past the end or inside a
/// multi-byte character are clamped down to the nearest boundary.
pub fn apply_to(text: &str, edits: &[&Edit]) -> String {
    let mut ordered: Vec<(usize, &Edit)> = edits.iter().copied().enumerate().collect();
    // descending offset, and descending batch index among equal offsets so
    // that earlier edits end up first in the text
    ordered.sort_by(|(ia, a), (ib, b)| b.offset.cmp(&a.offset).then(ib.cmp(ia)));

    let mut output = text.to_string();
    for (_, edit) in ordered {
        let mut at = (edit.offset as usize).min(text.len());
        while !text.is_char_boundary(at) {
            at -= 1;
        }
        output.insert_str(at, &edit.text);
    }
    output
}
