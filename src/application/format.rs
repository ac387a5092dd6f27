//! Text formats for dialogs.
//!
//! Documents mirror the tree shape: `{ name?, start: { entry?, lines?, branches? } }`.
//! Parent links are never written; decoding rebuilds them from `branches`.

use std::path::Path;

use generational_arena::Index;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{BranchTree, BranchView, Dialog, Payload};

pub const JSON_EXTENSION: &str = "json";

/// Serialization format, selected purely by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogFormat {
    Json,
}

impl DialogFormat {
    /// Resolves the format for `path`; unknown extensions are rejected.
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(JSON_EXTENSION) => Ok(Self::Json),
            _ => Err(ApplicationError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => JSON_EXTENSION,
        }
    }
}

/// Output layout settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces per indentation level
    pub indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

#[derive(Serialize)]
struct DialogDocRef<'a, B, N> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    start: BranchDocRef<'a, B, N>,
}

#[derive(Serialize)]
struct BranchDocRef<'a, B, N> {
    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<&'a B>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    lines: &'a [N],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    branches: Vec<BranchDocRef<'a, B, N>>,
}

fn is_empty_slice<T>(items: &&[T]) -> bool {
    items.is_empty()
}

impl<'a, B, N> BranchDocRef<'a, B, N> {
    fn from_view(view: BranchView<'a, B, N>) -> Self {
        Self {
            entry: view.entry(),
            lines: view.lines(),
            branches: view.children().map(Self::from_view).collect(),
        }
    }
}

// Absent `Option` fields already decode as None. No bare `#[serde(default)]`
// on generic fields: it adds `Default` bounds to the payload types.
#[derive(Deserialize)]
struct DialogDoc<B, N> {
    name: Option<String>,
    start: BranchDoc<B, N>,
}

#[derive(Deserialize)]
struct BranchDoc<B, N> {
    entry: Option<B>,
    #[serde(default = "Vec::new")]
    lines: Vec<N>,
    #[serde(default = "Vec::new")]
    branches: Vec<BranchDoc<B, N>>,
}

/// Longest start-to-ending chain of branches a JSON document can hold.
///
/// Each branch adds two nesting levels (its object and its `branches` array)
/// and the lines of the deepest branch add two more. serde_json refuses to
/// parse beyond 127 levels, so a 63-branch chain of plain lines is unreadable.
pub const MAX_JSON_DEPTH: usize = 62;

/// Serializes a dialog completely in memory.
///
/// Only documents that [`decode`] can read back are produced; deeper trees
/// fail with [`ApplicationError::TooDeep`].
#[instrument(level = "debug", skip(dialog), fields(name = ?dialog.name()))]
pub fn encode<B, N>(
    dialog: &Dialog<B, N>,
    format: DialogFormat,
    options: &FormatOptions,
) -> ApplicationResult<String>
where
    B: Serialize,
    N: Serialize,
{
    let depth = dialog.tree().depth();
    match format {
        DialogFormat::Json => {
            if depth > MAX_JSON_DEPTH {
                return Err(ApplicationError::TooDeep {
                    depth,
                    max: MAX_JSON_DEPTH,
                });
            }

            let doc = DialogDocRef {
                name: dialog.name(),
                start: BranchDocRef::from_view(dialog.start()),
            };
            let indent = vec![b' '; options.indent];
            let mut buf = Vec::new();
            let mut serializer = serde_json::Serializer::with_formatter(
                &mut buf,
                PrettyFormatter::with_indent(&indent),
            );
            doc.serialize(&mut serializer)
                .map_err(|source| ApplicationError::Encode { source })?;
            buf.push(b'\n');
            let text = String::from_utf8(buf).map_err(|e| ApplicationError::OperationFailed {
                context: "encode dialog as UTF-8".to_string(),
                source: Box::new(e),
            })?;

            // nested payloads can still exceed the parser's nesting limit
            if serde_json::from_str::<IgnoredAny>(&text).is_err() {
                return Err(ApplicationError::TooDeep {
                    depth,
                    max: MAX_JSON_DEPTH,
                });
            }
            Ok(text)
        }
    }
}

/// Parses a dialog and restores every parent link.
///
/// `path` only names the origin in error messages.
#[instrument(level = "debug", skip(text))]
pub fn decode<B, N>(
    text: &str,
    format: DialogFormat,
    path: &Path,
) -> ApplicationResult<Dialog<B, N>>
where
    B: Payload + DeserializeOwned,
    N: Payload + DeserializeOwned,
{
    let doc: DialogDoc<B, N> = match format {
        DialogFormat::Json => {
            serde_json::from_str(text).map_err(|source| ApplicationError::Malformed {
                path: path.to_path_buf(),
                source,
            })?
        }
    };

    let DialogDoc { name, start } = doc;
    let mut tree = BranchTree::new(start.entry, start.lines, Vec::new());
    let root = tree.root_index();

    let mut pending: Vec<(Index, BranchDoc<B, N>)> =
        start.branches.into_iter().rev().map(|doc| (root, doc)).collect();
    while let Some((parent, doc)) = pending.pop() {
        let idx = tree.attach_unlinked(parent, doc.entry, doc.lines)?;
        pending.extend(doc.branches.into_iter().rev().map(|child| (idx, child)));
    }

    let relinked = tree.relink_parents();
    debug!("decoded {} branches", relinked);

    Ok(Dialog::new(name, tree))
}
