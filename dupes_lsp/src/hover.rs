//! Hover provider for dupes LSP
//!
//! Shows the hover message of every duplicate range under the cursor.

use dupes::Decoration;
use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use crate::diagnostics::{from_lsp_position, to_lsp_range};

/// Build hover content for `position`, or `None` if no range covers it
pub fn hover_at(decorations: &[Decoration], position: Position) -> Option<Hover> {
    let pos = from_lsp_position(position);
    let hits: Vec<&Decoration> = decorations
        .iter()
        .filter(|d| d.range.contains(pos))
        .collect();

    let first = hits.first()?;

    let value = hits
        .iter()
        .map(|d| d.hover.as_str())
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::PlainText,
            value,
        }),
        // Single hit: let the client highlight the whole fragment
        range: if hits.len() == 1 {
            Some(to_lsp_range(&first.range))
        } else {
            None
        },
    })
}
