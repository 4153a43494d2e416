//! Decorations as LSP diagnostics
//!
//! Each highlighted range becomes one `Information` diagnostic whose related
//! information points at the partner fragment.

use std::path::Path;

use dupes::{Decoration, Span};
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, Location, NumberOrString,
    Position, Range, Url,
};

pub const SOURCE: &str = "dupe-viewer";
pub const CODE: &str = "duplicate-code";

pub fn to_lsp_range(span: &Span) -> Range {
    Range {
        start: Position {
            line: span.start.line,
            character: span.start.character,
        },
        end: Position {
            line: span.end.line,
            character: span.end.character,
        },
    }
}

pub fn from_lsp_position(pos: Position) -> dupes::Position {
    dupes::Position::new(pos.line, pos.character)
}

/// Convert one decoration; `root` resolves the partner path for the related link
pub fn decoration_diagnostic(decoration: &Decoration, root: Option<&Path>) -> Diagnostic {
    let related = root
        .and_then(|root| Url::from_file_path(root.join(&decoration.partner.file)).ok())
        .map(|uri| {
            vec![DiagnosticRelatedInformation {
                location: Location {
                    uri,
                    range: to_lsp_range(&decoration.partner.range),
                },
                message: format!(
                    "Duplicate of lines {}-{}",
                    decoration.partner.start_line, decoration.partner.end_line
                ),
            }]
        });

    Diagnostic {
        range: to_lsp_range(&decoration.range),
        severity: Some(DiagnosticSeverity::INFORMATION),
        code: Some(NumberOrString::String(CODE.to_string())),
        code_description: None,
        source: Some(SOURCE.to_string()),
        message: decoration.hover.clone(),
        related_information: related,
        tags: None,
        data: None,
    }
}

pub fn decoration_diagnostics(decorations: &[Decoration], root: Option<&Path>) -> Vec<Diagnostic> {
    decorations
        .iter()
        .map(|d| decoration_diagnostic(d, root))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dupes::translate::{Partner, hover_message};

    fn decoration() -> Decoration {
        Decoration {
            range: Span::new(dupes::Position::new(9, 8), dupes::Position::new(23, 9)),
            hover: hover_message("src/checkout.js", 31, 45),
            partner: Partner {
                file: "src/checkout.js".to_string(),
                start_line: 31,
                end_line: 45,
                range: Span::new(dupes::Position::new(30, 10), dupes::Position::new(44, 11)),
            },
            lines: 15,
            format: "javascript".to_string(),
        }
    }

    #[test]
    fn test_diagnostic_fields() {
        let diag = decoration_diagnostic(&decoration(), None);
        assert_eq!(diag.range.start, Position::new(9, 8));
        assert_eq!(diag.range.end, Position::new(23, 9));
        assert_eq!(diag.severity, Some(DiagnosticSeverity::INFORMATION));
        assert_eq!(
            diag.code,
            Some(NumberOrString::String("duplicate-code".to_string()))
        );
        assert_eq!(diag.source.as_deref(), Some("dupe-viewer"));
        assert!(diag.message.starts_with("Duplicate code found with file:\nsrc/checkout.js"));
        assert!(diag.related_information.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_related_information_points_at_partner() {
        let diag = decoration_diagnostic(&decoration(), Some(Path::new("/work/shop")));
        let related = diag.related_information.expect("related info");
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].location.uri.path(), "/work/shop/src/checkout.js");
        assert_eq!(related[0].location.range.start, Position::new(30, 10));
        assert_eq!(related[0].message, "Duplicate of lines 31-45");
    }
}
