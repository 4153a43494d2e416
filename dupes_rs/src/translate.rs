//! Report locations to host ranges
//!
//! jscpd lines are 1-based while editor positions are 0-based, and its
//! columns come out shifted relative to the editor's character offsets.
//! [`Offsets`] holds both corrections.

use serde::{Deserialize, Serialize};

use crate::matcher::normalize;
use crate::report::{Duplicate, FileRef, Location, Report};

/// Correction added to report line/column numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offsets {
    pub line: i64,
    pub column: i64,
}

impl Default for Offsets {
    fn default() -> Self {
        Self {
            line: -1,
            column: 7,
        }
    }
}

impl Offsets {
    /// Apply the correction to a report location, saturating at zero
    pub fn apply(&self, loc: &Location) -> Position {
        Position {
            line: shift(loc.line, self.line),
            character: shift(loc.column, self.column),
        }
    }
}

fn shift(value: u64, by: i64) -> u32 {
    let shifted = i64::try_from(value)
        .unwrap_or(i64::MAX)
        .saturating_add(by)
        .max(0);
    u32::try_from(shifted).unwrap_or(u32::MAX)
}

/// Zero-based position in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Half-open range between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// True when `pos` lies within the span, end inclusive
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// The other half of a clone pair, as seen from the active document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    /// Normalized path relative to the workspace root
    pub file: String,
    /// 1-based start line as reported
    pub start_line: u64,
    /// 1-based end line as reported
    pub end_line: u64,
    /// Partner range with the same offsets applied
    pub range: Span,
}

/// One highlight for the active document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub range: Span,
    pub hover: String,
    pub partner: Partner,
    /// Clone size in lines
    pub lines: u64,
    pub format: String,
}

/// Hover text naming the partner file and its reported lines
pub fn hover_message(file: &str, start: u64, end: u64) -> String {
    format!(
        "Duplicate code found with file:\n{}\nStart: {},\nEnd: {}.",
        file, start, end
    )
}

/// Build the decoration for `entry` if either side is `active`.
///
/// `active` must already be normalized. The first side wins when both
/// sides name the same file.
pub fn translate_entry(entry: &Duplicate, active: &str, offsets: Offsets) -> Option<Decoration> {
    let first = normalize(&entry.first_file.name);
    let second = normalize(&entry.second_file.name);

    let (own, other, other_name) = if first == active {
        (&entry.first_file, &entry.second_file, second)
    } else if second == active {
        (&entry.second_file, &entry.first_file, first)
    } else {
        return None;
    };

    Some(Decoration {
        range: span_of(own, offsets),
        hover: hover_message(&other_name, other.start_loc.line, other.end_loc.line),
        partner: Partner {
            range: span_of(other, offsets),
            file: other_name,
            start_line: other.start_loc.line,
            end_line: other.end_loc.line,
        },
        lines: entry.lines,
        format: entry.format.clone(),
    })
}

/// Decorations for every clone pair touching `active`, in report order
pub fn translate(report: &Report, active: &str, offsets: Offsets) -> Vec<Decoration> {
    let active = normalize(active);
    report
        .duplicates
        .iter()
        .filter_map(|entry| translate_entry(entry, &active, offsets))
        .collect()
}

fn span_of(side: &FileRef, offsets: Offsets) -> Span {
    Span::new(offsets.apply(&side.start_loc), offsets.apply(&side.end_loc))
}
