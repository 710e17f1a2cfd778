// Visitor Utilities
//
// Statement-level rewriting of a source file. A visitor replaces class
// declarations (top-level or inside function bodies) and may ask for statements to be inserted before or
// after them; `visit` reduces those results back into file text.

use ts::{ClassDeclaration, SourceFile, TextRange};

/// Replacement text for a visited class plus the statements around it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitListEntryResult {
    pub node: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
}

impl VisitListEntryResult {
    pub fn of(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            ..Default::default()
        }
    }
}

pub trait Visitor {
    /// Returns `None` to keep the declaration as written.
    fn visit_class_declaration(
        &mut self,
        class: &ClassDeclaration,
        file: &SourceFile,
    ) -> anyhow::Result<Option<VisitListEntryResult>>;
}

/// Visits every class of `file` and returns the rewritten text.
pub fn visit(file: &SourceFile, visitor: &mut dyn Visitor) -> anyhow::Result<String> {
    Ok(apply_edits(&file.text, 0, visit_edits(file, visitor)?))
}

/// The edits `visitor` makes to the classes of `file`, for callers
/// that add edits of their own before applying them.
pub fn visit_edits(file: &SourceFile, visitor: &mut dyn Visitor) -> anyhow::Result<Vec<TextEdit>> {
    let mut edits = Vec::new();
    for class in file.all_classes() {
        let Some(result) = visitor.visit_class_declaration(class, file)? else {
            continue;
        };
        let mut text = String::new();
        for before in &result.before {
            text.push_str(before);
            text.push('\n');
        }
        text.push_str(&result.node);
        for after in &result.after {
            text.push('\n');
            text.push_str(after);
        }
        edits.push(TextEdit::replace(class.range, text));
    }
    Ok(edits)
}

/// A replacement of `range` (relative to the text it is applied to) with `text`.
/// Empty ranges are insertions.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEdit {
    pub range: TextRange,
    pub text: String,
}

impl TextEdit {
    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(pos: u32, text: impl Into<String>) -> Self {
        Self::replace(TextRange::new(pos, pos), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, String::new())
    }
}

/// Applies non-overlapping edits to `text`, whose first byte sits at absolute
/// position `offset`. Insertions at the same position keep their order.
pub fn apply_edits(text: &str, offset: u32, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by_key(|edit| edit.range.pos);
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for edit in edits {
        let start = (edit.range.pos.saturating_sub(offset) as usize).clamp(cursor, text.len());
        let end = (edit.range.end.saturating_sub(offset) as usize).clamp(start, text.len());
        out.push_str(&text[cursor..start]);
        out.push_str(&edit.text);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}
