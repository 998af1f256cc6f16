//! Variable substitution ahead of formula parsing.
//!
//! Identifiers (`[A-Za-z_][A-Za-z0-9_.]*`) outside string literals are
//! replaced by literals. Resolution order per identifier: the reserved
//! `file.name`, `file.path` and `file.size`; then `formula.*`/`computed.*`;
//! then front matter keys. Whole identifiers are matched, so a short key
//! never rewrites part of a longer token.

use crate::note::front_matter::format_number;
use crate::note::{AnnotatedNote, FrontMatterValue};

pub fn substitute(formula: &str, note: &AnnotatedNote<'_>) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut chars = formula.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c == '"' || c == '\'' {
            // String literal: copied through untouched, re-quoted with `"`
            let mut literal = String::new();
            let mut closed = false;
            while let Some((_, next)) = chars.next() {
                if next == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        literal.push(escaped);
                    }
                } else if next == c {
                    closed = true;
                    break;
                } else {
                    literal.push(next);
                }
            }
            if closed {
                out.push_str(&quote(&literal));
            } else {
                out.push_str(&formula[start..]);
            }
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' || next == '.' {
                    end = i + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let ident = &formula[start..end];
            match resolve(ident, note) {
                Some(literal) => out.push_str(&literal),
                None => out.push_str(ident),
            }
            continue;
        }

        out.push(c);
    }

    out
}

fn resolve(ident: &str, note: &AnnotatedNote<'_>) -> Option<String> {
    let source = note.note();
    match ident {
        "file.name" => return Some(quote(&source.title)),
        "file.path" => return Some(quote(&source.relative_path)),
        "file.size" => return source.file_stats.size.map(|size| size.to_string()),
        _ => {}
    }
    note.lookup(ident).and_then(to_literal)
}

fn to_literal(value: &FrontMatterValue) -> Option<String> {
    match value {
        FrontMatterValue::String(s) => Some(quote(s)),
        FrontMatterValue::Number(n) if n.is_finite() => Some(format_number(*n)),
        FrontMatterValue::Number(_) => None,
        FrontMatterValue::Bool(b) => Some(b.to_string()),
        FrontMatterValue::Date(_) | FrontMatterValue::List(_) => Some(quote(&value.to_text())),
        FrontMatterValue::Null | FrontMatterValue::Map(_) => None,
    }
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{FileStats, FrontMatter, Note};

    fn note() -> Note {
        Note::new("docs/Alpha.md")
            .with_front_matter(
                FrontMatter::new()
                    .with("price", 10i64)
                    .with("priceTax", 12i64)
                    .with("status", "in \"review\"")
                    .with("done", true),
            )
            .with_file_stats(FileStats {
                size: Some(2048),
                ..FileStats::default()
            })
    }

    #[test]
    fn reserved_tokens() {
        let note = note();
        let annotated = AnnotatedNote::new(&note);
        assert_eq!(substitute("\"Note: \" + file.name", &annotated), r#""Note: " + "Alpha""#);
        assert_eq!(substitute("file.size / 1024", &annotated), "2048 / 1024");
        assert_eq!(substitute("file.path", &annotated), r#""docs/Alpha.md""#);
    }

    #[test]
    fn whole_identifiers_only() {
        let note = note();
        let annotated = AnnotatedNote::new(&note);
        assert_eq!(substitute("priceTax - price", &annotated), "12 - 10");
        assert_eq!(substitute("unknown * price", &annotated), "unknown * 10");
    }

    #[test]
    fn literals_are_left_alone() {
        let note = note();
        let annotated = AnnotatedNote::new(&note);
        assert_eq!(substitute("'price: ' + status", &annotated), r#""price: " + "in \"review\"""#);
        assert_eq!(substitute("done", &annotated), "true");
    }

    #[test]
    fn computed_values_chain() {
        let note = note();
        let mut annotated = AnnotatedNote::new(&note);
        annotated.set_computed("total", FrontMatterValue::Number(22.0));
        assert_eq!(substitute("formula.total * 2", &annotated), "22 * 2");
    }
}
