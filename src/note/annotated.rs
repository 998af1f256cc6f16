use indexmap::IndexMap;

use super::front_matter::FrontMatterValue;
use super::note::Note;

/// Formula results keyed by formula name, in declaration order.
pub type Computed = IndexMap<String, FrontMatterValue>;

/// A shared note seen through a per-Base overlay of computed properties.
///
/// The underlying note is borrowed immutably; every Base evaluation owns its
/// own overlay, so two Bases over the same snapshot never observe each
/// other's formula results.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedNote<'a> {
    note: &'a Note,
    computed: Computed,
}

impl<'a> AnnotatedNote<'a> {
    pub fn new(note: &'a Note) -> Self {
        Self {
            note,
            computed: Computed::new(),
        }
    }

    pub fn note(&self) -> &'a Note {
        self.note
    }

    /// Values computed for this Base only.
    pub fn computed(&self) -> &Computed {
        &self.computed
    }

    pub fn set_computed(&mut self, name: impl Into<String>, value: FrontMatterValue) {
        self.computed.insert(name.into(), value);
    }

    /// The note's `computed` map with this overlay applied on top.
    pub fn merged_computed(&self) -> Computed {
        let mut merged = self.note.front_matter.computed().cloned().unwrap_or_default();
        merged.extend(self.computed.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// A computed value: overlay first, then the note's own `computed` map.
    pub fn computed_value(&self, name: &str) -> Option<&FrontMatterValue> {
        self.computed
            .get(name)
            .or_else(|| self.note.front_matter.computed().and_then(|c| c.get(name)))
    }

    /// Resolve a front matter style key.
    ///
    /// `formula.<name>` and `computed.<name>` address computed values,
    /// `note.<key>` and `frontmatter.<key>` address front matter, any other
    /// key is looked up in front matter as is.
    pub fn lookup(&self, key: &str) -> Option<&FrontMatterValue> {
        if let Some(name) = key
            .strip_prefix("formula.")
            .or_else(|| key.strip_prefix("computed."))
        {
            return self.computed_value(name);
        }

        let key = key
            .strip_prefix("note.")
            .or_else(|| key.strip_prefix("frontmatter."))
            .unwrap_or(key);
        self.note.front_matter.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::FrontMatter;

    #[test]
    fn overlay_shadows_stored_computed() {
        let mut stored = IndexMap::new();
        stored.insert("score".to_string(), FrontMatterValue::Number(1.0));
        stored.insert("label".to_string(), FrontMatterValue::from("old"));
        let note = Note::new("a.md").with_front_matter(
            FrontMatter::new()
                .with("status", "open")
                .with("computed", FrontMatterValue::Map(stored)),
        );

        let mut annotated = AnnotatedNote::new(&note);
        annotated.set_computed("score", FrontMatterValue::Number(5.0));

        assert_eq!(annotated.lookup("formula.score"), Some(&FrontMatterValue::Number(5.0)));
        assert_eq!(annotated.lookup("computed.label"), Some(&FrontMatterValue::from("old")));
        assert_eq!(annotated.lookup("note.status"), Some(&FrontMatterValue::from("open")));
        assert_eq!(annotated.lookup("status"), Some(&FrontMatterValue::from("open")));
        assert_eq!(annotated.merged_computed().len(), 2);

        // the shared note is untouched
        assert_eq!(
            note.front_matter.computed().and_then(|c| c.get("score")),
            Some(&FrontMatterValue::Number(1.0))
        );
    }
}
