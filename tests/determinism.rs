use bases_core::base::{Base, Formula, SortRule, View};
use bases_core::note::{FrontMatter, Note};
use bases_core::predicate::Predicate;
use bases_core::selection::filter_notes;
use bases_core::types::{BaseId, CollectionVersion};
use bases_core::QueryEngine;

fn notes() -> Vec<Note> {
    (0..20)
        .map(|i| {
            Note::new(format!("notes/n{i:02}.md")).with_front_matter(
                FrontMatter::new()
                    .with("bucket", (i % 3) as i64)
                    .with("tags", vec![if i % 2 == 0 { "even" } else { "odd" }]),
            )
        })
        .collect()
}

#[test]
fn determinism_filter_twice() {
    let notes = notes();
    let filter = Predicate::Or(vec![
        Predicate::expr(r#"file.hasTag("even")"#),
        Predicate::expr(r#"file.name endsWith "5""#),
    ]);

    let first: Vec<_> = filter_notes(Some(&filter), &notes).iter().map(|n| n.id.clone()).collect();
    let second: Vec<_> = filter_notes(Some(&filter), &notes).iter().map(|n| n.id.clone()).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 12);
}

#[test]
fn determinism_absent_filter_is_identity() {
    let notes = notes();
    let all = filter_notes(None, &notes);
    assert_eq!(all.len(), notes.len());
    assert!(all.iter().zip(&notes).all(|(a, b)| a.id == b.id));
}

#[test]
fn determinism_full_query_and_json() {
    let notes = notes();
    let base = Base::new(BaseId::new("buckets"))
        .with_formula(Formula::new("score", "bucket * 10"))
        .with_view(
            View::table("By bucket")
                .with_sort(SortRule::desc("bucket"))
                .with_sort(SortRule::asc("file.name")),
        );
    let engine = QueryEngine::default();

    let a = serde_json::to_string(&engine.query(&base, &notes)).unwrap();
    let b = serde_json::to_string(&engine.query(&base, &notes)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn determinism_collection_version() {
    let notes = notes();
    assert_eq!(CollectionVersion::from_notes(&notes), CollectionVersion::from_notes(&notes.clone()));

    let mut changed = notes.clone();
    changed[3] = changed[3].clone().with_content("edited");
    assert_ne!(CollectionVersion::from_notes(&notes), CollectionVersion::from_notes(&changed));
    assert!(CollectionVersion::from_notes(&notes).as_str().starts_with("sha256:"));
}
