use quire_core::{
    Document, DocumentPipeline, PageRecord, PipelineError, PipelineOptions, normalize_url,
};
use rayon::prelude::*;

const SAMPLE: &str = "title: Test\ntags: one, two\n\nHello [[target]].";

#[test]
fn sample_document_metadata_body_and_links() {
    let processed = DocumentPipeline::default().process(SAMPLE).unwrap();

    let fields: Vec<_> = processed.metadata.iter().collect();
    assert_eq!(fields, [("title", "Test"), ("tags", "one, two")]);
    assert_eq!(processed.body, "Hello [[target]].");
    assert_eq!(
        processed.rendered,
        "<p>Hello <a href=\"/target/\">target</a>.</p>"
    );
}

#[test]
fn labelled_reference_uses_normalized_target() {
    let (rendered, _, _) = DocumentPipeline::default()
        .process_parts("\n\nSee [[Path/Sub|Label Text]].")
        .unwrap();
    assert!(rendered.contains("<a href=\"/path/sub/\">Label Text</a>"));
}

#[test]
fn reference_in_code_span_is_literal() {
    let (rendered, _, _) = DocumentPipeline::default()
        .process_parts("\n\nWrite `[[target]]` to link.")
        .unwrap();
    assert!(rendered.contains("<code>[[target]]</code>"));
    assert!(!rendered.contains("<a "));
}

#[test]
fn reference_in_fenced_block_is_literal() {
    let (rendered, _, _) = DocumentPipeline::default()
        .process_parts("\n\n```\n[[target]]\n```")
        .unwrap();
    assert!(rendered.contains("[[target]]"));
    assert!(!rendered.contains("<a "));
}

#[test]
fn references_in_attributes_are_literal() {
    let (rendered, _, _) = DocumentPipeline::default()
        .process_parts("\n\n![[[x]]](i.png) and [a](/a \"see [[x]]\")")
        .unwrap();
    assert!(rendered.contains("alt=\"[[x]]\""));
    assert!(rendered.contains("title=\"see [[x]]\""));
    assert!(!rendered.contains("href=\"/x/\""));
}

#[test]
fn leading_slash_targets_stay_on_site() {
    let (rendered, _, _) = DocumentPipeline::default()
        .process_parts("\n\nSee [[/evil.example]] and [[\\\\evil.example|x]].")
        .unwrap();
    assert_eq!(
        rendered,
        "<p>See <a href=\"/evil.example/\">/evil.example</a> and <a href=\"/evil.example/\">x</a>.</p>"
    );
}

#[test]
fn missing_blank_line_is_malformed() {
    let result = DocumentPipeline::default().process("title: Test\nHello");
    assert_eq!(result, Err(PipelineError::MalformedDocument));

    let doc = Document::render("x", "title: Test\nHello", &DocumentPipeline::default());
    assert!(doc.is_err());
}

#[test]
fn repeated_key_yields_single_entry() {
    let processed = DocumentPipeline::default()
        .process("tags: a\ntitle: T\ntags: b\n\nbody")
        .unwrap();
    assert_eq!(processed.metadata.keys().collect::<Vec<_>>(), ["tags", "title"]);
    assert_eq!(processed.metadata.get("tags"), Some("b"));
}

#[test]
fn concurrent_runs_are_identical() {
    let pipeline = DocumentPipeline::default();
    let text = "title: Same\ntags: a\n\n# Heading\n\n[[one]] and [[two|Two]]\n\n| x |\n| - |\n| 1 |";
    let expected = Document::render("same", text, &pipeline).unwrap();

    let docs: Vec<_> = (0..64)
        .into_par_iter()
        .map(|_| Document::render("same", text, &pipeline).unwrap())
        .collect();
    assert!(docs.iter().all(|doc| *doc == expected));
}

#[test]
fn record_round_trip_preserves_title_tags_body() {
    let pipeline = DocumentPipeline::default();
    let records = [
        PageRecord::new("a", "Body with [[link]]\n\nand more.")
            .with_title("A Page")
            .with_tags("x, y"),
        PageRecord::new("b", "only body"),
        PageRecord::new("c", "\n\nleading blank lines").with_tags("solo"),
    ];

    for record in &records {
        let first = Document::from_record(record, &pipeline).unwrap();
        let again = Document::from_record(&first.to_record(), &pipeline).unwrap();
        assert_eq!(again.title(), first.title());
        assert_eq!(again.tags(), first.tags());
        assert_eq!(again.body(), first.body());
        assert_eq!(again.body(), record.body);
        assert_eq!(again.rendered(), first.rendered());
    }
}

#[test]
fn alternate_link_formatter() {
    let pipeline = DocumentPipeline::with_link_formatter(&PipelineOptions::default(), |id: &str| {
        format!("https://wiki.example.org/page/{id}")
    });
    let doc = Document::render("home", "\n\n[[Getting Started]]", &pipeline).unwrap();
    assert!(
        doc.rendered()
            .contains("href=\"https://wiki.example.org/page/getting_started\"")
    );
}

#[test]
fn identifier_is_canonical() {
    let doc = Document::render("  My\\Page  ", "\n\nx", &DocumentPipeline::default()).unwrap();
    assert_eq!(doc.identifier(), normalize_url("my/page"));
}
