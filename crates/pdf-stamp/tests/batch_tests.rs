use lopdf::{Dictionary, Document, Object, Stream};
use pdf_stamp::*;

fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

fn source(name: &str, bytes: Vec<u8>) -> DocumentCandidate {
    DocumentCandidate::new(name, bytes).with_declared_type("application/pdf")
}

fn sources(candidates: Vec<DocumentCandidate>) -> Vec<SourceDocument> {
    ingest(candidates, SelectionOrigin::Files).unwrap()
}

#[tokio::test]
async fn test_batch_all_valid() {
    let docs = sources(vec![
        source("docA", to_bytes(create_test_pdf(3))),
        source("docB", to_bytes(create_test_pdf(1))),
    ]);

    let outcome = run_batch(&docs, StampVariant::Batch, ArtifactKind::Final)
        .await
        .unwrap();

    assert!(outcome.failures.is_empty());
    let names: Vec<_> = outcome.composed.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["docA_checkmarks", "docB_checkmarks"]);

    let a = Document::load_mem(&outcome.composed[0].bytes).unwrap();
    let b = Document::load_mem(&outcome.composed[1].bytes).unwrap();
    assert_eq!(stamped_pages(&a).unwrap(), vec![1, 2]);
    assert!(stamped_pages(&b).unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_skips_invalid_and_keeps_order() {
    let docs = sources(vec![
        source("one.pdf", to_bytes(create_test_pdf(2))),
        source("broken.pdf", b"this is not a pdf".to_vec()),
        source("three.pdf", to_bytes(create_test_pdf(4))),
        source("empty.pdf", Vec::new()),
        source("five.pdf", to_bytes(create_test_pdf(2))),
    ]);

    let outcome = run_batch(&docs, StampVariant::Batch, ArtifactKind::Preview)
        .await
        .unwrap();

    let indices: Vec<_> = outcome.composed.iter().map(|d| d.source_index).collect();
    assert_eq!(indices, [0, 2, 4]);
    let names: Vec<_> = outcome.composed.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["one_rv.pdf", "three_rv.pdf", "five_rv.pdf"]);

    let failed: Vec<_> = outcome
        .failures
        .iter()
        .map(|f| (f.source_index, f.source_name.as_str()))
        .collect();
    assert_eq!(failed, [(1, "broken.pdf"), (3, "empty.pdf")]);
    assert!(
        outcome
            .failures
            .iter()
            .all(|f| matches!(f.error, StampError::Load(_)))
    );
}

#[tokio::test]
async fn test_batch_all_invalid() {
    let docs = sources(vec![
        source("a.pdf", b"nope".to_vec()),
        source("b.pdf", b"still nope".to_vec()),
    ]);

    let err = run_batch(&docs, StampVariant::Batch, ArtifactKind::Preview)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StampError::NoValidDocuments {
            kind: ArtifactKind::Preview
        }
    ));
    assert_eq!(
        err.to_string(),
        "Could not generate previews for any files. Please check if they are valid PDFs."
    );

    let err = run_batch(&docs, StampVariant::Batch, ArtifactKind::Final)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to process all selected files. Please check if they are valid PDFs."
    );
}

#[tokio::test]
async fn test_batch_empty_input() {
    let result = run_batch(&[], StampVariant::Batch, ArtifactKind::Final).await;
    assert!(matches!(result, Err(StampError::NoValidDocuments { .. })));
}

#[tokio::test]
async fn test_batch_uses_selected_variant() {
    let docs = sources(vec![source("a.pdf", to_bytes(create_test_pdf(2)))]);

    let batch = run_batch(&docs, StampVariant::Batch, ArtifactKind::Final)
        .await
        .unwrap();
    let single = run_batch(&docs, StampVariant::Single, ArtifactKind::Final)
        .await
        .unwrap();

    assert_ne!(batch.composed[0].bytes, single.composed[0].bytes);
}
