use pdf_stamp::*;
use std::fs;

#[tokio::test]
async fn test_load_files_uses_file_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invoice.pdf");
    fs::write(&path, b"%PDF-1.7").unwrap();

    let candidates = load_files(&[&path]).await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].name, "invoice.pdf");
    assert_eq!(candidates[0].bytes, b"%PDF-1.7");
    assert!(candidates[0].declared_type.is_none());
}

#[tokio::test]
async fn test_load_files_missing() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_files(&[dir.path().join("missing.pdf")]).await;
    assert!(matches!(result, Err(StampError::Io(_))));
}

#[tokio::test]
async fn test_load_directory_recursive_and_sorted() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("b.pdf"), b"b").unwrap();
    fs::write(dir.path().join("a.pdf"), b"a").unwrap();
    fs::write(dir.path().join("readme.txt"), b"skip me").unwrap();
    fs::write(dir.path().join("nested").join("c.pdf"), b"c").unwrap();

    let candidates = load_directory(dir.path()).await.unwrap();
    let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["a.pdf", "b.pdf", "c.pdf"]);

    let documents = ingest(candidates, SelectionOrigin::Directory).unwrap();
    assert_eq!(documents.len(), 3);
}

#[tokio::test]
async fn test_load_directory_without_pdfs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("photo.jpg"), b"jpg").unwrap();

    let candidates = load_directory(dir.path()).await.unwrap();
    assert!(candidates.is_empty());

    let err = ingest(candidates, SelectionOrigin::Directory).unwrap_err();
    assert_eq!(err.to_string(), "No PDF files found in the selected directory");
}

#[tokio::test]
async fn test_load_directory_same_name_in_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    for year in ["2024", "2025"] {
        fs::create_dir(dir.path().join(year)).unwrap();
        fs::write(dir.path().join(year).join("report.pdf"), year.as_bytes()).unwrap();
    }

    let candidates = load_directory(dir.path()).await.unwrap();
    assert_eq!(candidates.len(), 2);

    let mut session = Session::new(StampVariant::Batch);
    let err = session
        .select(candidates, SelectionOrigin::Directory)
        .unwrap_err();
    assert!(matches!(err, StampError::Selection(_)));
    assert_eq!(
        err.to_string(),
        "More than one selected file would be saved as report_rv.pdf"
    );
    assert!(session.state().sources().is_empty());
    assert_eq!(session.state().last_error(), Some(err.to_string().as_str()));
}
