use pdf_stamp::*;
use std::path::PathBuf;

#[test]
fn test_validation_no_input_files() {
    let options = StampOptions::default();
    let result = options.validate();
    assert!(result.is_err());
    match result {
        Err(StampError::Config(msg)) => {
            assert!(msg.contains("No input files"));
        }
        _ => panic!("Expected Config error"),
    }
}

#[test]
fn test_validation_input_sources() {
    let mut options = StampOptions::default();

    // Valid: explicit files
    options.input_files.push(PathBuf::from("a.pdf"));
    assert!(options.validate().is_ok());
    assert_eq!(options.selection_origin(), SelectionOrigin::Files);

    // Invalid: files and a directory
    options.input_dir = Some(PathBuf::from("scans"));
    assert!(options.validate().is_err());

    // Valid: directory only
    options.input_files.clear();
    assert!(options.validate().is_ok());
    assert_eq!(options.selection_origin(), SelectionOrigin::Directory);
}

#[test]
fn test_validation_output_dirs() {
    let mut options = StampOptions::default();
    options.input_files.push(PathBuf::from("a.pdf"));

    // Invalid: empty output directory
    options.output_dir = PathBuf::new();
    assert!(options.validate().is_err());

    // Invalid: previews would overwrite outputs
    options.output_dir = PathBuf::from("out");
    options.preview_dir = Some(PathBuf::from("out"));
    assert!(options.validate().is_err());

    // Valid: separate directories
    options.preview_dir = Some(PathBuf::from("previews"));
    assert!(options.validate().is_ok());
}

#[test]
fn test_default_variant() {
    assert_eq!(StampOptions::default().variant, StampVariant::Batch);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_options() {
    use tempfile::NamedTempFile;

    let mut options = StampOptions::default();
    options.variant = StampVariant::Single;
    options.input_files.push(PathBuf::from("input.pdf"));
    options.output_dir = PathBuf::from("stamped");
    options.preview_dir = Some(PathBuf::from("previews"));

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    // Save
    options.save(path).await.unwrap();

    // Load
    let loaded = StampOptions::load(path).await.unwrap();

    assert_eq!(loaded, options);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_partial_options() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), r#"{ "variant": "Single" }"#).unwrap();

    let loaded = StampOptions::load(temp_file.path()).await.unwrap();
    assert_eq!(loaded.variant, StampVariant::Single);
    assert!(loaded.input_files.is_empty());
    assert_eq!(loaded.output_dir, PathBuf::from("."));
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_invalid_options() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "not json").unwrap();

    match StampOptions::load(temp_file.path()).await {
        Err(StampError::Config(msg)) => assert!(msg.contains("Failed to parse config")),
        _ => panic!("Expected Config error"),
    }
}
