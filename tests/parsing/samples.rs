#[cfg(test)]
mod samples {
    use std::fs;
    use std::path::{Path, PathBuf};

    use taxonkeys::parsing;

    fn keys_in(dir: &Path) -> Vec<PathBuf> {
        assert!(dir.exists(), "{:?} directory missing", dir);

        let entries = fs::read_dir(dir).expect("Failed to read directory");

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.expect("Failed to read directory entry");
            let path = entry.path();

            if path
                .extension()
                .and_then(|s| s.to_str())
                == Some("txt")
            {
                files.push(path);
            }
        }
        files.sort();

        assert!(!files.is_empty(), "No .txt files found in {:?}", dir);
        files
    }

    #[test]
    fn ensure_samples_parse() {
        let files = keys_in(Path::new("tests/samples/"));

        let mut failures = Vec::new();

        for file in &files {
            let content = parsing::load(&file)
                .unwrap_or_else(|e| panic!("Failed to load file {:?}: {:?}", file, e));

            match parsing::parse_file(&content, "B1", None) {
                Ok(resources) => {
                    assert!(!resources.is_empty(), "{:?} has no resources", file);
                }
                Err(e) => {
                    println!("File {:?} failed to parse:\n{}", file, e);
                    failures.push(file.clone());
                }
            }
        }

        if !failures.is_empty() {
            panic!(
                "Sample keys should parse successfully, but {} files failed",
                failures.len()
            );
        }
    }

    #[test]
    fn ensure_samples_stable() {
        for file in keys_in(Path::new("tests/samples/")) {
            let content = parsing::load(&file)
                .unwrap_or_else(|e| panic!("Failed to load file {:?}: {:?}", file, e));

            let first = parsing::parse_file(&content, "B1", None).unwrap();
            let history = taxonkeys::language::History::from_resources(content.clone(), &first);
            let second = parsing::parse_file(&content, "B1", Some(&history)).unwrap();

            assert_eq!(first, second, "{:?} changed when parsed again", file);
        }
    }

    #[test]
    fn ensure_broken_fail() {
        let files = keys_in(Path::new("tests/broken/"));

        let mut unexpected_successes = Vec::new();

        for file in &files {
            let content = parsing::load(&file)
                .unwrap_or_else(|e| panic!("Failed to load file {:?}: {:?}", file, e));

            match parsing::parse_file(&content, "B1", None) {
                Ok(_) => {
                    println!("Key {:?} unexpectedly parsed", file);
                    unexpected_successes.push(file.clone());
                }
                Err(_) => {}
            }
        }

        if !unexpected_successes.is_empty() {
            panic!(
                "Broken keys should fail to parse, but {} files passed",
                unexpected_successes.len()
            );
        }
    }
}
