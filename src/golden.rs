//! Golden tests over `testdata/<name>.in.txt` / `<name>.out.txt` pairs.
//!
//! Set `FLAKESUM_WRITE_FIXTURES=1` to rewrite the `.out.txt` files from the
//! current output instead of comparing against them.

use crate::collector::Collector;
use crate::models::FilterOptions;
use crate::stream;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IN_SUFFIX: &str = ".in.txt";
const OUT_SUFFIX: &str = ".out.txt";

fn testdata_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn write_mode() -> bool {
    std::env::var("FLAKESUM_WRITE_FIXTURES").is_ok_and(|v| !v.is_empty() && v != "0")
}

fn filter(input: &[u8]) -> String {
    let mut collector = Collector::new(FilterOptions::default());
    let mut output: Vec<u8> = Vec::new();
    tokio_test::block_on(stream::run(&mut collector, input, &mut output))
        .expect("in-memory streams do not fail");
    String::from_utf8(output).expect("output is valid UTF-8")
}

fn fixture_inputs() -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = WalkDir::new(testdata_dir())
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(IN_SUFFIX))
        })
        .collect();
    inputs.sort();
    inputs
}

#[test]
fn test_fixtures() {
    let inputs = fixture_inputs();
    assert!(!inputs.is_empty(), "no fixtures under {}", testdata_dir().display());

    let mut mismatches = Vec::new();
    for in_path in inputs {
        let file_name = in_path.file_name().and_then(|n| n.to_str()).unwrap();
        let name = file_name.trim_end_matches(IN_SUFFIX);
        let out_path = in_path.with_file_name(format!("{}{}", name, OUT_SUFFIX));

        let input = std::fs::read(&in_path).unwrap();
        let got = filter(&input);

        if write_mode() {
            std::fs::write(&out_path, &got).unwrap();
            continue;
        }

        let expected = std::fs::read_to_string(&out_path)
            .unwrap_or_else(|e| panic!("missing {}: {}", out_path.display(), e));
        if got != expected {
            mismatches.push(format!(
                "fixture {}\nExpected:\n{}\nGot:\n{}",
                name, expected, got
            ));
        }
    }

    assert!(mismatches.is_empty(), "{}", mismatches.join("\n"));
}

#[test]
fn test_fixtures_are_stable() {
    for in_path in fixture_inputs() {
        let input = std::fs::read(&in_path).unwrap();
        assert_eq!(filter(&input), filter(&input), "{}", in_path.display());
    }
}
