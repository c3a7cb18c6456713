//! Hash domain governance lock tests.
//!
//! Proves:
//! 1. The canonical domain set has the expected count
//! 2. Domain byte strings are unique and null-terminated
//! 3. Domains follow the `SKYPLAN::*::V1\0` naming convention
//! 4. No raw `SKYPLAN::` domain literal appears in production source
//!    outside `hash_domain.rs`

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use skyplan_kernel::proof::hash_domain::HashDomain;

#[test]
fn canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        6,
        "if you added a new domain, update this count"
    );
}

#[test]
fn bytes_unique_and_null_terminated() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        assert!(seen.insert(domain.as_bytes()), "duplicate domain bytes: {domain}");
        assert_eq!(domain.as_bytes().last(), Some(&0), "{domain} is not null-terminated");
    }
}

#[test]
fn naming_convention() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        let text = std::str::from_utf8(&bytes[..bytes.len() - 1]).unwrap();
        assert!(text.starts_with("SKYPLAN::"), "{domain}: {text}");
        assert!(text.ends_with("::V1"), "{domain}: {text}");
        assert!(
            text.chars().all(|c| c.is_ascii_uppercase() || c == '_' || c == ':' || c.is_ascii_digit()),
            "{domain}: {text}"
        );
    }
}

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

#[test]
fn no_raw_domain_literals_outside_hash_domain() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let mut files = Vec::new();
    for krate in ["kernel", "search", "harness"] {
        rust_sources(&root.join(krate).join("src"), &mut files);
    }
    assert!(!files.is_empty());

    let needle = ["SKYPLAN", "::"].concat();
    for file in files {
        if file.ends_with("hash_domain.rs") {
            continue;
        }
        let source = std::fs::read_to_string(&file).unwrap();
        assert!(
            !source.contains(&needle),
            "{} contains a raw domain literal; add a HashDomain variant instead",
            file.display()
        );
    }
}
