use std::sync::Arc;

use super::{FileRegistry, InMemoryFileRegistry};

#[test]
fn lookup_returns_registered_reference() {
    let files = InMemoryFileRegistry::new();

    let reference = files.add_blob("models/m.onnx", b"weights");

    assert_eq!(files.lookup("models/m.onnx"), Some(reference));
    assert_eq!(files.lookup("models/other.onnx"), None);
}

#[test]
fn identical_bytes_give_identical_references() {
    let files = InMemoryFileRegistry::new();

    let a = files.add_blob("a", b"same");
    let b = files.add_blob("b", b"same");
    let c = files.add_blob("c", b"different");

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn registrations_are_counted_per_name() {
    let files = InMemoryFileRegistry::new();

    files.add_blob("p.f", b"1");
    files.add_blob("p.f", b"1");
    files.add_blob("q.f", b"2");

    assert_eq!(files.registrations("p.f"), 2);
    assert_eq!(files.registrations("q.f"), 1);
    assert_eq!(files.registrations("r.f"), 0);
    assert_eq!(files.names(), vec!["p.f", "q.f"]);
}

#[test]
fn concurrent_registration() {
    let files = Arc::new(InMemoryFileRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let files = Arc::clone(&files);
            std::thread::spawn(move || {
                for j in 0..100 {
                    files.add_blob(&format!("t{i}.f{j}"), format!("{i}/{j}").as_bytes());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(files.len(), 800);
    assert_eq!(files.blob("t3.f7"), Some(b"3/7".to_vec()));
}
