use crate::*;
use crate::sketch::dimensions;
use nt_core::{CounterConfig, CounterKind, NtError};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use std::collections::HashMap;

fn small_sketch() -> SketchCounter {
    SketchCounter::new(0.01, 0.99).unwrap()
}

fn export_bytes<C: Counter>(c: &C) -> Vec<u8> {
    let mut buf = Vec::new();
    c.export(&mut buf).unwrap();
    buf
}

// ========== ExactCounter ==========

#[test]
fn test_exact_count() {
    let mut c = ExactCounter::new();
    c.add(b"truck");
    c.add(b"truck");
    c.add(b"red");
    assert_eq!(c.count(b"truck"), 2);
    assert_eq!(c.count(b"red"), 1);
    assert_eq!(c.count(b"blue"), 0);
    assert_eq!(c.len(), 2);
}

#[test]
fn test_exact_matches_true_counts() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut c = ExactCounter::new();
    let mut truth: HashMap<String, u64> = HashMap::new();
    for _ in 0..2000 {
        let key = format!("k{}", rng.gen_range(0..100));
        c.add(key.as_bytes());
        *truth.entry(key).or_insert(0) += 1;
    }
    for (k, v) in &truth {
        assert_eq!(c.count(k.as_bytes()), *v);
    }
}

#[test]
fn test_exact_export_format() {
    let mut c = ExactCounter::new();
    c.add(b"red");
    c.add(b"big_red");
    c.add(b"big_red");
    let buf = export_bytes(&c);
    assert_eq!(String::from_utf8(buf).unwrap(), "2 big_red\n1 red\n");
}

#[test]
fn test_exact_export_byte_count() {
    let c: ExactCounter = [("a", 10u64), ("bb", 2)].into_iter().collect();
    let mut buf = Vec::new();
    let n = c.export(&mut buf).unwrap();
    assert_eq!(n, buf.len());
}

#[test]
fn test_exact_round_trip() {
    let c: ExactCounter = [("big_red_truck", 1u64), ("big_red", 5), ("red", 50)].into_iter().collect();
    let buf = export_bytes(&c);
    let mut restored = ExactCounter::new();
    let n = restored.import(&mut buf.as_slice()).unwrap();
    assert_eq!(n, 3);
    assert_eq!(restored, c);
}

#[test]
fn test_exact_import_overwrites() {
    let mut c = ExactCounter::new();
    c.add(b"red");
    c.add(b"blue");
    c.import(&mut "7 red\n".as_bytes()).unwrap();
    assert_eq!(c.count(b"red"), 7);
    assert_eq!(c.count(b"blue"), 1);
}

#[test]
fn test_exact_import_tolerates_crlf_and_extra_spaces() {
    let mut c = ExactCounter::new();
    let n = c.import(&mut "3   red\r\n4\ttruck".as_bytes()).unwrap();
    assert_eq!(n, 2);
    assert_eq!(c.count(b"red"), 3);
    assert_eq!(c.count(b"truck"), 4);
}

#[test]
fn test_exact_import_wrong_field_count() {
    let mut c = ExactCounter::new();
    let err = c.import(&mut "1 red\n2 big red\n3 truck\n".as_bytes()).unwrap_err();
    match err {
        NtError::SnapshotParse { record, records_read, .. } => {
            assert_eq!(record, 2);
            assert_eq!(records_read, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    // Lines before the failure stay loaded.
    assert_eq!(c.count(b"red"), 1);
    assert_eq!(c.count(b"truck"), 0);
}

#[test]
fn test_exact_import_non_numeric_count() {
    let mut c = ExactCounter::new();
    let err = c.import(&mut "red 3\n".as_bytes()).unwrap_err();
    assert_eq!(err.records_read(), Some(0));
}

#[test]
fn test_exact_import_negative_count() {
    let mut c = ExactCounter::new();
    assert!(c.import(&mut "-1 red\n".as_bytes()).is_err());
}

#[test]
fn test_exact_import_empty_line_is_malformed() {
    let mut c = ExactCounter::new();
    let err = c.import(&mut "1 red\n\n2 blue\n".as_bytes()).unwrap_err();
    assert_eq!(err.records_read(), Some(1));
}

#[test]
fn test_exact_import_empty_stream() {
    let mut c = ExactCounter::new();
    assert_eq!(c.import(&mut "".as_bytes()).unwrap(), 0);
    assert!(c.is_empty());
}

#[test]
fn test_exact_whitespace_key_does_not_round_trip() {
    let mut c = ExactCounter::new();
    c.add(b"big red");
    let buf = export_bytes(&c);
    assert!(ExactCounter::new().import(&mut buf.as_slice()).is_err());
}

// ========== SketchCounter ==========

#[test]
fn test_dimensions() {
    let (w, d) = dimensions(0.01, 0.99);
    assert_eq!(w, 272);
    assert_eq!(d, 5);
    let (_, d) = dimensions(0.5, 0.1);
    assert_eq!(d, 1);
}

#[test]
fn test_sketch_rejects_bad_params() {
    assert!(SketchCounter::new(0.0, 0.99).is_err());
    assert!(SketchCounter::new(0.01, 1.0).is_err());
}

#[test]
fn test_sketch_rejects_oversized_table() {
    assert!(matches!(SketchCounter::new(1e-300, 0.5), Err(NtError::InvalidConfig(_))));
    assert!(matches!(SketchCounter::new(1e-12, 0.99), Err(NtError::InvalidConfig(_))));
    let cfg = CounterConfig::sketch(1e-300, 0.5);
    assert!(FrequencyCounter::from_config(&cfg).is_err());
}

#[test]
fn test_sketch_unseen_is_zero() {
    let c = small_sketch();
    assert_eq!(c.count(b"anything"), 0);
}

#[test]
fn test_sketch_never_undercounts() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut c = small_sketch();
    let mut truth: HashMap<String, u64> = HashMap::new();
    for _ in 0..5000 {
        let key = format!("token{}", rng.gen_range(0..1000));
        c.add(key.as_bytes());
        *truth.entry(key).or_insert(0) += 1;
    }
    assert_eq!(c.total(), 5000);
    for (k, v) in &truth {
        assert!(c.count(k.as_bytes()) >= *v, "undercount for {k}");
    }
}

#[test]
fn test_sketch_count_monotonic() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut c = SketchCounter::new(0.1, 0.9).unwrap();
    let probe = b"probe";
    let mut last = 0;
    for i in 0..500 {
        if i % 7 == 0 {
            c.add(probe);
        } else {
            c.add(format!("n{}", rng.gen::<u32>()).as_bytes());
        }
        let now = c.count(probe);
        assert!(now >= last);
        last = now;
    }
}

#[test]
fn test_sketch_exact_when_sparse() {
    let mut c = small_sketch();
    for _ in 0..5 {
        c.add(b"big_red");
    }
    c.add(b"truck");
    assert_eq!(c.count(b"big_red"), 5);
    assert_eq!(c.count(b"truck"), 1);
}

#[test]
fn test_sketch_error_bound() {
    let mut c = SketchCounter::new(0.01, 0.99).unwrap();
    for i in 0..1000 {
        c.add(format!("k{i}").as_bytes());
    }
    assert!((c.error_bound() - 10.0).abs() < 1e-9);
}

#[test]
fn test_sketch_round_trip() {
    let mut c = small_sketch();
    let keys: Vec<String> = (0..300).map(|i| format!("key{}", i % 40)).collect();
    for k in &keys {
        c.add(k.as_bytes());
    }
    let mut buf = Vec::new();
    let written = c.export(&mut buf).unwrap();
    assert_eq!(written, buf.len());

    let mut restored = SketchCounter::new(0.5, 0.5).unwrap();
    let cells = restored.import(&mut buf.as_slice()).unwrap();
    assert_eq!(cells, c.width() * c.depth());
    assert_eq!(restored.width(), c.width());
    assert_eq!(restored.depth(), c.depth());
    assert_eq!(restored.total(), c.total());
    for k in &keys {
        assert_eq!(restored.count(k.as_bytes()), c.count(k.as_bytes()));
    }
    assert_eq!(restored, c);
}

#[test]
fn test_sketch_seed_survives_round_trip() {
    let mut c = SketchCounter::with_seed(0.05, 0.9, 1234).unwrap();
    c.add(b"x");
    let buf = export_bytes(&c);
    let (restored, _) = SketchCounter::read_from(&mut buf.as_slice()).unwrap();
    assert_eq!(restored.seed(), 1234);
    assert_eq!(restored.count(b"x"), 1);
}

#[test]
fn test_sketch_import_truncated() {
    let mut c = small_sketch();
    c.add(b"red");
    let mut buf = export_bytes(&c);
    buf.truncate(buf.len() - 4);

    let mut target = small_sketch();
    target.add(b"keep");
    let err = target.import(&mut buf.as_slice()).unwrap_err();
    assert!(matches!(err, NtError::SnapshotParse { .. }));
    assert_eq!(err.records_read(), Some(c.width() * c.depth() - 1));
    // Failed import leaves state untouched.
    assert_eq!(target.count(b"keep"), 1);
}

#[test]
fn test_sketch_import_truncated_header() {
    let buf = export_bytes(&small_sketch());
    let err = SketchCounter::read_from(&mut &buf[..10]).unwrap_err();
    assert_eq!(err.records_read(), Some(0));
}

#[test]
fn test_sketch_import_unknown_version() {
    let mut buf = export_bytes(&small_sketch());
    buf[5] = 9;
    let err = SketchCounter::read_from(&mut buf.as_slice()).unwrap_err();
    assert!(matches!(err, NtError::SnapshotParse { .. }));
    assert!(err.to_string().contains("version 9"));
}

#[test]
fn test_sketch_import_invalid_parameters() {
    let mut buf = export_bytes(&small_sketch());
    // epsilon follows magic and version
    buf[6..14].copy_from_slice(&f64::NAN.to_le_bytes());
    assert!(matches!(
        SketchCounter::read_from(&mut buf.as_slice()),
        Err(NtError::SnapshotParse { .. })
    ));

    let mut buf = export_bytes(&small_sketch());
    buf[14..22].copy_from_slice(&1.5f64.to_le_bytes());
    assert!(matches!(
        SketchCounter::read_from(&mut buf.as_slice()),
        Err(NtError::SnapshotParse { .. })
    ));
}

#[test]
fn test_sketch_import_bad_magic() {
    let mut buf = export_bytes(&small_sketch());
    buf[0] = b'X';
    assert!(matches!(
        SketchCounter::read_from(&mut buf.as_slice()),
        Err(NtError::SnapshotParse { .. })
    ));
}

#[test]
fn test_sketch_import_zero_dimensions() {
    let mut buf = export_bytes(&small_sketch());
    // width field follows magic, version, epsilon and confidence
    buf[22..30].copy_from_slice(&0u64.to_le_bytes());
    assert!(SketchCounter::read_from(&mut buf.as_slice()).is_err());
}

#[test]
fn test_sketch_import_exact_snapshot_fails() {
    let mut c = small_sketch();
    assert!(c.import(&mut "3 red\n".as_bytes()).is_err());
}

// ========== FrequencyCounter ==========

#[test]
fn test_frequency_from_config() {
    let exact = FrequencyCounter::from_config(&CounterConfig::exact()).unwrap();
    assert_eq!(exact.kind(), CounterKind::Exact);
    let sketch = FrequencyCounter::from_config(&CounterConfig::sketch(0.01, 0.9)).unwrap();
    assert_eq!(sketch.kind(), CounterKind::Sketch);
    assert!(FrequencyCounter::from_config(&CounterConfig::sketch(2.0, 0.9)).is_err());
}

#[test]
fn test_frequency_delegates() {
    for cfg in [CounterConfig::exact(), CounterConfig::sketch(0.01, 0.99)] {
        let mut c = FrequencyCounter::from_config(&cfg).unwrap();
        c.add(b"red");
        c.add(b"red");
        assert_eq!(c.count(b"red"), 2);
        assert_eq!(c.count(b"blue"), 0);
    }
}

#[test]
fn test_counter_as_trait_object() {
    let mut counters: Vec<Box<dyn Counter>> = Vec::new();
    counters.push(Box::new(ExactCounter::new()));
    counters.push(Box::new(small_sketch()));
    for c in counters.iter_mut() {
        c.add(b"truck");
        assert!(c.count(b"truck") >= 1);
    }
}

// ========== Snapshot files ==========

#[test]
fn test_snapshot_round_trip_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.txt");
    let c: FrequencyCounter = [("red", 50u64), ("truck", 3)].into_iter().collect::<ExactCounter>().into();
    let written = save_snapshot(&path, &c).unwrap();
    assert_eq!(written, std::fs::metadata(&path).unwrap().len() as usize);
    assert!(!path.with_extension("tmp").exists());

    let loaded = load_snapshot(&path, &CounterConfig::exact()).unwrap();
    assert_eq!(loaded.count(b"red"), 50);
    assert_eq!(loaded.count(b"truck"), 3);
}

#[test]
fn test_snapshot_round_trip_sketch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("counts.cms");
    let mut c = SketchCounter::new(0.01, 0.9).unwrap();
    for _ in 0..4 {
        c.add(b"red_truck");
    }
    save_snapshot(&path, &c).unwrap();

    // Dimensions come from the file, not the config.
    let loaded = load_snapshot(&path, &CounterConfig::sketch(0.5, 0.5)).unwrap();
    assert_eq!(loaded.count(b"red_truck"), 4);
    match loaded {
        FrequencyCounter::Sketch(s) => assert_eq!(s.width(), c.width()),
        other => panic!("expected sketch, got {:?}", other.kind()),
    }
}

#[test]
fn test_snapshot_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_snapshot(dir.path().join("missing"), &CounterConfig::exact()).unwrap_err();
    assert!(matches!(err, NtError::SnapshotOpen { .. }));
}

#[test]
fn test_snapshot_parse_error_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.txt");
    std::fs::write(&path, "1 red\nnot-a-number truck\n").unwrap();
    let err = load_snapshot(&path, &CounterConfig::exact()).unwrap_err();
    assert_eq!(err.records_read(), Some(1));
}
