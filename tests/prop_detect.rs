use proptest::prelude::*;

use tabport::detect::{DEFAULT_DELIMITER, DEFAULT_QUOTE, SCAN_WINDOW_LINES, detect};
use tabport::ImportSource;

/// Lines the detector would scan: newline-terminated chunks plus a trailing
/// partial line, capped at the scan window.
fn scanned_line_count(data: &[u8]) -> usize {
    if data.is_empty() {
        return 0;
    }
    let mut lines = data.iter().filter(|&&b| b == b'\n').count();
    if *data.last().unwrap() != b'\n' {
        lines += 1;
    }
    lines.min(SCAN_WINDOW_LINES)
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        .. proptest::test_runner::Config::default()
    })]

    /// `detect` is total: arbitrary bytes never panic and always produce a
    /// complete result, with `skip_rows` inside the scanned window
    /// (`0 <= skip_rows < scanned_line_count`, or 0 when nothing scanned).
    #[test]
    fn prop_detect_is_total(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let scanned = scanned_line_count(&data);
        let d = detect(&ImportSource::from_bytes(data));
        if scanned == 0 {
            prop_assert_eq!(d.skip_rows, 0);
        } else {
            prop_assert!(d.skip_rows < scanned);
        }
    }

    #[test]
    fn prop_detect_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let src = ImportSource::from_bytes(data);
        prop_assert_eq!(detect(&src), detect(&src));
    }

    /// Fewer than two non-empty lines always yields skip_rows = 0.
    #[test]
    fn prop_single_line_never_skips(line in "[a-z0-9,;|]{0,120}") {
        let d = detect(&ImportSource::from_bytes(line.into_bytes()));
        prop_assert_eq!(d.skip_rows, 0);
    }

    /// Well-formed comma data with a keyworded header is never degraded.
    #[test]
    fn prop_clean_csv_detects_comma(rows in 1usize..20) {
        let mut data = String::from("id,name,count\n");
        for i in 0..rows {
            data.push_str(&format!("{i},row{i},{}\n", i * 2));
        }
        let d = detect(&ImportSource::from_bytes(data.into_bytes()));
        prop_assert_eq!(d.skip_rows, 0);
        prop_assert_eq!(d.delimiter, DEFAULT_DELIMITER);
        prop_assert_eq!(d.quote, DEFAULT_QUOTE);
        prop_assert!(!d.degraded);
    }
}
