use std::error::Error;
use std::io::Write;

use skymatch::records::{count_lines, load_matches};
use skymatch::{Error as SkyError, Match};

#[test]
fn count_lines_ignores_trailing_partial_line() -> Result<(), Box<dyn Error>> {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("skymatch_records_it_count_{}.txt", std::process::id()));
    std::fs::write(&path, "0 1 0.5\n2 3 0.6\n4 5 0.7\n")?;
    assert_eq!(count_lines(&path)?, 3);

    std::fs::write(&path, "0 1 0.5\n2 3 0.6\nno newline here")?;
    assert_eq!(count_lines(&path)?, 2);

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn load_matches_parses_exact_grammar() -> Result<(), Box<dyn Error>> {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("skymatch_records_it_load_{}.txt", std::process::id()));
    let mut f = std::fs::File::create(&path)?;
    writeln!(f, "0 10 0.9999619230642")?;
    writeln!(f, "1 11 0.8660254037844")?;
    drop(f);

    let records: Vec<Match> = load_matches(&path)?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].primary_index, 0);
    assert_eq!(records[0].secondary_index, 10);
    assert!((records[0].cosdist - 0.9999619230642).abs() < 1e-12);
    assert_eq!(records[1].primary_index, 1);

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn load_matches_short_read_reports_line_and_path() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("skymatch_records_it_short_{}.txt", std::process::id()));
    std::fs::write(&path, "0 10 0.5\n1 11\n").unwrap();

    let err = load_matches(&path).unwrap_err();
    match err {
        SkyError::IoError { path: p, source } => {
            assert_eq!(p, path);
            assert!(source.to_string().contains("line 2"));
        }
        other => panic!("expected IoError, got {other:?}"),
    }
    std::fs::remove_file(&path).ok();
}

#[test]
fn count_lines_missing_file_is_io_error() {
    let err = count_lines("/definitely/not/a/real/path.txt").unwrap_err();
    assert!(matches!(err, SkyError::IoError { .. }));
}
