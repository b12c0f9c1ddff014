use super::*;

use burrow_engine::{NodeId, RecordId};

fn row(name: &str, depth: usize, is_dir: bool) -> RecordView {
    RecordView {
        node: NodeId(0),
        record: RecordId(0),
        depth,
        name: name.to_owned(),
        size: if is_dir { 0 } else { 42 },
        date: "2024-01-01".to_owned(),
        time: "12:00:00".to_owned(),
        is_dir,
        scan_index: 1,
        selected: false,
    }
}

fn ctx<'a>(dir: &'a Path, stats: Option<&'a FillStats>) -> PrintContext<'a> {
    PrintContext {
        kind: "tree",
        window: WindowId(1),
        directory: dir,
        stats,
        elapsed: Duration::from_millis(3),
        reads: 2,
    }
}

fn plain() -> PrinterConfig {
    PrinterConfig {
        color: ColorChoice::Never,
        ..PrinterConfig::default()
    }
}

#[test]
fn human_rows_are_indented_by_depth() {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let dir = Path::new("/tmp/root");
    let stats = FillStats {
        directories: 2,
        records: 2,
        ..FillStats::default()
    };

    HumanPrinter::new(&mut out, &mut err, plain())
        .print_all(&[row("docs", 0, true), row("readme.md", 1, false)], &ctx(dir, Some(&stats)))
        .expect("print");

    let out = String::from_utf8(out).expect("utf8");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "/tmp/root");
    assert!(lines[1].ends_with("  docs/"));
    assert!(lines[2].ends_with("    readme.md"));
    assert!(lines[2].contains("42 2024-01-01 12:00:00"));

    let err = String::from_utf8(err).expect("utf8");
    assert!(err.contains("[tree] window w1: 2 records in 2 directories"));
}

#[test]
fn human_colors_directories_only_when_asked() {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let cfg = PrinterConfig {
        color: ColorChoice::Always,
        show_summary: false,
        ..PrinterConfig::default()
    };

    HumanPrinter::new(&mut out, &mut err, cfg)
        .print_all(&[row("src", 0, true), row("a.txt", 0, false)], &ctx(Path::new("/r"), None))
        .expect("print");

    let out = String::from_utf8(out).expect("utf8");
    assert!(out.contains("\x1b[1;34msrc/\x1b[0m"));
    assert!(out.lines().last().expect("row").ends_with("a.txt"));
    assert!(err.is_empty(), "summary suppressed");
}

#[test]
fn human_summary_notes_an_unfinished_window() {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    HumanPrinter::new(&mut out, &mut err, plain())
        .finish(&ctx(Path::new("/r"), None))
        .expect("finish");

    let err = String::from_utf8(err).expect("utf8");
    assert!(err.contains("closed before population finished"));
}

#[test]
fn json_writes_one_object_per_row() {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let stats = FillStats {
        records: 1,
        ..FillStats::default()
    };
    let cfg = PrinterConfig {
        format: OutputFormat::Json,
        ..plain()
    };

    JsonPrinter::new(&mut out, &mut err, cfg)
        .print_all(&[row("a.txt", 0, false)], &ctx(Path::new("/r"), Some(&stats)))
        .expect("print");

    let out = String::from_utf8(out).expect("utf8");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 1);

    let v: serde_json::Value = serde_json::from_str(lines[0]).expect("json");
    assert_eq!(v["kind"], "tree");
    assert_eq!(v["record"]["name"], "a.txt");
    assert_eq!(v["record"]["size"], 42);

    let summary: serde_json::Value =
        serde_json::from_str(String::from_utf8(err).expect("utf8").trim()).expect("json");
    assert_eq!(summary["type"], "summary");
    assert_eq!(summary["stats"]["records"], 1);
    assert_eq!(summary["reads"], 2);
}
