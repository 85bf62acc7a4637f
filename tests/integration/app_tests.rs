use std::fs;
use std::path::Path;

use clap::Parser;
use tempfile::tempdir;
use treecmp::cli::Cli;
use treecmp::error::{exit_code_for, ExitCode};
use treecmp::run_app;

use crate::{clear_env, ENV_MUTEX};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Parse `treecmp --no-progress --config <absent> <args...>`.
fn cli(config_dir: &Path, args: &[String]) -> Cli {
    let mut argv = vec![
        "treecmp".to_string(),
        "--no-progress".to_string(),
        "--config".to_string(),
        config_dir.join("absent.toml").to_string_lossy().into_owned(),
    ];
    argv.extend(args.iter().cloned());
    Cli::try_parse_from(argv).unwrap()
}

fn s(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_csv_report_written() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let work = tempdir().unwrap();
    let a = work.path().join("one/app");
    let b = work.path().join("two/app");
    write(&a, "x/foo.py", "1");
    write(&b, "y/foo.py", "1");
    write(&b, "only_b.py", "b");
    let out = work.path().join("reports/out.csv");

    let code = run_app(cli(
        work.path(),
        &["compare".into(), s(&a), s(&b), "--out".into(), s(&out)],
    ))
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    let csv = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "file_name,path_one_app,sha_one_app,collision_one_app,exists_one_app,\
         path_two_app,sha_two_app,collision_two_app,exists_two_app,\
         status,group_one_app,group_two_app,group_summary,num_groups"
    );
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "foo.py,x/foo.py,6b86b273ff34,,true,y/foo.py,6b86b273ff34,,true,\
         all_exist,1,1,\"G1:one_app,two_app\",1"
    );
    assert!(lines[2].starts_with("only_b.py,,,,false,only_b.py,"));
}

#[test]
fn test_json_report_with_list_file_and_ordinal_labels() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let work = tempdir().unwrap();
    let a = work.path().join("a");
    let b = work.path().join("b");
    write(&a, "m.py", "one");
    write(&b, "m.py", "two");
    let list = work.path().join("roots.txt");
    fs::write(&list, format!("# roots\n{}\n\n{}\n{}\n", s(&a), s(&b), s(&a))).unwrap();
    let out = work.path().join("out.json");

    let code = run_app(cli(
        work.path(),
        &[
            "compare".into(),
            "--list".into(),
            s(&list),
            "--format".into(),
            "json".into(),
            "--labels".into(),
            "ordinal".into(),
            "--out".into(),
            s(&out),
        ],
    ))
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["roots"].as_array().unwrap().len(), 2);
    assert_eq!(json["roots"][1]["label"], "p2");
    assert_eq!(json["records"][0]["group_summary"], "G1:p1;G2:p2");
    assert_eq!(json["summary"]["divergent_keys"], 1);
    assert_eq!(json["summary"]["exit_code_name"], "TC000");
}

#[test]
fn test_invalid_root_is_partial_success() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let work = tempdir().unwrap();
    let a = work.path().join("a");
    write(&a, "foo.py", "x");
    let out = work.path().join("out.csv");

    let code = run_app(cli(
        work.path(),
        &[
            "compare".into(),
            s(&a),
            s(&work.path().join("missing")),
            "--labels".into(),
            "ordinal".into(),
            "--out".into(),
            s(&out),
        ],
    ))
    .unwrap();
    assert_eq!(code, ExitCode::PartialSuccess);

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.lines().next().unwrap().contains("exists_p2"));
    assert!(csv.lines().nth(1).unwrap().contains(",false,p1,1,,G1:p1,1"));
}

#[test]
fn test_no_roots_is_usage_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let work = tempdir().unwrap();

    let err = run_app(cli(work.path(), &["compare".into()])).unwrap_err();
    assert_eq!(exit_code_for(&err), ExitCode::UsageError);
}

#[test]
fn test_missing_list_file_is_usage_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let work = tempdir().unwrap();

    let err = run_app(cli(
        work.path(),
        &["compare".into(), "--list".into(), s(&work.path().join("none.txt"))],
    ))
    .unwrap_err();
    assert_eq!(exit_code_for(&err), ExitCode::UsageError);
}

#[test]
fn test_bad_extensions_is_usage_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let work = tempdir().unwrap();

    let err = run_app(cli(
        work.path(),
        &["compare".into(), s(work.path()), "--ext".into(), "py".into()],
    ))
    .unwrap_err();
    assert_eq!(exit_code_for(&err), ExitCode::UsageError);
}

#[test]
fn test_rerun_produces_identical_csv() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let work = tempdir().unwrap();
    let a = work.path().join("a");
    let b = work.path().join("b");
    for i in 0..15 {
        write(&a, &format!("d{}/f{}.py", i % 4, i % 6), &i.to_string());
        write(&b, &format!("e{}/f{}.py", i % 2, i % 9), &(i % 3).to_string());
    }
    let first = work.path().join("first.csv");
    let second = work.path().join("second.csv");

    for out in [&first, &second] {
        run_app(cli(
            work.path(),
            &["compare".into(), s(&a), s(&b), "--out".into(), s(out)],
        ))
        .unwrap();
    }

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_config_file_settings_apply() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let work = tempdir().unwrap();
    let a = work.path().join("a");
    write(&a, "keep.rs", "fn main() {}");
    write(&a, "skip.py", "pass");
    let out = work.path().join("out.csv");
    let config = work.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "extensions = [\".rs\"]\nfingerprint_width = 4\nout = \"{}\"\n",
            s(&out).replace('\\', "\\\\")
        ),
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "treecmp".to_string(),
        "--no-progress".to_string(),
        "--config".to_string(),
        s(&config),
        "compare".to_string(),
        s(&a),
    ])
    .unwrap();
    run_app(cli).unwrap();

    let csv = fs::read_to_string(&out).unwrap();
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].starts_with("keep.rs,keep.rs,"));
    let sha = rows[0].split(',').nth(2).unwrap();
    assert_eq!(sha.len(), 4);
}
