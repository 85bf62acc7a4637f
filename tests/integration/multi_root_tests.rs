use std::fs;
use std::path::Path;

use tempfile::{tempdir, TempDir};
use treecmp::compare::{CompareConfig, Comparer, Status};
use treecmp::roots::{resolve_roots, LabelStyle, Root};

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn labelled(dirs: &[(&str, &TempDir)]) -> Vec<Root> {
    dirs.iter()
        .map(|(label, dir)| Root::new(*label, dir.path(), true))
        .collect()
}

#[test]
fn test_two_equal_one_different() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let c = tempdir().unwrap();
    write(a.path(), "x/foo.py", b"1");
    write(b.path(), "y/foo.py", b"1");
    write(c.path(), "z/foo.py", b"2");

    let roots = labelled(&[("A", &a), ("B", &b), ("C", &c)]);
    let (records, _) = Comparer::with_defaults().compare(&roots).unwrap();

    assert_eq!(records.len(), 1);
    let foo = &records[0];
    assert_eq!(foo.presence(), vec![true, true, true]);
    assert_eq!(foo.status, Status::AllExist);
    assert_eq!(foo.group_ids(), vec![Some(1), Some(1), Some(2)]);
    assert_eq!(foo.group_summary, "G1:A,B;G2:C");
    assert_eq!(foo.num_groups, 2);
}

#[test]
fn test_identical_everywhere_is_one_group() {
    let dirs: Vec<TempDir> = (0..4).map(|_| tempdir().unwrap()).collect();
    for (i, dir) in dirs.iter().enumerate() {
        write(dir.path(), &format!("level{i}/common.py"), b"print('same')\n");
    }

    let roots: Vec<Root> = dirs
        .iter()
        .enumerate()
        .map(|(i, d)| Root::new(format!("r{i}"), d.path(), true))
        .collect();
    let (records, summary) = Comparer::with_defaults().compare(&roots).unwrap();

    assert_eq!(records[0].status, Status::AllExist);
    assert_eq!(records[0].num_groups, 1);
    assert_eq!(records[0].group_summary, "G1:r0,r1,r2,r3");
    assert_eq!(summary.divergent_keys, 0);
    assert_eq!(summary.keys_everywhere, 1);
}

#[test]
fn test_all_different_gives_n_groups() {
    let dirs: Vec<TempDir> = (0..3).map(|_| tempdir().unwrap()).collect();
    for (i, dir) in dirs.iter().enumerate() {
        write(dir.path(), "mod.py", format!("v = {i}\n").as_bytes());
    }

    let roots: Vec<Root> = dirs
        .iter()
        .enumerate()
        .map(|(i, d)| Root::new(format!("p{}", i + 1), d.path(), true))
        .collect();
    let (records, _) = Comparer::with_defaults().compare(&roots).unwrap();

    assert_eq!(records[0].num_groups, 3);
    assert_eq!(records[0].group_summary, "G1:p1;G2:p2;G3:p3");
}

#[test]
fn test_partial_presence_status_and_row_order() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let c = tempdir().unwrap();
    write(a.path(), "zeta.py", b"z");
    write(c.path(), "zeta.py", b"z");
    write(b.path(), "alpha.py", b"a");
    write(a.path(), "mid.py", b"m");
    write(b.path(), "mid.py", b"m");
    write(c.path(), "mid.py", b"m");

    let roots = labelled(&[("A", &a), ("B", &b), ("C", &c)]);
    let (records, _) = Comparer::with_defaults().compare(&roots).unwrap();

    let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["alpha.py", "mid.py", "zeta.py"]);

    let statuses: Vec<_> = records.iter().map(|r| r.status.to_string()).collect();
    assert_eq!(statuses, vec!["B", "all_exist", "A_C"]);
    assert_eq!(records[2].group_ids(), vec![Some(1), None, Some(1)]);
}

#[test]
fn test_empty_root_shows_absent() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write(a.path(), "foo.py", b"x");

    let roots = labelled(&[("A", &a), ("B", &b)]);
    let (records, summary) = Comparer::with_defaults().compare(&roots).unwrap();

    assert_eq!(records[0].presence(), vec![true, false]);
    assert_eq!(records[0].status.to_string(), "A");
    assert_eq!(records[0].group_summary, "G1:A");
    assert!(!summary.has_warnings());
}

#[test]
fn test_collision_paths_recorded_in_order() {
    let a = tempdir().unwrap();
    write(a.path(), "b/dup.py", b"same");
    write(a.path(), "a/dup.py", b"same");
    write(a.path(), "a/z/dup.py", b"other");

    let (index, _) = Comparer::with_defaults()
        .index_root(&Root::new("A", a.path(), true))
        .unwrap();
    let entry = index.get("dup.py").unwrap();

    assert_eq!(entry.relative_path, "a/dup.py");
    assert_eq!(entry.collisions, vec!["a/dup.py", "a/z/dup.py", "b/dup.py"]);
    assert_eq!(entry.collisions[0], entry.relative_path);
}

#[test]
fn test_hidden_and_symlinked_files_excluded() {
    let a = tempdir().unwrap();
    write(a.path(), "visible.py", b"v");
    write(a.path(), ".hidden.py", b"h");
    write(a.path(), ".venv/lib/site.py", b"s");

    #[cfg(unix)]
    std::os::unix::fs::symlink(a.path().join("visible.py"), a.path().join("link.py")).unwrap();

    let (records, _) = Comparer::with_defaults()
        .compare(&[Root::new("A", a.path(), true)])
        .unwrap();

    let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["visible.py"]);
}

#[test]
fn test_dot_named_roots_are_compared() {
    let parent = tempdir().unwrap();
    let a = parent.path().join(".proj_a");
    let b = parent.path().join("proj_b");
    write(&a, "x/foo.py", b"same");
    write(&a, "x/.git/hook.py", b"ignored");
    write(&b, "x/foo.py", b"same");

    let raw = vec![
        a.to_string_lossy().into_owned(),
        b.to_string_lossy().into_owned(),
    ];
    let (roots, problems) = resolve_roots(raw, LabelStyle::Path);
    assert!(problems.is_empty());

    let (records, summary) = Comparer::with_defaults().compare(&roots).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].presence(), vec![true, true]);
    assert_eq!(records[0].status, Status::AllExist);
    assert_eq!(records[0].num_groups, 1);
    assert!(!summary.has_warnings());
}

#[test]
fn test_invalid_roots_keep_their_column() {
    let a = tempdir().unwrap();
    write(a.path(), "foo.py", b"x");
    let file_root = a.path().join("foo.py");

    let raw = vec![
        a.path().to_string_lossy().into_owned(),
        a.path().join("nope").to_string_lossy().into_owned(),
        file_root.to_string_lossy().into_owned(),
    ];
    let (roots, problems) = resolve_roots(raw, LabelStyle::Ordinal);
    assert_eq!(problems.len(), 2);

    let (records, summary) = Comparer::with_defaults().compare(&roots).unwrap();

    assert_eq!(records[0].cells.len(), 3);
    assert_eq!(records[0].presence(), vec![true, false, false]);
    assert_eq!(records[0].status.to_string(), "p1");
    assert_eq!(summary.invalid_roots(), 2);
    assert!(summary.has_warnings());
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let a = tempdir().unwrap();
    write(a.path(), "ok/fine.py", b"f");
    write(a.path(), "locked/secret.py", b"s");
    let locked = a.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Running as root bypasses permissions; nothing to test then
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = Comparer::with_defaults().compare(&[Root::new("A", a.path(), true)]);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (records, summary) = result.unwrap();
    let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["fine.py"]);
    assert_eq!(summary.skipped_directories(), 1);
    assert!(summary.has_warnings());
}

#[test]
fn test_rerun_is_identical_across_thread_counts() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    for i in 0..40 {
        write(a.path(), &format!("pkg{}/sub{}/m{}.py", i % 5, i % 3, i % 11), &[i as u8]);
        write(b.path(), &format!("lib{}/m{}.py", i % 4, i % 13), &[(i % 3) as u8]);
    }
    let roots = labelled(&[("A", &a), ("B", &b)]);

    let serial = Comparer::new(CompareConfig::default().with_io_threads(1))
        .compare(&roots)
        .unwrap()
        .0;
    let parallel = Comparer::new(CompareConfig::default().with_io_threads(8))
        .compare(&roots)
        .unwrap()
        .0;

    assert_eq!(serial, parallel);
}

#[test]
fn test_large_file_spanning_chunks() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let mut content = vec![7u8; 3 * 1024 * 1024 + 17];
    write(a.path(), "big.py", &content);
    content[2 * 1024 * 1024 + 5] = 8;
    write(b.path(), "big.py", &content);

    let roots = labelled(&[("A", &a), ("B", &b)]);
    let (records, _) = Comparer::with_defaults().compare(&roots).unwrap();

    assert_eq!(records[0].num_groups, 2);
}
