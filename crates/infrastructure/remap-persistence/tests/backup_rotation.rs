use camino::Utf8PathBuf;
use chrono::NaiveDate;
use remap_persistence::{backup_file_name, make_daily_backup, prune_backups, BackupPolicy};

fn setup() -> (tempfile::TempDir, Utf8PathBuf, BackupPolicy) {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let path = root.join("profiles.json");
    let policy = BackupPolicy::beside(&path);
    (dir, path, policy)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

#[test]
fn backup_name_uses_stem_and_date() {
    let path = Utf8PathBuf::from("/tmp/profiles.json");
    assert_eq!(backup_file_name(&path, day(9)), "profiles_20261009.json");
}

#[test]
fn no_backup_without_source_file() {
    let (_dir, path, policy) = setup();
    assert!(make_daily_backup(&path, &policy, day(1)).unwrap().is_none());
    assert!(!policy.directory.exists());
}

#[test]
fn one_backup_per_day() {
    let (_dir, path, policy) = setup();
    std::fs::write(&path, "{\"profiles\": []}").unwrap();

    let first = make_daily_backup(&path, &policy, day(1)).unwrap();
    assert!(first.is_some());

    std::fs::write(&path, "{\"profiles\": [{}]}").unwrap();
    assert!(make_daily_backup(&path, &policy, day(1)).unwrap().is_none());

    let content = std::fs::read_to_string(first.unwrap()).unwrap();
    assert_eq!(content, "{\"profiles\": []}");

    assert!(make_daily_backup(&path, &policy, day(2)).unwrap().is_some());
}

#[test]
fn prune_keeps_newest_and_ignores_foreign_files() {
    let (_dir, path, mut policy) = setup();
    policy.keep = 3;
    std::fs::write(&path, "{}").unwrap();

    for d in 1..=6 {
        make_daily_backup(&path, &policy, day(d)).unwrap();
    }
    std::fs::write(policy.directory.join("notes.txt"), "keep me").unwrap();
    std::fs::write(policy.directory.join("profiles_2026.json"), "keep me").unwrap();

    let removed = prune_backups(&path, &policy).unwrap();
    assert_eq!(removed.len(), 3);

    let mut left: Vec<String> = std::fs::read_dir(&policy.directory)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    left.sort();
    assert_eq!(
        left,
        [
            "notes.txt",
            "profiles_2026.json",
            "profiles_20261004.json",
            "profiles_20261005.json",
            "profiles_20261006.json",
        ]
    );
}
