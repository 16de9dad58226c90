use std::fs;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use git2::{Repository, Signature, Time};
use tempfile::TempDir;

use folio_engine::{
    CancelToken, ContributionConfig, Engine, EngineError, FileCategory, Identity, IssueKind,
    Profile, ProjectType,
};

// 2024-03-15 12:00:00 UTC
const T0: i64 = 1710504000;
const DAY: i64 = 86_400;

fn commit_file(
    repo: &Repository,
    name: &str,
    content: &str,
    author: (&str, &str),
    message: &str,
    time_secs: i64,
) {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let abs = workdir.join(name);
    if let Some(parent) = abs.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&abs, content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = Signature::new(author.0, author.1, &Time::new(time_secs, 0)).unwrap();
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap();
}

#[test]
fn test_same_tree_scans_identically() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir(root.join("src")).unwrap();
    fs::write(root.join("src/main.rs"), "fn main() {}\n").unwrap();
    fs::write(root.join("src/lib.rs"), "pub mod x;\n").unwrap();
    fs::write(root.join("notes.md"), "# notes\n").unwrap();

    let engine = Engine::default();
    let a = engine.scan(root, &CancelToken::new()).unwrap();
    let b = engine.scan(root, &CancelToken::new()).unwrap();

    let paths_a: Vec<_> = a.files.iter().map(|f| &f.path).collect();
    let paths_b: Vec<_> = b.files.iter().map(|f| &f.path).collect();
    assert_eq!(paths_a, paths_b);

    let hashes_a: Vec<_> = a.files.iter().map(|f| f.hash).collect();
    let hashes_b: Vec<_> = b.files.iter().map(|f| f.hash).collect();
    assert_eq!(hashes_a, hashes_b);

    assert_eq!(a.summary.total_files, b.summary.total_files);
    assert_eq!(a.summary.total_bytes, b.summary.total_bytes);
}

#[test]
fn test_duplicate_group_with_wasted_bytes() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let body = "x".repeat(300);
    fs::write(root.join("a.py"), &body).unwrap();
    fs::write(root.join("b.py"), &body).unwrap();
    fs::write(root.join("c.txt"), "different content here").unwrap();

    let engine = Engine::default();
    let result = engine.scan(root, &CancelToken::new()).unwrap();

    assert_eq!(result.duplicates.len(), 1);
    let group = &result.duplicates[0];
    assert_eq!(group.size, 300);
    assert_eq!(group.wasted_bytes, 300);
    assert_eq!(group.paths, vec![PathBuf::from("a.py"), PathBuf::from("b.py")]);
    assert_eq!(result.summary.wasted_bytes, 300);
    assert_eq!(result.total_wasted_bytes(), 300);
}

#[test]
fn test_git_repository_analysis_end_to_end() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let repo = Repository::init(root.join("proj")).unwrap();
    for i in 0..3 {
        commit_file(
            &repo,
            &format!("src/f{i}.rs"),
            "pub fn f() {}\n",
            ("Alice", "alice@x.com"),
            "work",
            T0 + i * 3600,
        );
    }
    commit_file(&repo, "fix.rs", "fn fix() {}\n", ("Bob", "bob@y.com"), "fix", T0 + DAY);

    let engine = Engine::default();
    let result = engine.scan(root, &CancelToken::new()).unwrap();

    assert_eq!(result.repositories.len(), 1);
    let record = &result.repositories[0];
    assert_eq!(record.root, PathBuf::from("proj"));
    assert_eq!(record.commit_count, 4);
    assert_eq!(record.project_type, ProjectType::Collaborative);
    assert_eq!(record.contributors[0].identity.name, "Alice");
    assert_eq!(record.contributors[0].commit_count, 3);
    assert_eq!(result.summary.repository_count, 1);
}

#[test]
fn test_nested_repositories_are_independent_roots() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let outer = Repository::init(root).unwrap();
    commit_file(&outer, "top.rs", "fn t() {}\n", ("Alice", "alice@x.com"), "top", T0);
    let inner = Repository::init(root.join("vendor/lib")).unwrap();
    commit_file(&inner, "inner.py", "x = 1\n", ("Bob", "bob@y.com"), "inner", T0);

    let engine = Engine::default();
    let result = engine.scan(root, &CancelToken::new()).unwrap();

    let roots: Vec<_> = result.repositories.iter().map(|r| r.root.clone()).collect();
    assert_eq!(roots, vec![PathBuf::new(), PathBuf::from("vendor/lib")]);
    // Each history is read from its own root only.
    assert_eq!(result.repositories[0].commit_count, 1);
    assert_eq!(result.repositories[1].commit_count, 1);
    assert_eq!(result.repositories[1].contributors[0].identity.name, "Bob");
}

#[test]
fn test_rescan_reuses_unchanged_content() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("stable.rs"), "fn stable() {}\n").unwrap();
    fs::write(root.join("volatile.rs"), "fn v1() {}\n").unwrap();

    let engine = Engine::default();
    let first = engine.scan(root, &CancelToken::new()).unwrap();
    assert_eq!(first.summary.files_hashed, 2);
    assert_eq!(first.summary.files_reused, 0);

    // Grow the file so size (and mtime) change.
    fs::write(root.join("volatile.rs"), "fn v1() {}\nfn v2() {}\n").unwrap();
    let second = engine.rescan(root, &first, &CancelToken::new()).unwrap();

    // Only the changed file is re-read.
    assert_eq!(second.summary.files_hashed, 1);
    assert_eq!(second.summary.files_reused, 1);

    let stable_before = first.file(Path::new("stable.rs")).unwrap();
    let stable_after = second.file(Path::new("stable.rs")).unwrap();
    assert_eq!(stable_before.hash, stable_after.hash);

    let volatile_before = first.file(Path::new("volatile.rs")).unwrap();
    let volatile_after = second.file(Path::new("volatile.rs")).unwrap();
    assert_ne!(volatile_before.hash, volatile_after.hash);
    assert!(volatile_after.hash.is_some());

    // The prior result is untouched.
    assert_eq!(first.files.len(), 2);
    assert!(second.summary.complete);
}

#[test]
fn test_cancelled_scan_returns_partial_result() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.rs"), "fn a() {}\n").unwrap();

    let engine = Engine::default();
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = engine.scan(temp.path(), &cancel).unwrap();
    assert!(!result.summary.complete);
    assert!(result.skills.is_empty());
}

#[test]
fn test_missing_root_is_fatal() {
    let engine = Engine::default();
    let result = engine.scan(
        Path::new("/definitely/not/a/real/root"),
        &CancelToken::new(),
    );
    assert!(matches!(result, Err(EngineError::RootNotFound { .. })));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_issue_not_failure() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("open.rs"), "fn open() {}\n").unwrap();
    let locked = root.join("locked.rs");
    fs::write(&locked, "fn locked() {}\n").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let engine = Engine::default();
    let result = engine.scan(root, &CancelToken::new()).unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    // Root bypasses permissions; assert only when the OS enforced them.
    if result.has_issues() {
        let issue = result
            .issues
            .iter()
            .find(|i| i.path == PathBuf::from("locked.rs"))
            .expect("issue for locked file");
        assert_eq!(issue.kind, IssueKind::PermissionDenied);
    }
    let open = result.file(Path::new("open.rs")).unwrap();
    assert!(open.hash.is_some());
}

#[test]
fn test_skill_proficiency_saturates() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for i in 0..5 {
        fs::write(
            root.join(format!("m{i}.py")),
            "class Handler(Base):\n    pass\n",
        )
        .unwrap();
    }

    let engine = Engine::default();
    let result = engine.scan(root, &CancelToken::new()).unwrap();

    let skill = result
        .skills
        .iter()
        .find(|s| s.name == "Inheritance")
        .expect("inheritance skill");
    assert_eq!(skill.evidence.len(), 5);
    assert_eq!(skill.proficiency, 1.0);

    // No zero-evidence entries anywhere.
    assert!(result.skills.iter().all(|s| !s.evidence.is_empty()));
}

#[test]
fn test_contribution_reports_share_and_activity() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let repo = Repository::init(root.join("proj")).unwrap();
    for i in 0..3 {
        commit_file(
            &repo,
            &format!("src/f{i}.rs"),
            "pub fn f() {}\n",
            ("Alice", "alice@x.com"),
            "work",
            T0 + i * 3600,
        );
    }
    commit_file(
        &repo,
        "tests/it.rs",
        "#[test]\nfn t() {}\n",
        ("Bob", "bob@y.com"),
        "test",
        T0 + DAY,
    );

    let engine = Engine::default();
    let result = engine.scan(root, &CancelToken::new()).unwrap();

    let config = ContributionConfig::builder()
        .caller(Some(Identity::new("Alice", "alice@x.com")))
        .reference_time(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        .build()
        .unwrap();
    let reports = engine.contribution_reports(&result, config);

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.total_commits, 4);
    assert_eq!(report.own_commit_share, Some(0.75));
    assert!(report.activity.code >= 3);
    assert_eq!(report.activity.test, 1);
    assert!(report.rank_score > 0.0 && report.rank_score <= 1.0);
}

#[test]
fn test_unmatched_caller_share_is_null_in_json() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let repo = Repository::init(root.join("proj")).unwrap();
    commit_file(&repo, "a.rs", "fn a() {}\n", ("Alice", "alice@x.com"), "one", T0);

    let engine = Engine::default();
    let result = engine.scan(root, &CancelToken::new()).unwrap();

    let config = ContributionConfig::builder()
        .caller(Some(Identity::new("Nobody", "nobody@nowhere.dev")))
        .reference_time(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        .build()
        .unwrap();
    let reports = engine.contribution_reports(&result, config);

    assert_eq!(reports[0].own_commit_share, None);
    let json = serde_json::to_value(&reports[0]).unwrap();
    assert!(json["own_commit_share"].is_null());
}

#[test]
fn test_scan_result_serializes_to_json() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("main.rs"), "fn main() {}\n").unwrap();
    fs::write(root.join("readme.md"), "# hello\n").unwrap();

    let engine = Engine::default();
    let result = engine.scan(root, &CancelToken::new()).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["summary"]["total_files"], 2);
    assert!(json["files"][0]["path"].is_string());
    assert_eq!(json["profile"]["name"], "default");
}

#[test]
fn test_profile_filters_apply() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("keep.rs"), "fn keep() {}\n").unwrap();
    fs::write(root.join("skip.js"), "var x = 1;\n").unwrap();

    let profile = Profile::builder()
        .allowed_extensions(vec!["rs".to_string()])
        .build()
        .unwrap();
    let engine = Engine::new(profile);
    let result = engine.scan(root, &CancelToken::new()).unwrap();

    let keep = result.file(Path::new("keep.rs")).unwrap();
    assert!(!keep.excluded);
    assert!(keep.hash.is_some());
    assert_eq!(keep.category, FileCategory::Code);

    // Disallowed extensions are recorded but never read.
    let skip = result.file(Path::new("skip.js")).unwrap();
    assert!(skip.excluded);
    assert!(skip.hash.is_none());
}
