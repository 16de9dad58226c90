use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{TimeZone, Utc};
use git2::{Repository, Signature, Time};
use tempfile::TempDir;

use folio_analyze::{
    ContributionAggregator, ContributionConfig, DuplicateDetector, GitAnalyzer, GitConfig,
    ProjectType, RankWeights, SkillAnalyzer,
};
use folio_core::{ContentHash, FileCategory, FileRecord, Identity, Language};

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

fn hashed_record(path: &str, size: u64, hash_byte: u8) -> FileRecord {
    let mut record = FileRecord::new(path, FileCategory::Code, size, SystemTime::UNIX_EPOCH, None);
    record.hash = Some(ContentHash::new([hash_byte; 32]));
    record
}

#[test]
fn test_git_config_builder() {
    let config = GitConfig::builder()
        .messages_per_bucket(3usize)
        .files_per_bucket(10usize)
        .build()
        .unwrap();

    assert_eq!(config.messages_per_bucket, 3);
    assert_eq!(config.files_per_bucket, 10);
    assert_eq!(config.languages_per_bucket, 5);

    let default_config = GitConfig::default();
    assert_eq!(default_config.messages_per_bucket, 5);
}

#[test]
fn test_git_history_end_to_end() {
    let temp = TempDir::new().unwrap();
    let repo = Repository::init(temp.path()).unwrap();
    for i in 0..3 {
        commit_file(
            &repo,
            &format!("src/mod{i}.rs"),
            "pub fn f() {}",
            ("Alice", "alice@x.com"),
            &format!("commit {i}"),
            T0 + i * 3600,
        );
    }
    commit_file(&repo, "lib.py", "x = 1", ("Bob", "bob@y.com"), "python", T0 + DAY);

    let record = GitAnalyzer::new().analyze(temp.path(), "proj").unwrap();

    assert_eq!(record.root, PathBuf::from("proj"));
    assert_eq!(record.commit_count, 4);
    assert_eq!(record.project_type, ProjectType::Collaborative);
    assert_eq!(record.contributors[0].identity.name, "Alice");
    assert_eq!(record.contributors[0].commit_count, 3);
    assert!(record.first_commit.unwrap() < record.last_commit.unwrap());
    assert_eq!(record.timeline.len(), 1);
    assert!(
        record.timeline[0]
            .languages
            .iter()
            .any(|(lang, _)| lang == "Rust")
    );
}

#[test]
fn test_duplicate_detection_over_records() {
    let files = vec![
        hashed_record("a.py", 300, 1),
        hashed_record("b.py", 300, 1),
        hashed_record("c.txt", 120, 2),
    ];

    let groups = DuplicateDetector::new(1).detect(&files);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].wasted_bytes, 300);
    assert_eq!(groups[0].count(), 2);
    assert_eq!(groups[0].deletable_count(), 1);
    assert_eq!(DuplicateDetector::total_wasted(&groups), 300);
}

#[test]
fn test_skill_analysis_reads_files_from_disk() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(
        root.join("worker.py"),
        "class Worker(Base):\n    def run(self):\n        pass\n",
    )
    .unwrap();

    let mut record = FileRecord::new(
        "worker.py",
        FileCategory::Code,
        64,
        SystemTime::UNIX_EPOCH,
        None,
    );
    record.hash = Some(ContentHash::new([1; 32]));
    record.language = Some(Language::Python);

    let skills = SkillAnalyzer::new().analyze_files(root, &[record]);
    assert!(skills.iter().any(|s| s.name == "Inheritance"));
    for skill in &skills {
        assert!(skill.proficiency > 0.0 && skill.proficiency <= 1.0);
        assert!(!skill.evidence.is_empty());
    }
}

#[test]
fn test_contribution_combines_history_and_files() {
    let temp = TempDir::new().unwrap();
    let repo = Repository::init(temp.path()).unwrap();
    for i in 0..3 {
        commit_file(
            &repo,
            &format!("f{i}.rs"),
            "fn main() {}",
            ("Alice", "alice@x.com"),
            "work",
            T0 + i * 3600,
        );
    }
    commit_file(&repo, "g.rs", "fn g() {}", ("Bob", "bob@y.com"), "fix", T0 + DAY);

    let record = GitAnalyzer::new().analyze(temp.path(), "proj").unwrap();

    let files = vec![
        hashed_record("proj/src/main.rs", 100, 1),
        hashed_record("proj/tests/it.rs", 100, 2),
    ];
    let refs: Vec<&FileRecord> = files.iter().collect();

    let config = ContributionConfig::builder()
        .caller(Some(Identity::new("Alice", "ALICE@X.COM")))
        .reference_time(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        .build()
        .unwrap();
    let report = ContributionAggregator::with_config(config).aggregate(&record, &refs, 2);

    // Email matching is case-insensitive.
    assert_eq!(report.own_commit_share, Some(0.75));
    assert_eq!(report.total_commits, 4);
    assert_eq!(report.total_contributors, 2);
    assert_eq!(report.activity.code, 1);
    assert_eq!(report.activity.test, 1);
    assert!(report.rank_score > 0.0);
}

#[test]
fn test_rank_score_stable_across_runs() {
    let temp = TempDir::new().unwrap();
    let repo = Repository::init(temp.path()).unwrap();
    commit_file(&repo, "a.rs", "x", ("Alice", "alice@x.com"), "one", T0);

    let record = GitAnalyzer::new().analyze(temp.path(), "proj").unwrap();
    let config = ContributionConfig::builder()
        .reference_time(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        .weights(RankWeights {
            recency: 0.5,
            volume: 0.3,
            diversity: 0.2,
        })
        .build()
        .unwrap();

    let first = ContributionAggregator::with_config(config.clone()).aggregate(&record, &[], 1);
    let second = ContributionAggregator::with_config(config).aggregate(&record, &[], 1);
    assert_eq!(first.rank_score, second.rank_score);
}
