//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn quizdrill() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizdrill").unwrap()
}

/// Write a two-module course (plus an empty checkpoint document) into `dir`.
///
/// The manifest lands at the default `quiz-data.json` path, so commands run
/// with `current_dir(dir)` need no flags at all.
fn write_course(dir: &Path) {
    std::fs::write(dir.join("quiz-data.json"), MANIFEST).unwrap();
    std::fs::write(dir.join("m1.json"), MODULE_ONE).unwrap();
    std::fs::write(dir.join("m2.json"), MODULE_TWO).unwrap();
    std::fs::write(dir.join("cp1.json"), EMPTY_SET).unwrap();
}

fn saved_id(dir: &Path) -> String {
    let raw = std::fs::read_to_string(dir.join("saved-quizzes.json")).unwrap();
    let quizzes: serde_json::Value = serde_json::from_str(&raw).unwrap();
    quizzes[0]["id"].as_str().unwrap().to_string()
}

#[test]
fn validate_a_valid_manifest() {
    let dir = TempDir::new().unwrap();
    write_course(dir.path());

    quizdrill()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 modules"))
        .stdout(predicate::str::contains("Manifest is valid."));
}

#[test]
fn validate_reports_duplicate_ids() {
    let dir = TempDir::new().unwrap();
    write_course(dir.path());
    std::fs::write(dir.path().join("quiz-data.json"), DUPLICATE_MANIFEST).unwrap();

    quizdrill()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("duplicate id: m1"))
        .stderr(predicate::str::contains("problem(s) found"));
}

#[test]
fn validate_nonexistent_manifest() {
    let dir = TempDir::new().unwrap();

    quizdrill()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--manifest")
        .arg("no-such-manifest.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn list_renders_the_catalogue() {
    let dir = TempDir::new().unwrap();
    write_course(dir.path());

    quizdrill()
        .current_dir(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Networking Basics"))
        .stdout(predicate::str::contains("Routing and Switching"))
        .stdout(predicate::str::contains("cp1"))
        .stdout(predicate::str::contains("Final Exam Form A"));
}

#[test]
fn take_scores_a_piped_module_session() {
    let dir = TempDir::new().unwrap();
    write_course(dir.path());

    quizdrill()
        .current_dir(dir.path())
        .args(["take", "module", "m1"])
        .write_stdin("2\n1,2,4\n1,2,3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Networking Basics"))
        .stdout(predicate::str::contains("3/3 correct (100%) - passed"));
}

#[test]
fn take_scores_skipped_questions_as_wrong() {
    let dir = TempDir::new().unwrap();
    write_course(dir.path());

    quizdrill()
        .current_dir(dir.path())
        .args(["take", "module", "m1"])
        .write_stdin("\n\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("0/3 correct (0%) - failed"));
}

#[test]
fn take_review_shows_wrong_answers_and_explanations() {
    let dir = TempDir::new().unwrap();
    write_course(dir.path());

    // First answer is wrong, the other two are right.
    quizdrill()
        .current_dir(dir.path())
        .args(["take", "module", "m1", "--review"])
        .write_stdin("1\n1,2,4\n1,2,3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2/3 correct (67%) - failed"))
        .stdout(predicate::str::contains("WRONG"))
        .stdout(predicate::str::contains("layer 3 addresses"));
}

#[test]
fn take_unknown_module_id() {
    let dir = TempDir::new().unwrap();
    write_course(dir.path());

    quizdrill()
        .current_dir(dir.path())
        .args(["take", "module", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no module with id 'nope'"));
}

#[test]
fn take_unknown_saved_quiz() {
    let dir = TempDir::new().unwrap();

    quizdrill()
        .current_dir(dir.path())
        .args(["take", "saved", "custom-missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved quiz with id"));
}

#[test]
fn take_writes_a_report_file() {
    let dir = TempDir::new().unwrap();
    write_course(dir.path());

    quizdrill()
        .current_dir(dir.path())
        .args(["take", "module", "m1", "--report", "reports"])
        .write_stdin("2\n1,2,4\n1,2,3\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Report saved to:"));

    let entries: Vec<_> = std::fs::read_dir(dir.path().join("reports"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("report-"));
    assert!(entries[0].ends_with(".json"));
}

#[test]
fn build_saves_a_replayable_custom_quiz() {
    let dir = TempDir::new().unwrap();
    write_course(dir.path());

    quizdrill()
        .current_dir(dir.path())
        .args(["build", "--modules", "m1,m2", "--count", "3", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved custom quiz"));

    let id = saved_id(dir.path());
    assert!(id.starts_with("custom-"));

    quizdrill()
        .current_dir(dir.path())
        .arg("saved")
        .assert()
        .success()
        .stdout(predicate::str::contains(&id))
        .stdout(predicate::str::contains("Custom Quiz"));

    // Hand the replay straight in; the title and question count prove the
    // stored quiz came back.
    quizdrill()
        .current_dir(dir.path())
        .args(["take", "saved", &id])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Custom Quiz"))
        .stdout(predicate::str::contains("0/3 correct"));
}

#[test]
fn saved_delete_removes_the_quiz() {
    let dir = TempDir::new().unwrap();
    write_course(dir.path());

    quizdrill()
        .current_dir(dir.path())
        .args(["build", "--modules", "m1"])
        .assert()
        .success();
    let id = saved_id(dir.path());

    quizdrill()
        .current_dir(dir.path())
        .args(["saved", "--delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    quizdrill()
        .current_dir(dir.path())
        .arg("saved")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved quizzes."));
}

#[test]
fn saved_delete_unknown_id() {
    let dir = TempDir::new().unwrap();

    quizdrill()
        .current_dir(dir.path())
        .args(["saved", "--delete", "custom-missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved quiz with id"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    quizdrill()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizdrill.toml"))
        .stdout(predicate::str::contains("Created data/quiz-data.json"));

    assert!(dir.path().join("quizdrill.toml").exists());
    assert!(dir.path().join("data/quiz-data.json").exists());
    assert!(dir.path().join("data/m1.json").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    // First init
    quizdrill()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    // Second init should skip
    quizdrill()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_scaffold_passes_validation() {
    let dir = TempDir::new().unwrap();

    quizdrill()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    quizdrill()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Manifest is valid."));
}

#[test]
fn help_output() {
    quizdrill()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Quiz drilling and exam practice at the terminal",
        ));
}

#[test]
fn version_output() {
    quizdrill()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizdrill"));
}

const MANIFEST: &str = r#"{
  "modules": [
    { "id": "m1", "title": "Networking Basics", "file": "m1.json", "moduleNumber": 1 },
    { "id": "m2", "title": "Routing and Switching", "file": "m2.json", "moduleNumber": 2 }
  ],
  "checkpoints": [
    { "id": "cp1", "title": "Checkpoint 1", "file": "cp1.json", "moduleRange": [1, 2] }
  ],
  "finalExams": [
    { "id": "final-a", "title": "Final Exam Form A", "file": "final-a.json" }
  ]
}
"#;

const DUPLICATE_MANIFEST: &str = r#"{
  "modules": [
    { "id": "m1", "title": "Networking Basics", "file": "m1.json", "moduleNumber": 1 },
    { "id": "m1", "title": "Copy Paste Accident", "file": "m1.json", "moduleNumber": 2 }
  ]
}
"#;

const MODULE_ONE: &str = r#"{
  "title": "Networking Basics",
  "passPercentage": 80,
  "questions": [
    {
      "type": "single",
      "question": "Which device forwards packets between different networks?",
      "options": [
        { "text": "Switch" },
        { "text": "Router", "isCorrect": true },
        { "text": "Hub" },
        { "text": "Repeater" }
      ],
      "explanation": "Routers make forwarding decisions on layer 3 addresses."
    },
    {
      "type": "multiple",
      "question": "Which of these are private IPv4 ranges?",
      "options": [
        { "text": "10.0.0.0/8", "isCorrect": true },
        { "text": "172.16.0.0/12", "isCorrect": true },
        { "text": "8.8.8.0/24" },
        { "text": "192.168.0.0/16", "isCorrect": true }
      ]
    },
    {
      "type": "match",
      "question": "Match each protocol to its default port.",
      "pairs": [
        { "left": "HTTP", "right": "80" },
        { "left": "HTTPS", "right": "443" },
        { "left": "SSH", "right": "22" }
      ]
    }
  ]
}
"#;

const MODULE_TWO: &str = r#"{
  "title": "Routing and Switching",
  "questions": [
    {
      "type": "single",
      "question": "What does a switch use to build its MAC address table?",
      "options": [
        { "text": "Destination IP addresses" },
        { "text": "Source MAC addresses", "isCorrect": true },
        { "text": "ARP replies only" }
      ]
    },
    {
      "type": "dropdown-match",
      "question": "Match each routing concept to its description.",
      "pairs": [
        { "left": "Static route", "right": "Configured by hand" },
        { "left": "Default route", "right": "Used when nothing else matches" }
      ]
    }
  ]
}
"#;

const EMPTY_SET: &str = r#"{ "title": "Checkpoint 1", "questions": [] }
"#;
