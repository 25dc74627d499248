//! Run the binary end to end against a fake Azure DevOps and GitHub.

use helpers::*;
use mockito::Server;

mod helpers;

const COMMITS: &[FakeCommit] = &[
    FakeCommit {
        sha: "1111111111111111111111111111111111111111",
        author: "Jane Doe",
        date: "2024-01-02T03:04:05Z",
        message: "WIDG-101: Add the widget factory (#12)\n\nFollow-up in widg-102",
    },
    FakeCommit {
        sha: "2222222222222222222222222222222222222222",
        author: "John Roe",
        date: "2024-01-03T09:00:00Z",
        message: "Fix typo in README",
    },
    FakeCommit {
        sha: "3333333333333333333333333333333333333333",
        author: "Jane Doe",
        date: "2024-01-04T12:30:00Z",
        message: "Merge pull request #13 from acme/abc-77",
    },
];

#[test]
fn writes_report_for_build_range() {
    let case = TestCase::new("generate_report");
    let working_dir = case.arrange();
    let mut server = Server::new();
    let from = mock_build(&mut server, "1.0.1", FROM_SHA);
    let to = mock_build(&mut server, "1.0.2", TO_SHA);
    let compare = mock_compare(&mut server, COMMITS);

    case.command(&working_dir, &server)
        .args(["1.0.1", "1.0.2", "--output", "report.md"])
        .assert()
        .success();

    from.assert();
    to.assert();
    compare.assert();
    case.assert_report(&working_dir, "report.md");
}

#[test]
fn default_output_name_comes_from_config_and_builds() {
    let case = TestCase::new("generate_report");
    let working_dir = case.arrange();
    let mut server = Server::new();
    let _from = mock_build(&mut server, "1.0.1", FROM_SHA);
    let _to = mock_build(&mut server, "1.0.2", TO_SHA);
    let _compare = mock_compare(&mut server, COMMITS);

    case.command(&working_dir, &server)
        .args(["1.0.1", "1.0.2"])
        .assert()
        .success();

    assert!(working_dir
        .path()
        .join("commit-report_1.0.1_1.0.2_commit_report.md")
        .exists());
}

#[test]
fn json_config_with_builds() {
    let case = TestCase::new("json_config");
    let working_dir = case.arrange();
    let mut server = Server::new();
    let _from = mock_build(&mut server, "1.0.1", FROM_SHA);
    let _to = mock_build(&mut server, "1.0.2", TO_SHA);
    let _compare = mock_compare(
        &mut server,
        &[FakeCommit {
            sha: "1111111111111111111111111111111111111111",
            author: "Jane Doe",
            date: "2024-01-02T03:04:05Z",
            message: "ABC-123 Only commit",
        }],
    );

    case.command(&working_dir, &server)
        .args(["--config", "release.json"])
        .assert()
        .success();

    case.assert_report(&working_dir, "release_1.0.1_1.0.2_commit_report.md");
}

#[test]
fn dry_run_prints_instead_of_writing() {
    let case = TestCase::new("generate_report");
    let working_dir = case.arrange();
    let mut server = Server::new();
    let _from = mock_build(&mut server, "1.0.1", FROM_SHA);
    let _to = mock_build(&mut server, "1.0.2", TO_SHA);
    let _compare = mock_compare(&mut server, COMMITS);

    case.command(&working_dir, &server)
        .args(["1.0.1", "1.0.2", "--output", "report.md", "--dry-run"])
        .assert()
        .success()
        .stdout_matches_path(case.expected_report());

    assert!(!working_dir.path().join("report.md").exists());
}

#[test]
fn unknown_build_is_an_error() {
    let case = TestCase::new("generate_report");
    let working_dir = case.arrange();
    let mut server = Server::new();
    let _from = mock_build(&mut server, "1.0.1", FROM_SHA);
    let _to = mock_missing_build(&mut server, "9.9.9");

    let output = case
        .command(&working_dir, &server)
        .args(["1.0.1", "9.9.9", "--output", "report.md"])
        .assert()
        .failure()
        .get_output()
        .clone();

    assert!(!working_dir.path().join("report.md").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No build numbered 9.9.9 was found"), "{stderr}");
}

#[test]
fn missing_azure_token_is_an_error() {
    let case = TestCase::new("generate_report");
    let working_dir = case.arrange();
    let server = Server::new();

    let output = case
        .command(&working_dir, &server)
        .env_remove("AZURE_DEVOPS_PAT")
        .args(["1.0.1", "1.0.2", "--output", "report.md"])
        .assert()
        .failure()
        .get_output()
        .clone();

    assert!(!working_dir.path().join("report.md").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No Azure DevOps token was provided"), "{stderr}");
}

#[test]
fn missing_config_is_an_error() {
    let working_dir = tempfile::tempdir().unwrap();
    let server = Server::new();

    TestCase::new("missing_config")
        .command(&working_dir, &server)
        .args(["1.0.1", "1.0.2"])
        .assert()
        .failure();
}
