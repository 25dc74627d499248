use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

pub const FROM_SHA: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const TO_SHA: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// A commit as the GitHub compare API returns it.
pub struct FakeCommit {
    pub sha: &'static str,
    pub author: &'static str,
    pub date: &'static str,
    pub message: &'static str,
}

/// Azure DevOps knows `build_number` as a succeeded build of `sha`.
pub fn mock_build(server: &mut ServerGuard, build_number: &str, sha: &str) -> Mock {
    server
        .mock("GET", "/acme/widgets/_apis/build/builds")
        .match_query(Matcher::UrlEncoded("buildNumber".into(), build_number.into()))
        .match_header("authorization", Matcher::Regex("^Basic ".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "count": 1,
                "value": [{"id": 100, "buildNumber": build_number, "result": "succeeded", "sourceVersion": sha}]
            })
            .to_string(),
        )
        .create()
}

/// Azure DevOps has never heard of `build_number`.
pub fn mock_missing_build(server: &mut ServerGuard, build_number: &str) -> Mock {
    server
        .mock("GET", "/acme/widgets/_apis/build/builds")
        .match_query(Matcher::UrlEncoded("buildNumber".into(), build_number.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"count": 0, "value": []}).to_string())
        .create()
}

/// GitHub returns `commits` when comparing [`FROM_SHA`] to [`TO_SHA`].
pub fn mock_compare(server: &mut ServerGuard, commits: &[FakeCommit]) -> Mock {
    let commits: Vec<_> = commits
        .iter()
        .map(|commit| {
            json!({
                "sha": commit.sha,
                "commit": {
                    "message": commit.message,
                    "author": {"name": commit.author, "date": commit.date}
                }
            })
        })
        .collect();
    server
        .mock(
            "GET",
            format!("/repos/acme/widgets/compare/{FROM_SHA}...{TO_SHA}").as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"status": "ahead", "total_commits": commits.len(), "commits": commits})
                .to_string(),
        )
        .create()
}
