//! End-to-end passes against mock tracker and CI servers.

use serde_json::json;
use ticket_check::{Config, Correlator, Credentials, Error, TicketMatcher, TicketSet};
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, jobs: &[&str]) -> Config {
    let jobs: Vec<String> = jobs
        .iter()
        .map(|job| format!("    - {}/job/{}", server.uri(), job))
        .collect();
    Config::from_yaml(&format!(
        "project: HG\ntimeout_secs: 5\njira:\n  rest_url: {uri}/rest/api/latest/search\n  browse_url: {uri}/browse/\njenkins:\n  max_concurrent: 2\n  jobs:\n{jobs}\n",
        uri = server.uri(),
        jobs = jobs.join("\n")
    ))
    .unwrap()
}

fn set(ids: &[&str]) -> TicketSet {
    let matcher = TicketMatcher::new("HG").unwrap();
    ids.iter().map(|id| matcher.canonical(id).unwrap()).collect()
}

async fn mount_tracker(server: &MockServer, keys: &[&str]) {
    let issues: Vec<_> = keys.iter().map(|key| json!({ "key": key })).collect();
    Mock::given(method("GET"))
        .and(path("/rest/api/latest/search"))
        .and(basic_auth("jdoe", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "issues": issues })))
        .mount(server)
        .await;
}

async fn mount_job(server: &MockServer, job: &str, builds: &[(u64, Vec<&str>)]) {
    let entries: Vec<_> = builds
        .iter()
        .map(|(n, _)| json!({ "number": n, "url": format!("{}/job/{}/{}/", server.uri(), job, n) }))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/job/{}/api/json", job)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "builds": entries })))
        .mount(server)
        .await;

    for (n, messages) in builds {
        let items: Vec<_> = messages.iter().map(|m| json!({ "msg": m })).collect();
        Mock::given(method("GET"))
            .and(path(format!("/job/{}/{}/api/json", job, n)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "changeSets": [{ "items": items }] })),
            )
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn ready_tickets_are_the_intersection() {
    let server = MockServer::start().await;
    mount_tracker(&server, &["HG-10", "HG-20"]).await;
    mount_job(&server, "Server-QE", &[(1, vec!["fix HG-10", "unrelated", "HG 30 fix"])]).await;

    let correlator = Correlator::new(config(&server, &["Server-QE"])).unwrap();
    let result = correlator
        .reconcile(&Credentials::new("jdoe", "secret"))
        .await
        .unwrap();

    assert_eq!(result.builds, set(&["HG-10", "HG-30"]));
    assert_eq!(result.ready, set(&["HG-10"]));
    assert_eq!(
        correlator.config().browse_url(result.ready.iter().next().unwrap()),
        format!("{}/browse/HG-10", server.uri())
    );
}

#[tokio::test]
async fn same_reference_in_many_builds_counts_once() {
    let server = MockServer::start().await;
    mount_tracker(&server, &["HG-5"]).await;
    mount_job(&server, "Server-QE", &[(3, vec!["HG-5 part 3"]), (2, vec!["hg 5 part 2"])]).await;
    mount_job(&server, "Framework-QE", &[(9, vec!["Hg5 part 1"])]).await;

    let correlator = Correlator::new(config(&server, &["Server-QE", "Framework-QE"])).unwrap();
    let result = correlator
        .reconcile(&Credentials::new("jdoe", "secret"))
        .await
        .unwrap();

    assert_eq!(result.builds.len(), 1);
    assert_eq!(result.ready, set(&["HG-5"]));
}

#[tokio::test]
async fn no_tracker_tickets_is_not_an_error() {
    let server = MockServer::start().await;
    mount_tracker(&server, &[]).await;
    mount_job(&server, "Server-QE", &[(1, vec!["HG-1"])]).await;

    let correlator = Correlator::new(config(&server, &["Server-QE"])).unwrap();
    let result = correlator
        .reconcile(&Credentials::new("jdoe", "secret"))
        .await
        .unwrap();

    assert!(result.ready.is_empty());
}

#[tokio::test]
async fn failing_job_aborts_the_pass() {
    let server = MockServer::start().await;
    mount_tracker(&server, &["HG-1"]).await;
    mount_job(&server, "Server-QE", &[(1, vec!["HG-1"])]).await;
    Mock::given(method("GET"))
        .and(path("/job/Framework-QE/api/json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let correlator = Correlator::new(config(&server, &["Server-QE", "Framework-QE"])).unwrap();
    let err = correlator
        .reconcile(&Credentials::new("jdoe", "secret"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Connectivity { .. }));
}

#[tokio::test]
async fn wrong_password_is_an_auth_error() {
    let server = MockServer::start().await;
    mount_tracker(&server, &["HG-1"]).await;
    Mock::given(method("GET"))
        .and(path("/rest/api/latest/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Log in</html>"))
        .with_priority(10)
        .mount(&server)
        .await;
    mount_job(&server, "Server-QE", &[(1, vec!["HG-1"])]).await;

    let correlator = Correlator::new(config(&server, &["Server-QE"])).unwrap();
    let err = correlator
        .reconcile(&Credentials::new("jdoe", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AuthOrQuery { .. }));
}
