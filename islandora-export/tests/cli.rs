use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;
use std::fs::{read_to_string, write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, NamedTempFile};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use islandora_export::cli::{run, Cli};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

/// Config file pointing the response cache at a fresh directory.
fn config_with_cache(cache_dir: &Path) -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        format!(
            "fetch:\n  cache_dir: {}\ncrossref:\n  registrant: Lehigh University\n  depositor_name: Library\n  depositor_email: lib@example.edu\n",
            cache_dir.display()
        ),
    )
    .expect("Writing temp config failed");
    config
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("_format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let cli = Cli::parse_from([
        "islandora-export",
        "--config",
        "does-not-exist.yaml",
        "export",
        "csv",
        "--base-url",
        "http://127.0.0.1:9",
        "--nid",
        "1",
    ]);

    let _ = run(cli).await;

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}

#[test]
fn help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("islandora-export").expect("Binary exists");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("export")
                .and(predicate::str::contains("transform"))
                .and(predicate::str::contains("cache-warm")),
        );
}

#[test]
fn export_crossref_requires_base_url_and_target() {
    let mut cmd = Command::cargo_bin("islandora-export").expect("Binary exists");
    cmd.args(["export", "crossref", "--nid", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--base-url"));
}

#[test]
fn missing_config_file_is_reported() {
    let out = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("islandora-export").expect("Binary exists");
    cmd.args(["--config", "no/such/config.yaml", "transform", "csv", "crossref"])
        .arg("--source")
        .arg(out.path().join("in.csv"))
        .arg("--target")
        .arg(out.path().join("out.xml"))
        .args(["--base-url", "https://repo.test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn transform_csv_to_crossref_writes_deposit() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("merged.csv");
    let target = dir.path().join("crossref.xml");
    write(
        &source,
        "node_id,title,field_member_of,field_identifier,field_full_title,field_edtf_date_issued\n\
         10,Lehigh Review,,\"{\"\"attr0\"\":\"\"doi\"\",\"\"value\"\":\"\"10.1/x\"\"}\",,\n\
         11,Volume 3,10,,,\n\
         12,Paper,11,,Paper A & B,2020-05\n",
    )
    .unwrap();
    let config = config_with_cache(&dir.path().join("cache"));

    let mut cmd = Command::cargo_bin("islandora-export").expect("Binary exists");
    cmd.arg("--config")
        .arg(config.path())
        .args(["transform", "csv", "crossref"])
        .arg("--source")
        .arg(&source)
        .arg("--target")
        .arg(&target)
        .args(["--base-url", "https://repo.test", "--type", "journal-volume"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Crossref journal written"));

    let xml = read_to_string(&target).unwrap();
    assert!(xml.contains("<doi>10.1/x</doi>"));
    assert!(xml.contains("<registrant>Lehigh University</registrant>"));
    assert!(xml.contains("Paper A &amp; B"));
    assert!(xml.contains("<year>2020</year>"));
    assert!(!xml.contains("<issue>"));
}

#[tokio::test(flavor = "multi_thread")]
async fn export_crossref_walks_live_repository() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/node/10",
        serde_json::json!({
            "nid": [{"value": 10}],
            "title": [{"value": "Lehigh Review"}],
            "field_identifier": [{"attr0": "doi", "value": "10.1/x"}]
        }),
    )
    .await;
    mount_json(&server, "/node/10/members", serde_json::json!([{"nid": "11"}])).await;
    mount_json(
        &server,
        "/node/11",
        serde_json::json!({
            "nid": [{"value": 11}],
            "title": [{"value": "Volume 3"}],
            "field_member_of": [{"target_id": 10}],
            "field_part_detail": [{"type": "volume", "number": "3"}, {"type": "issue", "number": "2"}]
        }),
    )
    .await;
    mount_json(&server, "/node/11/members", serde_json::json!([{"nid": 12}])).await;
    mount_json(
        &server,
        "/node/12",
        serde_json::json!({
            "nid": [{"value": 12}],
            "title": [{"value": "Paper"}],
            "field_full_title": [{"value": "Paper A"}],
            "field_member_of": [{"target_id": 11}],
            "field_edtf_date_issued": [{"value": "2021"}]
        }),
    )
    .await;
    mount_json(&server, "/node/12/members", serde_json::json!([])).await;

    let dir = tempdir().unwrap();
    let target = dir.path().join("deposit.xml");
    let config = config_with_cache(&dir.path().join("cache"));

    let uri = server.uri();
    let cli = Cli::parse_from([
        "islandora-export",
        "--config",
        config.path().to_str().unwrap(),
        "export",
        "crossref",
        "--base-url",
        uri.as_str(),
        "--nid",
        "10",
        "--target",
        target.to_str().unwrap(),
    ]);
    run(cli).await.expect("export crossref should succeed");

    let xml = read_to_string(&target).unwrap();
    assert!(xml.contains("<full_title>Lehigh Review</full_title>"));
    assert!(xml.contains("<volume>3</volume>"));
    assert!(xml.contains("<issue>2</issue>"));
    assert!(xml.contains("Paper A"));
    assert!(xml.contains(&format!("{uri}/node/10")));
}

#[tokio::test(flavor = "multi_thread")]
async fn export_csv_merges_container_exports() {
    let server = MockServer::start().await;
    let csv_route = |nid: i64, body: &'static str| {
        Mock::given(method("GET"))
            .and(path(format!("/node/{nid}")))
            .and(query_param("_format", "workbench_csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
    };
    csv_route(
        1,
        "node_id,title,field_model,field_member_of,field_weight\n\
         1,Journal,Collection,,0\n\
         2,Issue,Publication Issue,1,1\n",
    )
    .mount(&server)
    .await;
    csv_route(
        2,
        "node_id,title,field_model,field_member_of,field_weight,field_pid\n\
         2,Issue,Publication Issue,1,1,\n\
         3,Page,Page,2,1,p3\n",
    )
    .mount(&server)
    .await;

    let dir = tempdir().unwrap();
    let output = dir.path().join("merged.csv");
    let config = config_with_cache(&dir.path().join("cache"));

    let uri = server.uri();
    let cli = Cli::parse_from([
        "islandora-export",
        "--config",
        config.path().to_str().unwrap(),
        "export",
        "csv",
        "--base-url",
        uri.as_str(),
        "--nid",
        "1",
        "--output",
        output.to_str().unwrap(),
    ]);
    run(cli).await.expect("export csv should succeed");

    let merged = read_to_string(&output).unwrap();
    let mut lines = merged.lines();
    assert_eq!(
        lines.next(),
        Some("node_id,title,field_model,field_member_of,field_weight,field_pid")
    );
    let ids: Vec<&str> = lines.map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}
