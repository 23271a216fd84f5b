use std::fs;
use std::path::Path;

use adapters::SourceFormat;
use pipeline::{
    generate_client, generate_spec, ClientOptions, ErrorKind, OverwritePolicy, SpecOptions,
};

const PLAIN: &str = r#"
asyncapi: 2.6.0
info:
  title: echo
  version: 1.0.0
channels:
  /echo:
    publish:
      message:
        name: Say
        payload:
          type: object
          properties:
            text: { type: string }
"#;

const SERVICE: &str = r#"
name: ticker
basePath: /ticks/{symbol: string}
annotations:
  - name: websocket:ServiceConfig
    fields:
      dispatcherKey: '"event"'
methods:
  - name: onWatch
    params: [{ name: watch, type: Watch }]
    returns: stream<Tick>
  - name: onQuote
    params: [{ name: quote, type: Quote }]
    returns: Price
types:
  Watch: { type: object, properties: { event: { type: string } } }
  Quote: { type: object, properties: { event: { type: string } } }
  Price: { type: object, properties: { value: { type: number } } }
  Tick: { type: object, properties: { value: { type: number } } }
"#;

fn client_options(spec_path: &Path, out: &Path, include_tests: bool) -> ClientOptions {
    ClientOptions {
        spec_path: spec_path.to_path_buf(),
        output_dir: out.to_path_buf(),
        license_path: None,
        include_tests,
        server_url: None,
        auth_scheme: None,
    }
}

#[test]
fn channel_without_server_or_auth_connects_by_url_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let spec = dir.path().join("echo.yaml");
    fs::write(&spec, PLAIN).expect("write spec");
    let out = dir.path().join("out");

    let outcome = generate_client(&client_options(&spec, &out, false), &mut OverwritePolicy::AlwaysOverwrite)
        .expect("generate");
    assert!(outcome.warnings.is_empty());
    // No path parameters and no dispatcher: the utils module is not needed.
    assert_eq!(outcome.report.written, vec![out.join("client.rs"), out.join("types.rs")]);

    let client = fs::read_to_string(out.join("client.rs")).expect("client");
    assert!(client.contains("pub async fn connect(service_url: &str) -> Result<Self, ClientError> {"));
    assert!(!client.contains("auth:"));
    assert!(!out.join("tests").exists());
}

#[test]
fn tests_and_license_are_written_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let spec = dir.path().join("echo.yaml");
    fs::write(&spec, PLAIN).expect("write spec");
    let license = dir.path().join("LICENSE");
    fs::write(&license, "Copyright 2026 Echo Authors\n").expect("write license");
    let out = dir.path().join("out");
    let mut options = client_options(&spec, &out, true);
    options.license_path = Some(license);

    generate_client(&options, &mut OverwritePolicy::AlwaysOverwrite).expect("first run");
    let client = fs::read_to_string(out.join("client.rs")).expect("client");
    assert!(client.starts_with("// Copyright 2026 Echo Authors\n\n// AUTO-GENERATED"));
    assert!(client.contains("mod tests;"));
    let config = fs::read_to_string(out.join("tests/Config.toml")).expect("config");
    assert!(!config.contains("Copyright"));

    fs::write(out.join("tests/test_client.rs"), "// edited\n").expect("edit");
    let outcome = generate_client(&options, &mut OverwritePolicy::NeverOverwrite).expect("second run");
    assert_eq!(outcome.report.skipped, vec![out.join("tests/test_client.rs"), out.join("tests/Config.toml")]);
    assert!(outcome.report.written.contains(&out.join("client.1.rs")));
    assert_eq!(fs::read_to_string(out.join("tests/test_client.rs")).expect("read"), "// edited\n");
}

#[test]
fn spec_generation_never_replaces_existing_documents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = dir.path().join("ticker.yaml");
    fs::write(&service, SERVICE).expect("write service");
    let out = dir.path().join("specs");
    let options = SpecOptions { service_path: service, output_dir: out.clone(), format: SourceFormat::Yaml };

    let first = generate_spec(&options).expect("first");
    let second = generate_spec(&options).expect("second");
    assert_eq!(first.report.written, vec![out.join("ticker_asyncapi.yaml")]);
    assert_eq!(second.report.written, vec![out.join("ticker_asyncapi.1.yaml")]);

    // The generated document feeds straight back into client generation.
    let client_out = dir.path().join("client");
    generate_client(
        &client_options(&out.join("ticker_asyncapi.yaml"), &client_out, false),
        &mut OverwritePolicy::AlwaysOverwrite,
    )
    .expect("client from generated spec");
    let client = fs::read_to_string(client_out.join("client.rs")).expect("client");
    assert!(client.contains("pub struct TickerClient {"));
    assert!(client.contains("pub async fn do_watch(&self, watch: Watch) -> Result<ResponseStream<Tick>, ClientError> {"));
    assert!(client.contains("pub async fn do_quote(&self, quote: Quote) -> Result<Price, ClientError> {"));
}

#[test]
fn errors_are_classified() {
    let dir = tempfile::tempdir().expect("tempdir");
    let spec = dir.path().join("broken.yaml");
    fs::write(
        &spec,
        "asyncapi: 2.6.0\ninfo: { title: t, version: '1' }\nchannels:\n  /a:\n    publish:\n      message:\n        oneOf:\n          - { name: A, payload: { type: string } }\n          - { name: B, payload: { type: string } }\n",
    )
    .expect("write spec");
    let error = generate_client(&client_options(&spec, dir.path(), false), &mut OverwritePolicy::AlwaysOverwrite)
        .expect_err("missing event identifier");
    assert_eq!(error.kind(), ErrorKind::MissingExtension);
    assert!(error.to_string().starts_with("x-event-identifier attribute is not found"));
}
