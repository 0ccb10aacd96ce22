//! CLI parsing and the `invoke` / `check-config` subcommands.

use clap::Parser;
use prerender_edge::cli::{self, Cli, CliError, Commands};
use prerender_edge::config::PrerenderConfig;
use prerender_edge::Stage;
use serde_json::{json, Value};

mod common;

#[test]
fn test_parse_invoke_with_global_config() {
    let parsed = Cli::try_parse_from([
        "prerender-edge",
        "invoke",
        "origin-request",
        "--event",
        "event.json",
        "--config",
        "edge.toml",
    ])
    .unwrap();

    assert_eq!(parsed.config.as_deref(), Some(std::path::Path::new("edge.toml")));
    match parsed.command {
        Commands::Invoke { stage, event } => {
            assert_eq!(stage, Stage::OriginRequest);
            assert_eq!(event.as_deref(), Some(std::path::Path::new("event.json")));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_parse_serve_and_check_config() {
    let serve = Cli::try_parse_from(["prerender-edge", "serve", "--watch"]).unwrap();
    assert!(matches!(serve.command, Commands::Serve { watch: true }));

    let check = Cli::try_parse_from(["prerender-edge", "check-config"]).unwrap();
    assert!(matches!(check.command, Commands::CheckConfig));
    assert!(check.config.is_none());
}

#[test]
fn test_parse_rejects_unknown_stage() {
    assert!(Cli::try_parse_from(["prerender-edge", "invoke", "origin-response"]).is_err());
}

#[test]
fn test_invoke_viewer_request() {
    let raw = common::viewer_event_json("Googlebot/2.1", "/about", "").to_string();

    let output = cli::invoke_event(&common::config(), Stage::ViewerRequest, &raw).unwrap();

    let request: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(
        request["headers"]["x-prerender-host"],
        json!([{"key": "X-Prerender-Host", "value": "example.com"}])
    );
    assert_eq!(request["clientIp"], json!("203.0.113.178"));
}

#[test]
fn test_invoke_origin_request_without_token() {
    let mut event = common::viewer_event_json("Googlebot/2.1", "/about", "");
    let headers = &mut event["Records"][0]["cf"]["request"]["headers"];
    headers["x-prerender-token"] = json!([{"key": "X-Prerender-Token", "value": "t"}]);
    headers["x-prerender-host"] = json!([{"key": "X-Prerender-Host", "value": "example.com"}]);

    let output = cli::invoke_event(
        &PrerenderConfig::default(),
        Stage::OriginRequest,
        &event.to_string(),
    )
    .unwrap();

    let request: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(
        request["origin"]["custom"]["path"],
        json!("/https%3A%2F%2Fexample.com")
    );
}

#[test]
fn test_invoke_errors() {
    let config = common::config();

    let err = cli::invoke_event(&config, Stage::ViewerRequest, "{not json").unwrap_err();
    assert!(matches!(err, CliError::MalformedEvent(_)));

    let err = cli::invoke_event(&config, Stage::ViewerRequest, r#"{"Records": []}"#).unwrap_err();
    assert!(matches!(err, CliError::Event(_)));

    let raw = common::viewer_event_json("Googlebot", "/", "").to_string();
    let err = cli::invoke_event(&PrerenderConfig::default(), Stage::ViewerRequest, &raw)
        .unwrap_err();
    assert!(matches!(err, CliError::Handler(_)));
    assert!(err.to_string().contains("PRERENDER_TOKEN"));
}

#[test]
fn test_check_config_output() {
    let config = common::config();

    let rendered = cli::render_config(&config).unwrap();

    assert!(rendered.contains("[router]"));
    assert!(rendered.contains("service.prerender.io"));
    assert!(!rendered.contains(common::TEST_TOKEN));
    let reparsed: PrerenderConfig = toml::from_str(&rendered).unwrap();
    assert_eq!(reparsed.router.port, 443);

    assert!(cli::token_warning(&config).is_none());
    let warning = cli::token_warning(&PrerenderConfig::default()).unwrap();
    assert!(warning.contains("PRERENDER_TOKEN"));
}
