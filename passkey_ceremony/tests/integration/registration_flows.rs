use std::sync::Arc;

use http::StatusCode;
use passkey_ceremony::{
    CeremonyFlowError, CeremonyKind, CeremonyOrchestrator, FlowOptions, RunState, RunStatus,
    TransportErrorPolicy,
};
use serde_json::{Value, json};

use crate::common::mock_rp_server::{REGISTRATION_OPTIONS, REGISTRATION_VERIFY};
use crate::common::{CancellingAuthenticator, CannedResponse, EchoAuthenticator, MockRelyingPartyServer};

fn registration(
    server: &MockRelyingPartyServer,
    authenticator: Arc<dyn passkey_ceremony::CeremonyAuthenticator>,
    options: FlowOptions,
) -> CeremonyOrchestrator {
    CeremonyOrchestrator::new(
        CeremonyKind::Registration,
        Arc::new(server.relying_party()),
        authenticator,
        options,
    )
}

/// Register a new passkey against a relying party that accepts it
#[tokio::test]
async fn test_registration_passes_over_http() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockRelyingPartyServer::start().await;
    let authenticator = Arc::new(EchoAuthenticator::default());
    let orchestrator = registration(&server, authenticator.clone(), FlowOptions::default());

    let report = orchestrator.run("alice").await?;

    assert!(report.passed());
    assert_eq!(orchestrator.status_text(), "✅");
    assert_eq!(report.trace.len(), 3);
    assert_eq!(report.trace[0].label, "Registration Options");
    assert_eq!(report.trace[1].label, "Registration Response");
    assert_eq!(report.trace[2].label, "Verification Response");

    // The authenticator got the options body exactly as served
    let received = authenticator.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].1["rp"]["name"], "webauthn");

    let requests = server.requests();
    assert_eq!(requests.len(), 2);

    assert_eq!(requests[0].endpoint, REGISTRATION_OPTIONS);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].raw_path, "/generate-registration-options/alice");
    assert_eq!(requests[0].accept.as_deref(), Some("application/json"));

    assert_eq!(requests[1].endpoint, REGISTRATION_VERIFY);
    assert_eq!(requests[1].method, "POST");
    assert_eq!(requests[1].raw_path, "/verify-registration-response/alice");
    assert_eq!(requests[1].content_type.as_deref(), Some("application/json"));

    // The posted body is the credential the authenticator produced
    let posted = requests[1].body.clone().expect("verification body is JSON");
    assert_eq!(posted["id"], "cred1");
    assert_eq!(posted["response"]["clientDataJSON"]["type"], "webauthn.create");
    assert_eq!(posted["response"]["clientDataJSON"]["challenge"], "abc");
    let traced: Value = serde_json::from_str(&report.trace[1].payload)?;
    assert_eq!(traced, posted);

    server.shutdown().await;
    Ok(())
}

/// A relying party in the `{verified, msg, status}` shape rejects the credential
#[tokio::test]
async fn test_registration_rejected_with_msg_reason() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockRelyingPartyServer::start().await;
    server.respond(
        REGISTRATION_VERIFY,
        CannedResponse::json_with_status(
            StatusCode::BAD_REQUEST,
            json!({"verified": false, "msg": "Invalid challenge", "status": 400}),
        ),
    );
    let orchestrator = registration(
        &server,
        Arc::new(EchoAuthenticator::default()),
        FlowOptions::default(),
    );

    let report = orchestrator.run("alice").await?;

    assert_eq!(
        report.status,
        RunStatus::Failed("Invalid challenge".to_string())
    );
    assert_eq!(report.status_text(), "🛑 (Reason: Invalid challenge)");

    let verification: Value = serde_json::from_str(&report.trace[2].payload)?;
    assert_eq!(verification["status"], 400);

    server.shutdown().await;
    Ok(())
}

/// The user dismisses the prompt: nothing is posted for verification
#[tokio::test]
async fn test_registration_cancelled_by_user() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockRelyingPartyServer::start().await;
    let orchestrator = registration(
        &server,
        Arc::new(CancellingAuthenticator),
        FlowOptions::default(),
    );

    let report = orchestrator.run("alice").await?;

    assert!(report.status.is_failed());
    assert!(report.status_text().starts_with("🛑 (Reason: NotAllowedError"));
    assert_eq!(report.trace.len(), 1);
    assert_eq!(report.trace[0].label, "Registration Options");
    assert_eq!(*report.states.last().unwrap(), RunState::Reported);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");

    server.shutdown().await;
    Ok(())
}

/// An HTML error page from the options endpoint is surfaced to the caller
#[tokio::test]
async fn test_registration_options_html_error_propagates() {
    let server = MockRelyingPartyServer::start().await;
    server.respond(
        REGISTRATION_OPTIONS,
        CannedResponse::raw(
            StatusCode::INTERNAL_SERVER_ERROR,
            "text/html",
            "<!doctype html><title>500 Internal Server Error</title>",
        ),
    );
    let authenticator = Arc::new(EchoAuthenticator::default());
    let orchestrator = registration(&server, authenticator.clone(), FlowOptions::default());

    let result = orchestrator.run("alice").await;

    match result {
        Err(CeremonyFlowError::MalformedResponse(msg)) => {
            assert!(msg.contains("500"), "status missing from '{msg}'");
        }
        other => panic!("Expected MalformedResponse, got {other:?}"),
    }
    assert_eq!(orchestrator.status(), RunStatus::Pending);
    assert_eq!(orchestrator.status_text(), "");
    assert_eq!(orchestrator.state(), RunState::OptionsRequested);
    assert!(orchestrator.trace().is_empty());
    assert!(authenticator.received().is_empty());
    assert_eq!(server.requests().len(), 1);

    server.shutdown().await;
}

/// With the report policy the same failure ends the run with a failed status
#[tokio::test]
async fn test_registration_options_html_error_reported() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockRelyingPartyServer::start().await;
    server.respond(
        REGISTRATION_OPTIONS,
        CannedResponse::raw(StatusCode::BAD_GATEWAY, "text/html", "<h1>Bad Gateway</h1>"),
    );
    let options = FlowOptions {
        transport_errors: TransportErrorPolicy::Report,
        ..FlowOptions::default()
    };
    let orchestrator = registration(&server, Arc::new(EchoAuthenticator::default()), options);

    let report = orchestrator.run("alice").await?;

    assert!(report.status.is_failed());
    assert!(
        report
            .status_text()
            .starts_with("🛑 (Reason: Malformed response:")
    );
    assert!(report.trace.is_empty());
    assert_eq!(
        report.states,
        vec![RunState::Idle, RunState::OptionsRequested, RunState::Reported]
    );

    server.shutdown().await;
    Ok(())
}

/// Reserved characters in the identity stay inside one path segment
#[tokio::test]
async fn test_registration_identity_is_percent_encoded() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockRelyingPartyServer::start().await;
    let orchestrator = registration(
        &server,
        Arc::new(EchoAuthenticator::default()),
        FlowOptions::default(),
    );

    let report = orchestrator.run("alice/bob?x#y").await?;
    assert!(report.passed());

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].raw_path,
        "/generate-registration-options/alice%2Fbob%3Fx%23y"
    );
    assert_eq!(requests[0].identity, "alice/bob?x#y");
    assert_eq!(requests[1].identity, "alice/bob?x#y");

    server.shutdown().await;
    Ok(())
}

/// Dot-segment identities never reach the bare options endpoint
#[tokio::test]
async fn test_registration_dot_segment_identity_is_rejected() {
    let server = MockRelyingPartyServer::start().await;
    let options = FlowOptions {
        transport_errors: TransportErrorPolicy::Report,
        ..FlowOptions::default()
    };
    let orchestrator = registration(&server, Arc::new(EchoAuthenticator::default()), options);

    for identity in [".", ".."] {
        let result = orchestrator.run(identity).await;
        assert!(
            matches!(result, Err(CeremonyFlowError::Config(_))),
            "Expected Config error for '{identity}', got {result:?}"
        );
        assert_eq!(orchestrator.status(), RunStatus::Pending);
        assert!(orchestrator.trace().is_empty());
    }
    assert!(server.requests().is_empty());

    server.shutdown().await;
}

/// Endpoints mounted under a route prefix
#[tokio::test]
async fn test_registration_under_route_prefix() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockRelyingPartyServer::start_with_prefix("/webauthn").await;
    let orchestrator = registration(
        &server,
        Arc::new(EchoAuthenticator::default()),
        FlowOptions::default(),
    );

    let report = orchestrator.run("alice").await?;
    assert!(report.passed());

    let paths: Vec<String> = server
        .requests()
        .into_iter()
        .map(|request| request.raw_path)
        .collect();
    assert_eq!(
        paths,
        vec![
            "/webauthn/generate-registration-options/alice",
            "/webauthn/verify-registration-response/alice",
        ]
    );

    server.shutdown().await;
    Ok(())
}
