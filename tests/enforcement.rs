//! check / enforce / govern against an in-memory gateway

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::{agent_client, MockTransport, TRACE_ID};
use meshguard::transport::{HEADER_ACTION, HEADER_AUTHORIZATION, HEADER_RESOURCE, HEADER_TRACE_ID};
use meshguard::{MeshGuardError, Outcome};
use serde_json::json;

fn strict_denial() -> std::sync::Arc<MockTransport> {
    MockTransport::json(
        403,
        json!({
            "policy": "strict",
            "rule": "no-delete",
            "message": "Delete operations not allowed"
        }),
    )
}

#[tokio::test]
async fn check_allowed() {
    let transport = MockTransport::json(200, json!({"policy": "default"}));
    let client = agent_client(transport.clone());

    let decision = client.check("read:contacts", None).await.unwrap();

    assert!(decision.allowed);
    assert_eq!(decision.action, "read:contacts");
    assert_eq!(decision.decision, Outcome::Allow);
    assert_eq!(decision.policy.as_deref(), Some("default"));
    assert_eq!(decision.trace_id, TRACE_ID);

    let request = transport.last_request();
    assert_eq!(request.header(HEADER_ACTION), Some("read:contacts"));
    assert_eq!(request.header(HEADER_TRACE_ID), Some(TRACE_ID));
    assert!(request.header(HEADER_AUTHORIZATION).is_some());
}

#[tokio::test]
async fn check_denied_is_advisory() {
    let client = agent_client(strict_denial());

    let decision = client.check("delete:database", None).await.unwrap();

    assert!(!decision.allowed);
    assert_eq!(decision.action, "delete:database");
    assert_eq!(decision.decision, Outcome::Deny);
    assert_eq!(decision.policy.as_deref(), Some("strict"));
    assert_eq!(decision.rule.as_deref(), Some("no-delete"));
    assert_eq!(decision.reason.as_deref(), Some("Delete operations not allowed"));
}

#[tokio::test]
async fn check_sends_resource() {
    let transport = MockTransport::json(200, json!({}));
    let client = agent_client(transport.clone());

    client.check("read:contacts", Some("contacts/123")).await.unwrap();

    assert_eq!(
        transport.last_request().header(HEADER_RESOURCE),
        Some("contacts/123")
    );
}

#[tokio::test]
async fn check_handles_empty_response() {
    let client = agent_client(MockTransport::empty(200));

    let decision = client.check("read:contacts", None).await.unwrap();

    assert!(decision.allowed);
    assert_eq!(decision.policy, None);
}

#[tokio::test]
async fn check_propagates_non_policy_errors() {
    let client = agent_client(MockTransport::json(401, json!({})));
    assert!(matches!(
        client.check("read:contacts", None).await,
        Err(MeshGuardError::Authentication(_))
    ));

    let client = agent_client(MockTransport::empty(429));
    assert!(matches!(
        client.check("read:contacts", None).await,
        Err(MeshGuardError::RateLimited)
    ));

    let client = agent_client(MockTransport::text(503, "Service Unavailable"));
    match client.check("read:contacts", None).await {
        Err(MeshGuardError::RequestFailed { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "Service Unavailable");
        }
        other => panic!("Expected RequestFailed, got {:?}", other),
    }

    let client = agent_client(MockTransport::unreachable("connection refused"));
    assert!(matches!(
        client.check("read:contacts", None).await,
        Err(MeshGuardError::Transport(_))
    ));
}

#[tokio::test]
async fn enforce_returns_decision_when_allowed() {
    let client = agent_client(MockTransport::json(200, json!({"policy": "default"})));

    let decision = client.enforce("read:contacts", None).await.unwrap();

    assert!(decision.allowed);
    assert_eq!(decision.policy.as_deref(), Some("default"));
}

#[tokio::test]
async fn enforce_raises_when_denied() {
    let transport = strict_denial();
    let client = agent_client(transport.clone());

    let err = client.enforce("delete:database", None).await.unwrap_err();

    let denied = err.as_denial().expect("expected a policy denial");
    assert_eq!(denied.action, "delete:database");
    assert_eq!(denied.policy.as_deref(), Some("strict"));
    assert_eq!(denied.rule.as_deref(), Some("no-delete"));
    assert_eq!(denied.reason, "Delete operations not allowed");
    assert_eq!(denied.trace_id.as_deref(), Some(TRACE_ID));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn enforce_and_check_agree_on_attribution() {
    let client = agent_client(strict_denial());

    let decision = client.check("delete:database", None).await.unwrap();
    let err = client.enforce("delete:database", None).await.unwrap_err();
    let denied = err.as_denial().unwrap();

    assert_eq!(decision.policy, denied.policy);
    assert_eq!(decision.rule, denied.rule);
    assert_eq!(decision.reason.as_deref(), Some(denied.reason.as_str()));
    assert_eq!(decision.action, denied.action);
}

#[tokio::test]
async fn enforce_with_resource() {
    let transport = MockTransport::json(200, json!({}));
    let client = agent_client(transport.clone());

    client.enforce("read:contacts", Some("contacts/456")).await.unwrap();

    assert_eq!(
        transport.last_request().header(HEADER_RESOURCE),
        Some("contacts/456")
    );
}

#[tokio::test]
async fn govern_runs_body_when_allowed() {
    let client = agent_client(MockTransport::json(200, json!({"policy": "default"})));
    let executed = AtomicUsize::new(0);

    let result = client
        .govern("read:contacts", None)
        .run(|decision| {
            let executed = &executed;
            async move {
                assert!(decision.allowed);
                executed.fetch_add(1, Ordering::SeqCst);
                "contacts"
            }
        })
        .await
        .unwrap();

    assert_eq!(result, "contacts");
    assert_eq!(executed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn govern_skips_body_when_denied() {
    let client = agent_client(MockTransport::json(403, json!({"message": "Not allowed"})));
    let executed = AtomicUsize::new(0);

    let err = client
        .govern("delete:contacts", None)
        .run(|_| async {
            executed.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap_err();

    assert_eq!(executed.load(Ordering::SeqCst), 0);
    let denied = err.as_denial().unwrap();
    assert_eq!(denied.action, "delete:contacts");
    assert_eq!(denied.reason, "Not allowed");
}

#[tokio::test]
async fn govern_scope_holds_decision() {
    let transport = MockTransport::json(200, json!({"policy": "default"}));
    let client = agent_client(transport.clone());

    let governed = client.govern("read:contacts", Some("contacts/789"));
    assert_eq!(governed.action(), "read:contacts");
    assert_eq!(governed.resource(), Some("contacts/789"));
    assert_eq!(transport.calls(), 0);

    let scope = governed.enter().await.unwrap();
    assert!(scope.allowed);
    assert_eq!(scope.decision().policy.as_deref(), Some("default"));
    assert_eq!(
        transport.last_request().header(HEADER_RESOURCE),
        Some("contacts/789")
    );
}

#[tokio::test]
async fn concurrent_checks_share_one_client() {
    let transport = MockTransport::json(200, json!({"policy": "default"}));
    let client = agent_client(transport.clone());

    let actions: Vec<String> = (0..8).map(|i| format!("read:item{}", i)).collect();
    let decisions = futures::future::join_all(
        actions.iter().map(|action| client.check(action, None)),
    )
    .await;

    assert_eq!(transport.calls(), 8);
    for (action, decision) in actions.iter().zip(decisions) {
        let decision = decision.unwrap();
        assert_eq!(&decision.action, action);
        assert_eq!(decision.trace_id, TRACE_ID);
    }
}
