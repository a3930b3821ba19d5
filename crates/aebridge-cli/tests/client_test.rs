//! Client tests against a live bridge on an ephemeral port.

use std::future::pending;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::net::TcpListener;

use aebridge_client::{
    wrap_script, BridgeClient, ClientError, Collection, EvalValue, ObjectRef, ObjectValue,
};
use aebridge_server::server::serve_with_listener;
use aebridge_server::state::AppState;
use aebridge_server::{EvalReply, LIVENESS_MESSAGE};

type Scripts = Arc<Mutex<Vec<String>>>;

/// Starts a bridge whose evaluator records scripts and answers from `answer`.
async fn start_bridge<F>(answer: F) -> (BridgeClient, Scripts)
where
    F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
{
    let scripts: Scripts = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&scripts);
    let state = AppState::with_evaluator(move |script: String, reply: EvalReply| {
        recorded.lock().unwrap().push(script.clone());
        match answer(&script) {
            Ok(result) => reply.complete(result),
            Err(message) => reply.fail(message),
        };
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_with_listener(listener, state, pending()));

    (BridgeClient::new(format!("http://{}", addr)), scripts)
}

#[tokio::test]
async fn ping_returns_liveness_text() {
    let (client, _) = start_bridge(|_| Ok(String::new())).await;
    assert_eq!(client.ping().await.unwrap(), LIVENESS_MESSAGE);
}

#[tokio::test]
async fn eval_raw_sends_script_unchanged() {
    let (client, scripts) = start_bridge(|_| Ok("2".to_string())).await;
    assert_eq!(client.eval_raw("1+1").await.unwrap(), "2");
    assert_eq!(*scripts.lock().unwrap(), vec!["1+1".to_string()]);
}

#[tokio::test]
async fn eval_wraps_and_decodes_json() {
    let (client, scripts) = start_bridge(|_| {
        Ok(r#"{"isObject": true, "objectType": "Project", "pydobeId": "1"}"#.to_string())
    })
    .await;

    let value = client.eval("app.project").await.unwrap();
    assert_eq!(
        value,
        EvalValue::Json(json!({ "isObject": true, "objectType": "Project", "pydobeId": "1" }))
    );
    assert_eq!(scripts.lock().unwrap()[0], wrap_script("app.project"));
}

#[tokio::test]
async fn eval_keeps_text_results() {
    let (client, _) = start_bridge(|_| Ok("Untitled Project".to_string())).await;
    assert_eq!(
        client.eval("app.project.file").await.unwrap(),
        EvalValue::Text("Untitled Project".to_string())
    );
}

#[tokio::test]
async fn error_statuses_are_reported() {
    let (client, _) = start_bridge(|_| Err("host engine busy".to_string())).await;
    match client.eval_raw("1+1").await {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "host engine busy");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_bridge_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BridgeClient::new(format!("http://{}", addr));
    assert!(matches!(
        client.ping().await,
        Err(ClientError::Request { .. })
    ));
}

/// Host stand-in for the object table: `app.project` and its items.
fn project_host(script: &str) -> Result<String, String> {
    if script.contains("var tmp = app.project;") {
        Ok(r#"{"isObject": true, "objectType": "Project", "pydobeId": "1"}"#.to_string())
    } else if script.contains("var tmp = $._pydobe['1'].items;") {
        Ok(r#"{"isObject": true, "objectType": "ItemCollection", "pydobeId": "2"}"#.to_string())
    } else if script.contains("var tmp = $._pydobe['2'].length;") {
        Ok("3".to_string())
    } else if script.contains("var tmp = $._pydobe['2'][3];") {
        Ok(r#"{"isObject": true, "objectType": "CompItem", "pydobeId": "3"}"#.to_string())
    } else if script.contains("var tmp = $._pydobe['3'].name;") {
        Ok("Main Comp".to_string())
    } else if script.contains("var tmp = nope;") {
        Ok(r#"{"message": "nope is undefined", "error": true}"#.to_string())
    } else {
        Err(format!("unexpected script: {}", script))
    }
}

#[tokio::test]
async fn object_handles_walk_the_host_object_graph() {
    let (client, scripts) = start_bridge(project_host).await;

    let project = client
        .eval_returning_object("app.project;")
        .await
        .unwrap()
        .into_object()
        .unwrap();
    assert_eq!(
        project,
        ObjectRef {
            id: "1".to_string(),
            object_type: "Project".to_string(),
        }
    );

    let items = project.get(&client, "items").await.unwrap().into_object().unwrap();
    assert_eq!(items.object_type, "ItemCollection");

    let items = Collection::one_based(items, "length");
    assert_eq!(items.len(&client).await.unwrap(), 3);

    let last = items.get(&client, -1).await.unwrap().into_object().unwrap();
    assert_eq!(last.object_type, "CompItem");
    assert_eq!(
        last.get(&client, "name").await.unwrap(),
        ObjectValue::Value(EvalValue::Text("Main Comp".to_string()))
    );

    assert!(matches!(
        items.get(&client, 3).await,
        Err(ClientError::IndexOutOfRange { index: 3, len: 3 })
    ));

    let sent = scripts.lock().unwrap();
    assert!(sent.iter().all(|s| s.starts_with("try{\nvar tmp = ")));
}

#[tokio::test]
async fn caught_host_errors_surface_as_script_errors() {
    let (client, _) = start_bridge(project_host).await;
    match client.eval_returning_object("nope;").await {
        Err(ClientError::Script { message, .. }) => assert_eq!(message, "nope is undefined"),
        other => panic!("expected script error, got {:?}", other),
    }
}
