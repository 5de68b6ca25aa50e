use std::net::TcpListener;
use std::time::Duration;

use chat_widget_engine::{
    ChatClient, ClientSettings, CompletionRequest, CompletionResponse, FailureKind,
    ReqwestChatClient,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> ClientSettings {
    ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    }
}

fn hello(selected_text: Option<&str>) -> CompletionRequest {
    CompletionRequest {
        message: "Hello".to_string(),
        selected_text: selected_text.map(ToOwned::to_owned),
        session_token: "session_1_abc".to_string(),
        mode: "full_content".to_string(),
    }
}

#[tokio::test]
async fn posts_expected_body_and_decodes_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "message": "Hello",
            "selected_text": "foo bar",
            "session_token": "session_1_abc",
            "mode": "full_content"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Hi",
            "session_token": "server-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestChatClient::new(settings_for(&server)).expect("client");
    let reply = client.complete(1, &hello(Some("foo bar"))).await.expect("reply");

    assert_eq!(
        reply,
        CompletionResponse {
            response: Some("Hi".to_string()),
            session_token: Some("server-token".to_string()),
        }
    );
}

#[tokio::test]
async fn omits_selected_text_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(body_json(json!({
            "message": "Hello",
            "session_token": "session_1_abc",
            "mode": "full_content"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Hi" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestChatClient::new(settings_for(&server)).expect("client");
    let reply = client.complete(2, &hello(None)).await.expect("reply");
    assert_eq!(reply.response.as_deref(), Some("Hi"));
    assert_eq!(reply.session_token, None);
}

#[tokio::test]
async fn tolerates_null_and_missing_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": null })))
        .mount(&server)
        .await;

    let client = ReqwestChatClient::new(settings_for(&server)).expect("client");
    let reply = client.complete(3, &hello(None)).await.expect("reply");
    assert_eq!(reply, CompletionResponse::default());
}

#[tokio::test]
async fn distinguishes_rate_limit_from_other_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = ReqwestChatClient::new(settings_for(&server)).expect("client");
    let first = client.complete(4, &hello(None)).await.unwrap_err();
    assert_eq!(first.kind, FailureKind::RateLimited);

    let second = client.complete(5, &hello(None)).await.unwrap_err();
    assert_eq!(second.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(json!({ "response": "too late" })),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..settings_for(&server)
    };
    let client = ReqwestChatClient::new(settings).expect("client");
    let err = client.complete(6, &hello(None)).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn undecodable_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>oops</html>", "text/html"))
        .mount(&server)
        .await;

    let client = ReqwestChatClient::new(settings_for(&server)).expect("client");
    let err = client.complete(7, &hello(None)).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let settings = ClientSettings {
        base_url: format!("http://127.0.0.1:{port}"),
        ..ClientSettings::default()
    };
    let client = ReqwestChatClient::new(settings).expect("client");
    assert_eq!(client.base_url(), format!("http://127.0.0.1:{port}"));

    let err = client.complete(8, &hello(None)).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Unreachable);
}

#[test]
fn rejects_invalid_base_url() {
    let settings = ClientSettings {
        base_url: "localhost without scheme".to_string(),
        ..ClientSettings::default()
    };
    let err = ReqwestChatClient::new(settings).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
