use mediahook_sources::OpenAiClient;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_chat_completion_returns_first_choice() {
    let mock_server = MockServer::start().await;

    let response_body = r#"{
        "id": "chatcmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": "Type: movie\nName: Arrival\nYear: 2016" } },
            { "index": 1, "message": { "role": "assistant", "content": "second" } }
        ]
    }"#;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "messages": [{ "role": "user", "content": "Arrival 2016" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(response_body))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new("sk-test", None)
        .unwrap()
        .with_base_url(mock_server.uri());

    let answer = client.chat_completion("Arrival 2016").await;
    assert_eq!(answer.as_deref(), Some("Type: movie\nName: Arrival\nYear: 2016"));
}

#[tokio::test]
async fn test_non_200_returns_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string(r#"{"error": {"message": "rate limited"}}"#))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new("sk-test", None)
        .unwrap()
        .with_base_url(mock_server.uri());

    assert!(client.chat_completion("hello").await.is_none());
    assert!(client.try_chat_completion("hello").await.is_err());
}

#[tokio::test]
async fn test_empty_choices_returns_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"choices": []}"#))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new("sk-test", None)
        .unwrap()
        .with_base_url(mock_server.uri());

    assert!(client.chat_completion("hello").await.is_none());
}

#[tokio::test]
async fn test_custom_model_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "model": "qwen-plus" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"choices": [{"message": {"role": "assistant", "content": "ok"}}]}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::new("sk-test", None)
        .unwrap()
        .with_base_url(mock_server.uri())
        .with_model("qwen-plus")
        .with_temperature(0.2);

    assert_eq!(client.chat_completion("hi").await.as_deref(), Some("ok"));
}
