use quillmate_core::ai::{AiGateway, SummarizeOptions, TranslateOptions};
use quillmate_core::{AiSettings, Language, Provider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer, provider: Provider) -> AiSettings {
    AiSettings {
        provider,
        model: "gpt-test".to_string(),
        base_url: server.uri(),
        api_key: Some("sk-test".to_string()),
        language: Language::En,
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ]
    })
}

async fn failing_with(status: u16, body: &str, provider: Provider) -> String {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;

    let gateway = AiGateway::new(&settings(&server, provider));
    let response = gateway
        .translate("hola", &TranslateOptions::to("English"))
        .await;
    assert!(response.is_error());
    assert!(response.content.is_empty());
    response.error.unwrap_or_default()
}

#[tokio::test]
async fn summarize_posts_an_authorized_chat_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "max_tokens": 400
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Short summary.")))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = AiGateway::new(&settings(&server, Provider::OpenAI));
    let response = gateway
        .summarize(
            "A long note about Rust ownership.",
            SummarizeOptions {
                max_length: 200,
                language: None,
            },
        )
        .await;

    assert!(!response.is_error());
    assert_eq!(response.content, "Short summary.");
}

#[tokio::test]
async fn rejected_key_names_the_credential_variable() {
    let message = failing_with(401, r#"{"error":"bad key"}"#, Provider::OpenAI).await;
    assert!(message.contains("OPENAI_API_KEY"), "{message}");

    let message = failing_with(403, "", Provider::DeepSeek).await;
    assert!(message.contains("DEEPSEEK_API_KEY"), "{message}");
}

#[tokio::test]
async fn rate_limit_has_its_own_message() {
    let message = failing_with(429, "slow down", Provider::OpenAI).await;
    assert!(message.contains("Rate limit"), "{message}");
}

#[tokio::test]
async fn server_errors_report_the_status() {
    let message = failing_with(503, "unavailable", Provider::OpenAI).await;
    assert!(message.contains("status 503"), "{message}");
}

#[tokio::test]
async fn other_failures_carry_the_response_excerpt() {
    let message = failing_with(400, "context length exceeded", Provider::OpenAI).await;
    assert!(message.contains("status 400"), "{message}");
    assert!(message.contains("context length exceeded"), "{message}");
}

#[tokio::test]
async fn empty_model_output_falls_back_to_a_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .mount(&server)
        .await;

    let gateway = AiGateway::new(&settings(&server, Provider::OpenAI));
    let response = gateway.ask_question("why?", "no context").await;

    assert!(!response.is_error());
    assert_eq!(response.content, "Unable to answer this question.");
}

#[tokio::test]
async fn tags_are_split_on_either_comma() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "max_tokens": 100 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("rust, 笔记，async ,")))
        .mount(&server)
        .await;

    let gateway = AiGateway::new(&settings(&server, Provider::OpenAI));
    let tags = gateway.generate_tags("some text", 5).await;

    assert_eq!(tags, vec!["rust", "笔记", "async"]);
}

#[tokio::test]
async fn failed_tag_generation_yields_no_tags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gateway = AiGateway::new(&settings(&server, Provider::OpenAI));
    assert!(gateway.generate_tags("some text", 5).await.is_empty());
}

#[tokio::test]
async fn connection_test_uses_a_short_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "max_tokens": 100 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("It works.")))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = AiGateway::new(&settings(&server, Provider::OpenAI));
    assert_eq!(gateway.test_connection().await.content, "It works.");
}
