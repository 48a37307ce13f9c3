//! Integration tests for the detection and redaction pipeline

use mockito::{Matcher, Server};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use veil::anonymization::config::{AnonymizationConfig, AuditConfig, ModelConfig};
use veil::anonymization::{AnonymizationEngine, AnonymizeRequest, OperatorPreset};
use veil::domain::{EntityType, LanguageCode};

fn lang(code: &str) -> LanguageCode {
    LanguageCode::new(code).unwrap()
}

fn entity(name: &str) -> EntityType {
    EntityType::new(name).unwrap()
}

fn engine() -> AnonymizationEngine {
    AnonymizationEngine::new(AnonymizationConfig::default()).unwrap()
}

fn model_config(endpoint: String) -> ModelConfig {
    ModelConfig {
        endpoint,
        languages: vec!["en".to_string(), "el".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_redact_english_text() {
    let engine = engine();
    let request = AnonymizeRequest::new(
        lang("en"),
        "Mail john.doe@example.com from 192.168.1.1",
    );

    let result = engine.anonymize(request).await.unwrap();
    assert_eq!(result.output_text, "Mail HIDDEN_EMAIL from 192.16*****");
    assert!(result.spans.is_none());
}

#[tokio::test]
async fn test_span_report_uses_output_coordinates() {
    let engine = engine();
    let request = AnonymizeRequest::new(
        lang("en"),
        "Mail john.doe@example.com from 192.168.1.1",
    )
    .with_spans();

    let result = engine.anonymize(request).await.unwrap();
    let spans = result.spans.unwrap();
    assert_eq!(spans.len(), 2);

    let chars: Vec<char> = result.output_text.chars().collect();
    let slice = |s: usize, e: usize| chars[s..e].iter().collect::<String>();

    assert_eq!(spans[0].entity_type, entity("EMAIL_ADDRESS"));
    assert_eq!((spans[0].start, spans[0].end), (5, 17));
    assert_eq!(slice(spans[0].start, spans[0].end), "HIDDEN_EMAIL");
    assert!(spans[0].score > 0.5, "context word should raise the score");

    assert_eq!(spans[1].entity_type, entity("IP_ADDRESS"));
    assert_eq!(slice(spans[1].start, spans[1].end), "192.16*****");
}

#[tokio::test]
async fn test_redact_greek_text() {
    let engine = engine();
    let request = AnonymizeRequest::new(
        lang("el"),
        "Στείλε στο maria@example.gr ή πάρε στο +306912345678",
    )
    .with_spans();

    let result = engine.anonymize(request).await.unwrap();
    assert_eq!(
        result.output_text,
        "Στείλε στο HIDDEN_EMAIL ή πάρε στο HIDDEN_PHONE_NUMBER"
    );

    let spans = result.spans.unwrap();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].start, 11);
    assert_eq!(spans[0].end, 23);
    assert_eq!(spans[1].entity_type, entity("PHONES_el"));
}

#[tokio::test]
async fn test_synthetic_preset() {
    let engine = engine();
    let request = AnonymizeRequest::new(
        lang("en"),
        "Card 4111 1111 1111 1111, IBAN GB82WEST12345698765432",
    )
    .with_preset(OperatorPreset::Synthetic);

    let mut rng = StdRng::seed_from_u64(42);
    let result = engine.anonymize_with_rng(request, &mut rng).await.unwrap();

    assert!(result
        .output_text
        .starts_with("Card 0000 0000 0000 0000, IBAN "));
    let iban = result.output_text.rsplit(' ').next().unwrap();
    assert_eq!(iban.len(), 34);
    assert!(iban[..2].chars().all(|c| c.is_ascii_uppercase()));
    assert!(iban[2..].chars().all(|c| c == '0'));
    assert!(!result.output_text.contains("GB82"));
}

#[tokio::test]
async fn test_seeded_runs_are_reproducible() {
    let engine = engine();
    let text = "IBAN GB82WEST12345698765432";

    let mut first = StdRng::seed_from_u64(7);
    let mut second = StdRng::seed_from_u64(7);
    let a = engine
        .anonymize_with_rng(
            AnonymizeRequest::new(lang("en"), text).with_preset(OperatorPreset::Synthetic),
            &mut first,
        )
        .await
        .unwrap();
    let b = engine
        .anonymize_with_rng(
            AnonymizeRequest::new(lang("en"), text).with_preset(OperatorPreset::Synthetic),
            &mut second,
        )
        .await
        .unwrap();

    assert_eq!(a.output_text, b.output_text);
}

#[tokio::test]
async fn test_analyze_reports_input_offsets_and_sources() {
    let engine = engine();
    let request = AnonymizeRequest::new(lang("el"), "Η IP είναι 10.0.0.1 σήμερα");

    let result = engine.analyze(&request).await.unwrap();
    assert_eq!(result.spans.len(), 1);
    assert_eq!(result.sources, vec!["ip_el".to_string()]);

    let span = &result.spans[0];
    let covered: String = request
        .text
        .chars()
        .skip(span.start)
        .take(span.end - span.start)
        .collect();
    assert_eq!(covered, "10.0.0.1");
}

#[tokio::test]
async fn test_batch_requests_are_independent() {
    let engine = engine();
    let requests = vec![
        AnonymizeRequest::new(lang("en"), "write to a@example.com"),
        AnonymizeRequest::new(lang("fr"), "écrire à b@example.com"),
        AnonymizeRequest::new(lang("el"), "γράψε στο c@example.com"),
    ];

    let results = engine.anonymize_batch(requests).await;
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().output_text, "write to HIDDEN_EMAIL");
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().output_text, "γράψε στο HIDDEN_EMAIL");
}

#[tokio::test]
async fn test_model_recognizer_end_to_end() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/ner")
        .match_body(Matcher::PartialJson(json!({"language": "en"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "entities": [
                    {"label": "PERSON", "start": 0, "end": 4, "score": 0.95},
                    {"label": "GPE", "start": 14, "end": 20},
                    {"label": "NORP", "start": 26, "end": 31}
                ]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let config = AnonymizationConfig {
        model: Some(model_config(format!("{}/ner", server.url()))),
        ..Default::default()
    };
    let engine = AnonymizationEngine::new(config).unwrap();
    assert!(engine.recognizer_names().contains(&"model_en"));

    let request = AnonymizeRequest::new(lang("en"), "John lives in Athens with Greek friends");
    let result = engine.anonymize(request).await.unwrap();

    assert_eq!(
        result.output_text,
        "ANONYMOUS lives in HIDDEN_LOCATION with Greek friends"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_model_recognizer_greek_char_offsets() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/ner")
        .match_body(Matcher::PartialJson(json!({"language": "el"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "entities": [
                    {"label": "PER", "start": 2, "end": 7, "score": 0.9},
                    {"label": "LOC", "start": 19, "end": 24, "score": 0.9}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let config = AnonymizationConfig {
        model: Some(model_config(format!("{}/ner", server.url()))),
        ..Default::default()
    };
    let engine = AnonymizationEngine::new(config).unwrap();

    let request = AnonymizeRequest::new(lang("el"), "Η Μαρία μένει στην Αθήνα").with_spans();
    let result = engine.anonymize(request).await.unwrap();

    assert_eq!(result.output_text, "Η ANONYMOUS μένει στην HIDDEN_LOCATION");
    let spans = result.spans.unwrap();
    assert_eq!((spans[0].start, spans[0].end), (2, 11));
    assert_eq!(spans[1].entity_type, entity("LOCATION"));
}

#[tokio::test]
async fn test_audit_log_written_without_plaintext() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("audit").join("redactions.log");

    let config = AnonymizationConfig {
        audit: AuditConfig {
            enabled: true,
            log_path: log_path.clone(),
            json_format: true,
        },
        ..Default::default()
    };
    let engine = AnonymizationEngine::new(config).unwrap();

    engine
        .anonymize(AnonymizeRequest::new(
            lang("en"),
            "Mail secret.person@example.com from 172.16.0.9",
        ))
        .await
        .unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(content.lines().count(), 1);

    let entry: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(entry["redactions_count"], 2);
    assert_eq!(entry["language"], "en");
    assert_eq!(entry["preset"], "redact");
    assert!(!content.contains("secret.person@example.com"));
    assert!(!content.contains("172.16.0.9"));
}
