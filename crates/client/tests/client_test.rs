//! Client tests against a mocked SRL service

use mockito::Matcher;
use nlp_serve_client::{ClientError, NomSrlClient, VerbSrlClient};
use nlp_serve_common::{NomSrlResult, NominalFrame, VerbFrame, VerbSrlResult};
use serde_json::json;

const TWITTER: &str = "Twitter confirms sale of company to Elon Musk for $44 billion.";

fn words() -> Vec<String> {
    [
        "Twitter", "confirms", "sale", "of", "company", "to", "Elon", "Musk", "for", "$", "44",
        "billion", ".",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
}

fn tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

fn nominal_reference() -> NomSrlResult {
    NomSrlResult {
        nominals: vec![NominalFrame {
            nominal: "sale".to_string(),
            sense: "01".to_string(),
            predicate_index: vec![2],
            description: "[ARG0: Twitter] [Support: confirms] sale [ARG1: of company] [ARG2: to Elon Musk] [ARG3: for $ 44 billion] .".to_string(),
            tags: tags(&[
                "B-ARG0", "B-Support", "O", "B-ARG1", "I-ARG1", "B-ARG2", "I-ARG2", "I-ARG2",
                "B-ARG3", "I-ARG3", "I-ARG3", "I-ARG3", "O",
            ]),
        }],
        words: words(),
    }
}

fn verb_reference() -> VerbSrlResult {
    VerbSrlResult {
        verbs: vec![VerbFrame {
            verb: "confirms".to_string(),
            sense: "1.0".to_string(),
            description: "[ARG0: Twitter] [V: confirms] [ARG1: sale of company to Elon Musk for $ 44 billion] .".to_string(),
            tags: tags(&[
                "B-ARG0", "B-V", "B-ARG1", "I-ARG1", "I-ARG1", "I-ARG1", "I-ARG1", "I-ARG1",
                "I-ARG1", "I-ARG1", "I-ARG1", "I-ARG1", "O",
            ]),
        }],
        words: words(),
    }
}

#[tokio::test]
async fn test_nominal_predict() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/cogcomp_nom_srl")
        .match_body(Matcher::Json(json!({"sentence": TWITTER})))
        .with_body(serde_json::to_string(&nominal_reference()).unwrap())
        .create_async()
        .await;

    let client = NomSrlClient::with_url(format!("{}/cogcomp_nom_srl", server.url()));
    let result = client.predict(TWITTER).await.unwrap();

    assert_eq!(result, nominal_reference());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_nominal_batch_predict() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/cogcomp_nom_srl")
        .match_body(Matcher::Json(json!([{"sentence": ""}, {"sentence": TWITTER}])))
        .with_body(json!([{"nominals": [], "words": []}, nominal_reference()]).to_string())
        .create_async()
        .await;

    let client = NomSrlClient::with_url(format!("{}/cogcomp_nom_srl", server.url()));
    let results = client.batch_predict(&["", TWITTER]).await.unwrap();

    assert_eq!(results, vec![NomSrlResult::empty(), nominal_reference()]);
}

#[tokio::test]
async fn test_verb_predict() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/cogcomp_verb_srl")
        .with_body(serde_json::to_string(&verb_reference()).unwrap())
        .create_async()
        .await;

    let client = VerbSrlClient::with_url(format!("{}/cogcomp_verb_srl", server.url()));
    let result = client.predict(TWITTER).await.unwrap();

    assert_eq!(result, verb_reference());
}

#[tokio::test]
async fn test_error_envelope() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/cogcomp_nom_srl")
        .with_status(400)
        .with_body(r#"{"error": "Invalid request"}"#)
        .create_async()
        .await;

    let client = NomSrlClient::with_url(format!("{}/cogcomp_nom_srl", server.url()));
    let err = client.predict(TWITTER).await.unwrap_err();

    assert!(matches!(err, ClientError::Server(ref msg) if msg == "Invalid request"));
}
