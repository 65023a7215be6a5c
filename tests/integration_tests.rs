use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use travelplanner::api::AppState;
use travelplanner::{
    DateRange, DeliveryReport, Exporter, Length, MessageSender, PlaceCandidate, PlaceCounts,
    PlaceResolver, PlaceSearch, Planner, PlannerError, TextGenerator, Tone, TripRequest, chunk,
    maps, merge, web,
};

struct ItineraryGenerator;

#[async_trait]
impl TextGenerator for ItineraryGenerator {
    async fn generate(&self, _prompt: &str) -> travelplanner::Result<String> {
        Ok("Day 1: Eiffel Tower at sunrise, lunch at Le Jules Verne.".to_string())
    }
}

struct ParisSearch;

#[async_trait]
impl PlaceSearch for ParisSearch {
    async fn search(&self, query: &str) -> travelplanner::Result<Vec<PlaceCandidate>> {
        if query.starts_with("tourist attractions") {
            Ok(vec![PlaceCandidate {
                name: Some("Eiffel Tower".to_string()),
                formatted_address: Some("Champ de Mars, Paris".to_string()),
                rating: Some(4.7),
            }])
        } else if query.starts_with("hotels") {
            Err(PlannerError::upstream("HTTP 500"))
        } else {
            Ok(Vec::new())
        }
    }
}

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, body: &str) -> travelplanner::Result<()> {
        self.sent.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

fn request(draft_count: usize) -> TripRequest {
    TripRequest {
        destination: "Paris".to_string(),
        dates: DateRange {
            start: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 11, 4).unwrap(),
        },
        members: 2,
        budget: "1,500 EUR".to_string(),
        draft_count,
        tone: Tone::Friendly,
        length: Length::Brief,
    }
}

fn planner(generator: Option<Arc<dyn TextGenerator>>) -> Planner {
    Planner::new(
        generator,
        PlaceResolver::new(Some(Arc::new(ParisSearch))),
        PlaceCounts::default(),
    )
}

fn app(sender: Option<Arc<dyn MessageSender>>, pdf_enabled: bool) -> Router {
    let state = AppState::new(
        planner(Some(Arc::new(ItineraryGenerator))),
        sender,
        20,
        Exporter::new(pdf_enabled),
    );
    web::app(state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

#[tokio::test]
async fn test_pipeline_links_and_indexes_every_place() {
    let plan = planner(Some(Arc::new(ItineraryGenerator)))
        .run(&request(2))
        .await
        .unwrap();

    let eiffel = maps::build("Eiffel Tower", "Paris");
    assert_eq!(plan.documents.len(), 2);
    for document in &plan.documents {
        assert!(document.text.contains(&format!("[Eiffel Tower]({eiffel})")));
        assert!(document.text.contains(&format!(
            "- Eiffel Tower ({eiffel}) — Champ de Mars, Paris (4.7)"
        )));
        let index_lines = document
            .text
            .split(merge::INDEX_HEADING)
            .nth(1)
            .unwrap()
            .lines()
            .filter(|l| l.starts_with("- "))
            .count();
        assert_eq!(index_lines, 19);
    }

    assert_eq!(plan.hotels[0].name, "hotels 1");
    assert_eq!(plan.hotels[0].maps_url, maps::build("hotels", "Paris"));
}

#[tokio::test]
async fn test_scenario_no_model_still_resolves_places() {
    let plan = planner(None).run(&request(2)).await.unwrap();
    assert_eq!(plan.documents.len(), 1);
    assert!(plan.documents[0].text.contains("no language-model API key"));
    assert_eq!(plan.attractions[0].name, "Eiffel Tower");
    assert_eq!(plan.attractions.len(), 8);
}

#[test]
fn test_chunk_long_document() {
    let text = "a ".repeat(2000);
    let chunks = chunk::chunk(&text, 1500);
    assert!(chunks.len() >= 2);
    assert!(chunks.iter().all(|c| c.chars().count() <= 1500));
    assert_eq!(chunks.join(" "), text.trim_end());
}

#[tokio::test]
async fn test_api_plan() {
    let body = json!({
        "destination": "Paris",
        "dates": {"start": "2026-11-02", "end": "2026-11-04"},
        "members": 2
    });
    let response = app(None, false)
        .oneshot(post_json("/api/plan", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let plan: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(plan["documents"].as_array().unwrap().len(), 1);
    assert_eq!(plan["restaurants"].as_array().unwrap().len(), 6);
    assert_eq!(plan["attractions"][0]["rating"], "4.7");
}

#[tokio::test]
async fn test_api_plan_rejects_reversed_dates() {
    let body = json!({
        "destination": "Paris",
        "dates": {"start": "2026-11-04", "end": "2026-11-02"}
    });
    let response = app(None, false)
        .oneshot(post_json("/api/plan", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(message.contains("before start date"));
}

#[tokio::test]
async fn test_api_plan_from_text() {
    let body = json!({
        "destination": "Paris",
        "dates": {"start": "2026-11-02", "end": "2026-11-04"},
        "text": "Picnic below the Eiffel Tower"
    });
    let response = app(None, false)
        .oneshot(post_json("/api/plan", body))
        .await
        .unwrap();
    let plan: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let text = plan["documents"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Picnic below the [Eiffel Tower]("));
}

#[tokio::test]
async fn test_api_deliver_chunks_message() {
    let sender = Arc::new(RecordingSender::default());
    let response = app(Some(sender.clone()), false)
        .oneshot(post_json(
            "/api/deliver",
            json!({"text": "Day 1 Louvre Day 2 Versailles", "destination": "Paris"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report: DeliveryReport = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let sent = sender.sent.lock().unwrap();
    assert_eq!(report, DeliveryReport::Delivered { chunks: sent.len() });
    assert_eq!(sent[0], "Your AI Travel Plan");
    assert!(sent.iter().all(|c| c.chars().count() <= 20));
}

#[tokio::test]
async fn test_api_deliver_without_sender() {
    let response = app(None, false)
        .oneshot(post_json("/api/deliver", json!({"text": "Day 1"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_api_export_text_and_disabled_pdf() {
    let router = app(None, false);

    let response = router
        .clone()
        .oneshot(post_json("/api/export", json!({"text": "Day 1: Louvre", "format": "txt"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_bytes(response).await, b"Day 1: Louvre");

    let response = router
        .oneshot(post_json("/api/export", json!({"text": "Day 1", "format": "pdf"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_api_extract_text_upload() {
    let boundary = "travelplanner-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"plan.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         Day 1: Eiffel Tower\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/extract")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app(None, false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let extracted: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(extracted["file_name"], "plan.txt");
    assert_eq!(extracted["text"], "Day 1: Eiffel Tower");
}

#[tokio::test]
async fn test_api_capabilities() {
    let response = app(None, false)
        .oneshot(
            Request::builder()
                .uri("/api/capabilities")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let capabilities: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(
        capabilities,
        json!({"generation": true, "delivery": false, "pdf": false})
    );
}
