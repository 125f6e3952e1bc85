use actix_web::http::{Method, StatusCode, header};
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use community_events::database::Database;
use community_events::date_provider::FixedDateProvider;
use community_events::event::NewEvent;
use community_events::server::{self, AppState, SUGGESTIONS_PATH};
use community_events::suggestions::{CompletionClient, NO_EVENTS_PLACEHOLDER, SuggestionError};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

const IDEAS: &str = r#"Sure! Here you go:
[
  {"title": "Seed Library", "description": "Share seeds with neighbours", "category": "Gardening", "promotionalMessage": "Grow together 🌱"},
  {"title": "Skill Swap", "description": "Teach what you know"}
]"#;

/// Replays a fixed reply and remembers every prompt it was given
struct StubClient {
    reply: fn() -> Result<String, SuggestionError>,
    prompts: Mutex<Vec<String>>,
}

impl StubClient {
    fn new(reply: fn() -> Result<String, SuggestionError>) -> Arc<Self> {
        Arc::new(StubClient {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(&self, prompt: &str) -> Result<String, SuggestionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.reply)()
    }
}

fn empty_db() -> Database {
    let clock = FixedDateProvider(Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap());
    Database::with_date_provider(":memory:", Arc::new(clock)).unwrap()
}

fn new_event(title: &str, day: u32) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        location: "Clubhouse".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
        time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        description: format!("{} for everyone", title),
    }
}

macro_rules! app {
    ($db:expr, $client:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new($db, $client)))
                .wrap(server::cors())
                .configure(server::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_suggestions_with_no_events_uses_placeholder() {
    let stub = StubClient::new(|| Ok(IDEAS.to_string()));
    let client: Arc<dyn CompletionClient> = stub.clone();
    let app = app!(empty_db(), Some(client));

    let req = test::TestRequest::post().uri(SUGGESTIONS_PATH).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0]["title"], "Seed Library");
    assert_eq!(suggestions[0]["promotionalMessage"], "Grow together 🌱");
    assert!(suggestions[1].get("category").is_none());

    assert!(stub.last_prompt().contains(NO_EVENTS_PLACEHOLDER));
}

#[actix_web::test]
async fn test_suggestions_quote_only_four_most_recent_events() {
    let db = empty_db();
    for (i, title) in ["Yoga", "Book Club", "Chili Cook-off", "Movie Night", "Bake Sale"]
        .iter()
        .enumerate()
    {
        db.create_event(new_event(title, i as u32 + 1)).unwrap();
    }

    let stub = StubClient::new(|| Ok(IDEAS.to_string()));
    let client: Arc<dyn CompletionClient> = stub.clone();
    let app = app!(db, Some(client));

    let req = test::TestRequest::post().uri(SUGGESTIONS_PATH).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let prompt = stub.last_prompt();
    assert!(prompt.contains("* Bake Sale: Bake Sale for everyone"));
    assert!(prompt.contains("* Book Club: Book Club for everyone"));
    assert!(!prompt.contains("Yoga"));
    assert!(!prompt.contains(NO_EVENTS_PLACEHOLDER));
}

#[actix_web::test]
async fn test_suggestions_without_api_key_returns_500() {
    let app = app!(empty_db(), None);

    let req = test::TestRequest::post().uri(SUGGESTIONS_PATH).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Gemini API key not configured" }));
}

#[actix_web::test]
async fn test_suggestions_rate_limit_message() {
    let client: Arc<dyn CompletionClient> = StubClient::new(|| Err(SuggestionError::RateLimited));
    let app = app!(empty_db(), Some(client));

    let req = test::TestRequest::post().uri(SUGGESTIONS_PATH).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Rate limit exceeded"));
}

#[actix_web::test]
async fn test_suggestions_reply_without_array_returns_500() {
    let client: Arc<dyn CompletionClient> =
        StubClient::new(|| Ok("I could not think of anything.".to_string()));
    let app = app!(empty_db(), Some(client));

    let req = test::TestRequest::post().uri(SUGGESTIONS_PATH).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid response format from Gemini API");
}

#[actix_web::test]
async fn test_suggestions_preflight_is_permissive() {
    let app = app!(empty_db(), None);

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri(SUGGESTIONS_PATH)
        .insert_header((header::ORIGIN, "https://residents.example.org"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type, apikey"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );

    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn test_cross_origin_post_carries_allow_origin() {
    let client: Arc<dyn CompletionClient> = StubClient::new(|| Ok(IDEAS.to_string()));
    let app = app!(empty_db(), Some(client));

    let req = test::TestRequest::post()
        .uri(SUGGESTIONS_PATH)
        .insert_header((header::ORIGIN, "https://residents.example.org"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[actix_web::test]
async fn test_create_and_fetch_event() {
    let app = app!(empty_db(), None);

    let req = test::TestRequest::post()
        .uri("/api/events")
        .set_json(json!({
            "title": "  Potluck  ",
            "location": "Courtyard",
            "date": "2025-07-04",
            "time": "17:30:00",
            "description": "Bring a dish"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["title"], "Potluck");
    assert_eq!(created["date"], "2025-07-04");

    let req = test::TestRequest::get().uri("/api/events/1").to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    let req = test::TestRequest::get().uri("/api/events").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_create_event_rejects_blank_title() {
    let app = app!(empty_db(), None);

    let req = test::TestRequest::post()
        .uri("/api/events")
        .set_json(json!({
            "title": "   ",
            "location": "Courtyard",
            "date": "2025-07-04",
            "time": "17:30:00",
            "description": "Bring a dish"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Event title cannot be empty");
}

#[actix_web::test]
async fn test_malformed_json_returns_400() {
    let app = app!(empty_db(), None);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_unknown_event_returns_404() {
    let app = app!(empty_db(), None);

    let req = test::TestRequest::get().uri("/api/events/42").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(json!({ "event_id": 42, "rating": 4 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_feedback_rating_out_of_range_returns_400() {
    let db = empty_db();
    db.create_event(new_event("Yoga", 1)).unwrap();
    let app = app!(db, None);

    for rating in [0, 6] {
        let req = test::TestRequest::post()
            .uri("/api/feedback")
            .set_json(json!({ "event_id": 1, "rating": rating }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Rating must be between 1 and 5 stars");
    }
}

#[actix_web::test]
async fn test_feedback_flows_into_analytics() {
    let db = empty_db();
    db.create_event(new_event("Yoga", 1)).unwrap();
    db.create_event(new_event("Book Club", 2)).unwrap();
    let app = app!(db, None);

    for (event_id, rating, comment) in [(1, 5, Some("Relaxing")), (1, 4, None), (2, 2, Some("  "))] {
        let req = test::TestRequest::post()
            .uri("/api/feedback")
            .set_json(json!({ "event_id": event_id, "rating": rating, "comment": comment }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/api/feedback").to_request();
    let feedback: Value = test::call_and_read_body_json(&app, req).await;
    let feedback = feedback.as_array().unwrap();
    assert_eq!(feedback.len(), 3);
    assert_eq!(feedback[0]["event_title"], "Book Club");
    assert!(feedback[0]["comment"].is_null());

    let req = test::TestRequest::get().uri("/api/analytics").to_request();
    let analytics: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(analytics["totalEvents"], 2);
    assert_eq!(analytics["totalFeedback"], 3);
    assert_eq!(analytics["averageRating"], 3.7);
    assert_eq!(analytics["eventSummaries"][0]["title"], "Yoga");
    assert_eq!(analytics["eventSummaries"][0]["averageRating"], 4.5);
    assert_eq!(analytics["eventSummaries"][1]["averageRating"], 2.0);

    let labels: Vec<&str> = analytics["ratingHistogram"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["2 Stars", "4 Stars", "5 Stars"]);
}

#[actix_web::test]
async fn test_submitted_feedback_is_echoed() {
    let db = empty_db();
    db.create_event(new_event("Yoga", 1)).unwrap();
    let app = app!(db, None);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(json!({ "event_id": 1, "rating": 3, "comment": " ok " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["rating"], 3);
    assert_eq!(body["comment"], "ok");
    assert_eq!(body["submitted_at"], "2025-05-01T09:00:00Z");
}

#[actix_web::test]
async fn test_plain_options_gets_empty_permissive_reply() {
    let app = app!(empty_db(), None);

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri(SUGGESTIONS_PATH)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
    let allowed = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(allowed.contains("apikey"));
    assert!(allowed.contains("x-client-info"));

    let body = test::read_body(resp).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn test_fetch_single_feedback() {
    let db = empty_db();
    db.create_event(new_event("Yoga", 1)).unwrap();
    let app = app!(db, None);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(json!({ "event_id": 1, "rating": 5, "comment": "Great stretch" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/feedback/{}", created["id"]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = test::read_body_json(resp).await;
    assert_eq!(fetched, created);

    let req = test::TestRequest::get().uri("/api/feedback/77").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Feedback 77 not found");
}
