use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{TestApp, piped_streams_body};

#[tokio::test]
async fn a_free_text_query_resolves_to_the_first_search_hit() {
    let app = TestApp::spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .and(query_param("q", "never gonna give you up"))
        .and(query_param("filter", "videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {"url": "/watch?v=BddP6PYo2gs", "title": "hit", "duration": 212}
            ]
        })))
        .expect(1)
        .mount(&app.primary_mirror)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/streams/BddP6PYo2gs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(piped_streams_body()))
        .expect(1)
        .mount(&app.primary_mirror)
        .await;

    let response = app.get_search("never gonna give you up").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["video_id"], "BddP6PYo2gs");
    assert_eq!(body["audio_url"], "https://cdn.example/audio.m4a");
}

#[tokio::test]
async fn a_search_falls_back_to_the_next_group_like_resolution_does() {
    let app = TestApp::spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.primary_mirror)
        .await;
    // Invidious answers searches with a bare result array.
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"type": "video", "videoId": "BddP6PYo2gs", "title": "hit"}
        ])))
        .expect(1)
        .mount(&app.secondary_mirror)
        .await;
    // Metadata resolution starts over at the primary group.
    Mock::given(method("GET"))
        .and(path("/api/v1/streams/BddP6PYo2gs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(piped_streams_body()))
        .expect(1)
        .mount(&app.primary_mirror)
        .await;

    let response = app.get_search("some song").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["video_id"], "BddP6PYo2gs");
}

#[tokio::test]
async fn a_query_with_no_hits_anywhere_is_a_502() {
    let app = TestApp::spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
        .expect(1)
        .mount(&app.primary_mirror)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&app.secondary_mirror)
        .await;

    let response = app.get_search("zxqv nothing matches this").await;

    assert_eq!(response.status().as_u16(), 502);
}
