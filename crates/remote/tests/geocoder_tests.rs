use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tunedrop_core::collaborators::{Geocoder, LocationAutocomplete};
use tunedrop_core::error::CoreError;
use tunedrop_remote::{RestClient, RestGeocoder};

fn geocoder_for(server: &MockServer) -> RestGeocoder {
    RestGeocoder::new(RestClient::new(reqwest::Client::new(), server.uri(), None))
}

#[tokio::test]
async fn suggestions_parse_string_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Berlin"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "display_name": "Berlin, Germany", "lat": "52.52", "lon": "13.405" },
            { "display_name": "Broken", "lat": "north", "lon": "13" },
            { "display_name": "Berlin, NH, USA", "lat": "44.46", "lon": "-71.18" }
        ])))
        .mount(&server)
        .await;

    let suggestions = geocoder_for(&server).suggest("  Berlin ").await.unwrap();
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].name, "Berlin, Germany");
    assert_eq!(suggestions[0].lat, 52.52);
    assert_eq!(suggestions[1].lng, -71.18);
}

#[tokio::test]
async fn short_queries_skip_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let suggestions = geocoder_for(&server).suggest("B").await.unwrap();
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn geocode_takes_the_best_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "display_name": "Lagos, Nigeria", "lat": "6.45", "lon": "3.39" }
        ])))
        .mount(&server)
        .await;

    let coords = geocoder_for(&server).geocode("Lagos").await.unwrap().unwrap();
    assert_eq!(coords.lat, 6.45);
    assert_eq!(coords.lng, 3.39);
}

#[tokio::test]
async fn geocode_without_matches_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert_eq!(geocoder_for(&server).geocode("Nowhere").await.unwrap(), None);
}

#[tokio::test]
async fn remote_failures_become_internal_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = geocoder_for(&server).geocode("Lagos").await.unwrap_err();
    assert_matches!(err, CoreError::Internal(msg) if msg.contains("503"));
}
