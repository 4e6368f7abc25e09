//! Integration tests for OpenWeatherClient using wiremock.

use std::sync::Arc;

use parking_lot::Mutex;
use weathernow_core::{
    ClientError, Coordinates, CycleOutcome, ForecastClient, Locator, OpenWeatherClient, Phase,
    Presenter, StaticLocation, WeatherClient, WeatherResolutionFlow,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_body(name: &str, main: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "dt": 1_760_522_400,
        "main": { "temp": temp, "feels_like": temp - 1.0, "humidity": 60 },
        "weather": [{ "main": main, "description": main.to_lowercase() }],
        "wind": { "speed": 3.5 },
        "sys": { "country": "FR" }
    })
}

fn forecast_body(name: &str, count: i64) -> serde_json::Value {
    let list: Vec<_> = (0..count)
        // deliberately newest first
        .rev()
        .map(|i| {
            serde_json::json!({
                "dt": 1_760_522_400 + i * 10_800,
                "main": { "temp": 10.0 + i as f64 },
                "weather": [{ "main": "Clouds", "description": "broken clouds" }]
            })
        })
        .collect();
    serde_json::json!({ "city": { "name": name, "country": "FR" }, "list": list })
}

fn client(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::with_base_url("TEST_KEY".to_string(), &server.uri())
}

#[derive(Debug, Default)]
struct Alerts(Mutex<Vec<String>>);

impl Presenter for Alerts {
    fn alert(&self, message: &str) {
        self.0.lock().push(message.to_string());
    }
}

#[tokio::test]
async fn current_weather_by_city() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", "Clear", 18.0)))
        .expect(1)
        .mount(&server)
        .await;

    let record = client(&server)
        .fetch_current_weather(&Locator::city(" Paris "))
        .await
        .unwrap();

    assert_eq!(record.city_name, "Paris");
    assert_eq!(record.condition_main, "Clear");
    assert_eq!(record.temperature_c, 18.0);
    assert_eq!(record.display_name(), "Paris, FR");
}

#[tokio::test]
async fn current_weather_by_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "59.91"))
        .and(query_param("lon", "10.75"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Oslo", "Rain", 6.0)))
        .expect(1)
        .mount(&server)
        .await;

    let locator = Locator::Coordinates(Coordinates::new(59.91, 10.75));
    let record = client(&server).fetch_current_weather(&locator).await.unwrap();

    assert_eq!(record.city_name, "Oslo");
    assert_eq!(record.condition_main, "Rain");
}

#[tokio::test]
async fn unknown_city_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_current_weather(&Locator::city("Qwxyzzy"))
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_current_weather(&Locator::city("Paris"))
        .await
        .unwrap_err();

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_city_is_rejected_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_current_weather(&Locator::city("  "))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidLocator(_)));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let client = OpenWeatherClient::with_base_url("TEST_KEY".to_string(), "http://127.0.0.1:9");

    let err = client.fetch_current_weather(&Locator::city("Paris")).await.unwrap_err();

    assert!(matches!(err, ClientError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn forecast_uses_canonical_name_and_sorts_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", "Clear", 18.0)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "Paris"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Paris", 5)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let weather = client.fetch_current_weather(&Locator::city("paris")).await.unwrap();
    let city = weather.canonical_city().unwrap();
    let forecast = client.fetch_forecast(&city).await.unwrap();

    assert_eq!(forecast.city.as_str(), "Paris");
    assert_eq!(forecast.entries.len(), 5);
    assert!(forecast.entries.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(forecast.entries[0].temperature_c, 10.0);
}

#[tokio::test]
async fn forecast_not_found_and_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Atlantis", "Clear", 25.0)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let weather = client.fetch_current_weather(&Locator::city("Atlantis")).await.unwrap();
    let city = weather.canonical_city().unwrap();

    let err = client.fetch_forecast(&city).await.unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    assert!(err.to_string().contains("Atlantis"));

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.fetch_forecast(&city).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 502, .. }), "got {err:?}");
}

#[tokio::test]
async fn flow_against_mock_provider() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "48.85"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", "Clouds", 14.0)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = Arc::new(client(&server));
    let alerts = Arc::new(Alerts::default());
    let flow = WeatherResolutionFlow::new(
        client.clone(),
        client,
        Arc::new(StaticLocation::new(Some(Coordinates::new(48.85, 2.35)))),
        alerts.clone(),
    );

    let outcome = flow.on_mount().await;
    assert!(matches!(outcome, CycleOutcome::ReadyWithoutForecast));

    let state = flow.state();
    assert_eq!(state.phase, Phase::Ready);
    assert_eq!(state.weather.map(|w| w.city_name), Some("Paris".to_string()));
    assert!(state.forecast.is_none());
    assert!(alerts.0.lock().is_empty());
}
