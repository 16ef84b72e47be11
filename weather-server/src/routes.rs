//! HTTP surface: welcome, start a collection job, poll its progress.

use serde::Deserialize;
use serde_json::json;
use std::{convert::Infallible, sync::Arc};
use warp::{
    Filter, Rejection, Reply,
    http::StatusCode,
    reply::Response,
};
use weather_core::{ServiceError, WeatherService};

const WELCOME: &str = "Welcome to the DevGrid Weather Challenge";
const STARTED: &str = "Weather data collection has been successfully initiated.";
const ALREADY_EXISTS: &str = "User ID already exists in the system.";
const NOT_FOUND: &str = "User ID cannot be found in the database.";
const BLANK_ID: &str = "Request ID cannot be blank.";
const EMPTY_ID: &str = "Request ID cannot be empty.";
const UNEXPECTED: &str = "An unexpected error occurred. Please try again later.";

#[derive(Debug, Deserialize)]
struct CollectionRequest {
    request_id: String,
}

/// All routes, with rejections turned into `{"detail": ...}` bodies.
pub fn routes(
    service: Arc<WeatherService>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let with_service = warp::any().map(move || service.clone());

    let index = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::json(&json!({ "message": WELCOME })));

    let start = warp::path("weather")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_service.clone())
        .and_then(start_collection);

    let empty_id = warp::path("weather")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| detail(StatusCode::UNPROCESSABLE_ENTITY, EMPTY_ID));

    let progress = warp::path!("weather" / String)
        .and(warp::get())
        .and(with_service)
        .and_then(get_progress);

    index
        .or(start)
        .or(empty_id)
        .or(progress)
        .with(warp::trace::request())
        .recover(handle_rejection)
}

async fn start_collection(
    body: CollectionRequest,
    service: Arc<WeatherService>,
) -> Result<Response, Infallible> {
    let reply = match service.start_collection(&body.request_id).await {
        Ok(_) => warp::reply::json(&json!({ "message": STARTED })).into_response(),
        Err(ServiceError::BlankRequestId) => detail(StatusCode::UNPROCESSABLE_ENTITY, BLANK_ID),
        Err(err) => service_error(err),
    };
    Ok(reply)
}

async fn get_progress(raw_id: String, service: Arc<WeatherService>) -> Result<Response, Infallible> {
    let request_id = match urlencoding::decode(&raw_id) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw_id.clone(),
    };

    if request_id.trim().is_empty() {
        return Ok(detail(StatusCode::UNPROCESSABLE_ENTITY, EMPTY_ID));
    }

    let reply = match service.progress(&request_id) {
        Ok(view) => warp::reply::json(&view).into_response(),
        Err(err) => service_error(err),
    };
    Ok(reply)
}

fn service_error(err: ServiceError) -> Response {
    match err {
        ServiceError::BlankRequestId => detail(StatusCode::UNPROCESSABLE_ENTITY, EMPTY_ID),
        ServiceError::AlreadyExists(id) => {
            tracing::info!(request_id = %id, "rejected duplicate request id");
            detail(StatusCode::BAD_REQUEST, ALREADY_EXISTS)
        }
        ServiceError::NotFound(_) => detail(StatusCode::NOT_FOUND, NOT_FOUND),
        other => {
            tracing::error!(error = %other, "request failed");
            detail(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED)
        }
    }
}

fn detail(status: StatusCode, message: impl AsRef<str>) -> Response {
    warp::reply::with_status(warp::reply::json(&json!({ "detail": message.as_ref() })), status)
        .into_response()
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let reply = if err.is_not_found() {
        detail(StatusCode::NOT_FOUND, "Not Found")
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        detail(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        detail(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported Media Type")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        detail(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    } else {
        tracing::error!(rejection = ?err, "unhandled rejection");
        detail(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED)
    };
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use weather_core::{
        Catalog, CityId, CollectionRecord, ProviderError, RecordStore, SqliteRecordStore,
        WeatherProvider, WeatherReading,
    };

    /// Answers `temperature = city_id`, `humidity = 50`, failing on one optional city.
    #[derive(Debug, Default)]
    struct FakeProvider {
        fail_on: Option<CityId>,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn get_weather(&self, city_id: CityId) -> Result<WeatherReading, ProviderError> {
            if self.fail_on == Some(city_id) {
                return Err(ProviderError::Status { city_id, status: 500, body: String::new() });
            }
            Ok(WeatherReading { city_id, temperature: f64::from(city_id), humidity: 50 })
        }
    }

    fn test_service(fail_on: Option<CityId>) -> (Arc<WeatherService>, Arc<SqliteRecordStore>) {
        let store = Arc::new(SqliteRecordStore::in_memory().expect("store"));
        let service = WeatherService::new(
            store.clone(),
            Arc::new(FakeProvider { fail_on }),
            Catalog::new(vec![1, 2, 3]).expect("catalog"),
        );
        (Arc::new(service), store)
    }

    fn json_body(body: &[u8]) -> Value {
        serde_json::from_slice(body).expect("json body")
    }

    fn post_weather(body: Value) -> warp::test::RequestBuilder {
        warp::test::request().method("POST").path("/weather/").json(&body)
    }

    #[tokio::test]
    async fn root_welcomes() {
        let (service, _) = test_service(None);
        let resp = warp::test::request().path("/").reply(&routes(service)).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp.body()), json!({ "message": WELCOME }));
    }

    #[tokio::test]
    async fn start_collection_success_then_progress_is_complete() {
        let (service, _) = test_service(None);
        let api = routes(service);

        let resp = post_weather(json!({ "request_id": "unique_request_id" })).reply(&api).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp.body()), json!({ "message": STARTED }));

        let resp = warp::test::request().path("/weather/unique_request_id").reply(&api).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp.body());
        assert_eq!(body["request_id"], "unique_request_id");
        assert_eq!(body["upload_progress"], "100% uploaded...");
        assert_eq!(
            body["data"],
            r#"[{"city_id":1,"temperature":1.0,"humidity":50},{"city_id":2,"temperature":2.0,"humidity":50},{"city_id":3,"temperature":3.0,"humidity":50}]"#
        );
    }

    #[tokio::test]
    async fn start_collection_existing_id_is_rejected() {
        let (service, store) = test_service(None);
        let api = routes(service);

        assert_eq!(post_weather(json!({ "request_id": "existing" })).reply(&api).await.status(), StatusCode::OK);
        let before = store.get("existing").expect("query");

        let resp = post_weather(json!({ "request_id": "existing" })).reply(&api).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp.body()), json!({ "detail": ALREADY_EXISTS }));
        assert_eq!(store.get("existing").expect("query"), before);
    }

    #[tokio::test]
    async fn start_collection_blank_id_is_unprocessable() {
        let (service, store) = test_service(None);
        let api = routes(service);

        let resp = post_weather(json!({ "request_id": "   " })).reply(&api).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(resp.body()), json!({ "detail": BLANK_ID }));
        assert!(!store.exists("   ").expect("query"));
    }

    #[tokio::test]
    async fn start_collection_missing_field_is_unprocessable() {
        let (service, _) = test_service(None);
        let resp = post_weather(json!({ "id": "x" })).reply(&routes(service)).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn start_collection_failure_is_generic_500_with_partial_progress() {
        let (service, _) = test_service(Some(2));
        let api = routes(service);

        let resp = post_weather(json!({ "request_id": "job" })).reply(&api).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(resp.body()), json!({ "detail": UNEXPECTED }));

        let resp = warp::test::request().path("/weather/job").reply(&api).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp.body());
        assert_eq!(body["upload_progress"], "33% uploaded...");
        assert_eq!(body["data"], r#"[{"city_id":1,"temperature":1.0,"humidity":50}]"#);
    }

    #[tokio::test]
    async fn progress_returns_stored_record() {
        let (service, store) = test_service(None);
        let data = r#"[{"city_id":3439525,"temperature":20.0,"humidity":70}]"#;
        store
            .insert(&CollectionRecord {
                request_id: "valid_request_id".into(),
                timestamp: "2024-01-01T00:00:00Z".parse().expect("timestamp"),
                data: data.into(),
            })
            .expect("insert");

        let resp = warp::test::request().path("/weather/valid_request_id").reply(&routes(service)).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            json_body(resp.body()),
            json!({
                "request_id": "valid_request_id",
                "timestamp": "2024-01-01T00:00:00Z",
                "data": data,
                "upload_progress": "33% uploaded..."
            })
        );
    }

    #[tokio::test]
    async fn progress_empty_id_is_unprocessable() {
        let (service, _) = test_service(None);
        let api = routes(service);

        for path in ["/weather/", "/weather/%20%20"] {
            let resp = warp::test::request().path(path).reply(&api).await;
            assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{path}");
            assert_eq!(json_body(resp.body()), json!({ "detail": EMPTY_ID }));
        }
    }

    #[tokio::test]
    async fn progress_unknown_id_is_not_found() {
        let (service, _) = test_service(None);
        let resp = warp::test::request().path("/weather/nonexistent").reply(&routes(service)).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(resp.body()), json!({ "detail": NOT_FOUND }));
    }

    #[tokio::test]
    async fn progress_decodes_percent_escapes() {
        let (service, _) = test_service(None);
        let api = routes(service);

        assert_eq!(post_weather(json!({ "request_id": "a b" })).reply(&api).await.status(), StatusCode::OK);

        let resp = warp::test::request().path("/weather/a%20b").reply(&api).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp.body())["request_id"], "a b");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (service, _) = test_service(None);
        let resp = warp::test::request().path("/nope").reply(&routes(service)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
