//! HTTP tests for the form page and JSON API over an in-memory registry

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use disease_predictor::api::{create_router, AppState};
use disease_predictor::{
    AppResult, BinaryLabel, Classifier, Disease, FeatureVector, ModelRegistry, SessionStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Positive when the feature at `index` exceeds `cutoff`
struct Cutoff {
    width: usize,
    index: usize,
    cutoff: f64,
}

impl Classifier for Cutoff {
    fn n_features(&self) -> usize {
        self.width
    }

    fn predict(&self, features: &FeatureVector) -> AppResult<BinaryLabel> {
        if features.len() != self.width {
            return Err(disease_predictor::AppError::shape_mismatch(self.width, features.len()));
        }
        Ok(if features.as_slice()[self.index] > self.cutoff {
            BinaryLabel::Positive
        } else {
            BinaryLabel::Negative
        })
    }

    fn model_type(&self) -> &'static str {
        "cutoff"
    }
}

fn registry(skip: Option<Disease>, heart_width: usize) -> ModelRegistry {
    let mut builder = ModelRegistry::builder();
    for disease in Disease::ALL {
        if Some(disease) == skip {
            continue;
        }
        let width = match disease {
            Disease::HeartDisease => heart_width,
            _ => disease.default_layout().len(),
        };
        // Glucose for diabetes, first field elsewhere
        let index = if disease == Disease::Diabetes { 1 } else { 0 };
        builder = builder
            .register(
                disease,
                Box::new(Cutoff {
                    width,
                    index,
                    cutoff: 140.0,
                }),
            )
            .unwrap();
    }
    builder.build()
}

fn app_with(registry: ModelRegistry) -> Router {
    let state = Arc::new(AppState::new(Arc::new(registry), SessionStore::default()));
    create_router(state)
}

fn app() -> Router {
    app_with(registry(None, 13))
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

async fn post_json(app: &Router, uri: &str, payload: Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn get_page(app: &Router, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().method("GET").uri("/");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone().oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
}

async fn post_form(app: &Router, uri: &str, cookie: &str, body: &str) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string()
}

// ============================================
// JSON API
// ============================================

#[tokio::test]
async fn test_health_reports_models() {
    let response = app()
        .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["models_available"], 5);
}

#[tokio::test]
async fn test_degraded_when_model_missing() {
    let app = app_with(registry(Some(Disease::LungCancer), 13));
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "degraded");
    assert_eq!(body["data"]["models_available"], 4);

    let response = post_json(&app, "/v1/predict", json!({"disease": "lung_cancer"})).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "MODEL_UNAVAILABLE");

    // the rest keep working
    let response = post_json(&app, "/v1/predict", json!({"disease": "diabetes"})).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_diseases_catalogue_follows_model_layout() {
    let app = app_with(registry(None, 9));
    let response = app
        .oneshot(Request::builder().uri("/v1/diseases").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    let diseases = body["data"].as_array().unwrap();
    assert_eq!(diseases.len(), 5);
    assert_eq!(diseases[0]["slug"], "diabetes");
    assert_eq!(diseases[1]["layout"], "compact");
    assert_eq!(diseases[1]["fields"].as_array().unwrap().len(), 9);
    assert_eq!(diseases[1]["fields"][8]["key"], "Exang");
}

#[tokio::test]
async fn test_predict_with_named_features() {
    let response = post_json(
        &app(),
        "/v1/predict",
        json!({"disease": "diabetes", "features": {"Glucose": 150.0, "Age": 40.0}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["result"], "Positive");
    assert_eq!(body["data"]["class"], 1);
    assert_eq!(body["data"]["message"], "The person is Positive for 🩺 Diabetes");
    assert_eq!(
        body["data"]["features"],
        json!([0.0, 150.0, 0.0, 0.0, 0.0, 0.0, 0.0, 40.0])
    );
}

#[tokio::test]
async fn test_predict_with_ordered_values() {
    let response = post_json(
        &app(),
        "/v1/predict",
        json!({"disease": "diabetes", "values": [2, 120, 70, 30, 80, 25.0, 0.5, 33]}),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["result"], "Negative");
    assert_eq!(body["data"]["message"], "The person is Negative for 🩺 Diabetes");
}

#[tokio::test]
async fn test_predict_rejections() {
    let app = app();

    let response = post_json(&app, "/v1/predict", json!({"disease": "flu"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        &app,
        "/v1/predict",
        json!({"disease": "hypothyroid", "features": {"Cholesterol": 1.0}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "API_BAD_REQUEST");

    let response = post_json(
        &app,
        "/v1/predict",
        json!({"disease": "parkinsons", "values": [1.0, 2.0, 3.0]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"]["code"], "PREDICT_SHAPE_MISMATCH");

    let response = post_json(
        &app,
        "/v1/predict",
        json!({"disease": "diabetes", "values": [1.0], "features": {}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================
// Form page
// ============================================

#[tokio::test]
async fn test_page_defaults_to_first_disease() {
    let app = app();
    let response = get_page(&app, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).starts_with("predictor_session="));

    let html = body_string(response).await;
    assert!(html.contains("Select Disease to Predict"));
    assert!(html.contains("Predict 🩺 Diabetes"));
    assert!(html.contains("name=\"DiabetesPedigreeFunction\" value=\"0\""));
    assert!(!html.contains("id=\"result\""));
}

#[tokio::test]
async fn test_select_then_predict_flow() {
    let app = app();
    let cookie = session_cookie(&get_page(&app, None).await);

    let response = post_form(&app, "/select", &cookie, "disease=heart_disease").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let html = body_string(get_page(&app, Some(&cookie)).await).await;
    assert!(html.contains("Predict ❤️ Heart Disease"));
    assert!(html.contains("name=\"Thal\""));

    let response = post_form(
        &app,
        "/predict",
        &cookie,
        "disease=diabetes&Pregnancies=2&Glucose=120&BloodPressure=70&SkinThickness=30\
         &Insulin=80&BMI=25.0&DiabetesPedigreeFunction=0.5&Age=33",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("The person is Negative for 🩺 Diabetes"));
    assert!(html.contains("name=\"Glucose\" value=\"120\""));
}

#[tokio::test]
async fn test_switching_back_shows_zeroed_fields() {
    let app = app();
    let cookie = session_cookie(&get_page(&app, None).await);

    let html = body_string(post_form(&app, "/predict", &cookie, "disease=diabetes&Glucose=150").await).await;
    assert!(html.contains("The person is Positive for 🩺 Diabetes"));

    post_form(&app, "/select", &cookie, "disease=hypothyroid").await;
    post_form(&app, "/select", &cookie, "disease=diabetes").await;

    let html = body_string(get_page(&app, Some(&cookie)).await).await;
    assert!(html.contains("name=\"Glucose\" value=\"0\""));
    assert!(!html.contains("id=\"result\""));
}

#[tokio::test]
async fn test_blank_and_garbage_inputs_become_zero() {
    let app = app();
    let cookie = session_cookie(&get_page(&app, None).await);

    let html = body_string(
        post_form(&app, "/predict", &cookie, "disease=diabetes&Glucose=&BMI=abc&Age=51").await,
    )
    .await;
    assert!(html.contains("name=\"Glucose\" value=\"0\""));
    assert!(html.contains("name=\"BMI\" value=\"0\""));
    assert!(html.contains("name=\"Age\" value=\"51\""));
    assert!(html.contains("Negative for 🩺 Diabetes"));
}

#[tokio::test]
async fn test_unknown_disease_in_form_is_rejected() {
    let app = app();
    let cookie = session_cookie(&get_page(&app, None).await);
    let response = post_form(&app, "/select", &cookie, "disease=gout").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
