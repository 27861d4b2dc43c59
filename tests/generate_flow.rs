use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};
use url::Url;

use rex_recipes::{
    FoodGoal,
    app::{AppState, router},
    client::{ComposeError, RecipeBook, RecipeClient},
    config::Config,
    store::LocalRecordStore,
    upstream::GatewayClient,
};

#[derive(Clone)]
struct Gateway {
    status: StatusCode,
    body: Value,
    delay: Duration,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn completions(State(gateway): State<Gateway>, Json(request): Json<Value>) -> (StatusCode, Json<Value>) {
    gateway.requests.lock().unwrap().push(request);
    tokio::time::sleep(gateway.delay).await;
    (gateway.status, Json(gateway.body.clone()))
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}")
}

fn recipe_json() -> Value {
    json!({
        "title": "Dino Egg Fried Rice",
        "description": "A quick bulking bowl.",
        "dinoCommentary": "ROAR! Rice and eggs, my favourite fossils!",
        "ingredients": [
            {"name": "egg", "amount": "3", "unit": "whole"},
            {"name": "rice", "amount": "2", "unit": "cups", "notes": "cooked"}
        ],
        "instructions": [
            {"step": 1, "instruction": "Scramble the eggs."},
            {"step": 2, "instruction": "Fry the rice with the eggs.", "tip": "High heat!"}
        ],
        "tips": ["Day-old rice fries best."],
        "substitutions": [{"original": "rice", "substitute": "cauliflower rice", "notes": "for fewer carbs"}],
        "prepTime": 10,
        "cookTime": 20,
        "totalTime": 30,
        "servings": 2,
        "difficulty": "beginner",
        "nutrition": {"calories": 640, "protein": 28, "carbs": 90, "fat": 16, "fiber": 3, "goalNotes": "Carb heavy for bulking."}
    })
}

fn completion(content: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

struct Harness {
    client: RecipeClient,
    app_url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn harness(status: StatusCode, body: Value, api_key: Option<&str>) -> Harness {
    harness_with(status, body, Duration::ZERO, |gateway_url| {
        Config::for_gateway(gateway_url, api_key)
    })
    .await
}

async fn harness_with(
    status: StatusCode,
    body: Value,
    delay: Duration,
    configure: impl FnOnce(Url) -> Config,
) -> Harness {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let gateway = Gateway {
        status,
        body,
        delay,
        requests: requests.clone(),
    };
    let gateway_url = spawn(
        Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(gateway),
    )
    .await;

    let config = configure(Url::parse(&format!("{gateway_url}/v1")).unwrap());
    let backend = GatewayClient::from_config(&config).unwrap();
    let app_url = spawn(router(AppState::new(config, Arc::new(backend)))).await;

    let endpoint = Url::parse(&format!("{app_url}/generate-recipe")).unwrap();
    Harness {
        client: RecipeClient::new(endpoint, "publishable-key"),
        app_url,
        requests,
    }
}

#[tokio::test]
async fn egg_and_rice_for_bulking_round_trips() {
    let h = harness(StatusCode::OK, completion(&recipe_json().to_string()), Some("gateway-key")).await;

    let recipe = h
        .client
        .generate(["egg", "rice"], FoodGoal::Bulking, 30)
        .await
        .unwrap();
    assert!(recipe.servings > 0);
    assert!(recipe.nutrition.calories >= 0.0);
    assert_eq!(recipe.total_time, 30);
    assert_eq!(recipe.food_goal, Some(FoodGoal::Bulking));
    assert_eq!(recipe.instructions.len(), 2);

    let requests = h.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent["model"], "google/gemini-3-flash-preview");
    assert_eq!(sent["messages"][0]["role"], "system");
    let user_prompt = sent["messages"][1]["content"].as_str().unwrap();
    assert!(user_prompt.contains("egg, rice"));
    assert!(user_prompt.contains("bulking (high calories, high protein, high carbs for muscle gain)"));
    assert!(user_prompt.contains("30 minutes"));
}

#[tokio::test]
async fn fenced_content_is_accepted() {
    let fenced = format!("```json\n{}\n```", recipe_json());
    let h = harness(StatusCode::OK, completion(&fenced), Some("gateway-key")).await;
    let recipe = h.client.generate(["egg"], FoodGoal::Balanced, 20).await.unwrap();
    assert_eq!(recipe.title, "Dino Egg Fried Rice");
}

#[tokio::test]
async fn gateway_rate_limit_reaches_the_caller() {
    let h = harness(StatusCode::TOO_MANY_REQUESTS, json!({"error": "slow down"}), Some("gateway-key")).await;
    let err = h.client.generate(["egg"], FoodGoal::Balanced, 20).await.unwrap_err();
    assert!(matches!(err, ComposeError::RateLimited));
    assert_eq!(h.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn gateway_payment_required_reaches_the_caller() {
    let h = harness(StatusCode::PAYMENT_REQUIRED, json!({}), Some("gateway-key")).await;
    let err = h.client.generate(["egg"], FoodGoal::Balanced, 20).await.unwrap_err();
    assert!(matches!(err, ComposeError::CreditsExhausted));
}

#[tokio::test]
async fn other_gateway_failures_surface_the_error_field() {
    let h = harness(StatusCode::BAD_GATEWAY, json!({"message": "upstream down"}), Some("gateway-key")).await;
    match h.client.generate(["egg"], FoodGoal::Balanced, 20).await {
        Err(ComposeError::Failed(message)) => assert_eq!(message, "AI gateway error: 502"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn status_codes_and_bodies_seen_by_raw_callers() {
    for (upstream, expected) in [
        (StatusCode::TOO_MANY_REQUESTS, StatusCode::TOO_MANY_REQUESTS),
        (StatusCode::PAYMENT_REQUIRED, StatusCode::PAYMENT_REQUIRED),
        (StatusCode::SERVICE_UNAVAILABLE, StatusCode::INTERNAL_SERVER_ERROR),
        (StatusCode::UNAUTHORIZED, StatusCode::INTERNAL_SERVER_ERROR),
    ] {
        let h = harness(upstream, json!({}), Some("gateway-key")).await;
        let response = reqwest::Client::new()
            .post(format!("{}/generate-recipe", h.app_url))
            .json(&json!({"ingredients": ["egg"], "foodGoal": "balanced", "cookingTime": 20}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), expected.as_u16());
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn unparsable_content_is_a_500_without_the_content() {
    let h = harness(StatusCode::OK, completion("Here is your recipe: LEAKED-TEXT"), Some("gateway-key")).await;
    let response = reqwest::Client::new()
        .post(format!("{}/generate-recipe", h.app_url))
        .json(&json!({"ingredients": ["egg"], "foodGoal": "balanced", "cookingTime": 20}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);
    let text = response.text().await.unwrap();
    assert!(!text.contains("LEAKED-TEXT"));
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["error"], "Failed to parse recipe from AI response");
}

#[tokio::test]
async fn missing_gateway_key_is_reported_without_calling_upstream() {
    let h = harness(StatusCode::OK, completion(&recipe_json().to_string()), None).await;
    match h.client.generate(["egg"], FoodGoal::Balanced, 20).await {
        Err(ComposeError::Failed(message)) => assert_eq!(message, "AI_GATEWAY_API_KEY is not configured"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(h.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn same_request_twice_gives_identical_bodies() {
    let h = harness(StatusCode::OK, completion(&recipe_json().to_string()), Some("gateway-key")).await;
    let http = reqwest::Client::new();
    let body = json!({"ingredients": ["egg", "rice"], "foodGoal": "bulking", "cookingTime": 30});

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let response = http
            .post(format!("{}/generate-recipe", h.app_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        bodies.push(response.bytes().await.unwrap());
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn unknown_goal_is_steered_as_balanced() {
    let h = harness(StatusCode::OK, completion(&recipe_json().to_string()), Some("gateway-key")).await;
    let response = reqwest::Client::new()
        .post(format!("{}/generate-recipe", h.app_url))
        .json(&json!({"ingredients": ["egg"], "foodGoal": "moon-diet", "cookingTime": 20}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let requests = h.requests.lock().unwrap();
    let prompt = requests[0]["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains(FoodGoal::Balanced.description()));
}

#[tokio::test]
async fn oddly_typed_recipe_still_reaches_the_caller() {
    let content = json!({
        "title": "Eggs",
        "ingredients": ["egg", "rice"],
        "tips": "one tip",
        "instructions": [{"step": "1", "instruction": "Boil.", "tip": 5}],
        "servings": 2
    });
    let h = harness(StatusCode::OK, completion(&content.to_string()), Some("gateway-key")).await;

    let recipe = h.client.generate(["egg", "rice"], FoodGoal::Cutting, 15).await.unwrap();
    assert_eq!(recipe.title, "Eggs");
    let names: Vec<_> = recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["egg", "rice"]);
    assert_eq!(recipe.tips, ["one tip"]);
    assert_eq!(recipe.instructions[0].step, 1);
    assert_eq!(recipe.instructions[0].tip.as_deref(), Some("5"));
    assert_eq!(recipe.servings, 2);
    assert_eq!(recipe.nutrition.calories, 0.0);
    assert_eq!(recipe.food_goal, Some(FoodGoal::Cutting));
}

#[tokio::test]
async fn non_json_success_body_is_a_generic_failure() {
    let app_url = spawn(Router::new().route("/generate-recipe", post(|| async { "definitely not json" }))).await;
    let client = RecipeClient::new(Url::parse(&format!("{app_url}/generate-recipe")).unwrap(), "anon");

    match client.generate(["egg"], FoodGoal::Balanced, 20).await {
        Err(ComposeError::Failed(message)) => assert_eq!(message, "Failed to generate recipe"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn gateway_timeout_is_a_single_500() {
    let h = harness_with(
        StatusCode::OK,
        completion(&recipe_json().to_string()),
        Duration::from_secs(2),
        |gateway_url| {
            let mut config = Config::for_gateway(gateway_url, Some("gateway-key"));
            config.gateway_timeout = Some(Duration::from_millis(100));
            config
        },
    )
    .await;

    let response = reqwest::Client::new()
        .post(format!("{}/generate-recipe", h.app_url))
        .json(&json!({"ingredients": ["egg"], "foodGoal": "balanced", "cookingTime": 20}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);
    let text = response.text().await.unwrap();
    assert!(!text.contains("/v1/chat/completions"));
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["error"], "AI gateway request failed");
    assert_eq!(h.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn generated_recipe_can_be_saved_and_listed() {
    let mut config = Config::for_gateway(Url::parse("http://127.0.0.1:9/v1").unwrap(), None);
    config.data_dir = std::env::temp_dir().join(format!("rex-flow-{}", uuid::Uuid::new_v4()));
    let book = RecipeBook::new(LocalRecordStore::from_config(&config));

    let h = harness(StatusCode::OK, completion(&recipe_json().to_string()), Some("gateway-key")).await;
    let recipe = h.client.generate(["egg", "rice"], FoodGoal::Bulking, 30).await.unwrap();

    let saved = book.save("alice", &recipe).await.unwrap();
    assert!(saved.id.is_some());
    assert!(config.data_dir.join("recipes").is_dir());

    let listed = book.list("alice").await.unwrap();
    assert_eq!(listed, vec![saved]);
    assert_eq!(listed[0].food_goal, Some(FoodGoal::Bulking));
    assert_eq!(listed[0].ingredients, recipe.ingredients);
}
