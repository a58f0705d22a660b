use codecamp_api::app::{build_router, AppServices};
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(seed: bool) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = build_router(AppServices::in_memory(seed).expect("failed to seed store"));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn talk_body(speaker_id: i32) -> Value {
    json!({
        "title": "Ownership Without Tears",
        "abstract": "Borrowing, lifetimes and how to stop fighting the compiler.",
        "level": 200,
        "speaker": { "speakerId": speaker_id }
    })
}

#[tokio::test]
async fn health_is_ok_and_responses_carry_request_id() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let given = "0190a5a4-8d9e-7c3b-9a51-2f3e4d5c6b7a";
    let res = client
        .get(server.url("/api/camps"))
        .header("x-request-id", given)
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], given);
}

#[tokio::test]
async fn create_camp_on_empty_store_returns_created_with_location() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/camps")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!([]));

    let res = client
        .post(server.url("/api/camps"))
        .json(&json!({ "Name": "Code Camp", "Moniker": "CC2024", "Length": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["location"], "/api/camps/CC2024");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Code Camp");
    assert_eq!(body["moniker"], "CC2024");
    assert_eq!(body["length"], 2);
    assert_eq!(body["eventDate"], "0001-01-01");

    let res = client.get(server.url("/api/camps/CC2024")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched["name"], "Code Camp");
}

#[tokio::test]
async fn duplicate_moniker_is_rejected_without_a_write() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/camps"))
        .json(&json!({ "name": "Impostor Camp", "moniker": "ATL2018" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let camps: Value = client
        .get(server.url("/api/camps"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(camps.as_array().unwrap().len(), 1);
    assert_eq!(camps[0]["name"], "Atlanta Code Camp");
}

#[tokio::test]
async fn unknown_monikers_are_not_found() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    for path in ["/api/camps/unknown", "/api/camps/unknown/talks", "/api/camps/unknown/speakers"] {
        let res = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
    }

    let res = client.delete(server.url("/api/camps/unknown")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_by_date() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/api/camps/search?theDate=2030-01-01"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(server.url("/api/camps/search?theDate=2018-10-18&includeTalks=true"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let camps: Value = res.json().await.unwrap();
    assert_eq!(camps[0]["moniker"], "ATL2018");
    assert_eq!(camps[0]["talks"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn include_talks_controls_nested_talks() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    let camp: Value = client
        .get(server.url("/api/camps/ATL2018"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(camp["talks"], json!([]));

    let camp: Value = client
        .get(server.url("/api/camps/ATL2018?includeTalks=true"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let talks = camp["talks"].as_array().unwrap();
    assert_eq!(talks.len(), 2);
    assert_eq!(talks[0]["title"], "Entity Framework From Scratch");
    assert_eq!(talks[0]["speaker"]["firstName"], "Shawn");
}

#[tokio::test]
async fn update_and_delete_camp() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    let res = client
        .put(server.url("/api/camps/ATL2018"))
        .json(&json!({
            "name": "Atlanta Code Camp 2018",
            "moniker": "ATL2018",
            "eventDate": "2018-10-20",
            "length": 2,
            "location": { "venueName": "Georgia World Congress Center", "cityTown": "Atlanta" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Atlanta Code Camp 2018");
    assert_eq!(body["eventDate"], "2018-10-20");
    assert_eq!(body["location"]["venueName"], "Georgia World Congress Center");

    // Talks survive a camp update.
    let res = client.get(server.url("/api/camps/ATL2018/talks")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.delete(server.url("/api/camps/ATL2018")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url("/api/camps/ATL2018")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = client.get(server.url("/api/camps/ATL2018/talks")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_talk_requires_camp_and_resolvable_speaker() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    let mut no_speaker = talk_body(1);
    no_speaker.as_object_mut().unwrap().remove("speaker");

    for (path, body) in [
        ("/api/camps/ATL2018/talks", no_speaker),
        ("/api/camps/ATL2018/talks", talk_body(999)),
        ("/api/camps/NOPE/talks", talk_body(1)),
    ] {
        let res = client.post(server.url(path)).json(&body).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path} {body}");
    }

    let talks: Value = client
        .get(server.url("/api/camps/ATL2018/talks"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(talks.as_array().unwrap().len(), 2);

    let res = client
        .post(server.url("/api/camps/ATL2018/talks"))
        .json(&talk_body(2))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res.headers()["location"].to_str().unwrap().to_string();
    let created: Value = res.json().await.unwrap();
    let talk_id = created["talkId"].as_i64().unwrap();
    assert!(talk_id > 0);
    assert_eq!(location, format!("/api/camps/ATL2018/talks/{talk_id}"));
    assert_eq!(created["speaker"]["firstName"], "Resa");

    let res = client
        .get(server.url(&format!("{location}?includeSpeakers=true")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched["title"], "Ownership Without Tears");
    assert_eq!(fetched["speaker"]["speakerId"], 2);
}

#[tokio::test]
async fn update_talk_with_unknown_speaker_keeps_current_speaker() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    let res = client
        .put(server.url("/api/camps/ATL2018/talks/1"))
        .json(&talk_body(999))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["talkId"], 1);
    assert_eq!(body["title"], "Ownership Without Tears");
    assert_eq!(body["speaker"]["speakerId"], 1);

    let fetched: Value = client
        .get(server.url("/api/camps/ATL2018/talks/1?includeSpeakers=true"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["level"], 200);
    assert_eq!(fetched["speaker"]["speakerId"], 1);

    let res = client
        .put(server.url("/api/camps/ATL2018/talks/2"))
        .json(&talk_body(1))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["speaker"]["firstName"], "Shawn");

    let res = client
        .put(server.url("/api/camps/ATL2018/talks/404"))
        .json(&talk_body(1))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn speakers_routes() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    let speakers: Value = client
        .get(server.url("/api/speakers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = speakers
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["firstName"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Resa", "Shawn"]);
    assert_eq!(speakers[1]["gitHub"], "shawnwildermuth");

    let res = client.get(server.url("/api/speakers/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url("/api/speakers/77")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(server.url("/api/speakers/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(server.url("/api/camps/ATL2018/speakers")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let server = TestServer::spawn(false).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/camps"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn monikers_with_reserved_characters_get_encoded_links() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    for (moniker, expected) in [("CC 2024", "/api/camps/CC%202024"), ("C#Conf", "/api/camps/C%23Conf")] {
        let res = client
            .post(server.url("/api/camps"))
            .json(&json!({ "name": "Code Camp", "moniker": moniker, "length": 2 }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED, "{moniker}");
        let location = res.headers()["location"].to_str().unwrap().to_string();
        assert_eq!(location, expected);

        let res = client.get(server.url(&location)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{location}");
        let camp: Value = res.json().await.unwrap();
        assert_eq!(camp["moniker"], moniker);
    }
}

#[tokio::test]
async fn renaming_onto_a_taken_moniker_is_rejected() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/camps"))
        .json(&json!({ "name": "Code Camp", "moniker": "CC2024" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .put(server.url("/api/camps/CC2024"))
        .json(&json!({ "name": "Code Camp", "moniker": "ATL2018" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Moniker already in use");

    let res = client.get(server.url("/api/camps/CC2024")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let camp: Value = client
        .get(server.url("/api/camps/ATL2018"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(camp["name"], "Atlanta Code Camp");
}

#[tokio::test]
async fn include_talks_flag_is_case_insensitive() {
    let server = TestServer::spawn(true).await;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/api/camps?includeTalks=True"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let camps: Value = res.json().await.unwrap();
    assert_eq!(camps[0]["talks"].as_array().unwrap().len(), 2);
}
