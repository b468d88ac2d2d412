use audio_resolver::{
    configuration::{MirrorGroupSettings, Settings},
    startup::Application,
    telemetry::init_subscriber,
};
use reqwest::Url;
use std::sync::LazyLock;
use std::time::Duration;
use wiremock::MockServer;

static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        init_subscriber();
    }
});

pub struct TestApp {
    pub address: String,
    pub port: u16,
    /// Stands in for the whole "piped" group (one instance).
    pub primary_mirror: MockServer,
    /// Stands in for the whole "invidious" group (one instance).
    pub secondary_mirror: MockServer,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spin up an instance of our application against two wiremock mirror
    /// groups and return its address (i.e. http://localhost:XXXX).
    pub async fn spawn_app() -> TestApp {
        LazyLock::force(&TRACING);
        let mut config = Settings::new().expect("Failed to read configuration");

        let primary_mirror = MockServer::start().await;
        let secondary_mirror = MockServer::start().await;

        config.application_cfg.host = "127.0.0.1".into();
        config.application_cfg.port = 0; // Random port
        config.resolver_cfg.timeout_ms = Duration::from_millis(200);
        config.resolver_cfg.max_attempts = 2;
        config.resolver_cfg.overall_deadline_ms = Duration::from_secs(5);
        config.mirrors_cfg.groups = vec![
            MirrorGroupSettings {
                name: "piped".into(),
                path_template: "/api/v1/streams/{id}".into(),
                search_path: "/api/v1/search".into(),
                instances: vec![Url::parse(&primary_mirror.uri()).unwrap()],
            },
            MirrorGroupSettings {
                name: "invidious".into(),
                path_template: "/api/v1/videos/{id}".into(),
                search_path: "/api/v1/search".into(),
                instances: vec![Url::parse(&secondary_mirror.uri()).unwrap()],
            },
        ];

        // Launch the application as a background task
        let application = Application::build(config)
            .await
            .expect("Failed to build application.");

        let application_port = application.port();

        tokio::spawn(application.run_until_stopped());

        TestApp {
            address: format!("http://localhost:{}", application_port),
            port: application_port,
            primary_mirror,
            secondary_mirror,
            client: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap(),
        }
    }

    pub async fn get_resolve(&self, reference: &str) -> reqwest::Response {
        self.get("resolve", &[("url", reference)]).await
    }

    pub async fn get_listen(&self, reference: &str) -> reqwest::Response {
        self.get("listen", &[("url", reference)]).await
    }

    pub async fn get_search(&self, query: &str) -> reqwest::Response {
        self.get("search", &[("q", query)]).await
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .get(format!("{}/{}", &self.address, path))
            .query(query)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// A Piped-family streams document with one clear audio winner.
pub fn piped_streams_body() -> serde_json::Value {
    serde_json::json!({
        "title": "T",
        "duration": 245,
        "thumbnailUrl": "https://img.example/1.jpg",
        "audioStreams": [
            {"url": "https://cdn.example/audio-low.m4a", "bitrate": 64, "mimeType": "audio/mp4"},
            {"url": "https://cdn.example/audio.m4a", "bitrate": 160, "mimeType": "audio/mp4"}
        ]
    })
}

/// An Invidious-family videos document with string-encoded numbers.
pub fn invidious_videos_body() -> serde_json::Value {
    serde_json::json!({
        "title": "T2",
        "lengthSeconds": 100,
        "videoThumbnails": [{"url": "https://img.example/2.jpg", "quality": "maxres"}],
        "adaptiveFormats": [
            {"url": "https://cdn.example/video.mp4", "type": "video/mp4; codecs=\"avc1\"", "bitrate": "900000"},
            {"url": "https://cdn.example/audio.webm", "type": "audio/webm; codecs=\"opus\"", "bitrate": "128000"}
        ]
    })
}
