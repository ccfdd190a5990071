use crate::autofill::AutofillPayload;
use crate::submission::SubmitRequest;
use crate::{Region, Team};
use log::{debug, info, warn};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

/// Initial teams by region, as served by `GET /teams`.
pub type RegionTeams = BTreeMap<Region, Vec<Team>>;

const EMBEDDED_TEAMS_YEAR: u16 = 2025;
const EMBEDDED_TEAMS_JSON: &str = include_str!("../data/teams_2025.json");

/// Client for the bracket server's autofill and submission endpoints.
#[derive(Debug, Clone)]
pub struct BracketApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    /// The server refused the request and said why, e.g. the per-user entry
    /// limit on submission.
    Rejected { status: u16, message: String },
    InvalidStrategy(String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Rejected { message, .. } => write!(f, "{message}"),
            ApiError::InvalidStrategy(name) => {
                write!(f, "Please choose an autofill strategy first (got {name:?})")
            }
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The server's fill modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutofillStrategy {
    Simulation,
    Chalk,
    Random,
    Probabilistic,
    Ranking,
}

impl AutofillStrategy {
    pub const ALL: [AutofillStrategy; 5] = [
        AutofillStrategy::Simulation,
        AutofillStrategy::Chalk,
        AutofillStrategy::Random,
        AutofillStrategy::Probabilistic,
        AutofillStrategy::Ranking,
    ];

    /// Wire name sent as `{"strategy": ...}`.
    pub fn name(&self) -> &'static str {
        match self {
            AutofillStrategy::Simulation => "simulation",
            AutofillStrategy::Chalk => "chalk",
            AutofillStrategy::Random => "random",
            AutofillStrategy::Probabilistic => "probabilistic",
            AutofillStrategy::Ranking => "ranking",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AutofillStrategy::Simulation => "Simulation",
            AutofillStrategy::Chalk => "Chalk (favorites win)",
            AutofillStrategy::Random => "Random",
            AutofillStrategy::Probabilistic => "Seed-weighted random",
            AutofillStrategy::Ranking => "Ranking",
        }
    }

    /// Reject `""`, `"none"` and unknown names before any request is made.
    pub fn parse(name: &str) -> ApiResult<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        AutofillStrategy::ALL
            .into_iter()
            .find(|s| s.name() == wanted)
            .ok_or_else(|| ApiError::InvalidStrategy(name.to_string()))
    }

    /// Cycle `None -> Simulation -> ... -> Ranking -> None`.
    pub fn cycle(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(AutofillStrategy::ALL[0]),
            Some(s) => {
                let idx = AutofillStrategy::ALL.iter().position(|x| *x == s).unwrap_or(0);
                AutofillStrategy::ALL.get(idx + 1).copied()
            }
        }
    }
}

impl FromStr for AutofillStrategy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AutofillStrategy::parse(s)
    }
}

#[derive(Debug, Serialize)]
struct AutofillRequest<'a> {
    strategy: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ServerMessage {
    message: Option<String>,
    error: Option<String>,
}

/// Where the initial teams came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamSource {
    Server,
    File(String),
    Embedded(u16),
}

impl fmt::Display for TeamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamSource::Server => f.write_str("server"),
            TeamSource::File(path) => write!(f, "file {path}"),
            TeamSource::Embedded(year) => write!(f, "built-in {year} field"),
        }
    }
}

impl BracketApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("mmpicks/0.1 (terminal bracket picker)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Load the Round of 64 field.
    ///
    /// Fallback chain:
    /// 1) `GET {server}/teams`.
    /// 2) A local JSON file in the same shape, if one is configured.
    /// 3) The embedded 2025 field.
    pub async fn load_initial_teams(
        &self,
        local: Option<&Path>,
    ) -> ApiResult<(RegionTeams, TeamSource)> {
        match self.fetch_teams().await {
            Ok(teams) => return Ok((teams, TeamSource::Server)),
            Err(e) => warn!("could not fetch teams from server: {e}"),
        }

        if let Some(path) = local {
            let content = std::fs::read_to_string(path)
                .map_err(|e| {
                    ApiError::NotFound(format!("could not read {}: {e}", path.display()))
                })?;
            let teams: RegionTeams = serde_json::from_str(&content).map_err(|e| {
                ApiError::Other(format!("invalid teams json at {}: {e}", path.display()))
            })?;
            return Ok((teams, TeamSource::File(path.display().to_string())));
        }

        let teams = embedded_teams()?;
        info!("using the built-in {EMBEDDED_TEAMS_YEAR} field");
        Ok((teams, TeamSource::Embedded(EMBEDDED_TEAMS_YEAR)))
    }

    pub async fn fetch_teams(&self) -> ApiResult<RegionTeams> {
        let url = self.url("teams");
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;
        read_json(response, &url).await
    }

    /// Ask the server to fill the whole bracket.
    pub async fn request_autofill(&self, strategy: AutofillStrategy) -> ApiResult<AutofillPayload> {
        debug!("requesting autofill with {}", strategy.name());
        self.post("autofill_bracket", &AutofillRequest { strategy: strategy.name() }).await
    }

    /// Submit picks. Returns the server's confirmation message.
    pub async fn submit_bracket(&self, request: &SubmitRequest) -> ApiResult<String> {
        let reply: ServerMessage = self.post("submit_bracket", request).await?;
        if let Some(error) = reply.error {
            return Err(ApiError::Rejected { status: 200, message: error });
        }
        Ok(reply.message.unwrap_or_else(|| "Bracket submitted.".to_string()))
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;
        read_json(response, &url).await
    }
}

/// Decode a success body, or turn a 4xx `{"error": ...}` body into
/// [`ApiError::Rejected`].
async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> ApiResult<T> {
    let status = response.status();
    if status.is_client_error() {
        let text = response.text().await.unwrap_or_default();
        let reply: ServerMessage = serde_json::from_str(&text).unwrap_or_default();
        let message = reply
            .error
            .or(reply.message)
            .unwrap_or_else(|| format!("request failed with status {status}"));
        return Err(ApiError::Rejected { status: status.as_u16(), message });
    }

    match response.error_for_status() {
        Ok(res) => res
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned())),
        Err(e) => Err(ApiError::Api(e, url.to_owned())),
    }
}

pub fn embedded_teams() -> ApiResult<RegionTeams> {
    serde_json::from_str(EMBEDDED_TEAMS_JSON)
        .map_err(|e| ApiError::Other(format!("invalid embedded teams json: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BracketEngine, ContainerId, RegionRound, SubmissionPayload};
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn strategy_names_parse() {
        assert_eq!(AutofillStrategy::parse("chalk").unwrap(), AutofillStrategy::Chalk);
        assert_eq!(AutofillStrategy::parse(" Ranking ").unwrap(), AutofillStrategy::Ranking);
        for name in ["", "none", "coinflip"] {
            assert!(
                matches!(AutofillStrategy::parse(name), Err(ApiError::InvalidStrategy(_))),
                "{name}"
            );
        }
    }

    #[test]
    fn strategy_cycle_wraps_through_none() {
        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..6 {
            current = AutofillStrategy::cycle(current);
            seen.push(current);
        }
        assert_eq!(seen[0], Some(AutofillStrategy::Simulation));
        assert_eq!(seen[4], Some(AutofillStrategy::Ranking));
        assert_eq!(seen[5], None);
    }

    #[test]
    fn embedded_field_loads_into_a_bracket() {
        let teams = embedded_teams().expect("embedded teams should parse");
        assert_eq!(teams.len(), 4);
        let engine = BracketEngine::with_teams(&teams).expect("embedded field should be valid");
        let west_r64 = ContainerId::regional(Region::West, RegionRound::R64);
        let first = &engine.bracket().container(west_r64)[0];
        assert_eq!(first.top.occupant, Some(Team::new(1, "Florida")));
        assert_eq!(first.bottom.occupant, Some(Team::new(16, "Norfolk St.")));
    }

    #[tokio::test]
    async fn autofill_posts_strategy_and_parses_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/autofill_bracket")
            .match_body(Matcher::Json(json!({ "strategy": "chalk" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "ff_left": [{"seed": 1, "name": "Florida"}, {"seed": 1, "name": "Auburn"}],
                    "championship": [{"seed": 1, "name": "Florida"}, {"seed": 1, "name": "Duke"}],
                    "champion": "Florida"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let api = BracketApi::new(server.url());
        let payload = api.request_autofill(AutofillStrategy::Chalk).await.unwrap();
        mock.assert_async().await;

        assert_eq!(payload.champion.as_deref(), Some("Florida"));
        assert_eq!(payload.containers[&ContainerId::FfLeft].len(), 2);
        assert_eq!(payload.containers[&ContainerId::Championship][1], Team::new(1, "Duke"));
    }

    #[tokio::test]
    async fn submit_sends_user_and_picks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/submit_bracket")
            .match_body(Matcher::PartialJson(json!({
                "user_id": "42",
                "bracket": { "champion": null, "ff_left": [null] }
            })))
            .with_status(200)
            .with_body(r#"{"message": "Bracket submitted successfully!"}"#)
            .create_async()
            .await;

        let engine = BracketEngine::with_teams(&embedded_teams().unwrap()).unwrap();
        let request = SubmitRequest { user_id: Some("42".into()), bracket: engine.serialize() };
        let api = BracketApi::new(format!("{}/", server.url()));
        let message = api.submit_bracket(&request).await.unwrap();
        mock.assert_async().await;
        assert_eq!(message, "Bracket submitted successfully!");
    }

    #[tokio::test]
    async fn submit_surfaces_server_error_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/submit_bracket")
            .with_status(400)
            .with_body(r#"{"error": "You have already submitted 2 brackets."}"#)
            .create_async()
            .await;

        let request = SubmitRequest { user_id: None, bracket: SubmissionPayload::default() };
        let err = BracketApi::new(server.url()).submit_bracket(&request).await.unwrap_err();
        match err {
            ApiError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "You have already submitted 2 brackets.");
            }
            other => panic!("expected a rejection, got {other}"),
        }
    }

    #[tokio::test]
    async fn server_errors_and_bad_bodies_are_reported() {
        let mut server = mockito::Server::new_async().await;
        let _fail = server.mock("POST", "/autofill_bracket").with_status(500).create_async().await;
        let api = BracketApi::new(server.url());
        assert!(matches!(
            api.request_autofill(AutofillStrategy::Random).await,
            Err(ApiError::Api(..))
        ));

        let mut server = mockito::Server::new_async().await;
        let _bad = server
            .mock("POST", "/autofill_bracket")
            .with_status(200)
            .with_body(r#"{"north_r64": []}"#)
            .create_async()
            .await;
        let api = BracketApi::new(server.url());
        assert!(matches!(
            api.request_autofill(AutofillStrategy::Random).await,
            Err(ApiError::Parsing(..))
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let api = BracketApi::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
        assert!(matches!(
            api.request_autofill(AutofillStrategy::Chalk).await,
            Err(ApiError::Network(..))
        ));
    }

    #[tokio::test]
    async fn teams_fall_back_to_the_embedded_field() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server.mock("GET", "/teams").with_status(404).create_async().await;
        let api = BracketApi::new(server.url());
        let (teams, source) = api.load_initial_teams(None).await.unwrap();
        assert_eq!(source, TeamSource::Embedded(2025));
        assert_eq!(teams[&Region::Midwest][0], Team::new(1, "Houston"));
    }

    #[tokio::test]
    async fn teams_come_from_the_server_when_available() {
        let mut server = mockito::Server::new_async().await;
        let _teams = server
            .mock("GET", "/teams")
            .with_status(200)
            .with_body(EMBEDDED_TEAMS_JSON)
            .create_async()
            .await;
        let api = BracketApi::new(server.url());
        let (teams, source) = api.load_initial_teams(None).await.unwrap();
        assert_eq!(source, TeamSource::Server);
        assert_eq!(teams[&Region::East].len(), 16);
    }
}
