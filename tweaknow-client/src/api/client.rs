use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::{ApiError, ApiResult};
use crate::logging::API_TARGET;
use tweaknow_types::*;

/// API client for the TweakNow backend
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token for authenticated requests
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Helper to add the bearer token to a request if available
    fn add_auth_header(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let response = self.add_auth_header(req).send().await?;
        self.handle_response(response).await
    }

    /// Send a request whose response body is ignored (204 No Content etc.)
    async fn send_empty(&self, req: RequestBuilder) -> ApiResult<()> {
        let response = self.add_auth_header(req).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), clean_error_body(status.as_u16(), &body)))
    }

    /// Helper to handle API responses
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        log::debug!(target: API_TARGET, "request failed with {}: {}", status, error_text);

        Err(ApiError::from_status(
            status.as_u16(),
            clean_error_body(status.as_u16(), &error_text),
        ))
    }

    // Account endpoints

    /// Get the authenticated account
    pub async fn current_user(&self) -> ApiResult<AccountUser> {
        self.send(self.client.get(self.url("/auth/me"))).await
    }

    // Universe endpoints

    pub async fn get_universes(&self) -> ApiResult<Vec<Universe>> {
        self.send(self.client.get(self.url("/universes/"))).await
    }

    // Character endpoints

    pub async fn get_characters(&self, universe_id: i64) -> ApiResult<Vec<Character>> {
        let url = self.url(&format!("/tweaknow/universes/{}/characters", universe_id));
        self.send(self.client.get(url)).await
    }

    // Tweak endpoints

    /// Get the universe feed. Entries are bare tweaks or feed items carrying
    /// retweet context, depending on the backend version.
    pub async fn get_feed(&self, universe_id: i64) -> ApiResult<Vec<FeedEntry>> {
        let url = self.url(&format!("/tweaknow/universes/{}/tweaks", universe_id));
        self.send(self.client.get(url)).await
    }

    fn create_tweak_request(&self, request: &CreateTweakRequest) -> RequestBuilder {
        let url = self.url(&format!("/tweaknow/universes/{}/tweaks", request.universe_id));
        self.client.post(url).json(request)
    }

    pub async fn create_tweak(&self, request: CreateTweakRequest) -> ApiResult<Tweak> {
        self.send(self.create_tweak_request(&request)).await
    }

    fn delete_tweak_request(&self, universe_id: i64, tweak_id: i64) -> RequestBuilder {
        let url = self.url(&format!("/tweaknow/universes/{}/tweaks/{}", universe_id, tweak_id));
        self.client.delete(url)
    }

    /// Delete a tweak. Replies below it are removed by the backend.
    pub async fn delete_tweak(&self, universe_id: i64, tweak_id: i64) -> ApiResult<()> {
        self.send_empty(self.delete_tweak_request(universe_id, tweak_id)).await
    }

    fn retweet_request(&self, universe_id: i64, tweak_id: i64, character_id: i64) -> RequestBuilder {
        let url = self.url(&format!(
            "/tweaknow/universes/{}/tweaks/{}/retweet",
            universe_id, tweak_id
        ));
        self.client.post(url).json(&RetweetRequest { character_id })
    }

    pub async fn retweet(&self, universe_id: i64, tweak_id: i64, character_id: i64) -> ApiResult<Tweak> {
        self.send(self.retweet_request(universe_id, tweak_id, character_id)).await
    }

    // Follow endpoints

    fn follow_url(&self, universe_id: i64, follower_id: i64, action: &str, following_id: i64) -> String {
        self.url(&format!(
            "/tweaknow/universes/{}/characters/{}/{}/{}",
            universe_id, follower_id, action, following_id
        ))
    }

    pub async fn follow(&self, universe_id: i64, follower_id: i64, following_id: i64) -> ApiResult<()> {
        let url = self.follow_url(universe_id, follower_id, "follow", following_id);
        self.send_empty(self.client.post(url)).await
    }

    pub async fn unfollow(&self, universe_id: i64, follower_id: i64, following_id: i64) -> ApiResult<()> {
        let url = self.follow_url(universe_id, follower_id, "unfollow", following_id);
        self.send_empty(self.client.delete(url)).await
    }

    pub async fn follow_status(
        &self,
        universe_id: i64,
        follower_id: i64,
        following_id: i64,
    ) -> ApiResult<FollowStatusResponse> {
        let url = self.follow_url(universe_id, follower_id, "is-following", following_id);
        self.send(self.client.get(url)).await
    }
}

/// Turn an error body into a readable message: FastAPI `{"detail": ...}`
/// bodies are unwrapped, HTML error pages are replaced.
fn clean_error_body(status: u16, body: &str) -> String {
    if body.contains("<html>") || body.contains("<!DOCTYPE") {
        return format!("Server returned {} error. Please check the server URL.", status);
    }
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(error) => error.detail,
        Err(_) if body.is_empty() => "Unknown error".to_string(),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.url("/tweaknow/templates"),
            "http://localhost:8000/tweaknow/templates"
        );
    }

    fn body_json(request: &reqwest::Request) -> serde_json::Value {
        let bytes = request.body().and_then(|body| body.as_bytes()).unwrap();
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_reply_request_shape() {
        let mut client = ApiClient::new("http://localhost:8000");
        client.set_access_token(Some("tok".to_string()));

        let request = CreateTweakRequest {
            universe_id: 3,
            character_id: 9,
            content: "agreed".to_string(),
            reply_to_tweak_id: Some(41),
            ..Default::default()
        };
        let built = client
            .add_auth_header(client.create_tweak_request(&request))
            .build()
            .unwrap();

        assert_eq!(built.method(), reqwest::Method::POST);
        assert_eq!(built.url().as_str(), "http://localhost:8000/tweaknow/universes/3/tweaks");
        assert_eq!(built.headers()["authorization"], "Bearer tok");
        let body = body_json(&built);
        assert_eq!(body["reply_to_tweak_id"], 41);
        assert_eq!(body["character_id"], 9);
        assert!(body.get("quoted_tweak_id").is_none());
    }

    #[test]
    fn test_retweet_and_delete_request_shape() {
        let client = ApiClient::new("http://localhost:8000/");

        let retweet = client.retweet_request(3, 41, 9).build().unwrap();
        assert_eq!(retweet.method(), reqwest::Method::POST);
        assert_eq!(
            retweet.url().as_str(),
            "http://localhost:8000/tweaknow/universes/3/tweaks/41/retweet"
        );
        assert_eq!(body_json(&retweet), serde_json::json!({"character_id": 9}));

        let delete = client.delete_tweak_request(3, 41).build().unwrap();
        assert_eq!(delete.method(), reqwest::Method::DELETE);
        assert_eq!(delete.url().path(), "/tweaknow/universes/3/tweaks/41");
        assert!(delete.headers().get("authorization").is_none());
    }

    #[test]
    fn test_follow_urls() {
        let client = ApiClient::new("http://localhost:8000");

        assert_eq!(
            client.follow_url(3, 9, "follow", 12),
            "http://localhost:8000/tweaknow/universes/3/characters/9/follow/12"
        );
        assert_eq!(
            client.follow_url(3, 9, "is-following", 12),
            "http://localhost:8000/tweaknow/universes/3/characters/9/is-following/12"
        );
    }

    #[test]
    fn test_clean_error_body() {
        assert_eq!(
            clean_error_body(404, r#"{"detail": "Universe not found"}"#),
            "Universe not found"
        );
        assert_eq!(
            clean_error_body(502, "<!DOCTYPE html><html>bad gateway</html>"),
            "Server returned 502 error. Please check the server URL."
        );
        assert_eq!(clean_error_body(500, ""), "Unknown error");
        assert_eq!(clean_error_body(500, "boom"), "boom");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(ApiError::from_status(404, String::new()), ApiError::NotFound(_)));
        assert!(matches!(ApiError::from_status(401, String::new()), ApiError::Unauthorized(_)));
        assert!(matches!(ApiError::from_status(422, String::new()), ApiError::BadRequest(_)));
        assert!(matches!(
            ApiError::from_status(503, String::new()),
            ApiError::Api { status: 503, .. }
        ));
    }
}
