//! HTTP client for the Deta Base API.
//!
//! The [`Client`] owns the project key, the set of registered Bases and the HTTP
//! session. The session is opened and closed explicitly; every operation's `send`
//! borrows an open client.

use crate::{Error, Result, model};

use reqwest::{Method, Response, StatusCode, Url, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{collections, env, fmt, time};

/// Environment variable read when no project key is passed explicitly.
pub const PROJECT_KEY_ENV: &str = "DETA_PROJECT_KEY";

/// Default host of the Deta Base API.
pub const DEFAULT_HOST: &str = "https://database.deta.sh";

/// Default version of the Deta Base API.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Header carrying the project key.
const API_KEY_HEADER: &str = "x-api-key";

/// Arguments for building a [`Client`].
///
/// ```rust
/// use deta_base_crud::client;
///
/// let args = client::ClientArgs {
///     project_key: Some("a0abcyxz_aSecretValue".to_string()),
///     bases: vec!["users".to_string()],
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ClientArgs {
    /// The project key.
    ///
    /// If `None`, the key is read from the `DETA_PROJECT_KEY` environment variable.
    pub project_key: Option<String>,
    /// Names of the Bases this client serves.
    pub bases: Vec<String>,
    /// Host of the API, without the version path.
    pub host: String,
    /// Version path segment of the API.
    pub api_version: String,
    /// Timeout applied to every request.
    pub timeout: Option<time::Duration>,
}

impl Default for ClientArgs {
    fn default() -> Self {
        Self {
            project_key: None,
            bases: Vec::new(),
            host: DEFAULT_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

fn resolve_project_key(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    let is_set = |project_key: &String| !project_key.is_empty();
    explicit
        .filter(is_set)
        .or_else(|| from_env.filter(is_set))
        .ok_or(Error::MissingProjectKey)
}

fn project_id(project_key: &str) -> &str {
    project_key
        .split_once('_')
        .map_or(project_key, |(project_id, _)| project_id)
}

/// A client for the Deta Base API.
///
/// ```rust,no_run
/// use deta_base_crud::client;
///
/// # fn example() -> deta_base_crud::Result<()> {
/// let mut client = client::Client::new(client::ClientArgs {
///     bases: vec!["users".to_string()],
///     ..Default::default()
/// })?;
/// client.open()?;
/// // ...
/// client.close();
/// # Ok(())
/// # }
/// ```
pub struct Client {
    api_version: String,
    bases: collections::HashSet<String>,
    host: Url,
    project_id: String,
    project_key: String,
    session: Option<reqwest::Client>,
    timeout: Option<time::Duration>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_version", &self.api_version)
            .field("bases", &self.bases)
            .field("host", &self.host.as_str())
            .field("project_id", &self.project_id)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client. The HTTP session is not opened until [`Client::open`].
    pub fn new(args: ClientArgs) -> Result<Self> {
        let project_key = resolve_project_key(args.project_key, env::var(PROJECT_KEY_ENV).ok())?;
        let host = Url::parse(&args.host).map_err(|error| Error::Url(error.to_string()))?;
        if host.cannot_be_a_base() {
            return Err(Error::Url(args.host));
        }
        let client = Self {
            api_version: args.api_version,
            bases: args.bases.into_iter().collect(),
            host,
            project_id: project_id(&project_key).to_string(),
            project_key,
            session: None,
            timeout: args.timeout,
        };
        Ok(client)
    }

    /// The project id, taken from the project key.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Register an additional Base on this client.
    pub fn register<B: model::base::Base>(&mut self) {
        self.bases.insert(B::NAME.to_string());
    }

    /// Whether the Base with the given name is registered.
    pub fn is_registered(&self, base_name: &str) -> bool {
        self.bases.contains(base_name)
    }

    /// A handle for the typed operations of a registered Base.
    pub fn base<B: model::base::Base>(&self) -> Result<model::base::BaseClient<'_, B>> {
        if !self.is_registered(B::NAME) {
            return Err(Error::UnregisteredBase(B::NAME.to_string()));
        }
        Ok(model::base::BaseClient::new(self))
    }

    /// Whether the HTTP session is open.
    pub fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    /// Open the HTTP session.
    pub fn open(&mut self) -> Result<()> {
        if self.is_ready() {
            #[cfg(feature = "tracing")]
            tracing::warn!("client is already open");
            return Ok(());
        }
        let mut api_key = header::HeaderValue::from_str(&self.project_key)
            .map_err(|_| Error::InvalidProjectKey)?;
        api_key.set_sensitive(true);
        let headers = header::HeaderMap::from_iter([
            (header::HeaderName::from_static(API_KEY_HEADER), api_key),
            (
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/json"),
            ),
        ]);
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        self.session = Some(builder.build()?);
        Ok(())
    }

    /// Close the HTTP session.
    pub fn close(&mut self) {
        if self.session.take().is_none() {
            #[cfg(feature = "tracing")]
            tracing::warn!("client is not open");
        }
    }

    fn session(&self) -> Result<&reqwest::Client> {
        self.session.as_ref().ok_or(Error::ClientClosed)
    }

    pub(crate) fn url(&self, base_name: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Url(self.host.to_string()))?
            .pop_if_empty()
            .extend([
                self.api_version.as_str(),
                self.project_id.as_str(),
                base_name,
            ])
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the raw response, whatever its status.
    pub(crate) async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        base_name: &str,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Response> {
        let url = self.url(base_name, segments)?;
        let mut request = self.session()?.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Ok(response)
    }

    /// Send a request and decode the JSON body of a successful response.
    pub(crate) async fn send_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: Method,
        base_name: &str,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<R> {
        let response = self.execute(method, base_name, segments, body).await?;
        Self::decode(response).await
    }

    pub(crate) async fn decode<R: DeserializeOwned>(response: Response) -> Result<R> {
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes)?;
        Ok(value)
    }

    /// Turn a non-success response into [`Error::Api`].
    pub(crate) async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(api_error(status, &text))
    }
}

fn api_error(status: StatusCode, text: &str) -> Error {
    let errors = match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => body.errors,
        Err(_) if text.trim().is_empty() => Vec::new(),
        Err(_) => vec![text.to_string()],
    };
    Error::Api { status, errors }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn client(host: &str) -> Client {
        Client::new(ClientArgs {
            project_key: Some("abc123_secret".to_string()),
            bases: vec!["users".to_string()],
            host: host.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case::explicit(Some("a_b".to_string()), Some("c_d".to_string()), Some("a_b"))]
    #[case::from_env(None, Some("c_d".to_string()), Some("c_d"))]
    #[case::empty_explicit(Some(String::new()), None, None)]
    #[case::empty_explicit_uses_env(Some(String::new()), Some("c_d".to_string()), Some("c_d"))]
    #[case::empty_env(None, Some(String::new()), None)]
    #[case::missing(None, None, None)]
    fn test_resolve_project_key(
        #[case] explicit: Option<String>,
        #[case] from_env: Option<String>,
        #[case] expected: Option<&str>,
    ) {
        let actual = resolve_project_key(explicit, from_env);
        match expected {
            Some(expected) => assert_eq!(actual.unwrap(), expected),
            None => assert!(matches!(actual, Err(Error::MissingProjectKey))),
        }
    }

    #[rstest]
    #[case::with_secret("abc123_secret", "abc123")]
    #[case::many_underscores("abc_def_ghi", "abc")]
    #[case::without_underscore("abc", "abc")]
    fn test_project_id(#[case] project_key: &str, #[case] expected: &str) {
        assert_eq!(project_id(project_key), expected);
    }

    #[rstest]
    #[case::items("https://database.deta.sh", &["items"], "https://database.deta.sh/v1/abc123/users/items")]
    #[case::trailing_slash("https://database.deta.sh/", &["query"], "https://database.deta.sh/v1/abc123/users/query")]
    #[case::key_is_encoded("http://localhost:1234", &["items", "a/b c"], "http://localhost:1234/v1/abc123/users/items/a%2Fb%20c")]
    fn test_url(#[case] host: &str, #[case] segments: &[&str], #[case] expected: &str) {
        let actual = client(host).url("users", segments).unwrap();
        assert_eq!(actual.as_str(), expected);
    }

    #[rstest]
    #[case::errors_list(r#"{"errors":["Key already exists"]}"#, vec!["Key already exists".to_string()])]
    #[case::empty_body("", vec![])]
    #[case::plain_text("bad gateway", vec!["bad gateway".to_string()])]
    fn test_api_error(#[case] text: &str, #[case] expected: Vec<String>) {
        match api_error(StatusCode::CONFLICT, text) {
            Error::Api { status, errors } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(errors, expected);
            }
            error => panic!("unexpected error {error}"),
        }
    }

    struct Users;

    impl model::base::Base for Users {
        const NAME: &'static str = "users";
    }

    struct Orders;

    impl model::base::Base for Orders {
        const NAME: &'static str = "orders";
    }

    #[test]
    fn test_register() {
        let mut client = client(DEFAULT_HOST);
        assert!(client.is_registered("users"));
        assert!(!client.is_registered("orders"));
        assert!(client.base::<Users>().is_ok());
        assert!(matches!(
            client.base::<Orders>(),
            Err(Error::UnregisteredBase(name)) if name == "orders"
        ));
        client.register::<Orders>();
        assert!(client.is_registered("orders"));
        assert!(client.base::<Orders>().is_ok());
    }

    #[test]
    fn test_open_close_lifecycle() {
        let mut client = client(DEFAULT_HOST);
        assert!(!client.is_ready());
        client.open().unwrap();
        assert!(client.is_ready());
        client.open().unwrap();
        assert!(client.is_ready());
        client.close();
        assert!(!client.is_ready());
        client.close();
        assert!(!client.is_ready());
    }

    #[tokio::test]
    async fn test_closed_client_rejects_requests() {
        let client = client(DEFAULT_HOST);
        let result = client
            .execute::<()>(Method::GET, "users", &["items", "a"], None)
            .await;
        assert!(matches!(result, Err(Error::ClientClosed)));
    }

    #[tokio::test]
    async fn test_requests_carry_project_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/abc123/users/items/a")
            .match_header(API_KEY_HEADER, "abc123_secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"key":"a"}"#)
            .expect(1)
            .create_async()
            .await;
        let mut client = client(&server.url());
        client.open().unwrap();
        let item: serde_json::Value = client
            .send_json::<(), _>(Method::GET, "users", &["items", "a"], None)
            .await
            .unwrap();
        assert_eq!(item, serde_json::json!({"key": "a"}));
        mock.assert_async().await;
    }

    #[test]
    fn test_debug_hides_project_key() {
        let client = client(DEFAULT_HOST);
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("abc123"));
    }
}
