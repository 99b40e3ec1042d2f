use std::time::Duration;

use reqwest::{Method, Request, Response, Url};
use serde::de::DeserializeOwned;

use crate::{
    error::classify_error,
    http::{HttpExecute, ReqwestExecutor},
    path,
    protocol::Operation,
    resource::Resource,
    Error, WebHdfsResult,
};

/// Client-wide connect/read timeout used by [`WebHdfsClient::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Prefix of every WebHDFS request path.
pub const API_PATH: &str = "/webhdfs/v1/";

/// Ordered collection of query parameters, skipping unset optionals.
#[derive(Debug, Default)]
pub(crate) struct Params(Vec<(&'static str, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<V: ToString>(mut self, name: &'static str, value: V) -> Self {
        self.0.push((name, value.to_string()));
        self
    }

    pub fn add_opt<V: ToString>(self, name: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.add(name, value),
            None => self,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.0.iter().map(|(name, value)| (*name, value.as_str()))
    }
}

/// Transport for the WebHDFS REST protocol.
///
/// Holds the ordered, fixed list of candidate namenode endpoints and the
/// identity sent as `user.name` on every call. Each remote call restarts from
/// the first host and falls over to the next one on connection-level failure;
/// the first host that produces any HTTP status is authoritative, even when
/// that status encodes an application error. The host list and identity are
/// immutable after construction, so a client can be shared freely across
/// concurrent call sites.
pub struct WebHdfsClient {
    hosts: Vec<Url>,
    username: String,
    executor: Box<dyn HttpExecute>,
}

impl std::fmt::Debug for WebHdfsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebHdfsClient")
            .field("hosts", &self.hosts)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl WebHdfsClient {
    /// Creates a client over the given endpoints with [`DEFAULT_TIMEOUT`].
    pub fn new<U: Into<String>>(hosts: Vec<Url>, username: U) -> WebHdfsResult<Self> {
        Self::with_timeout(hosts, username, DEFAULT_TIMEOUT)
    }

    /// Creates a client with an explicit client-wide HTTP timeout.
    pub fn with_timeout<U: Into<String>>(
        hosts: Vec<Url>,
        username: U,
        timeout: Duration,
    ) -> WebHdfsResult<Self> {
        Self::with_executor(hosts, username, Box::new(ReqwestExecutor::new(timeout)?))
    }

    /// Creates a client over a custom [`HttpExecute`] implementation.
    pub fn with_executor<U: Into<String>>(
        hosts: Vec<Url>,
        username: U,
        executor: Box<dyn HttpExecute>,
    ) -> WebHdfsResult<Self> {
        if hosts.is_empty() {
            return Err(Error::InvalidRequest("empty host list".to_owned()));
        }

        Ok(Self {
            hosts,
            username: username.into(),
            executor,
        })
    }

    pub fn hosts(&self) -> &[Url] {
        &self.hosts
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns a [`Resource`] handle for the given absolute path.
    pub fn resource<P: AsRef<str>>(&self, path: P) -> Resource<'_> {
        Resource::new(self, path::normalize(path.as_ref()))
    }

    fn build_uri(
        &self,
        host: &Url,
        path: &str,
        operation: Operation,
        params: &Params,
    ) -> WebHdfsResult<Url> {
        let relative = format!(
            "{}{}",
            API_PATH.trim_start_matches('/'),
            path.trim_start_matches('/')
        );

        let mut url = host
            .join(&relative)
            .map_err(|e| Error::InvalidRequest(format!("invalid assembled URI: {e}")))?;

        url.query_pairs_mut()
            .append_pair("op", operation.as_str())
            .append_pair("user.name", &self.username);
        for (name, value) in params.iter() {
            url.query_pairs_mut().append_pair(name, value);
        }

        Ok(url)
    }

    /// Executes one prepared request and applies error classification.
    ///
    /// Statuses below 400 pass the response through untouched; for the rest
    /// the body is drained and mapped to a typed [`Error`]. A failure to read
    /// the error body counts as a network failure.
    pub(crate) async fn request(&self, request: Request) -> WebHdfsResult<Response> {
        debug!("HTTP [{}] '{}'", request.method(), request.url());

        let response = self.executor.execute(request).await?;
        let status = response.status();
        debug!("CODE [{}]", status.as_u16());

        if status.as_u16() >= 400 {
            let body = response.text().await?;
            return Err(classify_error(status, &body));
        }

        Ok(response)
    }

    /// Executes `operation` against the first responsive host.
    ///
    /// Hosts are tried in fixed order. A malformed URI is a configuration
    /// error and is raised immediately. Network failures move on to the next
    /// host; once any host answers with an HTTP status that answer is final.
    /// If every host fails at the connection level, the returned error wraps
    /// the last failure.
    pub(crate) async fn request_any(
        &self,
        method: Method,
        path: &str,
        operation: Operation,
        params: &Params,
    ) -> WebHdfsResult<Response> {
        let mut last_failure = None;

        for host in &self.hosts {
            let url = self.build_uri(host, path, operation, params)?;

            match self.request(Request::new(method.clone(), url)).await {
                Err(Error::Network(failure)) => {
                    info!("host '{host}' is inactive, or unreachable");
                    last_failure = Some(failure);
                }
                result => return result,
            }
        }

        Err(Error::Network(match last_failure {
            Some(failure) => format!("no active host found: {failure}"),
            None => "no active host found".to_owned(),
        }))
    }

    /// Same as [`request_any`](Self::request_any), decoding the body as JSON.
    pub(crate) async fn request_any_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        operation: Operation,
        params: &Params,
    ) -> WebHdfsResult<T> {
        let body = self
            .request_any(method, path, operation, params)
            .await?
            .text()
            .await?;

        serde_json::from_str(&body)
            .map_err(|e| Error::Network(format!("unparseable response body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverExecutor;

    #[async_trait::async_trait]
    impl HttpExecute for NeverExecutor {
        async fn execute(&self, _: Request) -> WebHdfsResult<Response> {
            unreachable!("no request expected")
        }
    }

    fn client() -> WebHdfsClient {
        WebHdfsClient::with_executor(
            vec![Url::parse("http://namenode:50070").unwrap()],
            "hive",
            Box::new(NeverExecutor),
        )
        .unwrap()
    }

    #[test]
    fn empty_host_list_is_rejected() {
        let result = WebHdfsClient::with_executor(vec![], "hive", Box::new(NeverExecutor));
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn uri_carries_operation_identity_and_params() {
        let client = client();
        let params = Params::new()
            .add("destination", "/tmp/b")
            .add_opt::<u64>("buffersize", None);

        let url = client
            .build_uri(
                &client.hosts()[0],
                "/tmp/a",
                Operation::Rename,
                &params,
            )
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://namenode:50070/webhdfs/v1/tmp/a?op=RENAME&user.name=hive&destination=%2Ftmp%2Fb"
        );
    }

    #[test]
    fn uri_for_root_path() {
        let client = client();
        let url = client
            .build_uri(&client.hosts()[0], "/", Operation::ListStatus, &Params::new())
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://namenode:50070/webhdfs/v1/?op=LISTSTATUS&user.name=hive"
        );
    }
}
