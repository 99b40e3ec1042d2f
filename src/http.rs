use std::time::Duration;

use reqwest::{redirect, Request, Response};

use crate::{Error, WebHdfsResult};

/// Pluggable HTTP execution.
///
/// The transport funnels every outgoing request through this trait, which
/// keeps the failover and classification logic testable against scripted
/// responses. An `Err` from [`execute`](Self::execute) means no HTTP status
/// was obtained at all and is treated as a connection-level network failure;
/// once a response exists, its status is authoritative.
#[async_trait::async_trait]
pub trait HttpExecute: Send + Sync {
    async fn execute(&self, request: Request) -> WebHdfsResult<Response>;
}

/// Default [`HttpExecute`] implementation backed by [`reqwest::Client`].
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    /// Builds an executor with the given client-wide connect/read timeout.
    ///
    /// Redirect following is disabled: the `CREATE`/`APPEND` two-phase
    /// protocol needs the `307` redirect surfaced so the payload can be
    /// streamed to the datanode location in a second request.
    pub fn new(timeout: Duration) -> WebHdfsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpExecute for ReqwestExecutor {
    async fn execute(&self, request: Request) -> WebHdfsResult<Response> {
        self.client.execute(request).await.map_err(Error::from)
    }
}
