use std::{fmt, future::Future, pin::Pin};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE, LOCATION},
    Body, Method, Request, Response, Url,
};
use tokio::sync::OnceCell;

use crate::{
    client::{Params, WebHdfsClient},
    dir::ResourceIter,
    path,
    protocol::{BooleanResponse, FileKind, FileStatus, FileStatusResponse, ListStatusResponse, Operation},
    Error, WebHdfsResult,
};

/// Optional parameters of [`Resource::create_with`]. Every unset field is
/// left to the server default.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub overwrite: Option<bool>,
    pub block_size: Option<u64>,
    pub replication: Option<u16>,
    pub permission: Option<String>,
    pub buffer_size: Option<u64>,
}

/// Optional parameters of [`Resource::open_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// Byte offset to start reading from.
    pub offset: Option<u64>,
    /// Number of bytes to read.
    pub length: Option<u64>,
    pub buffer_size: Option<u64>,
}

/// Readable byte stream returned by [`Resource::open`].
///
/// The caller is responsible for consuming it; dropping the reader aborts
/// the transfer.
pub struct FileReader {
    response: Response,
}

impl FileReader {
    /// Next chunk of the file, or `None` once the stream is exhausted.
    pub async fn chunk(&mut self) -> WebHdfsResult<Option<Bytes>> {
        self.response.chunk().await.map_err(Error::from)
    }

    /// Drains the remaining content into memory.
    pub async fn bytes(self) -> WebHdfsResult<Bytes> {
        self.response.bytes().await.map_err(Error::from)
    }
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Handle to one path of the remote filesystem.
///
/// A handle borrows its [`WebHdfsClient`] and carries a file status cache
/// that is populated at most once, by the first accessor that needs it, and
/// never implicitly refreshed afterwards. Mutating operations (`create`,
/// `append`, `rename`, `remove`, `mkdir`) do not update the cache of the
/// handle they were invoked on; derive a fresh handle to observe changes.
/// The cache fill itself is race-free, so sharing one handle across tasks is
/// safe, if rarely useful.
#[derive(Debug, Clone)]
pub struct Resource<'a> {
    client: &'a WebHdfsClient,
    path: String,
    cached: OnceCell<FileStatus>,
}

impl fmt::Display for Resource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource {{ path = {} }}", self.path)
    }
}

impl<'a> Resource<'a> {
    pub(crate) fn new(client: &'a WebHdfsClient, path: String) -> Self {
        Self {
            client,
            path,
            cached: OnceCell::new(),
        }
    }

    /// Absolute path of this handle.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Final path segment; empty for the root.
    pub fn base_name(&self) -> &str {
        path::base_name(&self.path)
    }

    /// Handle for `relative` resolved against this path. No remote call.
    pub fn child<P: AsRef<str>>(&self, relative: P) -> Resource<'a> {
        Resource::new(self.client, path::join(&self.path, relative.as_ref()))
    }

    /// Handle for the parent directory. The parent of the root is the root.
    pub fn parent(&self) -> Resource<'a> {
        Resource::new(self.client, path::parent(&self.path))
    }

    /// Child handle built from a `LISTSTATUS` entry, cache pre-populated.
    pub(crate) fn child_from_status(&self, status: FileStatus) -> Resource<'a> {
        Resource {
            client: self.client,
            path: path::join(&self.path, &status.path_suffix),
            cached: OnceCell::new_with(Some(status)),
        }
    }

    /// Fetches the file status from the namenode.
    ///
    /// Always performs a remote call and leaves this handle's cache alone.
    pub async fn status(&self) -> WebHdfsResult<FileStatus> {
        let response: FileStatusResponse = self
            .client
            .request_any_json(Method::GET, &self.path, Operation::GetFileStatus, &Params::new())
            .await?;

        Ok(response.file_status)
    }

    /// Cached file status, fetched on first use.
    async fn stat(&self) -> WebHdfsResult<&FileStatus> {
        self.cached.get_or_try_init(|| self.status()).await
    }

    pub(crate) fn cached_kind(&self) -> Option<FileKind> {
        self.cached.get().map(|status| status.kind)
    }

    /// Whether the path exists on the remote.
    ///
    /// Fills the status cache as a side effect. Any error other than
    /// [`Error::NotFound`] propagates unchanged.
    pub async fn exists(&self) -> WebHdfsResult<bool> {
        match self.stat().await {
            Ok(_) => Ok(true),
            Err(Error::NotFound(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    pub async fn is_dir(&self) -> WebHdfsResult<bool> {
        Ok(self.stat().await?.is_dir())
    }

    pub async fn is_file(&self) -> WebHdfsResult<bool> {
        Ok(!self.stat().await?.is_dir())
    }

    pub async fn owner(&self) -> WebHdfsResult<&str> {
        Ok(&self.stat().await?.owner)
    }

    pub async fn group(&self) -> WebHdfsResult<&str> {
        Ok(&self.stat().await?.group)
    }

    pub async fn length(&self) -> WebHdfsResult<u64> {
        Ok(self.stat().await?.length)
    }

    pub async fn block_size(&self) -> WebHdfsResult<u64> {
        Ok(self.stat().await?.block_size)
    }

    pub async fn children_num(&self) -> WebHdfsResult<u64> {
        Ok(self.stat().await?.children_num)
    }

    pub async fn file_id(&self) -> WebHdfsResult<u64> {
        Ok(self.stat().await?.file_id)
    }

    pub async fn permission(&self) -> WebHdfsResult<&str> {
        Ok(&self.stat().await?.permission)
    }

    pub async fn replication(&self) -> WebHdfsResult<u16> {
        Ok(self.stat().await?.replication)
    }

    pub async fn storage_policy(&self) -> WebHdfsResult<u16> {
        Ok(self.stat().await?.storage_policy)
    }

    pub async fn access_time_millis(&self) -> WebHdfsResult<i64> {
        Ok(self.stat().await?.access_time)
    }

    pub async fn modification_time_millis(&self) -> WebHdfsResult<i64> {
        Ok(self.stat().await?.modification_time)
    }

    pub async fn access_time(&self) -> WebHdfsResult<DateTime<Utc>> {
        Ok(millis_to_datetime(self.stat().await?.access_time))
    }

    pub async fn modification_time(&self) -> WebHdfsResult<DateTime<Utc>> {
        Ok(millis_to_datetime(self.stat().await?.modification_time))
    }

    /// Creates a file at this path with server-default parameters.
    ///
    /// Two-phase protocol: the namenode answers `op=CREATE` with a redirect
    /// location naming a datanode, and the content is streamed there in a
    /// second `PUT` (no failover for that one, the location is explicit).
    pub async fn create<B: Into<Body>>(&self, data: B) -> WebHdfsResult<()> {
        self.create_with(data, CreateOptions::default()).await
    }

    /// [`create`](Self::create) with explicit optional parameters.
    pub async fn create_with<B: Into<Body>>(
        &self,
        data: B,
        options: CreateOptions,
    ) -> WebHdfsResult<()> {
        let params = Params::new()
            .add_opt("overwrite", options.overwrite)
            .add_opt("blockSize", options.block_size)
            .add_opt("replication", options.replication)
            .add_opt("permission", options.permission)
            .add_opt("buffersize", options.buffer_size);

        let response = self
            .client
            .request_any(Method::PUT, &self.path, Operation::Create, &params)
            .await?;

        self.upload(Method::PUT, redirect_location(&response)?, data.into())
            .await
    }

    /// Creates an empty file, or truncates an existing one to empty content
    /// (whether an existing file is truncated or refused is decided by the
    /// server, not by this client).
    pub async fn touch(&self) -> WebHdfsResult<()> {
        self.create(Bytes::new()).await
    }

    /// Appends to the file at this path. Same two-phase shape as
    /// [`create`](Self::create), with `POST op=APPEND`.
    pub async fn append<B: Into<Body>>(&self, data: B) -> WebHdfsResult<()> {
        self.append_with(data, None).await
    }

    pub async fn append_with<B: Into<Body>>(
        &self,
        data: B,
        buffer_size: Option<u64>,
    ) -> WebHdfsResult<()> {
        let params = Params::new().add_opt("buffersize", buffer_size);

        let response = self
            .client
            .request_any(Method::POST, &self.path, Operation::Append, &params)
            .await?;

        self.upload(Method::POST, redirect_location(&response)?, data.into())
            .await
    }

    async fn upload(&self, method: Method, location: Url, body: Body) -> WebHdfsResult<()> {
        let mut request = Request::new(method, location);
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
        *request.body_mut() = Some(body);

        self.client.request(request).await.map(|_| ())
    }

    /// Opens the file for reading from the beginning.
    pub async fn open(&self) -> WebHdfsResult<FileReader> {
        self.open_with(OpenOptions::default()).await
    }

    /// Opens the file with an explicit byte range and buffer size.
    pub async fn open_with(&self, options: OpenOptions) -> WebHdfsResult<FileReader> {
        let params = Params::new()
            .add_opt("offset", options.offset)
            .add_opt("length", options.length)
            .add_opt("buffersize", options.buffer_size);

        let mut response = self
            .client
            .request_any(Method::GET, &self.path, Operation::Open, &params)
            .await?;

        // The namenode redirects OPEN to the datanode holding the data.
        if response.status().is_redirection() {
            let location = redirect_location(&response)?;
            response = self.client.request(Request::new(Method::GET, location)).await?;
        }

        Ok(FileReader { response })
    }

    /// Renames this path to `destination`. Returns the server's success flag.
    pub async fn rename<P: AsRef<str>>(&self, destination: P) -> WebHdfsResult<bool> {
        let params = Params::new().add("destination", path::normalize(destination.as_ref()));

        let response: BooleanResponse = self
            .client
            .request_any_json(Method::PUT, &self.path, Operation::Rename, &params)
            .await?;

        Ok(response.boolean)
    }

    /// Deletes this path. Returns the server's success flag.
    pub async fn remove(&self, recursive: bool) -> WebHdfsResult<bool> {
        let params = Params::new().add("recursive", recursive);

        let response: BooleanResponse = self
            .client
            .request_any_json(Method::DELETE, &self.path, Operation::Delete, &params)
            .await?;

        Ok(response.boolean)
    }

    /// Creates this directory. With `parents`, missing ancestors are created
    /// first, closest to the root going down.
    pub async fn mkdir(&self, parents: bool) -> WebHdfsResult<bool> {
        self.mkdir_with(parents, None).await
    }

    /// [`mkdir`](Self::mkdir) with an explicit permission string.
    ///
    /// A concurrent caller may create an ancestor between the existence check
    /// and the `MKDIRS` call; the server resolves that idempotently.
    pub async fn mkdir_with(&self, parents: bool, permission: Option<&str>) -> WebHdfsResult<bool> {
        if parents {
            self.mkdir_all(permission).await
        } else {
            self.mkdir_inner(permission).await
        }
    }

    fn mkdir_all<'s>(&'s self, permission: Option<&'s str>) -> BoxFuture<'s, WebHdfsResult<bool>> {
        Box::pin(async move {
            let parent = self.parent();
            if parent.path != self.path && !parent.exists().await? {
                parent.mkdir_all(permission).await?;
            }

            self.mkdir_inner(permission).await
        })
    }

    async fn mkdir_inner(&self, permission: Option<&str>) -> WebHdfsResult<bool> {
        let params = Params::new().add_opt("permission", permission);

        let response: BooleanResponse = self
            .client
            .request_any_json(Method::PUT, &self.path, Operation::Mkdirs, &params)
            .await?;

        Ok(response.boolean)
    }

    /// Raw `LISTSTATUS` of this directory, in server order.
    pub(crate) async fn list(&self) -> WebHdfsResult<Vec<FileStatus>> {
        let response: ListStatusResponse = self
            .client
            .request_any_json(Method::GET, &self.path, Operation::ListStatus, &Params::new())
            .await?;

        Ok(response.file_statuses.file_status)
    }

    /// Lazy depth-first enumeration of this directory's contents.
    ///
    /// With `recursive`, subdirectories are descended into, each directory
    /// surfacing before its descendants. See [`ResourceIter`].
    pub async fn ls_resources(&self, recursive: bool) -> WebHdfsResult<ResourceIter<'a>> {
        ResourceIter::new(self.clone(), recursive).await
    }
}

fn redirect_location(response: &Response) -> WebHdfsResult<Url> {
    let location = response
        .headers()
        .get(LOCATION)
        .ok_or_else(|| Error::ServerError("redirect location missing from response".to_owned()))?
        .to_str()
        .map_err(|e| Error::ServerError(format!("unreadable redirect location: {e}")))?;

    Url::parse(location)
        .map_err(|e| Error::InvalidRequest(format!("invalid redirect location: {e}")))
}

// Out-of-range timestamps clamp to the epoch.
fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH)
}
