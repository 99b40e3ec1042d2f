//! Async client for the WebHDFS REST API.
//!
//! A [`WebHdfsClient`] holds an ordered list of namenode endpoints (for example
//! an active/standby pair) and tries them in order on every call, falling over
//! to the next host on connection-level failure. Filesystem entries are
//! addressed through [`Resource`] handles obtained from
//! [`WebHdfsClient::resource`], which lazily cache their own file status.

#[macro_use]
extern crate log;

mod client;
mod dir;
mod error;
mod http;
mod path;
/// WebHDFS wire types
pub mod protocol;
mod resource;

pub use client::{WebHdfsClient, API_PATH, DEFAULT_TIMEOUT};
pub use dir::ResourceIter;
pub use error::Error;
pub use http::{HttpExecute, ReqwestExecutor};
pub use protocol::{FileKind, FileStatus};
pub use reqwest::Url;
pub use resource::{CreateOptions, FileReader, OpenOptions, Resource};

pub type WebHdfsResult<T> = Result<T, Error>;
