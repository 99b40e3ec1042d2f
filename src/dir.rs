//! Lazy enumeration of remote directory trees.

use std::collections::VecDeque;

use crate::{
    protocol::{FileKind, FileStatus},
    resource::Resource,
    WebHdfsResult,
};

/// Cursor over one directory level: the listing as returned by the server
/// plus the directory it belongs to.
struct Level<'a> {
    root: Resource<'a>,
    entries: VecDeque<FileStatus>,
}

impl<'a> Level<'a> {
    async fn open(root: Resource<'a>) -> WebHdfsResult<Self> {
        let entries = root.list().await?.into();
        Ok(Self { root, entries })
    }
}

/// Depth-first, forward-only sequence of [`Resource`] handles below a root
/// directory.
///
/// One `LISTSTATUS` call is issued per directory, at the moment that
/// directory is surfaced; the tree is never materialized in full. Every
/// yielded handle has its status cache pre-populated from the listing entry,
/// and each directory is yielded before its descendants. The sequence is not
/// restartable and does not observe server-side changes to levels already
/// listed, so concurrent structural changes may produce a partial or stale
/// view.
///
/// ```no_run
/// # async fn list(root: webhdfs::Resource<'_>) -> webhdfs::WebHdfsResult<()> {
/// let mut iter = root.ls_resources(true).await?;
/// while let Some(entry) = iter.next_entry().await? {
///     println!("{}", entry.path());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ResourceIter<'a> {
    stack: Vec<Level<'a>>,
    recursive: bool,
}

impl<'a> ResourceIter<'a> {
    pub(crate) async fn new(root: Resource<'a>, recursive: bool) -> WebHdfsResult<Self> {
        Ok(Self {
            stack: vec![Level::open(root).await?],
            recursive,
        })
    }

    /// Next entry of the sequence, or `None` once the subtree is exhausted.
    ///
    /// When the surfaced entry is a directory and recursion is enabled, its
    /// listing call happens here, before the entry is returned.
    pub async fn next_entry(&mut self) -> WebHdfsResult<Option<Resource<'a>>> {
        loop {
            let Some(level) = self.stack.last_mut() else {
                return Ok(None);
            };

            let Some(status) = level.entries.pop_front() else {
                let _ = self.stack.pop();
                continue;
            };

            let entry = level.root.child_from_status(status);
            if self.recursive && entry.cached_kind() == Some(FileKind::Directory) {
                self.stack.push(Level::open(entry.clone()).await?);
            }

            return Ok(Some(entry));
        }
    }
}
