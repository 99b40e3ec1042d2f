//! Serde mappings for the JSON payloads of the WebHDFS REST protocol.

use serde::{Deserialize, Serialize};

/// One REST operation, sent as the `op` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListStatus,
    GetFileStatus,
    Create,
    Append,
    Open,
    Rename,
    Delete,
    Mkdirs,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListStatus => "LISTSTATUS",
            Self::GetFileStatus => "GETFILESTATUS",
            Self::Create => "CREATE",
            Self::Append => "APPEND",
            Self::Open => "OPEN",
            Self::Rename => "RENAME",
            Self::Delete => "DELETE",
            Self::Mkdirs => "MKDIRS",
        }
    }
}

/// Entry type as reported by the namenode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileKind {
    File,
    Directory,
}

/// A `FileStatus` JSON object as returned by `GETFILESTATUS` and `LISTSTATUS`.
///
/// Timestamps are milliseconds since the Unix epoch. `path_suffix` is only
/// meaningful in `LISTSTATUS` responses; `GETFILESTATUS` reports it empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub access_time: i64,
    pub modification_time: i64,
    pub block_size: u64,
    pub length: u64,
    #[serde(default)]
    pub children_num: u64,
    #[serde(default)]
    pub file_id: u64,
    pub owner: String,
    pub group: String,
    #[serde(default)]
    pub path_suffix: String,
    pub permission: String,
    pub replication: u16,
    #[serde(default)]
    pub storage_policy: u16,
    #[serde(rename = "type")]
    pub kind: FileKind,
}

impl FileStatus {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileStatusResponse {
    #[serde(rename = "FileStatus")]
    pub file_status: FileStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListStatusResponse {
    #[serde(rename = "FileStatuses")]
    pub file_statuses: FileStatuses,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileStatuses {
    #[serde(rename = "FileStatus")]
    pub file_status: Vec<FileStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BooleanResponse {
    pub boolean: bool,
}

/// Structured error payload optionally carried by responses with status >= 400.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteException {
    #[serde(default)]
    pub exception: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java_class_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoteExceptionResponse {
    #[serde(rename = "RemoteException")]
    pub remote_exception: RemoteException,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_status_from_namenode_json() {
        let raw = r#"{
            "accessTime": 1320171722771,
            "blockSize": 33554432,
            "childrenNum": 0,
            "fileId": 16388,
            "group": "supergroup",
            "length": 24930,
            "modificationTime": 1320171722771,
            "owner": "webuser",
            "pathSuffix": "a.patch",
            "permission": "644",
            "replication": 1,
            "storagePolicy": 0,
            "type": "FILE"
        }"#;

        let status: FileStatus = serde_json::from_str(raw).unwrap();
        assert_eq!(status.kind, FileKind::File);
        assert!(!status.is_dir());
        assert_eq!(status.length, 24930);
        assert_eq!(status.owner, "webuser");
        assert_eq!(status.path_suffix, "a.patch");
        assert_eq!(status.replication, 1);
    }

    #[test]
    fn file_status_tolerates_missing_optional_fields() {
        let raw = r#"{
            "accessTime": 0,
            "blockSize": 0,
            "group": "supergroup",
            "length": 0,
            "modificationTime": 1320895981256,
            "owner": "szetszwo",
            "permission": "755",
            "replication": 0,
            "type": "DIRECTORY"
        }"#;

        let status: FileStatus = serde_json::from_str(raw).unwrap();
        assert!(status.is_dir());
        assert_eq!(status.children_num, 0);
        assert_eq!(status.file_id, 0);
        assert_eq!(status.path_suffix, "");
    }

    #[test]
    fn list_status_preserves_server_order() {
        let raw = r#"{"FileStatuses": {"FileStatus": [
            {"accessTime": 0, "blockSize": 0, "group": "g", "length": 0,
             "modificationTime": 0, "owner": "o", "pathSuffix": "b",
             "permission": "755", "replication": 0, "type": "DIRECTORY"},
            {"accessTime": 0, "blockSize": 128, "group": "g", "length": 10,
             "modificationTime": 0, "owner": "o", "pathSuffix": "a",
             "permission": "644", "replication": 3, "type": "FILE"}
        ]}}"#;

        let listing: ListStatusResponse = serde_json::from_str(raw).unwrap();
        let names: Vec<_> = listing
            .file_statuses
            .file_status
            .iter()
            .map(|s| s.path_suffix.as_str())
            .collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn boolean_response() {
        let ok: BooleanResponse = serde_json::from_str(r#"{"boolean": true}"#).unwrap();
        assert!(ok.boolean);
    }
}
