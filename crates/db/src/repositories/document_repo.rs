//! Repository for `project_folders` and `project_files`.

use taskdeck_core::types::Id;
use taskdeck_remote::{Operation, RemoteClient, RemoteError};

use crate::models::document::{FileEntry, Folder, NewFolder};

const FOLDERS: &str = "project_folders";
const FILES: &str = "project_files";

pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn list_folders(
        client: &RemoteClient,
        project_id: Id,
    ) -> Result<Vec<Folder>, RemoteError> {
        client
            .rows(
                &Operation::select(FOLDERS)
                    .eq("project_id", project_id)
                    .order_asc("name"),
            )
            .await
    }

    pub async fn list_files(
        client: &RemoteClient,
        project_id: Id,
    ) -> Result<Vec<FileEntry>, RemoteError> {
        client
            .rows(
                &Operation::select(FILES)
                    .eq("project_id", project_id)
                    .order_asc("name"),
            )
            .await
    }

    pub async fn create_folder(client: &RemoteClient, input: &NewFolder) -> Result<Folder, RemoteError> {
        let body = serde_json::to_value(input)
            .map_err(|e| RemoteError::malformed("insert:project_folders", e))?;
        client.one(&Operation::insert(FOLDERS, body)).await
    }

    /// Delete a folder. Child folders and files cascade server-side.
    pub async fn delete_folder(client: &RemoteClient, id: Id) -> Result<(), RemoteError> {
        client.exec(&Operation::delete(FOLDERS).eq("id", id)).await
    }

    pub async fn delete_file(client: &RemoteClient, id: Id) -> Result<(), RemoteError> {
        client.exec(&Operation::delete(FILES).eq("id", id)).await
    }
}
