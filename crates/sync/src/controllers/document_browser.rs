//! Project document browser.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde::Serialize;
use taskdeck_core::tree::{build_forest, TreeNode};
use taskdeck_core::types::Id;
use taskdeck_db::models::document::{FileEntry, Folder, NewFolder};
use taskdeck_db::repositories::DocumentRepo;
use validator::Validate;

use crate::collection::SyncedCollection;
use crate::context::AppContext;
use crate::error::SyncError;

/// A folder with its files and subfolders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentNode {
    pub folder: Folder,
    pub files: Vec<FileEntry>,
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// Files in this folder and every descendant.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.children.iter().map(DocumentNode::file_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentTree {
    pub folders: Vec<DocumentNode>,
    /// Files at the project root or in a folder that is not loaded.
    pub loose_files: Vec<FileEntry>,
}

impl DocumentTree {
    pub fn assemble(folders: Vec<Folder>, files: Vec<FileEntry>) -> Self {
        let known: HashSet<Id> = folders.iter().map(|f| f.id).collect();
        let mut by_folder: HashMap<Id, Vec<FileEntry>> = HashMap::new();
        let mut loose_files = Vec::new();
        for file in files {
            match file.folder_id.filter(|id| known.contains(id)) {
                Some(folder_id) => by_folder.entry(folder_id).or_default().push(file),
                None => loose_files.push(file),
            }
        }

        let folders = build_forest(folders)
            .into_iter()
            .map(|node| attach(node, &mut by_folder))
            .collect();
        Self {
            folders,
            loose_files,
        }
    }
}

fn attach(node: TreeNode<Folder>, files: &mut HashMap<Id, Vec<FileEntry>>) -> DocumentNode {
    let own = files.remove(&node.item.id).unwrap_or_default();
    DocumentNode {
        children: node
            .children
            .into_iter()
            .map(|child| attach(child, files))
            .collect(),
        folder: node.item,
        files: own,
    }
}

pub struct DocumentBrowser {
    ctx: AppContext,
    project_id: Id,
    folders: SyncedCollection<Folder>,
    files: SyncedCollection<FileEntry>,
}

impl DocumentBrowser {
    pub fn new(ctx: AppContext, project_id: Id) -> Self {
        Self {
            ctx,
            project_id,
            folders: SyncedCollection::new("folder"),
            files: SyncedCollection::new("file"),
        }
    }

    pub async fn load(&self) -> Result<(), SyncError> {
        let result = async {
            let (folders, files) = tokio::join!(
                DocumentRepo::list_folders(&self.ctx.client, self.project_id),
                DocumentRepo::list_files(&self.ctx.client, self.project_id),
            );
            Ok::<_, SyncError>((folders?, files?))
        }
        .await;
        let (folders, files) = self.ctx.reported("Could not load documents", result)?;
        tracing::debug!(
            project_id = %self.project_id,
            folders = folders.len(),
            files = files.len(),
            "Documents loaded"
        );
        self.folders.replace_all(folders);
        self.files.replace_all(files);
        Ok(())
    }

    pub fn tree(&self) -> DocumentTree {
        DocumentTree::assemble(self.folders.snapshot(), self.files.snapshot())
    }

    pub async fn create_folder(&self, name: &str, parent_id: Option<Id>) -> Result<Folder, SyncError> {
        let input = NewFolder {
            project_id: self.project_id,
            name: name.trim().to_string(),
            parent_id,
        };
        let result = async {
            input.validate()?;
            let provisional = Folder {
                id: Id::new_v4(),
                project_id: self.project_id,
                name: input.name.clone(),
                parent_id,
                created_at: Utc::now(),
            };
            self.folders
                .add(provisional, DocumentRepo::create_folder(&self.ctx.client, &input))
                .await
        }
        .await;
        self.ctx.reported("Could not create folder", result)
    }

    /// Delete a folder. Its contents cascade on the server, so the browser
    /// reloads afterwards.
    pub async fn delete_folder(&self, id: Id) -> Result<(), SyncError> {
        let result = self
            .folders
            .remove(id, DocumentRepo::delete_folder(&self.ctx.client, id))
            .await;
        self.ctx.reported("Could not delete folder", result)?;
        self.load().await
    }

    pub async fn delete_file(&self, id: Id) -> Result<(), SyncError> {
        let result = self
            .files
            .remove(id, DocumentRepo::delete_file(&self.ctx.client, id))
            .await;
        self.ctx.reported("Could not delete file", result)
    }
}
