//! Google Drive v3 as a [`RemoteStore`].
//!
//! Only listing and media download are covered. The caller supplies an OAuth access token;
//! minting one from service-account credentials happens outside this crate.

use std::path::Path;

use async_trait::async_trait;
use indicatif::ProgressBar;
use serde::Deserialize;
use tracing::debug;

use super::{save_response, RemoteItem, RemoteStore};
use crate::error::{PipelineError, PipelineResult};

pub const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    mime_type: Option<String>,
}

impl From<DriveFile> for RemoteItem {
    fn from(file: DriveFile) -> Self {
        RemoteItem {
            is_folder: file.mime_type.as_deref() == Some(FOLDER_MIME),
            id: file.id,
            name: file.name,
        }
    }
}

pub struct DriveStore {
    client: reqwest::Client,
    token: String,
    api: String,
}

impl DriveStore {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api(token, DRIVE_API)
    }

    pub fn with_api(token: impl Into<String>, api: impl Into<String>) -> Self {
        DriveStore {
            client: reqwest::Client::new(),
            token: token.into(),
            api: api.into(),
        }
    }

    async fn list_page(&self, container: &str, page_token: Option<&str>) -> PipelineResult<FileList> {
        let query = children_query(container);
        let mut params = vec![
            ("q", query.as_str()),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
            ("fields", "nextPageToken,files(id,name,mimeType)"),
            ("pageSize", "1000"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let url = format!("{}/files", self.api);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PipelineError::Http {
                status: response.status().as_u16(),
                url,
            });
        }

        Ok(response.json::<FileList>().await?)
    }
}

fn children_query(container: &str) -> String {
    format!("'{}' in parents and trashed=false", container.replace('\'', "\\'"))
}

#[async_trait]
impl RemoteStore for DriveStore {
    async fn list(&self, container: &str) -> PipelineResult<Vec<RemoteItem>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(container, page_token.as_deref()).await?;
            items.extend(page.files.into_iter().map(RemoteItem::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(container, items = items.len(), "listed drive folder");

        Ok(items)
    }

    async fn fetch(&self, item: &RemoteItem, dest: &Path) -> PipelineResult<()> {
        let url = format!("{}/files/{}", self.api, item.id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await?;

        save_response(response, dest, &ProgressBar::hidden()).await?;

        Ok(())
    }
}

// -- Tests -------------------------------------------------------------------
