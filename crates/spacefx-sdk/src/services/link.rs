//! File transfer facade for `hostsvc-link`.
//!
//! The link service only picks files up from the outbox of the transfer
//! volume. A file elsewhere is copied into the outbox first; a file already
//! under the outbox keeps its relative subdirectory.

use crate::domain::config::XferDirectories;
use crate::domain::error::{SdkError, SdkResult};
use crate::ipc::Gateway;
use spacefx_types::{host_services, LinkRequest, LinkResponse, LinkType};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct LinkService {
    gateway: Gateway,
    xfer: XferDirectories,
}

impl LinkService {
    pub fn new(gateway: Gateway, xfer: XferDirectories) -> Self {
        Self { gateway, xfer }
    }

    /// Deliver a file to another app's inbox.
    pub async fn send_file_to_app(
        &self,
        destination_app_id: &str,
        file: impl AsRef<Path>,
        overwrite: bool,
        timeout: Option<Duration>,
    ) -> SdkResult<LinkResponse> {
        self.transfer(LinkType::App2App, destination_app_id, file.as_ref(), overwrite, timeout)
            .await
    }

    /// Queue a file for the next ground contact.
    pub async fn downlink_file(
        &self,
        destination_app_id: &str,
        file: impl AsRef<Path>,
        overwrite: bool,
        timeout: Option<Duration>,
    ) -> SdkResult<LinkResponse> {
        self.transfer(LinkType::Downlink, destination_app_id, file.as_ref(), overwrite, timeout)
            .await
    }

    /// Send a file to an app on another spacecraft.
    pub async fn crosslink_file(
        &self,
        destination_app_id: &str,
        file: impl AsRef<Path>,
        overwrite: bool,
        timeout: Option<Duration>,
    ) -> SdkResult<LinkResponse> {
        self.transfer(LinkType::Crosslink, destination_app_id, file.as_ref(), overwrite, timeout)
            .await
    }

    #[instrument(skip(self, file, timeout), fields(file = %file.display()))]
    async fn transfer(
        &self,
        link_type: LinkType,
        destination_app_id: &str,
        file: &Path,
        overwrite: bool,
        timeout: Option<Duration>,
    ) -> SdkResult<LinkResponse> {
        if destination_app_id.trim().is_empty() {
            return Err(SdkError::Argument("destination app id cannot be empty".into()));
        }
        let metadata = tokio::fs::metadata(file).await;
        if !metadata.map(|m| m.is_file()).unwrap_or(false) {
            return Err(SdkError::Argument(format!(
                "file '{}' does not exist",
                file.display()
            )));
        }
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SdkError::Argument(format!("'{}' has no file name", file.display())))?;

        let subdirectory = self.stage(file, &file_name).await?;

        let request = LinkRequest {
            link_type,
            destination_app_id: destination_app_id.to_string(),
            file_name,
            subdirectory,
            overwrite,
            ..LinkRequest::default()
        };
        self.gateway.send(host_services::LINK, request, timeout).await
    }

    /// Make sure the file sits under the outbox. Returns its subdirectory there.
    async fn stage(&self, file: &Path, file_name: &str) -> SdkResult<String> {
        let outbox = canonical_or_raw(&self.xfer.outbox).await;
        let source = canonical_or_raw(file).await;

        if let Ok(relative) = source.strip_prefix(&outbox) {
            let subdirectory = relative
                .parent()
                .map(|p| {
                    p.components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .unwrap_or_default();
            debug!(subdirectory = %subdirectory, "File already in outbox");
            return Ok(subdirectory);
        }

        tokio::fs::create_dir_all(&self.xfer.outbox)
            .await
            .map_err(|e| SdkError::io(&self.xfer.outbox, e))?;
        let destination = self.xfer.outbox.join(file_name);
        debug!(from = %file.display(), to = %destination.display(), "Copying file to outbox");
        tokio::fs::copy(file, &destination)
            .await
            .map_err(|e| SdkError::io(&destination, e))?;
        Ok(String::new())
    }
}

async fn canonical_or_raw(path: &Path) -> PathBuf {
    tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf())
}
