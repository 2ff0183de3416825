//! Retrieves the daily input files from the remote data portals.

pub mod drive;
pub mod imerg;
pub mod mswx;

use std::{
    ffi::OsString,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{PipelineError, PipelineResult};

pub use drive::DriveStore;
pub use imerg::ImergClient;
pub use mswx::{sync_mswx, SyncReport};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A file or folder held by a remote store.
pub struct RemoteItem {
    pub id: String,
    pub name: String,
    pub is_folder: bool,
}

/// A remote store organised as nested containers.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Lists the items directly inside `container`.
    async fn list(&self, container: &str) -> PipelineResult<Vec<RemoteItem>>;

    /// Saves the content of `item` to `dest`.
    async fn fetch(&self, item: &RemoteItem, dest: &Path) -> PipelineResult<()>;
}

/// Streams the body of a successful response to `file_path`, updating `progress` with the
/// bytes written when the length is known.
///
/// The body goes to `<file_path>.part` first and is renamed once complete, so an interrupted
/// transfer never leaves a truncated file under the final name.
pub async fn save_response(
    response: reqwest::Response,
    file_path: &Path,
    progress: &ProgressBar,
) -> PipelineResult<u64> {
    if !response.status().is_success() {
        return Err(PipelineError::Http {
            status: response.status().as_u16(),
            url: response.url().to_string(),
        });
    }

    let total_size = response.content_length().unwrap_or(0);
    if total_size > 0 {
        progress.set_length(total_size);
        if let Ok(style) = ProgressStyle::with_template(
            "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {eta}",
        ) {
            progress.set_style(style.progress_chars("=> "));
        }
    }

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let part = part_path(file_path);
    match stream_to(response, &part, progress).await {
        Ok(downloaded) => {
            fs::rename(&part, file_path)?;
            Ok(downloaded)
        }
        Err(e) => {
            let _ = fs::remove_file(&part);
            Err(e)
        }
    }
}

async fn stream_to(response: reqwest::Response, path: &Path, progress: &ProgressBar) -> PipelineResult<u64> {
    let mut file = File::create(path)?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        progress.set_position(downloaded);
    }
    file.flush()?;

    Ok(downloaded)
}

fn part_path(file_path: &Path) -> PathBuf {
    let mut name = OsString::from(file_path.as_os_str());
    name.push(".part");

    PathBuf::from(name)
}

/// Minimal HTTP/1.1 responder on a local socket for exercising the HTTP clients in tests.
#[cfg(test)]
pub(crate) mod http {
    use std::sync::{Arc, Mutex};

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Request heads received, in arrival order.
    pub type Requests = Arc<Mutex<Vec<String>>>;

    pub async fn bind(addr: &str) -> TcpListener {
        TcpListener::bind(addr).await.unwrap()
    }

    /// Answers each connection with `respond(request_head)` and closes it.
    pub fn serve<F>(listener: TcpListener, respond: F) -> Requests
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let requests = Requests::default();
        let seen = requests.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&head).to_string();
                let reply = respond(&head);
                seen.lock().unwrap().push(head);

                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        requests
    }

    /// A complete response with `Content-Length` set from `body`.
    pub fn reply(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut out = format!("HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n", status, body.len());
        for (name, value) in headers {
            out.push_str(&format!("{}: {}\r\n", name, value));
        }
        out.push_str("\r\n");
        out.push_str(body);

        out
    }

    /// The request path, e.g. `/files?q=...`.
    pub fn path_of(head: &str) -> &str {
        head.split_whitespace().nth(1).unwrap_or("")
    }

    pub fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }
}

/// In-memory store for tests: containers map to their children, files to their bytes.
#[cfg(test)]
pub(crate) mod memory {
    use std::{collections::HashMap, fs, path::Path, sync::Mutex};

    use async_trait::async_trait;

    use super::{RemoteItem, RemoteStore};
    use crate::error::{PipelineError, PipelineResult};

    #[derive(Default)]
    pub struct MemoryStore {
        pub children: HashMap<String, Vec<RemoteItem>>,
        pub contents: HashMap<String, Vec<u8>>,
        pub fetched: Mutex<Vec<String>>,
    }

    impl MemoryStore {
        pub fn folder(&mut self, parent: &str, id: &str, name: &str) {
            self.children.entry(parent.to_string()).or_default().push(RemoteItem {
                id: id.to_string(),
                name: name.to_string(),
                is_folder: true,
            });
        }

        pub fn file(&mut self, parent: &str, id: &str, name: &str) {
            self.children.entry(parent.to_string()).or_default().push(RemoteItem {
                id: id.to_string(),
                name: name.to_string(),
                is_folder: false,
            });
            self.contents.insert(id.to_string(), name.as_bytes().to_vec());
        }

        /// A listed file whose content cannot be fetched.
        pub fn broken_file(&mut self, parent: &str, id: &str, name: &str) {
            self.file(parent, id, name);
            self.contents.remove(id);
        }
    }

    #[async_trait]
    impl RemoteStore for MemoryStore {
        async fn list(&self, container: &str) -> PipelineResult<Vec<RemoteItem>> {
            Ok(self.children.get(container).cloned().unwrap_or_default())
        }

        async fn fetch(&self, item: &RemoteItem, dest: &Path) -> PipelineResult<()> {
            let bytes = self.contents.get(&item.id).ok_or_else(|| PipelineError::Http {
                status: 404,
                url: item.id.clone(),
            })?;
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(dest, bytes)?;
            self.fetched.lock().unwrap().push(item.name.clone());

            Ok(())
        }
    }
}

// -- Tests -------------------------------------------------------------------
