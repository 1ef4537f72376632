use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use reqwest;
use crate::browser::{Browser, BrowserError};
use crate::extract::{self, VideoItem};

#[derive(Error, Debug)]
pub enum DownloaderError {
    #[error("BrowserError: {0}")]
    BrowserError(#[from] BrowserError),
    #[error("ReqwestError: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error)
}

pub type Result<T> = std::result::Result<T, DownloaderError>;

/// Crawls a paginated profile feed and saves every referenced video,
/// skipping files that are already on disk.
pub struct VideoDownloader {
    base_url: String,
    user_id: String,
    start_page: u32,
    end_page: u32,
    download_directory: PathBuf,
    headless: bool,
    client: reqwest::Client,
}

impl VideoDownloader {

    const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

    pub fn new(
        base_url: String,
        user_id: String,
        start_page: u32,
        end_page: u32,
        download_directory: impl Into<PathBuf>,
        headless: bool,
    ) -> Result<Self> {

        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .build()?;

        Ok(Self {
            base_url,
            user_id,
            start_page,
            end_page,
            download_directory: download_directory.into(),
            headless,
            client,
        })
    }

    /// Walks the full page range in order, regardless of empty pages,
    /// downloading every item whose file is not already present.
    /// The browser session lives for exactly one call and is released
    /// on every exit path.
    pub async fn run(&self) -> Result<()> {

        fs::create_dir_all(&self.download_directory)?;

        let browser = Browser::new(self.headless)?;

        for page in self.start_page..=self.end_page {
            let page_url = self.page_url(page);
            let html = browser.rendered_html(&page_url, extract::DATA_ISLAND_SELECTOR)?;
            let items = extract::extract_video_items(&html);
            self.process_items(&items).await?;
        }

        Ok(())
    }

    fn page_url(&self, page: u32) -> String {
        format!("{}/{}?page={page}", self.base_url.trim_end_matches('/'), self.user_id)
    }

    async fn process_items(&self, items: &[VideoItem]) -> Result<()> {

        for item in items {
            let title = sanitize_title(&item.caption);
            let save_path = self.download_directory.join(format!("{title}.mp4"));

            if save_path.exists() {
                println!("File already exists, skipped: {}", save_path.display());
                continue;
            }

            let media_url = item.media_url.split(' ').next().unwrap_or_default();
            if self.download_video(media_url, &save_path).await? {
                println!("Downloaded: {}", save_path.display());
            }
        }

        Ok(())
    }

    /// Streams `url` into `save_path`. A non-success status writes nothing
    /// and reports `false`; there is no retry.
    async fn download_video(&self, url: &str, save_path: &Path) -> Result<bool> {

        let mut response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Ok(false);
        }

        let mut file = fs::File::create(save_path)?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk)?;
        }

        Ok(true)
    }
}

/// Filename stem for a caption: its first token, with path separators
/// replaced so the title can't escape the download directory.
pub fn sanitize_title(caption: &str) -> String {
    caption.split(' ').next().unwrap_or_default().replace('/', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn downloader(dir: &Path) -> VideoDownloader {
        VideoDownloader::new(
            "http://example.com/".to_string(),
            "someone".to_string(),
            1,
            1,
            dir,
            true,
        )
        .unwrap()
    }

    fn fresh_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("video_downloader_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Serves exactly one HTTP response on a loopback port, then goes away.
    async fn serve_once(status_line: &'static str, body: &'static [u8]) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;

            let header = format!(
                "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(header.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
        });

        addr
    }

    #[test]
    fn sanitize_keeps_first_token() {
        assert_eq!(sanitize_title("hello world"), "hello");
    }

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_title("a/b/c rest"), "a_b_c");
    }

    #[test]
    fn sanitize_empty_caption() {
        assert_eq!(sanitize_title(""), "");
    }

    #[test]
    fn page_url_strips_trailing_slash() {
        let d = downloader(Path::new("./videos"));
        assert_eq!(d.page_url(3), "http://example.com/someone?page=3");
    }

    #[tokio::test]
    async fn downloads_new_video() {
        let dir = fresh_dir("downloads_new_video");
        let addr = serve_once("HTTP/1.1 200 OK", b"video bytes").await;

        let d = downloader(&dir);
        let items = vec![VideoItem {
            caption: "hello world".to_string(),
            media_url: format!("http://{addr}/v.mp4"),
        }];
        d.process_items(&items).await.unwrap();

        assert_eq!(fs::read(dir.join("hello.mp4")).unwrap(), b"video bytes");
    }

    #[tokio::test]
    async fn second_pass_skips_existing_file() {
        let dir = fresh_dir("second_pass_skips");
        let addr = serve_once("HTTP/1.1 200 OK", b"first fetch").await;

        let d = downloader(&dir);
        let items = vec![VideoItem {
            caption: "hello again".to_string(),
            media_url: format!("http://{addr}/v.mp4"),
        }];
        d.process_items(&items).await.unwrap();

        // the one-shot server is gone: a refetch would fail loudly
        d.process_items(&items).await.unwrap();

        assert_eq!(fs::read(dir.join("hello.mp4")).unwrap(), b"first fetch");
    }

    #[tokio::test]
    async fn non_success_status_leaves_no_file() {
        let dir = fresh_dir("non_success_status");
        let addr = serve_once("HTTP/1.1 404 Not Found", b"gone").await;

        let d = downloader(&dir);
        let items = vec![VideoItem {
            caption: "missing video".to_string(),
            media_url: format!("http://{addr}/v.mp4"),
        }];
        d.process_items(&items).await.unwrap();

        assert!(!dir.join("missing.mp4").exists());
    }

    #[tokio::test]
    async fn media_url_uses_first_token() {
        let dir = fresh_dir("media_url_first_token");
        let addr = serve_once("HTTP/1.1 200 OK", b"tokenized").await;

        let d = downloader(&dir);
        let items = vec![VideoItem {
            caption: "clip".to_string(),
            media_url: format!("http://{addr}/v.mp4 http://other/w.mp4"),
        }];
        d.process_items(&items).await.unwrap();

        assert_eq!(fs::read(dir.join("clip.mp4")).unwrap(), b"tokenized");
    }
}
