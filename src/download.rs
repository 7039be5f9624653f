// src/download.rs
// =============================================================================
// Downloads PDF files to a local directory.
//
// Runs after a crawl (crawl --download) or on its own (download command),
// over the same fetcher the crawl used, so connections are reused.
//
// Rules:
// - The file is named after the last segment of the URL path
// - If that is empty or not a .pdf name, a generated name is used
// - Two URLs with the same name overwrite each other (last one wins)
// - One failed download never stops the others
// =============================================================================

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::config::CrawlConfig;
use crate::fetch::{FetchError, Fetcher};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("could not create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadedFile {
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadFailure {
    pub url: String,
    pub message: String,
}

/// Outcome of a batch of downloads
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadSummary {
    pub downloaded: Vec<DownloadedFile>,
    pub failures: Vec<DownloadFailure>,
}

impl DownloadSummary {
    pub fn total_bytes(&self) -> u64 {
        self.downloaded.iter().map(|file| file.bytes).sum()
    }

    pub fn attempted(&self) -> usize {
        self.downloaded.len() + self.failures.len()
    }
}

/// Progress notifications for a batch
#[derive(Debug, Clone, Copy)]
pub enum DownloadEvent<'a> {
    Started { index: usize, total: usize, url: &'a str, file_name: &'a str },
    Finished { file: &'a DownloadedFile },
    Failed { url: &'a str, error: &'a DownloadError },
}

pub struct Downloader<'a, F> {
    fetcher: &'a F,
    timeout: Duration,
    delay: Duration,
}

impl<'a, F: Fetcher> Downloader<'a, F> {
    // Uses the download timeout and the delay from `config`
    pub fn new(fetcher: &'a F, config: &CrawlConfig) -> Self {
        Self {
            fetcher,
            timeout: config.download_timeout,
            delay: config.delay,
        }
    }

    pub async fn download_all(&self, urls: &[String], dest: &Path) -> Result<DownloadSummary, DownloadError> {
        self.download_all_with(urls, dest, |_| {}).await
    }

    // Downloads every URL into `dest`, one after the other
    //
    // Only a missing, uncreatable `dest` is an error; per-file failures end
    // up in the summary.
    pub async fn download_all_with<O>(
        &self,
        urls: &[String],
        dest: &Path,
        mut observer: O,
    ) -> Result<DownloadSummary, DownloadError>
    where
        O: FnMut(DownloadEvent<'_>),
    {
        prepare_output_dir(dest).await?;

        let mut summary = DownloadSummary::default();
        let total = urls.len();

        for (i, url) in urls.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let file_name = file_name_for(url, Some(i + 1));
            observer(DownloadEvent::Started {
                index: i + 1,
                total,
                url,
                file_name: &file_name,
            });

            match self.fetch_to(url, &dest.join(&file_name)).await {
                Ok(file) => {
                    observer(DownloadEvent::Finished { file: &file });
                    summary.downloaded.push(file);
                }
                Err(e) => {
                    info!(url = %url, error = %e, "download failed");
                    observer(DownloadEvent::Failed { url, error: &e });
                    summary.failures.push(DownloadFailure {
                        url: url.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            downloaded = summary.downloaded.len(),
            failed = summary.failures.len(),
            bytes = summary.total_bytes(),
            "downloads complete"
        );

        Ok(summary)
    }

    // Downloads a single URL, outside of any batch
    pub async fn download_one(&self, url: &str, dest: &Path) -> Result<DownloadedFile, DownloadError> {
        prepare_output_dir(dest).await?;
        let path = dest.join(file_name_for(url, None));
        self.fetch_to(url, &path).await
    }

    async fn fetch_to(&self, url: &str, path: &Path) -> Result<DownloadedFile, DownloadError> {
        let response = self.fetcher.fetch(url, self.timeout).await?;

        tokio::fs::write(path, &response.body)
            .await
            .map_err(|source| DownloadError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(DownloadedFile {
            url: url.to_string(),
            path: path.to_path_buf(),
            bytes: response.body.len() as u64,
        })
    }
}

// Creates the output directory (and its parents) if needed
pub async fn prepare_output_dir(dest: &Path) -> Result<(), DownloadError> {
    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|source| DownloadError::CreateDir {
            path: dest.to_path_buf(),
            source,
        })
}

// Picks the local file name for a PDF URL
//
// Examples:
//   https://x.com/docs/guide.pdf?v=2  -> guide.pdf
//   https://x.com/docs/               -> document_<index>.pdf
//   https://x.com/download?id=7       -> document_<index>.pdf
//
// Without an index (single download) the fallback uses a hash of the URL.
pub fn file_name_for(url: &str, index: Option<usize>) -> String {
    let last_segment = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.last().map(str::to_string))
        })
        .filter(|name| name.to_ascii_lowercase().ends_with(".pdf"));

    match (last_segment, index) {
        (Some(name), _) => name,
        (None, Some(index)) => format!("document_{}.pdf", index),
        (None, None) => {
            let mut hasher = DefaultHasher::new();
            url.hash(&mut hasher);
            format!("document_{:016x}.pdf", hasher.finish())
        }
    }
}

// Reads a URL list: one URL per line, blank lines and # comments skipped
pub fn read_url_list(path: &Path) -> io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_url_list(&content))
}

fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

// Writes a URL list in the format read_url_list understands
pub fn write_url_list(path: &Path, urls: &[String]) -> io::Result<()> {
    let mut content = String::new();
    for url in urls {
        content.push_str(url);
        content.push('\n');
    }
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchResponse;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeFiles {
        files: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<(String, Duration)>>,
    }

    impl FakeFiles {
        fn file(mut self, url: &str, body: &[u8]) -> Self {
            self.files.insert(url.to_string(), body.to_vec());
            self
        }
    }

    impl Fetcher for FakeFiles {
        async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError> {
            self.requests.lock().unwrap().push((url.to_string(), timeout));
            match self.files.get(url) {
                Some(body) => Ok(FetchResponse {
                    status: 200,
                    body: body.clone(),
                }),
                None => Err(FetchError::HttpStatus(404)),
            }
        }
    }

    fn config() -> CrawlConfig {
        CrawlConfig::default().with_delay(Duration::ZERO)
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_file_name_from_last_segment() {
        assert_eq!(file_name_for("https://x.com/docs/guide.pdf", Some(1)), "guide.pdf");
        assert_eq!(file_name_for("https://x.com/docs/guide.pdf?v=2#p3", Some(1)), "guide.pdf");
        assert_eq!(file_name_for("https://x.com/FORM.PDF", None), "FORM.PDF");
    }

    #[test]
    fn test_file_name_fallbacks() {
        assert_eq!(file_name_for("https://x.com/docs/", Some(4)), "document_4.pdf");
        assert_eq!(file_name_for("https://x.com/download?id=7", Some(2)), "document_2.pdf");

        let hashed = file_name_for("https://x.com/docs/", None);
        assert!(hashed.starts_with("document_") && hashed.ends_with(".pdf"));
        assert_eq!(hashed, file_name_for("https://x.com/docs/", None));
        assert_ne!(hashed, file_name_for("https://x.com/other/", None));
    }

    #[tokio::test]
    async fn test_download_all_writes_files() {
        let fetcher = FakeFiles::default()
            .file("https://x.com/a/one.pdf", b"%PDF-1.4 one")
            .file("https://cdn.x.net/two.pdf", b"%PDF-1.7 two!");
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pdfs");

        let downloader = Downloader::new(&fetcher, &config());
        let summary = downloader
            .download_all(&urls(&["https://x.com/a/one.pdf", "https://cdn.x.net/two.pdf"]), &dest)
            .await
            .unwrap();

        assert_eq!(summary.downloaded.len(), 2);
        assert!(summary.failures.is_empty());
        assert_eq!(summary.total_bytes(), 25);
        assert_eq!(std::fs::read(dest.join("one.pdf")).unwrap(), b"%PDF-1.4 one");
        assert_eq!(std::fs::read(dest.join("two.pdf")).unwrap(), b"%PDF-1.7 two!");

        // Downloads use their own, longer timeout
        let requests = fetcher.requests.lock().unwrap();
        assert!(requests.iter().all(|(_, t)| *t == Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_failed_download_does_not_stop_the_rest() {
        let fetcher = FakeFiles::default().file("https://x.com/ok.pdf", b"ok");
        let dir = tempfile::tempdir().unwrap();

        let downloader = Downloader::new(&fetcher, &config());
        let summary = downloader
            .download_all(&urls(&["https://x.com/missing.pdf", "https://x.com/ok.pdf"]), dir.path())
            .await
            .unwrap();

        assert_eq!(summary.attempted(), 2);
        assert_eq!(summary.downloaded.len(), 1);
        assert_eq!(summary.failures[0].url, "https://x.com/missing.pdf");
        assert_eq!(summary.failures[0].message, "HTTP 404");
        assert!(dir.path().join("ok.pdf").exists());
        assert!(!dir.path().join("missing.pdf").exists());
    }

    #[tokio::test]
    async fn test_same_name_overwrites() {
        let fetcher = FakeFiles::default()
            .file("https://x.com/fr/tarifs.pdf", b"french")
            .file("https://x.com/nl/tarifs.pdf", b"dutch");
        let dir = tempfile::tempdir().unwrap();

        let downloader = Downloader::new(&fetcher, &config());
        let summary = downloader
            .download_all(&urls(&["https://x.com/fr/tarifs.pdf", "https://x.com/nl/tarifs.pdf"]), dir.path())
            .await
            .unwrap();

        assert_eq!(summary.downloaded.len(), 2);
        assert_eq!(std::fs::read(dir.path().join("tarifs.pdf")).unwrap(), b"dutch");
    }

    #[tokio::test]
    async fn test_write_failure_is_per_file() {
        let fetcher = FakeFiles::default()
            .file("https://x.com/blocked.pdf", b"blocked")
            .file("https://x.com/fine.pdf", b"fine");
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go makes the write fail
        std::fs::create_dir(dir.path().join("blocked.pdf")).unwrap();

        let downloader = Downloader::new(&fetcher, &config());
        let mut failed = Vec::new();
        let summary = downloader
            .download_all_with(
                &urls(&["https://x.com/blocked.pdf", "https://x.com/fine.pdf"]),
                dir.path(),
                |event| {
                    if let DownloadEvent::Failed { error, .. } = event {
                        failed.push(matches!(error, DownloadError::Write { .. }));
                    }
                },
            )
            .await
            .unwrap();

        assert_eq!(failed, vec![true]);
        assert_eq!(summary.downloaded.len(), 1);
        assert_eq!(std::fs::read(dir.path().join("fine.pdf")).unwrap(), b"fine");
    }

    #[tokio::test]
    async fn test_uncreatable_destination_is_an_error() {
        let fetcher = FakeFiles::default();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let downloader = Downloader::new(&fetcher, &config());
        let result = downloader.download_all(&urls(&["https://x.com/a.pdf"]), &file).await;

        assert!(matches!(result, Err(DownloadError::CreateDir { .. })));
    }

    #[tokio::test]
    async fn test_prepare_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        prepare_output_dir(&nested).await.unwrap();
        assert!(nested.is_dir());

        let file = dir.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        let err = prepare_output_dir(&file).await.unwrap_err();
        assert!(matches!(err, DownloadError::CreateDir { ref path, .. } if path == &file));
    }

    #[tokio::test]
    async fn test_download_one_uses_hash_fallback() {
        let fetcher = FakeFiles::default().file("https://x.com/get?id=9", b"pdf");
        let dir = tempfile::tempdir().unwrap();

        let downloader = Downloader::new(&fetcher, &config());
        let file = downloader.download_one("https://x.com/get?id=9", dir.path()).await.unwrap();

        assert_eq!(file.bytes, 3);
        assert_eq!(
            file.path.file_name().unwrap().to_str().unwrap(),
            file_name_for("https://x.com/get?id=9", None)
        );
    }

    #[test]
    fn test_parse_url_list_skips_blanks_and_comments() {
        let content = "# exported list\nhttps://x.com/a.pdf\n\n   https://x.com/b.pdf  \n#https://x.com/c.pdf\n";
        assert_eq!(parse_url_list(content), urls(&["https://x.com/a.pdf", "https://x.com/b.pdf"]));
    }

    #[test]
    fn test_url_list_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdf_list.txt");
        let list = urls(&["https://x.com/b.pdf", "https://x.com/a.pdf"]);

        write_url_list(&path, &list).unwrap();
        assert_eq!(read_url_list(&path).unwrap(), list);
    }
}
