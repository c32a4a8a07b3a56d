//! Streaming file download.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt as _;
use tokio::io::AsyncWriteExt as _;

use crate::SourceError;
use crate::progress::DownloadProgress;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(100);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1000);

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Downloads `url` to `destination`, creating its directory.
///
/// The body is streamed to `<destination>.part` and renamed into place once
/// complete, so an interrupted transfer never leaves a truncated
/// `destination`.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails or times out, the response
/// is not successful, or the file cannot be written.
pub async fn fetch(
    url: &str,
    destination: &Path,
    connect_timeout: Duration,
    read_timeout: Duration,
    progress: &Arc<dyn DownloadProgress>,
) -> Result<u64, SourceError> {
    log::info!("Downloading {url}");
    log::info!("  -> {}", destination.display());

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SourceError::io(parent, e))?;
    }

    let client = reqwest::Client::builder()
        .user_agent(concat!("callgrid/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(connect_timeout)
        .read_timeout(read_timeout)
        .build()?;

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(SourceError::HttpStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let label = destination
        .file_name()
        .map_or_else(|| url.to_string(), |n| n.to_string_lossy().into_owned());
    progress.start(&label, response.content_length());

    let partial = partial_path(destination);
    let mut file = tokio::fs::File::create(&partial)
        .await
        .map_err(|e| SourceError::io(&partial, e))?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| SourceError::io(&partial, e))?;
        downloaded += chunk.len() as u64;
        progress.advance(chunk.len() as u64);
    }

    file.flush()
        .await
        .map_err(|e| SourceError::io(&partial, e))?;
    drop(file);

    tokio::fs::rename(&partial, destination)
        .await
        .map_err(|e| SourceError::io(destination, e))?;

    #[allow(clippy::cast_precision_loss)]
    let mb = downloaded as f64 / 1_048_576.0;
    log::info!("  download complete: {mb:.1} MB");
    progress.finish(format!("{label}: {mb:.1} MB"));

    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use std::io::{Read as _, Write as _};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use crate::progress::null_progress;

    /// Serves one canned HTTP response on a local port.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0_u8; 4096];
                let _ = stream.read(&mut buf);
                stream.write_all(response.as_bytes()).unwrap();
            }
        });
        format!("http://{addr}/data.csv")
    }

    #[derive(Default)]
    struct CountingProgress {
        bytes: AtomicU64,
    }

    impl DownloadProgress for CountingProgress {
        fn start(&self, _label: &str, _total_bytes: Option<u64>) {}
        fn advance(&self, bytes: u64) {
            self.bytes.fetch_add(bytes, Ordering::Relaxed);
        }
        fn finish(&self, _message: String) {}
    }

    #[tokio::test]
    async fn downloads_into_new_directory() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 11\r\nConnection: close\r\n\r\nhello,world",
        );
        let dir = std::env::temp_dir().join("callgrid_fetch_ok_test");
        std::fs::remove_dir_all(&dir).ok();
        let dest = dir.join("nested").join("data.csv");

        let counting = Arc::new(CountingProgress::default());
        let progress: Arc<dyn DownloadProgress> = counting.clone();
        let bytes = fetch(
            &url,
            &dest,
            Duration::from_secs(5),
            Duration::from_secs(5),
            &progress,
        )
        .await
        .unwrap();

        assert_eq!(bytes, 11);
        assert_eq!(counting.bytes.load(Ordering::Relaxed), 11);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "hello,world");
        assert!(!partial_path(&dest).exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let dir = std::env::temp_dir().join("callgrid_fetch_404_test");
        std::fs::remove_dir_all(&dir).ok();
        let dest = dir.join("data.csv");

        let result = fetch(
            &url,
            &dest,
            Duration::from_secs(5),
            Duration::from_secs(5),
            &null_progress(),
        )
        .await;

        assert!(matches!(
            result,
            Err(SourceError::HttpStatus { status: 404, .. })
        ));
        assert!(!dest.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("data/weather.csv")),
            PathBuf::from("data/weather.csv.part")
        );
    }
}
