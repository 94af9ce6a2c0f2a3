use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::download::DownloadError;

/// Build the HTTP client shared by all downloads
///
/// # Errors
///
/// Returns `DownloadError::Http` if the TLS backend cannot be initialised.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, DownloadError> {
    Ok(reqwest::Client::builder()
        .connect_timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Delay before the retry following a failed `attempt` (0-based): 1s, 2s, 4s, ...
#[must_use]
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(16))
}

/// Sibling path a download is written to before it is complete
#[must_use]
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Download `url` to `dest`, retrying with exponential backoff.
///
/// The body is streamed to a `.part` file that is renamed to `dest` only once
/// complete, so an interrupted download never looks finished.
///
/// # Errors
///
/// Returns `DownloadError::RetriesExhausted` once every attempt has failed.
pub async fn fetch_with_retry(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    retries: u32,
    timeout: Duration,
) -> Result<(), DownloadError> {
    let part = partial_path(dest);
    let mut last_error = String::from("no attempts made");

    for attempt in 0..retries {
        match fetch_once(client, url, &part, timeout).await {
            Ok(()) => {
                tokio::fs::rename(&part, dest).await?;
                debug!("Fetched {url} -> {}", dest.display());
                return Ok(());
            }
            Err(e) => {
                warn!("Attempt {} of {retries} failed for {url}: {e}", attempt + 1);
                last_error = e.to_string();
                if attempt + 1 < retries {
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
            }
        }
    }

    // The partial file may never have been created
    if let Err(e) = tokio::fs::remove_file(&part).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!("Could not remove {}: {e}", part.display());
        }
    }

    Err(DownloadError::RetriesExhausted {
        url: url.to_string(),
        attempts: retries,
        last_error,
    })
}

async fn fetch_once(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    timeout: Duration,
) -> Result<(), DownloadError> {
    let mut response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let mut file = tokio::fs::File::create(dest).await?;
    loop {
        let chunk = tokio::time::timeout(timeout, response.chunk())
            .await
            .map_err(|_| DownloadError::Timeout {
                url: url.to_string(),
            })??;

        match chunk {
            Some(bytes) => file.write_all(&bytes).await?,
            None => break,
        }
    }
    file.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/tmp/genomes/GCF_1.1_A.fna.gz")),
            PathBuf::from("/tmp/genomes/GCF_1.1_A.fna.gz.part")
        );
    }

    #[tokio::test]
    async fn test_zero_retries_gives_up_immediately() {
        let client = build_client(Duration::from_secs(1)).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("never.txt");

        let err = fetch_with_retry(&client, "http://127.0.0.1:9/", &dest, 0, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DownloadError::RetriesExhausted { attempts: 0, .. }
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_failed_fetch_removes_partial_file() {
        let client = build_client(Duration::from_secs(1)).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("genome.fna.gz");
        std::fs::write(partial_path(&dest), "stale").unwrap();

        let err = fetch_with_retry(&client, "http://127.0.0.1:9/", &dest, 1, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::RetriesExhausted { attempts: 1, .. }));
        assert!(!partial_path(&dest).exists());
        assert!(!dest.exists());
    }
}
