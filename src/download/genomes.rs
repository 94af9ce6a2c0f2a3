use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::read::MultiGzDecoder;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::download::client::{build_client, fetch_with_retry, partial_path};
use crate::download::taxonomy_table::build_taxonomy_table;
use crate::download::{DownloadConfig, DownloadError};
use crate::parsing::assembly_summary::{load_assembly_summary, AssemblySummary};
use crate::utils::validation::accession_from_name;

/// Assembly summaries fetched on first use, as `(cache key, URL)`
pub const SUMMARY_SOURCES: [(&str, &str); 2] = [
    (
        "refseq",
        "https://ftp.ncbi.nlm.nih.gov/genomes/refseq/assembly_summary_refseq.txt",
    ),
    (
        "genbank",
        "https://ftp.ncbi.nlm.nih.gov/genomes/genbank/assembly_summary_genbank.txt",
    ),
];

/// Name of the concatenated FASTA written to the output directory
pub const COMBINED_GENOMES_FILE: &str = "combined_genomes.fasta";

/// Cache location of an assembly summary
#[must_use]
pub fn summary_cache_path(cache_dir: &Path, key: &str) -> PathBuf {
    cache_dir.join(format!("assembly_summary_{key}.txt"))
}

/// Outcome of a batch of genome downloads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Genome file names present in the output directory, sorted
    pub succeeded: Vec<String>,
    /// Accessions that could not be fetched, sorted
    pub failed: Vec<String>,
}

/// Downloads genomes listed by accession
#[derive(Clone)]
pub struct GenomeDownloader {
    client: reqwest::Client,
    config: Arc<DownloadConfig>,
    assemblies: Arc<AssemblySummary>,
}

impl GenomeDownloader {
    /// Create directories, fetch any uncached assembly summaries and load them.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created or a summary can be
    /// neither fetched nor read.
    pub async fn connect(config: DownloadConfig) -> Result<Self, DownloadError> {
        tokio::fs::create_dir_all(&config.output_dir).await?;
        tokio::fs::create_dir_all(&config.cache_dir).await?;

        let client = build_client(config.timeout)?;
        let mut assemblies = AssemblySummary::new();

        for (key, url) in SUMMARY_SOURCES {
            let cache_file = summary_cache_path(&config.cache_dir, key);
            if tokio::fs::try_exists(&cache_file).await? {
                debug!("Using cached {}", cache_file.display());
            } else {
                info!("Downloading {url}");
                fetch_with_retry(&client, url, &cache_file, config.retries, config.timeout).await?;
            }
            assemblies.merge(load_assembly_summary(&cache_file)?);
        }
        info!("Loaded {} assembly records", assemblies.len());

        Ok(Self::with_assemblies(client, config, assemblies))
    }

    /// Create a downloader over already loaded assembly records
    #[must_use]
    pub fn with_assemblies(
        client: reqwest::Client,
        config: DownloadConfig,
        assemblies: AssemblySummary,
    ) -> Self {
        Self {
            client,
            config: Arc::new(config),
            assemblies: Arc::new(assemblies),
        }
    }

    #[must_use]
    pub fn assemblies(&self) -> &AssemblySummary {
        &self.assemblies
    }

    #[must_use]
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Download every accession, at most `max_concurrent` at a time.
    ///
    /// Repeated accessions are fetched once. Individual failures are logged
    /// and reported, never fatal.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Queue` only if the concurrency limiter is closed.
    pub async fn download_all(&self, accessions: &[String]) -> Result<DownloadReport, DownloadError> {
        let limiter = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut tasks = JoinSet::new();
        let mut queued = HashSet::new();

        for accession in accessions {
            if !queued.insert(accession.as_str()) {
                debug!("{accession} listed more than once, skipping repeat");
                continue;
            }
            let permit = Arc::clone(&limiter).acquire_owned().await?;
            let downloader = self.clone();
            let accession = accession.clone();
            tasks.spawn(async move {
                let result = downloader.download_genome(&accession).await;
                drop(permit);
                (accession, result)
            });
        }

        let mut report = DownloadReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(file_name))) => report.succeeded.push(file_name),
                Ok((accession, Err(e))) => {
                    error!("Download of {accession} failed: {e}");
                    report.failed.push(accession);
                }
                Err(e) => error!("Download task aborted: {e}"),
            }
        }

        report.succeeded.sort();
        report.failed.sort();
        Ok(report)
    }

    /// Download and decompress one genome, returning its file name.
    ///
    /// A genome already present in the output directory is not fetched again.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::NotInSummary` for unknown accessions, or the
    /// fetch/decompression error.
    pub async fn download_genome(&self, accession: &str) -> Result<String, DownloadError> {
        let record = self
            .assemblies
            .get(accession)
            .ok_or_else(|| DownloadError::NotInSummary(accession.to_string()))?;

        let file_name = record.file_name();
        let output_path = self.config.output_dir.join(&file_name);
        if tokio::fs::try_exists(&output_path).await? {
            debug!("{file_name} already present, skipping");
            return Ok(file_name);
        }

        let gz_path = self.config.output_dir.join(format!("{file_name}.gz"));
        fetch_with_retry(
            &self.client,
            &record.genomic_fna_url(),
            &gz_path,
            self.config.retries,
            self.config.timeout,
        )
        .await?;

        let (src, dest) = (gz_path.clone(), output_path);
        tokio::task::spawn_blocking(move || decompress_gzip(&src, &dest))
            .await
            .map_err(io::Error::other)??;
        tokio::fs::remove_file(&gz_path).await?;

        Ok(file_name)
    }
}

/// Decompress a gzip file, renaming the result into place once complete
///
/// # Errors
///
/// Returns any IO or decompression error.
pub fn decompress_gzip(src: &Path, dest: &Path) -> io::Result<()> {
    let part = partial_path(dest);
    {
        let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(src)?));
        let mut writer = BufWriter::new(File::create(&part)?);
        io::copy(&mut decoder, &mut writer)?;
        writer.flush()?;
    }
    std::fs::rename(&part, dest)
}

/// Read an identifier list: one entry per non-empty line, reduced to its accession
///
/// # Errors
///
/// Returns `DownloadError::Io` if the file cannot be read.
pub fn read_accession_list(path: &Path) -> Result<Vec<String>, DownloadError> {
    let reader = BufReader::new(File::open(path)?);
    let mut accessions = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            accessions.push(accession_from_name(&line));
        }
    }
    Ok(accessions)
}

/// Concatenate genome files from `genome_dir` into `dest`, skipping missing files
///
/// # Errors
///
/// Returns `DownloadError::Io` if `dest` cannot be written.
pub fn concatenate_genomes(
    genome_dir: &Path,
    file_names: &[String],
    dest: &Path,
) -> Result<(), DownloadError> {
    let mut writer = BufWriter::new(File::create(dest)?);
    for file_name in file_names {
        match File::open(genome_dir.join(file_name)) {
            Ok(file) => {
                io::copy(&mut BufReader::new(file), &mut writer)?;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("{file_name} not found, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }
    writer.flush()?;
    Ok(())
}

/// Download the listed genomes, then write the taxonomy table and combined FASTA.
///
/// # Errors
///
/// Returns an error if setup fails or the outputs cannot be written. Failed
/// individual genomes are reported in the returned `DownloadReport`.
pub async fn download_and_index(
    config: DownloadConfig,
    accession_list: &Path,
    taxonomy_table: &Path,
) -> Result<DownloadReport, DownloadError> {
    let accessions = read_accession_list(accession_list)?;
    let downloader = GenomeDownloader::connect(config).await?;

    info!("Starting download of {} genomes", accessions.len());
    let report = downloader.download_all(&accessions).await?;

    let output_dir = downloader.config().output_dir.clone();
    build_taxonomy_table(&output_dir, downloader.assemblies(), taxonomy_table)?;

    let combined = output_dir.join(COMBINED_GENOMES_FILE);
    concatenate_genomes(&output_dir, &report.succeeded, &combined)?;
    info!("Genomes concatenated into {}", combined.display());

    info!("Downloaded successfully: {}", report.succeeded.len());
    info!("Failed: {}", report.failed.len());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::assembly_summary::AssemblyRecord;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::time::Duration;
    use tempfile::TempDir;

    fn record(accession: &str) -> AssemblyRecord {
        AssemblyRecord {
            accession: accession.to_string(),
            asm_name: "ASM1".to_string(),
            taxid: "562".to_string(),
            organism_name: "Escherichia coli".to_string(),
            ftp_path: format!("https://127.0.0.1:9/{accession}_ASM1"),
        }
    }

    fn offline_downloader(output_dir: &Path) -> GenomeDownloader {
        let mut assemblies = AssemblySummary::new();
        assemblies.insert(record("GCF_000000001.1"));
        assemblies.insert(record("GCF_000000002.1"));

        let mut config = DownloadConfig::new(output_dir, output_dir.join("cache"));
        config.retries = 1;
        config.timeout = Duration::from_secs(1);
        let client = build_client(config.timeout).unwrap();
        GenomeDownloader::with_assemblies(client, config, assemblies)
    }

    #[test]
    fn test_read_accession_list() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("genomes.txt");
        std::fs::write(
            &list,
            "GCF_000001405.40_GRCh38.p14_genomic.fna\n\nGCA_000005845.2\n",
        )
        .unwrap();

        let accessions = read_accession_list(&list).unwrap();
        assert_eq!(accessions, vec!["GCF_000001405.40", "GCA_000005845.2"]);
    }

    #[test]
    fn test_decompress_gzip() {
        let dir = TempDir::new().unwrap();
        let gz = dir.path().join("g.fna.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b">seq1\nACGT\n").unwrap();
        encoder.finish().unwrap();

        let out = dir.path().join("g.fna");
        decompress_gzip(&gz, &out).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), ">seq1\nACGT\n");
        assert!(!partial_path(&out).exists());
    }

    #[test]
    fn test_concatenate_skips_missing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.fna"), ">a\nAA\n").unwrap();
        std::fs::write(dir.path().join("b.fna"), ">b\nCC\n").unwrap();

        let dest = dir.path().join(COMBINED_GENOMES_FILE);
        let names = vec!["a.fna".to_string(), "gone.fna".to_string(), "b.fna".to_string()];
        concatenate_genomes(dir.path(), &names, &dest).unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), ">a\nAA\n>b\nCC\n");
    }

    #[test]
    fn test_summary_cache_path() {
        assert_eq!(
            summary_cache_path(Path::new("/cache"), "refseq"),
            PathBuf::from("/cache/assembly_summary_refseq.txt")
        );
    }

    #[tokio::test]
    async fn test_existing_genome_is_not_refetched() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("GCF_000000001.1_ASM1.fna"), ">x\nA\n").unwrap();

        let downloader = offline_downloader(dir.path());
        let file_name = downloader.download_genome("GCF_000000001.1").await.unwrap();
        assert_eq!(file_name, "GCF_000000001.1_ASM1.fna");
    }

    #[tokio::test]
    async fn test_unknown_accession_is_reported_failed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("GCF_000000001.1_ASM1.fna"), ">x\nA\n").unwrap();

        let downloader = offline_downloader(dir.path());
        let report = downloader
            .download_all(&["GCF_000000001.1".to_string(), "GCF_404.1".to_string()])
            .await
            .unwrap();

        assert_eq!(report.succeeded, vec!["GCF_000000001.1_ASM1.fna"]);
        assert_eq!(report.failed, vec!["GCF_404.1"]);
    }

    #[tokio::test]
    async fn test_repeated_accession_downloaded_once() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("GCF_000000001.1_ASM1.fna"), ">x\nA\n").unwrap();
        let list = dir.path().join("genomes.txt");
        std::fs::write(&list, "GCF_000000001.1_ASM1_genomic.fna\nGCF_000000001.1\n").unwrap();

        let downloader = offline_downloader(dir.path());
        let accessions = read_accession_list(&list).unwrap();
        let report = downloader.download_all(&accessions).await.unwrap();
        assert_eq!(report.succeeded, vec!["GCF_000000001.1_ASM1.fna"]);
        assert!(report.failed.is_empty());

        let combined = dir.path().join(COMBINED_GENOMES_FILE);
        concatenate_genomes(dir.path(), &report.succeeded, &combined).unwrap();
        assert_eq!(std::fs::read_to_string(&combined).unwrap(), ">x\nA\n");
    }
}
