use reqwest::Client;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::error::MossError;
use crate::language::Language;
use crate::storage::CachedFile;

const MAX_MATCHES: u32 = 10;
const SHOW_MATCHES: u32 = 250;

/// Client for the Moss submission server.
pub struct MossClient {
    user_id: String,
    host: String,
    port: u16,
    http: Client,
}

impl MossClient {
    pub fn new(user_id: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            user_id: user_id.into(),
            host: host.into(),
            port,
            http: Client::new(),
        }
    }

    /// Upload `files` as one Moss job and return the results URL.
    ///
    /// Blocks until Moss has finished comparing, which can take minutes.
    pub async fn submit(&self, language: Language, files: &[CachedFile]) -> Result<String, MossError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let moss_language = language.moss_name();

        let header = format!(
            "moss {}\ndirectory 0\nX 0\nmaxmatches {}\nshow {}\nlanguage {}\n",
            self.user_id, MAX_MATCHES, SHOW_MATCHES, moss_language
        );
        writer.write_all(header.as_bytes()).await?;

        let mut line = String::new();
        reader.read_line(&mut line).await?;
        if line.trim() == "no" {
            writer.write_all(b"end\n").await?;
            return Err(MossError::LanguageRejected {
                language: moss_language.to_string(),
            });
        }

        for (idx, file) in files.iter().enumerate() {
            let contents = tokio::fs::read(&file.path).await?;
            let announce = format!(
                "file {} {} {} {}\n",
                idx + 1,
                moss_language,
                contents.len(),
                file.display_name
            );
            writer.write_all(announce.as_bytes()).await?;
            writer.write_all(&contents).await?;
            debug!("Uploaded {}", file.display_name);
        }

        writer.write_all(b"query 0 \n").await?;
        info!("Sent {} {} files to Moss, waiting for results", files.len(), moss_language);

        line.clear();
        reader.read_line(&mut line).await?;
        writer.write_all(b"end\n").await?;

        let url = line.trim();
        if !url.starts_with("http") {
            return Err(MossError::UnexpectedResponse {
                response: url.to_string(),
            });
        }
        Ok(url.to_string())
    }

    /// Download the HTML index of a results URL.
    pub async fn download_report(&self, url: &str) -> Result<String, MossError> {
        let download_err = |source| MossError::Download {
            url: url.to_string(),
            source,
        };
        self.http
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(download_err)?
            .text()
            .await
            .map_err(download_err)
    }
}
