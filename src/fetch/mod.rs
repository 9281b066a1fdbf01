//! Downloads the gzipped world dumps.
//!
//! Redirects are followed; any transport error or non-2xx final status fails
//! the request (no retry). Bodies are gunzipped and handed to the caller one
//! line at a time.

use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::time::Duration;

use flate2::read::GzDecoder;

use crate::mapdata::{
    parse_alliance, parse_player, parse_town, Alliance, Player, TownRow, ALLIANCES_FILE,
    PLAYERS_FILE, TOWNS_FILE,
};

pub const USER_AGENT: &str = concat!("grepomap/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug)]
pub enum FetchError {
    Client(reqwest::Error),
    Request { url: String, source: reqwest::Error },
    Status { url: String, status: u16 },
    Decode { url: String, source: std::io::Error },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Request { url, source } => write!(f, "request to {url} failed: {source}"),
            Self::Status { url, status } => write!(f, "HTTP {status} from {url}"),
            Self::Decode { url, source } => write!(f, "failed to decode {url}: {source}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Shared HTTP client with the redirect policy and timeout used for every download.
/// Proxy environment variables are ignored; the dump hosts are reached directly.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .no_proxy()
        .build()
        .map_err(FetchError::Client)
}

/// GETs `url` and returns the raw body of a 2xx response.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let body = response
        .bytes()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
    Ok(body.to_vec())
}

/// Feeds each non-empty line of `body` to `on_line`, gunzipping first when
/// the body carries the gzip magic.
pub fn for_each_line(body: &[u8], mut on_line: impl FnMut(&str)) -> std::io::Result<()> {
    let reader: Box<dyn Read + '_> = if body.starts_with(&GZIP_MAGIC) {
        Box::new(GzDecoder::new(body))
    } else {
        Box::new(body)
    };
    for line in BufReader::new(reader).lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if !line.is_empty() {
            on_line(line);
        }
    }
    Ok(())
}

/// Client for one world's dump directory.
#[derive(Debug, Clone)]
pub struct DumpClient {
    http: reqwest::Client,
    base_url: String,
}

impl DumpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, file: &str) -> String {
        format!("{}/{file}", self.base_url)
    }

    /// Downloads `file` and runs `parse` over each line; lines it rejects are
    /// logged and skipped.
    pub async fn fetch_parsed<T>(
        &self,
        file: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Vec<T>, FetchError> {
        let url = self.url_for(file);
        let body = fetch_bytes(&self.http, &url).await?;

        let mut out = Vec::new();
        let mut rejected = 0usize;
        for_each_line(&body, |line| match parse(line) {
            Some(item) => out.push(item),
            None => {
                rejected += 1;
                tracing::warn!(file, line, "skipping malformed dump line");
            }
        })
        .map_err(|source| FetchError::Decode {
            url: url.clone(),
            source,
        })?;

        tracing::info!(file, rows = out.len(), rejected, "loaded dump");
        Ok(out)
    }

    /// Downloads players, alliances and towns concurrently; the first failure fails all three.
    pub async fn fetch_world(&self) -> Result<WorldDump, FetchError> {
        let (players, alliances, towns) = tokio::try_join!(
            self.fetch_parsed(PLAYERS_FILE, parse_player),
            self.fetch_parsed(ALLIANCES_FILE, parse_alliance),
            self.fetch_parsed(TOWNS_FILE, parse_town),
        )?;
        Ok(WorldDump {
            players,
            alliances,
            towns,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldDump {
    pub players: Vec<Player>,
    pub alliances: Vec<Alliance>,
    pub towns: Vec<TownRow>,
}
