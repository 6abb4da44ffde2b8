use crate::{core::geo::TileCoord, prelude::HashSet};
use crossbeam_channel::{Receiver, Sender};
use once_cell::sync::Lazy;
use reqwest::{blocking::Client, StatusCode};
use std::{sync::Arc, thread, time::Duration};

/// Shared blocking HTTP client. Building the client once avoids the cost of
/// TLS and connection pool setup for every tile.
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("fablemap/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(15))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {}", e);
            Client::new()
        })
});

/// Outcome of a single tile request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileFetch {
    Loaded(Arc<[u8]>),
    /// The server has no tile here (404): expected at pyramid edges
    Absent,
    Failed(String),
}

/// Anything able to fetch tile bytes for a URL
pub trait TileFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> TileFetch;
}

/// Fetches tiles over HTTP with the shared client
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

impl TileFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> TileFetch {
        let response = match HTTP_CLIENT.get(url).send() {
            Ok(response) => response,
            Err(e) => return TileFetch::Failed(e.to_string()),
        };
        match response.status() {
            StatusCode::NOT_FOUND => TileFetch::Absent,
            status if status.is_success() => match response.bytes() {
                Ok(bytes) => TileFetch::Loaded(Arc::from(bytes.as_ref())),
                Err(e) => TileFetch::Failed(e.to_string()),
            },
            status => TileFetch::Failed(format!("HTTP {}", status)),
        }
    }
}

/// Tile loader that fetches tiles in background threads and reports the
/// results back over a channel drained by the UI thread.
pub struct TileLoader {
    fetcher: Arc<dyn TileFetcher>,
    tx: Sender<(TileCoord, TileFetch)>,
    rx: Receiver<(TileCoord, TileFetch)>,
    in_flight: HashSet<TileCoord>,
    max_attempts: usize,
}

impl TileLoader {
    pub fn new(fetcher: Arc<dyn TileFetcher>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            fetcher,
            tx,
            rx,
            in_flight: HashSet::default(),
            max_attempts: 2,
        }
    }

    pub fn http() -> Self {
        Self::new(Arc::new(HttpFetcher))
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn is_in_flight(&self, coord: &TileCoord) -> bool {
        self.in_flight.contains(coord)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start downloading the specified tile on a detached thread. Duplicate
    /// requests for a tile already in flight are ignored.
    pub fn start_download(&mut self, coord: TileCoord, url: String) {
        if !self.in_flight.insert(coord) {
            return;
        }

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let max_attempts = self.max_attempts;

        thread::spawn(move || {
            let mut outcome = TileFetch::Failed("not attempted".into());
            for attempt in 1..=max_attempts {
                log::debug!("fetch tile {} attempt {}", coord, attempt);
                outcome = fetcher.fetch(&url);
                match &outcome {
                    TileFetch::Loaded(data) => {
                        log::debug!("downloaded tile {} ({} bytes)", coord, data.len());
                        break;
                    }
                    TileFetch::Absent => break,
                    TileFetch::Failed(e) => {
                        log::warn!("tile {} download failed on attempt {}: {}", coord, attempt, e);
                        if attempt < max_attempts {
                            thread::sleep(Duration::from_millis(100));
                        }
                    }
                }
            }
            // receiver gone means the view was dropped
            let _ = tx.send((coord, outcome));
        });
    }

    /// Drains finished downloads without blocking
    pub fn poll_completed(&mut self) -> Vec<(TileCoord, TileFetch)> {
        let completed: Vec<_> = self.rx.try_iter().collect();
        for (coord, _) in &completed {
            self.in_flight.remove(coord);
        }
        completed
    }

    /// Blocks until one download finishes or `timeout` elapses
    pub fn wait_one(&mut self, timeout: Duration) -> Option<(TileCoord, TileFetch)> {
        let completed = self.rx.recv_timeout(timeout).ok()?;
        self.in_flight.remove(&completed.0);
        Some(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyFetcher {
        calls: AtomicUsize,
    }

    impl TileFetcher for FlakyFetcher {
        fn fetch(&self, url: &str) -> TileFetch {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if url.ends_with("missing.png") {
                TileFetch::Absent
            } else if call == 0 {
                TileFetch::Failed("connection reset".into())
            } else {
                TileFetch::Loaded(Arc::from(&b"png"[..]))
            }
        }
    }

    #[test]
    fn test_retries_then_loads() {
        let fetcher = Arc::new(FlakyFetcher {
            calls: AtomicUsize::new(0),
        });
        let mut loader = TileLoader::new(fetcher.clone());
        let coord = TileCoord::new(1, 0, 0);

        loader.start_download(coord, "http://tiles/1/0/0.png".into());
        loader.start_download(coord, "http://tiles/1/0/0.png".into());
        assert_eq!(loader.in_flight(), 1);

        let (done, outcome) = loader.wait_one(Duration::from_secs(5)).unwrap();
        assert_eq!(done, coord);
        assert_eq!(outcome, TileFetch::Loaded(Arc::from(&b"png"[..])));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn test_absent_is_not_retried() {
        let fetcher = Arc::new(FlakyFetcher {
            calls: AtomicUsize::new(1),
        });
        let mut loader = TileLoader::new(fetcher.clone()).with_max_attempts(3);
        loader.start_download(TileCoord::new(0, 5, 5), "http://tiles/missing.png".into());

        let (_, outcome) = loader.wait_one(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome, TileFetch::Absent);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
