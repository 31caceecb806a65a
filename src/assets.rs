//! Static media manifest and preload progress
//!
//! The manifest is fixed at build time. Progress counts each asset at most
//! once, whether it loaded, failed, or timed out, so the page always becomes
//! interactive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Media type of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    Audio,
    Image,
}

/// Every asset the page preloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetId {
    Explosion,
    Rain,
    Background,
    JumpscareScream,
    JumpscareImage,
}

impl AssetId {
    /// The full manifest, audio first
    pub const ALL: [AssetId; 5] = [
        AssetId::Explosion,
        AssetId::Rain,
        AssetId::Background,
        AssetId::JumpscareScream,
        AssetId::JumpscareImage,
    ];

    /// URL path served from the site root
    pub fn path(self) -> &'static str {
        match self {
            AssetId::Explosion => "/explosion.mp3",
            AssetId::Rain => "/rain.mp3",
            AssetId::Background => "/background.mp3",
            AssetId::JumpscareScream => "/jumpscare-scream.mp3",
            AssetId::JumpscareImage => "/jumpscare.webp",
        }
    }

    pub fn kind(self) -> AssetKind {
        match self {
            AssetId::JumpscareImage => AssetKind::Image,
            _ => AssetKind::Audio,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Why an asset did not load
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum LoadError {
    #[error("{path} failed to load: {reason}")]
    Media { path: String, reason: String },
    #[error("{path} did not finish loading within {timeout_ms} ms")]
    TimedOut { path: String, timeout_ms: u32 },
}

/// Settlement of a single asset load
#[derive(Debug, Clone, PartialEq)]
pub struct AssetLoad {
    pub id: AssetId,
    pub result: Result<(), LoadError>,
}

impl AssetLoad {
    pub fn loaded(id: AssetId) -> Self {
        Self { id, result: Ok(()) }
    }

    pub fn failed(id: AssetId, reason: impl Into<String>) -> Self {
        Self {
            id,
            result: Err(LoadError::Media {
                path: id.path().to_string(),
                reason: reason.into(),
            }),
        }
    }
}

/// Per-asset settlement state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Settled {
    Loaded,
    Failed(LoadError),
}

/// Completed / total counter over the manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadProgress {
    settled: [Option<Settled>; 5],
}

impl LoadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.settled.len()
    }

    /// Assets settled so far (success or failure)
    pub fn completed(&self) -> usize {
        self.settled.iter().filter(|s| s.is_some()).count()
    }

    /// Assets that settled with an error
    pub fn failed(&self) -> usize {
        self.settled
            .iter()
            .filter(|s| matches!(s, Some(Settled::Failed(_))))
            .count()
    }

    /// round(100 * completed / total)
    pub fn percent(&self) -> u8 {
        (100.0 * self.completed() as f32 / self.total() as f32).round() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.completed() == self.total()
    }

    pub fn is_settled(&self, id: AssetId) -> bool {
        self.settled[id.index()].is_some()
    }

    /// Record a settlement. Returns false if the asset was already counted.
    pub fn record(&mut self, load: &AssetLoad) -> bool {
        let slot = &mut self.settled[load.id.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(match &load.result {
            Ok(()) => Settled::Loaded,
            Err(e) => Settled::Failed(e.clone()),
        });
        true
    }

    /// Mark every unsettled asset as timed out. Returns how many were marked.
    pub fn expire_pending(&mut self, timeout_ms: u32) -> usize {
        let mut expired = 0;
        for id in AssetId::ALL {
            let slot = &mut self.settled[id.index()];
            if slot.is_none() {
                *slot = Some(Settled::Failed(LoadError::TimedOut {
                    path: id.path().to_string(),
                    timeout_ms,
                }));
                expired += 1;
            }
        }
        expired
    }

    /// Errors recorded so far, in manifest order
    pub fn errors(&self) -> impl Iterator<Item = &LoadError> {
        self.settled.iter().filter_map(|s| match s {
            Some(Settled::Failed(e)) => Some(e),
            _ => None,
        })
    }
}

/// Summary of a joined preload, built from the collected results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub failed: usize,
}

impl LoadReport {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a Result<(), LoadError>>) -> Self {
        results
            .into_iter()
            .fold(LoadReport::default(), |mut report, r| {
                match r {
                    Ok(()) => report.loaded += 1,
                    Err(_) => report.failed += 1,
                }
                report
            })
    }

    pub fn total(&self) -> usize {
        self.loaded + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_shape() {
        assert_eq!(AssetId::JumpscareScream.path(), "/jumpscare-scream.mp3");
        let images: Vec<_> = AssetId::ALL
            .into_iter()
            .filter(|a| a.kind() == AssetKind::Image)
            .collect();
        assert_eq!(images, vec![AssetId::JumpscareImage]);
        for (i, id) in AssetId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn test_percent_is_monotonic_and_reaches_100() {
        let mut progress = LoadProgress::new();
        assert_eq!(progress.percent(), 0);

        let mut last = 0;
        for (i, id) in AssetId::ALL.into_iter().enumerate() {
            let load = if i % 2 == 0 {
                AssetLoad::loaded(id)
            } else {
                AssetLoad::failed(id, "decode error")
            };
            assert!(progress.record(&load));
            let pct = progress.percent();
            assert!(pct >= last);
            last = pct;
        }

        assert_eq!(progress.percent(), 100);
        assert!(progress.is_complete());
        assert_eq!(progress.failed(), 2);
    }

    #[test]
    fn test_duplicate_settlement_ignored() {
        let mut progress = LoadProgress::new();
        assert!(progress.record(&AssetLoad::loaded(AssetId::Rain)));
        assert!(!progress.record(&AssetLoad::failed(AssetId::Rain, "late")));
        assert_eq!(progress.completed(), 1);
        assert_eq!(progress.failed(), 0);
        assert_eq!(progress.percent(), 20);
    }

    #[test]
    fn test_expire_pending() {
        let mut progress = LoadProgress::new();
        progress.record(&AssetLoad::loaded(AssetId::Explosion));
        assert_eq!(progress.expire_pending(8000), 4);
        assert!(progress.is_complete());
        assert_eq!(progress.percent(), 100);

        let first = progress.errors().next().cloned();
        assert_eq!(
            first,
            Some(LoadError::TimedOut {
                path: "/rain.mp3".to_string(),
                timeout_ms: 8000
            })
        );
        assert_eq!(progress.expire_pending(8000), 0);
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError::Media {
            path: "/rain.mp3".to_string(),
            reason: "404".to_string(),
        };
        assert_eq!(err.to_string(), "/rain.mp3 failed to load: 404");
    }

    #[test]
    fn test_report_from_results() {
        let results = vec![
            Ok(()),
            Err(LoadError::Media {
                path: "/x".into(),
                reason: "y".into(),
            }),
            Ok(()),
        ];
        let report = LoadReport::from_results(&results);
        assert_eq!(report, LoadReport { loaded: 2, failed: 1 });
        assert_eq!(report.total(), 3);
    }
}
