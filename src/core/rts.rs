//! Return-to-sport readiness score after knee ligament reconstruction.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::generation::GenerationError;
use crate::core::generation::types::next_result_id;
use crate::core::memory::PersistenceStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtsMetrics {
    #[serde(default)]
    pub patient_name: String,
    /// Quadriceps limb symmetry index, percent.
    pub limb_symmetry: f64,
    /// 0 (none) to 10.
    pub pain_score: f64,
    /// Extension deficit, degrees.
    pub rom_extension: f64,
    pub rom_flexion: f64,
    /// Hop test symmetry, percent.
    pub hop_test: f64,
    /// ACL-RSI score, percent.
    pub psychological_readiness: f64,
}

impl Default for RtsMetrics {
    fn default() -> Self {
        Self {
            patient_name: String::new(),
            limb_symmetry: 85.0,
            pain_score: 2.0,
            rom_extension: 0.0,
            rom_flexion: 135.0,
            hop_test: 80.0,
            psychological_readiness: 70.0,
        }
    }
}

impl RtsMetrics {
    pub fn pain_factor(&self) -> f64 {
        (10.0 - self.pain_score).max(0.0) * 10.0
    }

    pub fn rom_factor(&self) -> f64 {
        if self.rom_flexion >= 130.0 && self.rom_extension <= 5.0 {
            100.0
        } else {
            50.0
        }
    }

    pub fn score(&self) -> u32 {
        let raw = self.limb_symmetry * 0.3
            + self.hop_test * 0.3
            + self.psychological_readiness * 0.2
            + self.pain_factor() * 0.1
            + self.rom_factor() * 0.1;
        raw.round().max(0.0) as u32
    }

    pub fn status(&self) -> RtsStatus {
        RtsStatus::from_score(self.score())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtsStatus {
    Cleared,
    Training,
    NotCleared,
}

impl RtsStatus {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => RtsStatus::Cleared,
            75..=89 => RtsStatus::Training,
            _ => RtsStatus::NotCleared,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RtsStatus::Cleared => "Cleared",
            RtsStatus::Training => "Sport-specific training",
            RtsStatus::NotCleared => "Not cleared",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtsHistoryEntry {
    pub id: String,
    pub date: String,
    pub patient_name: String,
    pub score: u32,
    pub metrics: RtsMetrics,
}

/// Saved assessments, newest first, under their own key.
#[derive(Clone)]
pub struct RtsHistory {
    store: PersistenceStore,
}

impl RtsHistory {
    pub fn new(store: PersistenceStore) -> Self {
        Self { store }
    }

    pub async fn entries(&self) -> Vec<RtsHistoryEntry> {
        self.store.load_rts_history().await
    }

    pub async fn save(&self, metrics: &RtsMetrics) -> Result<RtsHistoryEntry, GenerationError> {
        let patient_name = metrics.patient_name.trim();
        if patient_name.is_empty() {
            return Err(GenerationError::Validation(
                "Enter the patient's name to save the assessment.".to_string(),
            ));
        }
        let entry = RtsHistoryEntry {
            id: next_result_id().to_string(),
            date: Utc::now().to_rfc3339(),
            patient_name: patient_name.to_string(),
            score: metrics.score(),
            metrics: metrics.clone(),
        };
        let mut entries = self.entries().await;
        entries.insert(0, entry.clone());
        self.store.save_rts_history(&entries).await;
        info!("Saved RTS assessment {} (score {})", entry.id, entry.score);
        Ok(entry)
    }
}
