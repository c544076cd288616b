//! Host-side copies of a working patch, stored as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::registers::RegisterCache;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSnapshot {
    /// Slot the patch was taken from. Informational only.
    pub slot: u8,
    pub name: String,
    pub registers: RegisterCache,
}

impl PatchSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!("saved snapshot of {:?} to {}", self.name, path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;

    fn snapshot() -> PatchSnapshot {
        let mut registers = RegisterCache::new();
        registers.set(0, 1).unwrap();
        registers.set(511, 0xFE).unwrap();
        PatchSnapshot {
            slot: 17,
            name: "Tubular Bells".to_owned(),
            registers,
        }
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "xfm2ctl-snapshot-{}.json",
            std::process::id()
        ));

        let saved = snapshot();
        saved.save(&path).unwrap();
        let loaded = PatchSnapshot::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.name, "Tubular Bells");
        assert_eq!(loaded.registers.image(), saved.registers.image());
    }

    #[test]
    fn truncated_register_image_is_rejected() {
        let text = r#"{ "slot": 0, "name": "x", "registers": { "registers": [1, 2, 3] } }"#;
        assert!(matches!(
            PatchSnapshot::from_json(text),
            Err(Error::Config(_))
        ));
    }
}
