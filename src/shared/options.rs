//! Laufzeit-Konfiguration der Kreuzungs-Engine.
//!
//! `EngineOptions` enthält alle global wirkenden Einstellungen. Die
//! `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

/// Folgen neu angelegte Kreuzungen standardmäßig dem Gelände statt der
/// eingeebneten Knotenhöhe?
pub const NODE_IS_SLOPED_BY_DEFAULT: bool = false;

/// Alle zur Laufzeit änderbaren Engine-Optionen.
/// Wird als `junction_shaper.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Vorgabe für das Gefälle-Verhalten neuer Kreuzungen; einzelne
    /// Kreuzungen können davon abweichen.
    #[serde(default)]
    pub node_is_sloped_by_default: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            node_is_sloped_by_default: NODE_IS_SLOPED_BY_DEFAULT,
        }
    }
}

impl EngineOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(options) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    options
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("junction_shaper"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("junction_shaper.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optionen_toml_roundtrip() {
        let options = EngineOptions {
            node_is_sloped_by_default: true,
        };
        let toml = toml::to_string_pretty(&options).expect("Serialisierung fehlgeschlagen");
        let back: EngineOptions = toml::from_str(&toml).expect("Deserialisierung fehlgeschlagen");
        assert!(back.node_is_sloped_by_default);
    }

    #[test]
    fn test_leere_datei_liefert_standardwerte() {
        let back: EngineOptions = toml::from_str("").expect("Leere Datei muss parsbar sein");
        assert!(!back.node_is_sloped_by_default);
    }
}
