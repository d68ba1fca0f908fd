// src/config.rs
// Loads pkgverify configuration from /etc and user config; provides defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the pinned signify public key file.
    pub pubkey_path: PathBuf,
    /// Pinned public key given inline as base64, taking priority over the
    /// key file when set.
    pub pubkey_b64: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            pubkey_path: PathBuf::from("/etc/pkgverify/release.pub"),
            pubkey_b64: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let mut cfg = AppConfig::default();

        // 1) Load system config: /etc/pkgverify/config.cfg
        let sys_cfg = Path::new("/etc/pkgverify/config.cfg");
        if sys_cfg.exists() {
            if let Err(e) = Self::apply_cfg_file(&mut cfg, sys_cfg) {
                eprintln!("Warning: failed to load {}: {}", sys_cfg.display(), e);
            }
        }

        // 2) Load user config: $XDG_CONFIG_HOME/pkgverify/config.cfg or
        //    ~/.config/pkgverify/config.cfg
        let user_cfg = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("~/.config").expand_home());
        let user_cfg_path = user_cfg.join("pkgverify/config.cfg");
        if user_cfg_path.exists() {
            if let Err(e) = Self::apply_cfg_file(&mut cfg, &user_cfg_path) {
                eprintln!("Warning: failed to load {}: {}", user_cfg_path.display(), e);
            }
        }

        // 3) Environment overrides (highest priority)
        if let Ok(v) = env::var("PKGVERIFY_PUBKEY_PATH") {
            cfg.pubkey_path = PathBuf::from(v).expand_home();
        }
        if let Ok(v) = env::var("PKGVERIFY_PUBKEY_B64") {
            cfg.pubkey_b64 = Some(v);
        }

        cfg
    }

    fn apply_cfg_file(cfg: &mut AppConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Self::apply_cfg(cfg, &content);
        Ok(())
    }

    fn apply_cfg(cfg: &mut AppConfig, content: &str) {
        let mut section = String::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                section = line[1..line.len() - 1].trim().to_lowercase();
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();
                if section.as_str() == "security" {
                    if key == "pubkey_path" {
                        cfg.pubkey_path = PathBuf::from(value).expand_home();
                    } else if key == "pubkey_b64" {
                        cfg.pubkey_b64 = Some(value.to_string());
                    }
                }
            }
        }
    }
}

// Small helper to expand leading ~ in paths
trait ExpandHome {
    fn expand_home(self) -> PathBuf;
}

impl ExpandHome for PathBuf {
    fn expand_home(self) -> PathBuf {
        let s = self.to_string_lossy().to_string();
        if let Some(rest) = s.strip_prefix("~/") {
            if let Some(home) = dirs_next::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(s)
    }
}
