use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{net::SocketAddr, path::Path};

/// Session sizing and server address.
///
/// Loaded from defaults, then an optional JSON file, then `MEMSIM_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub total_size: usize,
    pub frames: usize,
    pub addr: SocketAddr,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            total_size: 1024,
            frames: 4,
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl SimConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. `lookup` is `std::env::var`
    /// in the binary; tests pass a map.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("MEMSIM_TOTAL_SIZE") {
            self.total_size = v.parse().context("MEMSIM_TOTAL_SIZE is not a number")?;
        }
        if let Some(v) = lookup("MEMSIM_FRAMES") {
            self.frames = v.parse().context("MEMSIM_FRAMES is not a number")?;
        }
        if let Some(v) = lookup("MEMSIM_ADDR") {
            self.addr = v.parse().context("MEMSIM_ADDR is not a socket address")?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Defaults, then `path` (or `MEMSIM_CONFIG`), then environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let from_env = std::env::var("MEMSIM_CONFIG").ok();
        let base = match path.map(str::to_string).or(from_env) {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_size == 0 {
            bail!("total_size must be positive");
        }
        if self.frames == 0 {
            bail!("frames must be positive");
        }
        Ok(())
    }
}
