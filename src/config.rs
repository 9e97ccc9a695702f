//! Simulation-wide configuration: cache geometry and bus latencies.
//!
//! Defaults reproduce the fixed constants of the data model (`ASSOC=8`,
//! `NSETS=128`, 32 B lines, `MEM_LATENCY=100`, `SNOOP_HIT_LATENCY=1`).
//! An optional TOML file may override them, and CLI flags take
//! precedence over the file.

use std::path::Path;

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::ConfigError;

/// Cache geometry and bus timing parameters for one simulation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    pub assoc: usize,
    pub nsets: usize,
    pub line_size: usize,
    pub mem_latency: u64,
    pub snoop_hit_latency: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            assoc: 8,
            nsets: 128,
            line_size: 32,
            mem_latency: 100,
            snoop_hit_latency: 1,
        }
    }
}

impl SimConfig {
    /// Number of low-order bits consumed by the line offset.
    pub fn offset_bits(&self) -> u32 {
        self.line_size.trailing_zeros()
    }

    /// Number of bits consumed by the set index.
    pub fn index_bits(&self) -> u32 {
        self.nsets.trailing_zeros()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.assoc.is_power_of_two() || !self.nsets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                assoc: self.assoc,
                nsets: self.nsets,
            });
        }
        if !self.line_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                assoc: self.line_size,
                nsets: self.nsets,
            });
        }
        Ok(())
    }

    /// Build the effective configuration for a run: defaults, layered
    /// with an optional TOML file, layered with CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut cfg = SimConfig::default();

        if let Some(path) = &cli.config {
            cfg.apply_file(path)?;
        }

        if let Some(v) = cli.assoc {
            cfg.assoc = v;
        }
        if let Some(v) = cli.nsets {
            cfg.nsets = v;
        }
        if let Some(v) = cli.mem_latency {
            cfg.mem_latency = v;
        }
        if let Some(v) = cli.snoop_hit_latency {
            cfg.snoop_hit_latency = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(v) = file.assoc {
            self.assoc = v;
        }
        if let Some(v) = file.nsets {
            self.nsets = v;
        }
        if let Some(v) = file.line_size {
            self.line_size = v;
        }
        if let Some(v) = file.mem_latency {
            self.mem_latency = v;
        }
        if let Some(v) = file.snoop_hit_latency {
            self.snoop_hit_latency = v;
        }

        Ok(())
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "snake_case")]
struct ConfigFile {
    assoc: Option<usize>,
    nsets: Option<usize>,
    line_size: Option<usize>,
    mem_latency: Option<u64>,
    snoop_hit_latency: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_constants() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.assoc, 8);
        assert_eq!(cfg.nsets, 128);
        assert_eq!(cfg.line_size, 32);
        assert_eq!(cfg.mem_latency, 100);
        assert_eq!(cfg.snoop_hit_latency, 1);
        assert_eq!(cfg.offset_bits(), 5);
        assert_eq!(cfg.index_bits(), 7);
    }

    #[test]
    fn rejects_non_power_of_two() {
        let mut cfg = SimConfig::default();
        cfg.nsets = 100;
        assert!(cfg.validate().is_err());
    }
}
