// file: src/config/loader.rs
// version: 1.0.0
// guid: 83783695-3152-4b84-9260-f385caa65f9e

//! Configuration file loading and environment variable substitution

use super::ClusterConfig;
use crate::error::InstallError;
use crate::Result;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader seeded from the process environment
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Load cluster configuration from a YAML file
    pub fn load_cluster_config<P: AsRef<Path>>(&self, path: P) -> Result<ClusterConfig> {
        let content = fs::read_to_string(&path).map_err(|e| {
            InstallError::config(format!(
                "Failed to read cluster config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        debug!("Loaded cluster config from {}", path.as_ref().display());

        self.parse_cluster_config(&content)
    }

    /// Parse cluster configuration from YAML text
    pub fn parse_cluster_config(&self, content: &str) -> Result<ClusterConfig> {
        let expanded = self.expand_env_vars(content)?;
        let mut config: ClusterConfig = serde_yaml::from_str(&expanded)?;

        if let Some(key) = config.ssh.private_key.take() {
            let expanded = shellexpand::tilde(&key).into_owned();
            config.ssh.private_key = Some(expanded);
        }

        config.validate()?;

        Ok(config)
    }

    /// Expand `${VAR}` references in configuration content
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| InstallError::config(format!("Invalid regex pattern: {}", e)))?;

        let mut missing_vars: Vec<String> = Vec::new();
        let result = re.replace_all(content, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match self.env_vars.get(var_name) {
                Some(value) => value.clone(),
                None => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });

        if !missing_vars.is_empty() {
            return Err(InstallError::config(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(result.into_owned())
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
