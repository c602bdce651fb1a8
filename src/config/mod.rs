use crate::layout::{LayoutTable, Point};
use crate::stream::StreamConfig;
use serde::Deserialize;
use std::collections::HashMap;

/// Complete Egress configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EgressConfig {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub api: ApiConfig,

    /// Fallback exit capacities, used until upstream supplies `exit_capacity`
    #[serde(default = "default_exit_capacity")]
    pub exits: HashMap<String, u32>,

    /// Node positions overriding the built-in floor plan
    #[serde(default)]
    pub layout: HashMap<String, Point>,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_exit_capacity() -> HashMap<String, u32> {
    [("Entrance", 10), ("Balcony1", 15), ("Balcony2", 8)]
        .into_iter()
        .map(|(name, capacity)| (name.to_string(), capacity))
        .collect()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for EgressConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            api: ApiConfig::default(),
            exits: default_exit_capacity(),
            layout: HashMap::new(),
        }
    }
}

impl EgressConfig {
    /// Layout table from config, falling back to the built-in floor plan
    /// when no `[layout]` section is given
    pub fn layout_table(&self) -> LayoutTable {
        if self.layout.is_empty() {
            LayoutTable::default()
        } else {
            LayoutTable::new(self.layout.clone())
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<EgressConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: EgressConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EgressConfig::default();
        assert_eq!(config.stream.subject, "egress.updates");
        assert_eq!(config.api.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.exits["Entrance"], 10);
        assert_eq!(config.exits["Balcony1"], 15);
        assert_eq!(config.exits["Balcony2"], 8);
        assert!(config.layout.is_empty());
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [stream]
            url = "nats://example.com:4222"
            subject = "building7.updates"

            [api]
            bind_addr = "127.0.0.1:9090"

            [exits]
            MainDoor = 20

            [layout]
            MainDoor = { x = 10.0, y = 20.0 }
        "#;

        let config: EgressConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.stream.url, "nats://example.com:4222");
        assert_eq!(config.stream.subject, "building7.updates");
        assert_eq!(config.api.bind_addr, "127.0.0.1:9090");
        assert_eq!(config.exits["MainDoor"], 20);
        assert_eq!(config.layout["MainDoor"], Point { x: 10.0, y: 20.0 });
    }

    #[test]
    fn test_partial_config() {
        // Missing sections use defaults
        let toml = r#"
            [api]
            bind_addr = "0.0.0.0:3000"
        "#;

        let config: EgressConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.stream.subject, "egress.updates"); // Default
        assert_eq!(config.exits["Entrance"], 10); // Default
    }

    #[test]
    fn test_layout_table_falls_back_to_floor_plan() {
        let config = EgressConfig::default();
        let table = config.layout_table();
        assert!(table.contains("Kitchen"));
    }

    #[test]
    fn test_layout_table_from_config_overrides_plan() {
        let toml = r#"
            [layout]
            Lab = { x = 1.0, y = 2.0 }
        "#;
        let config: EgressConfig = toml::from_str(toml).unwrap();

        let table = config.layout_table();
        assert!(table.contains("Lab"));
        assert!(!table.contains("Kitchen"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[stream]\nsubject = \"annex.updates\"\n\n[exits]\nEntrance = 4"
        )
        .unwrap();

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.stream.subject, "annex.updates");
        assert_eq!(config.exits["Entrance"], 4);
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        assert!(load_config("/nonexistent/egress.toml").is_err());
    }
}
