//! Relay information document (NIP-11).

use serde::{Deserialize, Serialize};

use crate::config::GateConfig;

/// NIPs this gate takes part in: basic events, relay info, file metadata.
pub const SUPPORTED_NIPS: [u32; 3] = [1, 11, 94];

/// What the relay says about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayInfo {
    pub name: String,
    pub description: String,
    pub pubkey: String,
    pub icon: String,
    pub supported_nips: Vec<u32>,
    pub software: String,
    pub version: String,
}

impl RelayInfo {
    /// Build from the cosmetic configuration fields.
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            name: config.relay_name.clone(),
            description: config.relay_description.clone(),
            pubkey: config.relay_pubkey.trim().to_string(),
            icon: config.relay_icon_url.clone(),
            ..Self::default()
        }
    }

    /// Render as the JSON document served to clients.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for RelayInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            pubkey: String::new(),
            icon: String::new(),
            supported_nips: SUPPORTED_NIPS.to_vec(),
            software: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let info = RelayInfo::from_config(&GateConfig::default());
        assert_eq!(info.name, "my relay");
        assert_eq!(info.icon, "https://example.com/icon.jpg");
        assert_eq!(info.supported_nips, vec![1, 11, 94]);

        let json: serde_json::Value = serde_json::from_str(&info.to_json().unwrap()).unwrap();
        assert_eq!(json["description"], "this is my custom relay");
        assert_eq!(json["software"], "blobgate");
    }
}
