use serde::{Deserialize, Serialize};

fn default_listen_addr() -> String {
    "127.0.0.1:7878".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address of the local WebSocket bridge the windows connect to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}
