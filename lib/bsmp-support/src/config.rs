use serde::{Deserialize, Serialize};
use sloggers::types::Severity;
use std::path::Path;

/// Transport endpoint the demo runner listens on and the CLI tool connects to.
#[derive(Serialize, Deserialize)]
pub struct Transport {
    pub address: String,
}

#[derive(Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
}

#[derive(Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub transport: Transport,
    pub logging: Logging,
}

impl Default for InstrumentConfig {
    fn default() -> InstrumentConfig {
        InstrumentConfig {
            transport: Transport {
                address: "127.0.0.1:5025".into(),
            },
            logging: Logging {
                level: "info".into(),
            },
        }
    }
}

impl InstrumentConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> InstrumentConfig {
        serdeconv::from_toml_file(path).expect("error loading instrument configuration file")
    }

    pub fn severity(&self) -> Severity {
        match self.logging.level.as_str() {
            "trace" => Severity::Trace,
            "debug" => Severity::Debug,
            "warning" | "warn" => Severity::Warning,
            "error" => Severity::Error,
            "critical" => Severity::Critical,
            _ => Severity::Info,
        }
    }
}
