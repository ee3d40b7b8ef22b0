//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Opix.
//! The Opix project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{Level, Log, Metadata, Record};
use serde_json::{json, Value};

use crate::log::config::OpiCLogConfig;
use crate::log::handlers::{OpiCFileHandler, OpiCLogHandler, OpiCStdoutHandler};

#[derive(Clone, Debug)]
pub struct OpiCLogRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub module_path: Option<String>,
    pub timestamp: SystemTime,
}

impl OpiCLogRecord {
    #[allow(non_snake_case)]
    pub fn OpiFFromLog(record: &Record<'_>) -> Self {
        OpiCLogRecord {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            module_path: record.module_path().map(str::to_string),
            timestamp: SystemTime::now(),
        }
    }

    #[allow(non_snake_case)]
    pub fn OpiFTimestampMillis(&self) -> u128 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
    }

    /// Splits the `area.event: message` convention into separate fields
    /// when the message follows it.
    #[allow(non_snake_case)]
    pub fn OpiFToJson(&self) -> Value {
        let (event, message) = match self.message.split_once(": ") {
            Some((event, rest)) if !event.contains(' ') && event.contains('.') => (Some(event), rest),
            _ => (None, self.message.as_str()),
        };

        json!({
            "level": self.level.as_str(),
            "target": self.target,
            "event": event,
            "message": message,
            "module": self.module_path,
            "timestamp_ms": self.OpiFTimestampMillis() as u64,
        })
    }
}

/// `log::Log` backend writing to the configured handlers.
pub struct OpiCLogger {
    config: OpiCLogConfig,
    handlers: Vec<Box<dyn OpiCLogHandler + Send + Sync>>,
}

impl OpiCLogger {
    #[allow(non_snake_case)]
    pub fn OpiFNew(config: OpiCLogConfig) -> Self {
        let mut handlers: Vec<Box<dyn OpiCLogHandler + Send + Sync>> = Vec::new();
        if config.console_enabled {
            handlers.push(Box::new(OpiCStdoutHandler::OpiFNew(config.json_format)));
        }
        if config.file_enabled {
            if let Some(path) = &config.file_path {
                handlers.push(Box::new(OpiCFileHandler::OpiFNew(
                    path.clone(),
                    config.json_format,
                    config.rotate_when.clone(),
                    config.max_bytes,
                    config.backup_count,
                )));
            }
        }
        OpiCLogger { config, handlers }
    }

    #[allow(non_snake_case)]
    pub fn OpiFConfig(&self) -> &OpiCLogConfig {
        &self.config
    }
}

impl Log for OpiCLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.config.OpiFShouldLog(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let record = OpiCLogRecord::OpiFFromLog(record);
        for handler in &self.handlers {
            handler.handle(&record);
        }
    }

    fn flush(&self) {
        for handler in &self.handlers {
            handler.flush();
        }
    }
}

static LOGGER: OnceLock<OpiCLogger> = OnceLock::new();

/// Installs the Opix logger as the process-wide `log` backend.
///
/// Safe to call more than once; the first call wins. Returns `false` when
/// a logger, this one or another, was already installed.
#[allow(non_snake_case)]
pub fn OpiFInitLogging(config: &OpiCLogConfig) -> bool {
    if LOGGER.get().is_some() {
        return false;
    }
    let logger = LOGGER.get_or_init(|| OpiCLogger::OpiFNew(config.clone()));
    match log::set_logger(logger) {
        Ok(()) => {
            log::set_max_level(logger.OpiFConfig().OpiFMaxLevel());
            true
        }
        Err(_) => false,
    }
}
