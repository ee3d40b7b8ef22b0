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

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::log::core::OpiCLogRecord;
use crate::log::formatters::{OpiCJsonFormatter, OpiCTextFormatter};

pub trait OpiCLogHandler {
    fn handle(&self, record: &OpiCLogRecord);

    fn flush(&self) {}
}

fn format_line(record: &OpiCLogRecord, json: bool) -> String {
    if json {
        OpiCJsonFormatter::OpiFFormat(record)
    } else {
        OpiCTextFormatter::OpiFFormat(record)
    }
}

pub struct OpiCStdoutHandler {
    json: bool,
}

impl OpiCStdoutHandler {
    #[allow(non_snake_case)]
    pub fn OpiFNew(json: bool) -> Self {
        OpiCStdoutHandler { json }
    }
}

impl OpiCLogHandler for OpiCStdoutHandler {
    fn handle(&self, record: &OpiCLogRecord) {
        println!("{}", format_line(record, self.json));
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

/// Appends to a file, optionally rotating it by size
/// (`opi.log` -> `opi.log.1` -> ... -> `opi.log.<backup_count>`).
pub struct OpiCFileHandler {
    path: PathBuf,
    json: bool,
    rotate_when: Option<String>,
    max_bytes: Option<u64>,
    backup_count: Option<u32>,
    file: Mutex<()>,
}

impl OpiCFileHandler {
    #[allow(non_snake_case)]
    pub fn OpiFNew(
        path: impl Into<PathBuf>,
        json: bool,
        rotate_when: Option<String>,
        max_bytes: Option<u64>,
        backup_count: Option<u32>,
    ) -> Self {
        OpiCFileHandler {
            path: path.into(),
            json,
            rotate_when,
            max_bytes,
            backup_count,
            file: Mutex::new(()),
        }
    }

    fn backup_path(&self, index: u32) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate_if_needed(&self) {
        if self.rotate_when.as_deref() != Some("size") {
            return;
        }
        let max_bytes = match self.max_bytes {
            Some(v) => v,
            None => return,
        };
        let backup_count = self.backup_count.unwrap_or(7);
        match fs::metadata(Path::new(&self.path)) {
            Ok(meta) if meta.len() > max_bytes => {}
            _ => return,
        }

        if backup_count == 0 {
            let _ = fs::remove_file(&self.path);
            return;
        }
        for idx in (1..=backup_count).rev() {
            let from = if idx == 1 {
                self.path.clone()
            } else {
                self.backup_path(idx - 1)
            };
            if from.exists() {
                let _ = fs::rename(&from, self.backup_path(idx));
            }
        }
    }
}

impl OpiCLogHandler for OpiCFileHandler {
    fn handle(&self, record: &OpiCLogRecord) {
        let _guard = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.rotate_if_needed();

        let line = format_line(record, self.json);
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{}", line);
        }
    }
}
