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

use crate::log::core::OpiCLogRecord;

pub struct OpiCJsonFormatter;

impl OpiCJsonFormatter {
    #[allow(non_snake_case)]
    pub fn OpiFFormat(record: &OpiCLogRecord) -> String {
        record.OpiFToJson().to_string()
    }
}

/// `<unix millis> <LEVEL> <target>: <message>`
pub struct OpiCTextFormatter;

impl OpiCTextFormatter {
    #[allow(non_snake_case)]
    pub fn OpiFFormat(record: &OpiCLogRecord) -> String {
        format!(
            "{} {:<5} {}: {}",
            record.OpiFTimestampMillis(),
            record.level,
            record.target,
            record.message
        )
    }
}
