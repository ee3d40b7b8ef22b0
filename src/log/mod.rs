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

//! # Logging
//!
//! Opix logs through the `log` facade. Messages follow the
//! `opi.<area>.<event>: <message> - key=value` shape so they can be
//! grepped and, with JSON output, split into an event name and a message.
//!
//! [`OpiFInitLogging`] installs [`OpiCLogger`], a backend with console
//! and file handlers. Applications that already use another `log` backend
//! simply skip it.

pub mod config;
pub mod core;
pub mod formatters;
pub mod handlers;

pub use self::config::{OpiCLogConfig, OpiCLogConfigBuilder};
pub use self::core::{OpiCLogRecord, OpiCLogger, OpiFInitLogging};
pub use self::formatters::{OpiCJsonFormatter, OpiCTextFormatter};
pub use self::handlers::{OpiCFileHandler, OpiCLogHandler, OpiCStdoutHandler};
