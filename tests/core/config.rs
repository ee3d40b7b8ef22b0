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

use std::fs;
use std::path::PathBuf;

use log::LevelFilter;
use opix::config::{OpiCHostConfig, OpiCHostConfigBuilder, OPI_DEFAULT_PLUGIN_DIR};
use opix::errors::OpiError;
use opix::gpu::OpiCGpuPlatform;
use opix::log::{OpiCLogConfig, OpiCLogConfigBuilder};
use serde_json::json;

#[test]
fn OpiFTDefaultsNeedNoGpu() {
    let config = OpiCHostConfig::default();
    assert_eq!(config.plugin_dir, PathBuf::from(OPI_DEFAULT_PLUGIN_DIR));
    assert_eq!(config.platform, OpiCGpuPlatform::None);
    assert_eq!(config.device, None);
    assert!(config.log.is_none());

    assert_eq!(OpiCHostConfigBuilder::default().OpiFBuild().expect("defaults"), config);
}

#[test]
fn OpiFTHostConfigFromJson() {
    let config = OpiCHostConfig::OpiFFromJson(&json!({
        "plugin_dir": "/opt/opi/plugins",
        "platform": "OpenCL",
        "device": 1,
        "log": { "default_level": "debug", "json_format": true }
    }))
    .expect("valid config");

    assert_eq!(config.plugin_dir, PathBuf::from("/opt/opi/plugins"));
    assert_eq!(config.platform, OpiCGpuPlatform::OpenCl);
    assert_eq!(config.device, Some(1));
    let log = config.log.expect("log section");
    assert_eq!(log.default_level, "debug");
    assert!(log.json_format);
    assert!(log.console_enabled);
}

#[test]
fn OpiFTPlatformNamesIgnoreCase() {
    for (name, platform) in [
        ("cuda", OpiCGpuPlatform::Cuda),
        ("CUDA", OpiCGpuPlatform::Cuda),
        ("opencl", OpiCGpuPlatform::OpenCl),
        ("cl", OpiCGpuPlatform::OpenCl),
        ("None", OpiCGpuPlatform::None),
    ] {
        let config = OpiCHostConfig::OpiFFromJson(&json!({ "platform": name })).expect("known platform");
        assert_eq!(config.platform, platform, "platform name {}", name);
    }
}

#[test]
fn OpiFTInvalidHostConfigIsRejected() {
    let err = OpiCHostConfig::OpiFFromJson(&json!({ "platform": "vulkan" })).expect_err("unknown platform");
    assert!(matches!(err, OpiError::Config { .. }));

    let err = OpiCHostConfig::OpiFFromJson(&json!({ "device": -2 })).expect_err("negative device");
    assert!(matches!(err, OpiError::Config { .. }));

    let err = OpiCHostConfig::OpiFFromJson(&json!({ "device": "first" })).expect_err("wrong type");
    assert!(matches!(err, OpiError::Serde(_)));
}

#[test]
fn OpiFTHostConfigFromFile() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("opix.json");
    fs::write(&path, r#"{ "platform": "cuda", "device": 0 }"#).expect("write");

    let config = OpiCHostConfig::OpiFFromPath(&path).expect("config file");
    assert_eq!(config.platform, OpiCGpuPlatform::Cuda);
    assert_eq!(config.device, Some(0));

    let missing = OpiCHostConfig::OpiFFromPath(&dir.path().join("absent.json")).expect_err("missing file");
    assert!(missing.to_string().contains("absent.json"));

    fs::write(&path, "{ not json").expect("write");
    assert!(OpiCHostConfig::OpiFFromPath(&path).is_err());
}

#[test]
fn OpiFTBuilderRoundsOutConfig() {
    let config = OpiCHostConfigBuilder::default()
        .OpiFPluginDir("/srv/plugins")
        .OpiFPlatform(OpiCGpuPlatform::OpenCl)
        .OpiFDevice(2)
        .OpiFLog(OpiCLogConfigBuilder {
            default_level: Some("WARN".to_string()),
            ..Default::default()
        })
        .OpiFBuild()
        .expect("builder");

    assert_eq!(config.plugin_dir, PathBuf::from("/srv/plugins"));
    assert_eq!(config.platform, OpiCGpuPlatform::OpenCl);
    assert_eq!(config.device, Some(2));
    assert_eq!(config.log.map(|log| log.default_level), Some("WARN".to_string()));
}

#[test]
fn OpiFTLogConfigIsLenient() {
    let config = OpiCLogConfigBuilder::OpiFFromJson(&json!({ "default_level": 5 }));
    assert_eq!(config, OpiCLogConfig::default());

    let config = OpiCLogConfigBuilder::OpiFFromJson(&json!({
        "file_enabled": true,
        "file_path": "logs/opix.log",
        "rotate_when": "size",
        "max_bytes": 1024
    }));
    assert!(config.file_enabled);
    assert_eq!(config.file_path.as_deref(), Some("logs/opix.log"));
    assert_eq!(config.max_bytes, Some(1024));
    assert_eq!(config.backup_count, OpiCLogConfig::default().backup_count);
}

#[test]
fn OpiFTLevelsResolvePerTarget() {
    let mut config = OpiCLogConfig::default();
    config.target_levels.insert("opix::plugin".to_string(), "debug".to_string());
    config.target_levels.insert("opix::plugin::gate".to_string(), "error".to_string());
    config.target_levels.insert("opix::gpu".to_string(), "off".to_string());

    assert_eq!(config.OpiFLevelFor("opix::host"), LevelFilter::Info);
    assert_eq!(config.OpiFLevelFor("opix::plugin::factory"), LevelFilter::Debug);
    assert_eq!(config.OpiFLevelFor("opix::plugin::gate"), LevelFilter::Error);
    assert_eq!(config.OpiFLevelFor("opix::gpu::backend"), LevelFilter::Off);
    assert_eq!(config.OpiFMaxLevel(), LevelFilter::Debug);
}

#[test]
fn OpiFTLevelNames() {
    assert_eq!(OpiCLogConfig::OpiFParseLevel("warning"), LevelFilter::Warn);
    assert_eq!(OpiCLogConfig::OpiFParseLevel(" TRACE "), LevelFilter::Trace);
    assert_eq!(OpiCLogConfig::OpiFParseLevel("none"), LevelFilter::Off);
    assert_eq!(OpiCLogConfig::OpiFParseLevel("verbose"), LevelFilter::Info);
}
