// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Logging utilities for Warren.
//!
//! This module provides centralized logging configuration and the lifecycle
//! banner printed around server startup.

pub mod lifecycle;

use log::{info, LevelFilter};
use std::sync::Once;

use crate::config::VerboseLevel;

static INIT: Once = Once::new();

/// Initialize logging with the specified level.
///
/// This function ensures logging is only initialized once; `RUST_LOG`
/// overrides the requested level.
pub fn init(level: Option<LevelFilter>) {
    INIT.call_once(|| {
        let env = env_logger::Env::default().filter_or(
            "RUST_LOG",
            level.map_or("info", |l| match l {
                LevelFilter::Trace => "trace",
                LevelFilter::Debug => "debug",
                LevelFilter::Info => "info",
                LevelFilter::Warn => "warn",
                LevelFilter::Error => "error",
                LevelFilter::Off => "off",
            }),
        );

        env_logger::Builder::from_env(env)
            .format_timestamp_millis()
            .format_target(true)
            .init();

        info!("Logging initialized at level: {}", log::max_level());
    });
}

/// The log-level filter implied by a verbose level. `VERBOSE` opens up
/// debug logging; everything else stays at info. The verbose level controls
/// banner and access-log behavior separately.
pub fn level_filter(verbose_level: VerboseLevel) -> LevelFilter {
    match verbose_level {
        VerboseLevel::Verbose => LevelFilter::Debug,
        _ => LevelFilter::Info,
    }
}
