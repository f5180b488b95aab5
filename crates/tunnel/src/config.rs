// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::time::Duration;

/// Tunable timings for a tunnel. Always supplied by the embedder through
/// the constructor; never read from the environment or a config file.
#[derive(Debug, Clone, Copy)]
pub struct TunnelConfig {
    /// Close the tunnel with `UPSTREAM_TIMEOUT` if nothing is received for
    /// this long.
    pub receive_timeout: Duration,
    /// Interval between keep-alive `sync` sends issued by the owning client.
    pub keep_alive_interval: Duration,
    /// Fallback polling interval for the HTTP long-poll transport, disabled
    /// after two progress events land on a single in-flight request.
    pub polling_fallback_interval: Duration,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            receive_timeout: Duration::from_millis(15_000),
            keep_alive_interval: Duration::from_millis(5_000),
            polling_fallback_interval: Duration::from_millis(30),
        }
    }
}
