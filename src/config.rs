// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! Node configuration (spec.md §6). A `structopt`-derived CLI, the same
//! crate the teacher uses for its own `Config` in
//! `examples/fakelionel-safe_network/src/bin/sn_node.rs`.

use std::path::PathBuf;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Authentication scheme (spec.md §6 `auth`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AuthKind {
    Null,
    Lrs,
    PreexchangedKeys,
    TwoPhaseNull,
}

/// `subgroup_policy` (spec.md §6), named to match `identity::SubgroupPolicy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SubgroupPolicyKind {
    CompleteGroup,
    FixedSubgroup,
    ManagedSubgroup,
    DisabledGroup,
}

impl From<SubgroupPolicyKind> for crate::identity::SubgroupPolicy {
    fn from(kind: SubgroupPolicyKind) -> Self {
        use crate::identity::SubgroupPolicy as SP;
        match kind {
            SubgroupPolicyKind::CompleteGroup => SP::CompleteGroup,
            SubgroupPolicyKind::FixedSubgroup => SP::FixedSubgroup,
            SubgroupPolicyKind::ManagedSubgroup => SP::ManagedSubgroup,
            SubgroupPolicyKind::DisabledGroup => SP::DisabledGroup,
        }
    }
}

/// Log sink selection (spec.md §6 `log`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogSink {
    Stdout,
    Stderr,
    File(PathBuf),
}

impl FromStr for LogSink {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | "stdout" => LogSink::Stdout,
            "stderr" => LogSink::Stderr,
            path => LogSink::File(PathBuf::from(path)),
        })
    }
}

/// Node configuration, covering every key enumerated in spec.md §6.
#[derive(Debug, structopt::StructOpt)]
#[structopt(name = "dissent-node")]
pub struct Config {
    /// Bootstrap addresses.
    #[structopt(long)]
    pub remote_endpoints: Vec<String>,

    /// Listener addresses.
    #[structopt(long)]
    pub local_endpoints: Vec<String>,

    /// Number of virtual nodes to run in this process.
    #[structopt(long, default_value = "1")]
    pub local_nodes: usize,

    /// Authentication scheme.
    #[structopt(long, default_value = "null")]
    pub auth: String,

    /// Anonymity round implementation to use.
    #[structopt(long)]
    pub round_type: String,

    /// Log sink: "stderr", "stdout", "" (stdout), or a file path.
    #[structopt(long, default_value = "")]
    pub log: String,

    /// Base64-encoded local node id.
    #[structopt(long)]
    pub local_id: Option<String>,

    /// Base64-encoded server ids.
    #[structopt(long)]
    pub server_ids: Vec<String>,

    /// Path to the directory holding private key material.
    #[structopt(long)]
    pub path_to_private_keys: Option<PathBuf>,

    /// Path to the directory holding public key material.
    #[structopt(long)]
    pub path_to_public_keys: Option<PathBuf>,

    /// Subgroup policy name.
    #[structopt(long, default_value = "complete_group")]
    pub subgroup_policy: String,

    /// Whether the leader quarantines recently-disconnected members
    /// before allowing re-registration (spec.md §7, "Log-off quarantine";
    /// `EnableLogOffMonitor` in the original).
    #[structopt(long)]
    pub disable_log_off_monitor: bool,
}

impl Config {
    pub fn auth_kind(&self) -> crate::error::Result<AuthKind> {
        AuthKind::from_str(&self.auth)
            .map_err(|_| crate::error::Error::Config(format!("unknown auth scheme: {}", self.auth)))
    }

    pub fn subgroup_policy_kind(&self) -> crate::error::Result<SubgroupPolicyKind> {
        SubgroupPolicyKind::from_str(&self.subgroup_policy).map_err(|_| {
            crate::error::Error::Config(format!(
                "unknown subgroup policy: {}",
                self.subgroup_policy
            ))
        })
    }

    pub fn log_sink(&self) -> LogSink {
        LogSink::from_str(&self.log).expect("LogSink::from_str is infallible")
    }
}
