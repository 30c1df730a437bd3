// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `dissent_node`: a composition root that wires a [`Session`] and, when
//! this node also leads the group, a [`SessionLeader`] together and runs
//! them to completion, grounded on
//! `examples/fakelionel-safe_network/src/bin/sn_node.rs`'s shape (a
//! dedicated OS thread running a `tokio` runtime, `color_eyre`-wrapped
//! errors, `tracing`/`tracing-appender` log setup driven by the parsed
//! config).
//!
//! Real transport and real peer-to-peer key exchange are Non-goals of
//! this crate (`net`/`identity::credentials` are narrow seams over
//! external collaborators), so this binary only demonstrates the
//! session/leader machinery end to end, for a single node acting as its
//! own group's leader, over the in-memory loopback `Network` used
//! elsewhere for tests. It requires the `test-utils` feature for exactly
//! that reason.

use dissent::authentication::{Authenticator, NullAuthenticator, TwoPhaseNullAuthenticator};
use dissent::config::{AuthKind, Config, LogSink};
use dissent::identity::{public_identity_of, Group, Id, PrivateIdentity, SubgroupPolicy, ID_LEN};
use dissent::net::test_util::RecordingNetwork;
use dissent::net::Network;
use dissent::session::{Session, SessionLeader, TokioScheduler};
use dissent::anonymity::round::RoundKind;
use eyre::{eyre, Result, WrapErr};
use rand::RngCore;
use std::sync::Arc;
use structopt::StructOpt;
use tracing::{info, warn};

fn main() -> Result<()> {
    color_eyre::install()?;

    let handle = std::thread::Builder::new()
        .name("dissent_node".to_string())
        .spawn(move || {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_node())
        })
        .wrap_err("failed to spawn node thread")?;

    match handle.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

async fn run_node() -> Result<()> {
    let config = Config::from_args();
    let _log_guard = init_logging(&config);

    if config.local_nodes > 1 {
        warn!(
            requested = config.local_nodes,
            "running multiple virtual nodes in one process is not supported; starting one"
        );
    }

    let local_id = local_id(&config)?;
    let local_ident = generate_identity(local_id);
    let round_kind = round_kind(&config)?;
    let authenticator = build_authenticator(&config)?;

    let roster = vec![public_identity_of(&local_ident)];
    let policy: SubgroupPolicy = config.subgroup_policy_kind()?.into();
    let group = match policy {
        SubgroupPolicy::ManagedSubgroup => {
            Group::with_managed_subgroup(roster.clone(), local_id, roster)
        }
        other => Group::new(roster, local_id, other),
    };

    let session_id = Id::from_counter(0);
    let network = Arc::new(RecordingNetwork::new());
    network.connections.connect(local_id);

    let (session_scheduler, mut session_timers) = TokioScheduler::new();
    let mut session = Session::new(
        session_id,
        group.clone(),
        local_ident_clone(&local_ident),
        round_kind,
        Box::new(network.clone()) as Box<dyn Network>,
        Box::new(session_scheduler),
    );
    session.on_round_starting(|round| info!(round_id = %round.round_id, "round started"));
    session.on_round_finished(|round| info!(round_id = %round.round_id, successful = round.successful(), "round finished"));
    session.on_data(|_round, sender, payload| {
        info!(%sender, bytes = payload.len(), "received round data")
    });

    let (leader_scheduler, mut leader_timers) = TokioScheduler::new();
    let mut leader = SessionLeader::new(
        session_id,
        group,
        local_ident,
        Box::new(network.clone()) as Box<dyn Network>,
        Box::new(leader_scheduler),
        authenticator,
    );

    info!(local_id = %local_id, "starting dissent node (self-led, single-member group)");
    session.start();
    leader.start();

    loop {
        tokio::select! {
            Some(token) = session_timers.recv() => session.handle_timer(token),
            Some(token) = leader_timers.recv() => { leader.handle_timer(token); },
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                session.stop();
                leader.stop();
                break;
            }
        }
        dispatch_loopback(&network, &mut session, &mut leader, local_id);
    }

    Ok(())
}

/// Routes messages the session and leader sent to themselves over the
/// loopback network (spec.md §6's wire protocol, collapsed onto a single
/// process since this node is both the group's sole member and its
/// leader).
fn dispatch_loopback(
    network: &Arc<RecordingNetwork>,
    session: &mut Session,
    leader: &mut SessionLeader,
    local_id: Id,
) {
    let pending = {
        let mut sent = network.sent.lock().unwrap();
        std::mem::take(&mut *sent)
    };
    for (dest, message) in pending {
        if dest != local_id {
            continue;
        }
        use dissent::messaging::WireMessage;
        match message {
            WireMessage::Register { ident, .. } => {
                match leader.handle_challenge_response(local_id, &ident, 0) {
                    Ok(admitted) => info!(member = %admitted.id, "member admitted"),
                    Err((kind, reason)) => warn!(?kind, %reason, "registration rejected"),
                }
            }
            WireMessage::Prepare { .. } => {
                if let Ok(request) =
                    dissent::session::PrepareRequest::from_wire(&message)
                {
                    let requested_round = request.round_id;
                    match session.handle_prepare(request) {
                        dissent::session::PrepareOutcome::Responded(round_id) => {
                            leader.handle_prepared(local_id, session.session_id(), round_id);
                        }
                        dissent::session::PrepareOutcome::Deferred => {
                            info!(round_id = %requested_round, "prepare deferred");
                        }
                    }
                }
            }
            WireMessage::Begin { round_id, .. } => {
                session.handle_begin(local_id, round_id);
            }
            WireMessage::Data { payload, .. } => {
                if let Err(err) = session.handle_data(local_id, session.session_id(), payload) {
                    warn!(%err, "dropped malformed data message");
                }
            }
            WireMessage::ChallengeRequest { .. } | WireMessage::ChallengeResponse { .. } => {
                // Collapsed into `Register` above for the Null-family
                // authenticators this binary supports.
            }
            WireMessage::Disconnect { .. } => {}
        }
    }
}

fn local_id(config: &Config) -> Result<Id> {
    match &config.local_id {
        Some(encoded) => {
            let bytes = base64::decode(encoded).wrap_err("--local-id is not valid base64")?;
            let array: [u8; ID_LEN] = bytes
                .try_into()
                .map_err(|_| eyre!("--local-id must decode to {} bytes", ID_LEN))?;
            Ok(Id::from_bytes(array))
        }
        None => {
            let mut bytes = [0u8; ID_LEN];
            rand::rngs::OsRng.fill_bytes(&mut bytes);
            Ok(Id::from_bytes(bytes))
        }
    }
}

fn generate_identity(id: Id) -> PrivateIdentity {
    let mut rng = rand::rngs::OsRng;
    let signing_key = ed25519_dalek::Keypair::generate(&mut rng);
    let mut dh_bytes = [0u8; 32];
    rng.fill_bytes(&mut dh_bytes);
    PrivateIdentity::new(id, signing_key, x25519_dalek::StaticSecret::from(dh_bytes), false)
}

/// `PrivateIdentity` holds non-`Clone` key material directly, so a second
/// owned copy (one for `Session`, one for `SessionLeader`) is built from
/// the same raw bytes rather than cloned.
fn local_ident_clone(ident: &PrivateIdentity) -> PrivateIdentity {
    PrivateIdentity::new(
        ident.id,
        ed25519_dalek::Keypair::from_bytes(&ident.signing_key.to_bytes())
            .expect("re-parsing a keypair's own bytes cannot fail"),
        x25519_dalek::StaticSecret::from(ident.dh_private.to_bytes()),
        ident.is_super_peer,
    )
}

fn round_kind(config: &Config) -> Result<RoundKind> {
    match config.round_type.as_str() {
        "plain" => Ok(RoundKind::Plain),
        "tolerant" => Ok(RoundKind::Tolerant {
            phase_count: 1,
            slot_count: 1,
        }),
        other => Err(eyre!("unknown --round-type: {}", other)),
    }
}

fn build_authenticator(config: &Config) -> Result<Authenticator> {
    let kind = config.auth_kind()?;
    match kind {
        AuthKind::Null => Ok(Authenticator::Null(NullAuthenticator::new())),
        AuthKind::TwoPhaseNull => Ok(Authenticator::TwoPhaseNull(TwoPhaseNullAuthenticator::new())),
        AuthKind::PreexchangedKeys | AuthKind::Lrs => Err(eyre!(
            "{:?} needs a pre-shared roster or ring loaded from --path-to-public-keys, \
             which this composition root does not wire up yet; use --auth=null or \
             --auth=two_phase_null",
            kind
        )),
    }
}

fn init_logging(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    match config.log_sink() {
        LogSink::Stdout => {
            tracing_subscriber::fmt::init();
            None
        }
        LogSink::Stderr => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            None
        }
        LogSink::File(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "dissent_node.log".to_string());
            let file_appender = tracing_appender::rolling::hourly(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_writer(non_blocking)
                .with_ansi(false)
                .init();
            Some(guard)
        }
    }
}
