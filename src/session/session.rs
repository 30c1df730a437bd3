// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! `Session`: the member side of the join -> round -> send cycle
//! (spec.md §4.1), grounded on
//! `examples/original_source/src/Anonymity/Sessions/Session.hpp`+`.cpp`.
//! The original's `QObject` signals become explicit callback slots
//! (spec.md §9 Design Note); its `Round`/`GroupHolder`/`Network` member
//! pointers become owned values and trait objects.

use super::group_holder::GroupHolder;
use super::scheduler::{Scheduler, TimerToken};
use super::MINIMUM_ROUND_SIZE;
use crate::anonymity::round::{Round, RoundKind, StopReason};
use crate::error::{Error, Result};
use crate::identity::group::Group;
use crate::identity::{public_identity_of, Id, PrivateIdentity, SubgroupPolicy};
use crate::messaging::{ErrorKind, WireMessage, WireResult};
use crate::net::{ConnectionTable, Network};
use std::time::Duration;

const REGISTER_RETRY_OTHER: Duration = Duration::from_secs(60);
const REGISTER_RETRY_DEFAULT: Duration = Duration::from_secs(5);

/// `SM::Prepare`, decoded into its typed fields (spec.md §6). `group`,
/// if present, is already deserialized.
#[derive(Clone)]
pub struct PrepareRequest {
    pub session_id: Id,
    pub round_id: Id,
    pub interrupt: bool,
    pub group: Option<Group>,
}

impl PrepareRequest {
    pub fn from_wire(message: &WireMessage) -> Result<Self> {
        match message {
            WireMessage::Prepare {
                session_id,
                round_id,
                interrupt,
                group,
            } => {
                let group = group
                    .as_ref()
                    .map(|bytes| Group::from_bytes(bytes))
                    .transpose()
                    .map_err(|e| Error::Serialisation(e.to_string()))?;
                Ok(PrepareRequest {
                    session_id: *session_id,
                    round_id: *round_id,
                    interrupt: *interrupt,
                    group,
                })
            }
            _ => Err(Error::Serialisation("not a Prepare message".to_string())),
        }
    }
}

/// The result of [`Session::handle_prepare`]: whether (and with what
/// round id) the caller should send back `SM::Prepared`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrepareOutcome {
    Responded(Id),
    Deferred,
}

/// spec.md §4.1's prepare state machine states.
enum PrepareState {
    Idle,
    PrepareDeferred(PrepareRequest),
    RoundCreated(Id),
}

/// The member side of a session (spec.md §4.1). Owns the send queue, the
/// current round (if any), and the prepare state machine; delegates
/// transport and timers to [`Network`]/[`Scheduler`] so it stays
/// testable without either.
pub struct Session {
    session_id: Id,
    group_holder: GroupHolder,
    local_ident: PrivateIdentity,
    round_kind: RoundKind,
    network: Box<dyn Network>,
    scheduler: Box<dyn Scheduler>,

    current_round: Option<Round>,
    prepare_state: PrepareState,
    send_queue: Vec<Vec<u8>>,
    trim_count: usize,
    registering: bool,
    register_retry_timer: Option<TimerToken>,
    stopped: bool,

    on_round_starting: Option<Box<dyn FnMut(&Round)>>,
    on_round_finished: Option<Box<dyn FnMut(&Round)>>,
    on_stopping: Option<Box<dyn FnMut()>>,
    on_data: Option<Box<dyn FnMut(&mut Round, Id, Vec<u8>)>>,
}

impl Session {
    pub fn new(
        session_id: Id,
        group: Group,
        local_ident: PrivateIdentity,
        round_kind: RoundKind,
        network: Box<dyn Network>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        Session {
            session_id,
            group_holder: GroupHolder::new(group),
            local_ident,
            round_kind,
            network,
            scheduler,
            current_round: None,
            prepare_state: PrepareState::Idle,
            send_queue: Vec::new(),
            trim_count: 0,
            registering: false,
            register_retry_timer: None,
            stopped: true,
            on_round_starting: None,
            on_round_finished: None,
            on_stopping: None,
            on_data: None,
        }
    }

    pub fn on_round_starting(&mut self, cb: impl FnMut(&Round) + 'static) {
        self.on_round_starting = Some(Box::new(cb));
    }

    pub fn on_round_finished(&mut self, cb: impl FnMut(&Round) + 'static) {
        self.on_round_finished = Some(Box::new(cb));
    }

    pub fn on_stopping(&mut self, cb: impl FnMut() + 'static) {
        self.on_stopping = Some(Box::new(cb));
    }

    pub fn on_data(&mut self, cb: impl FnMut(&mut Round, Id, Vec<u8>) + 'static) {
        self.on_data = Some(Box::new(cb));
    }

    pub fn session_id(&self) -> Id {
        self.session_id
    }

    pub fn local_id(&self) -> Id {
        self.local_ident.id
    }

    pub fn group(&self) -> Group {
        self.group_holder.group()
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.current_round.as_ref()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Begins registration with the leader if eligible (spec.md §4.1).
    pub fn start(&mut self) {
        self.stopped = false;
        self.maybe_register();
    }

    /// Stops any active round with reason "Session stopped", unregisters
    /// interest and fires `Stopping` (spec.md §4.1).
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.stop_round(StopReason::SessionStopped, false);
        if let Some(token) = self.register_retry_timer.take() {
            self.scheduler.cancel(token);
        }
        if let Some(cb) = &mut self.on_stopping {
            cb();
        }
    }

    /// Appends `data` to the pending send queue; fails silently (and
    /// logs) once the session has stopped (spec.md §4.1).
    pub fn send(&mut self, data: Vec<u8>) {
        if self.stopped {
            tracing::warn!("dropping send() on a stopped session");
            return;
        }
        self.send_queue.push(data);
    }

    /// Returns the longest prefix of queued messages fitting within
    /// `max` bytes, and whether any unsent message remains after it.
    /// Oversize messages are dropped outright (logged) so they can never
    /// block smaller ones behind them (spec.md §4.1; spec.md §9 Open
    /// Question 2 fixes the `more` predicate to reflect this directly
    /// rather than the original's always-false expression).
    pub fn get_data(&mut self, max: usize) -> (Vec<u8>, bool) {
        self.send_queue.retain(|msg| {
            if msg.len() > max {
                tracing::warn!(
                    len = msg.len(),
                    max,
                    "dropping oversize queued message to avoid head-of-line blocking"
                );
                false
            } else {
                true
            }
        });

        let mut out = Vec::new();
        let mut used = 0usize;
        let mut fit = 0usize;
        for msg in &self.send_queue {
            if used + msg.len() > max {
                break;
            }
            out.extend_from_slice(msg);
            used += msg.len();
            fit += 1;
        }
        self.trim_count = fit;
        let more = fit < self.send_queue.len();
        (out, more)
    }

    /// Drops the prefix `get_data` last reported as fitting. Called only
    /// when the round that consumed it succeeds; a failed round leaves
    /// the queue untouched so the same messages retry next round.
    fn commit_send_queue(&mut self) {
        self.send_queue.drain(0..self.trim_count);
        self.trim_count = 0;
    }

    fn is_connected(&self, id: Id) -> bool {
        self.network.connection_table().is_connected(id)
    }

    /// `ShouldRegister` (spec.md §4.1's table), combined with the
    /// "already not registering" guard every row shares.
    fn should_register(&self) -> bool {
        if self.registering {
            return false;
        }
        let group = self.group_holder.group();
        match group.subgroup_policy() {
            SubgroupPolicy::CompleteGroup | SubgroupPolicy::FixedSubgroup => {
                self.is_connected(group.leader())
            }
            SubgroupPolicy::ManagedSubgroup => {
                let in_subgroup = group
                    .subgroup()
                    .map_or(false, |s| s.contains(self.local_ident.id));
                if in_subgroup {
                    self.is_connected(group.leader())
                } else {
                    self.network.connection_table().count() > 1
                }
            }
            SubgroupPolicy::DisabledGroup => false,
        }
    }

    fn maybe_register(&mut self) {
        if !self.should_register() {
            return;
        }
        self.registering = true;
        let group = self.group_holder.group();
        let ident = public_identity_of(&self.local_ident);
        let ident_bytes =
            bincode::serialize(&ident).expect("PublicIdentity serialization is infallible");
        let message = WireMessage::Register {
            session_id: self.session_id,
            ident: ident_bytes,
        };
        if let Err(err) = self.network.send(group.leader(), message) {
            tracing::warn!(%err, "failed to send registration request");
        }
    }

    /// Handles the leader's response to a registration request (spec.md
    /// §4.1's retry rule): `Other` retries after 60s, anything else
    /// after 5s, with at most one retry timer armed at a time.
    pub fn handle_register_response(&mut self, result: WireResult<bool>) {
        if let Some(token) = self.register_retry_timer.take() {
            self.scheduler.cancel(token);
        }
        match result {
            Ok(_) => {
                self.registering = false;
            }
            Err((kind, reason)) => {
                tracing::warn!(?kind, %reason, "registration rejected, scheduling retry");
                let delay = if kind == ErrorKind::Other {
                    REGISTER_RETRY_OTHER
                } else {
                    REGISTER_RETRY_DEFAULT
                };
                self.register_retry_timer = Some(self.scheduler.schedule_once(delay));
            }
        }
    }

    /// Called by the event loop when a timer fires; a no-op unless
    /// `token` is the currently armed registration retry timer.
    pub fn handle_timer(&mut self, token: TimerToken) {
        if self.register_retry_timer == Some(token) {
            self.register_retry_timer = None;
            self.registering = false;
            self.maybe_register();
        }
    }

    /// `handle_connection` (spec.md §4.1): a fresh connection may make
    /// registration eligible, or satisfy a deferred prepare's group
    /// sufficiency check.
    pub fn handle_connection(&mut self, _id: Id) {
        self.maybe_register();
        self.try_deferred_prepare();
    }

    /// `handle_disconnect` (spec.md §4.1): reports the loss to the
    /// leader and aborts the current round if the group is no longer
    /// sufficient without it.
    pub fn handle_disconnect(&mut self, id: Id) {
        let group = self.group_holder.group();
        let still_sufficient =
            group.is_sufficient(self.local_ident.id, MINIMUM_ROUND_SIZE, |peer| {
                self.is_connected(peer)
            });
        let round_closed = if !still_sufficient {
            self.stop_round(
                StopReason::Other("group insufficient after disconnect".to_string()),
                false,
            );
            true
        } else {
            false
        };
        let message = WireMessage::Disconnect {
            session_id: self.session_id,
            remote_id: id,
            round_closed,
        };
        if let Err(err) = self.network.send(group.leader(), message) {
            tracing::warn!(%err, "failed to report disconnect to the leader");
        }
    }

    /// `handle_prepare` (spec.md §4.1's state machine). A round is
    /// "running" exactly when `prepare_state` is `RoundCreated` (set by
    /// [`Self::create_round_or_defer`], cleared back to `Idle` only once
    /// [`Self::stop_round`] concludes that same round), so that state
    /// alone is enough to tell whether this prepare must wait.
    pub fn handle_prepare(&mut self, request: PrepareRequest) -> PrepareOutcome {
        match &self.prepare_state {
            PrepareState::RoundCreated(existing) if *existing == request.round_id => {
                // Prepare-idempotence (spec.md §8): re-delivery while
                // already created for this round id is a no-op.
                PrepareOutcome::Responded(*existing)
            }
            PrepareState::RoundCreated(_) => {
                let interrupt = request.interrupt;
                self.prepare_state = PrepareState::PrepareDeferred(request);
                if interrupt {
                    self.stop_round(StopReason::Interrupted, false);
                    // Stopping may have synchronously re-entered a
                    // still-deferred prepare (spec.md §4.1: "round
                    // finished" -> "group now sufficient" -> re-entry),
                    // in which case a round already exists for it.
                    if let PrepareState::RoundCreated(id) = &self.prepare_state {
                        return PrepareOutcome::Responded(*id);
                    }
                }
                PrepareOutcome::Deferred
            }
            PrepareState::Idle | PrepareState::PrepareDeferred(_) => {
                self.create_round_or_defer(request)
            }
        }
    }

    fn create_round_or_defer(&mut self, request: PrepareRequest) -> PrepareOutcome {
        if let Some(group) = request.group.clone() {
            self.group_holder.set_group(group);
        }
        let group = self.group_holder.group();
        let sufficient = group.is_sufficient(self.local_ident.id, MINIMUM_ROUND_SIZE, |id| {
            self.is_connected(id)
        });
        if !sufficient {
            self.prepare_state = PrepareState::PrepareDeferred(request);
            return PrepareOutcome::Deferred;
        }
        let round_id = request.round_id;
        let round = Round::new(round_id, self.round_kind, group, self.local_ident.id);
        self.current_round = Some(round);
        self.prepare_state = PrepareState::RoundCreated(round_id);
        PrepareOutcome::Responded(round_id)
    }

    /// Re-enters prepare handling for a stored deferred request once the
    /// group is sufficient again (spec.md §4.1: "round finished or
    /// connection established" -> "group now sufficient").
    fn try_deferred_prepare(&mut self) -> Option<PrepareOutcome> {
        let request = match &self.prepare_state {
            PrepareState::PrepareDeferred(request) => request.clone(),
            _ => return None,
        };
        let group = request
            .group
            .clone()
            .unwrap_or_else(|| self.group_holder.group());
        let sufficient = group.is_sufficient(self.local_ident.id, MINIMUM_ROUND_SIZE, |id| {
            self.is_connected(id)
        });
        if !sufficient {
            return None;
        }
        self.prepare_state = PrepareState::Idle;
        Some(self.handle_prepare(request))
    }

    /// `handle_begin` (spec.md §4.1): starts the created round if the
    /// notification's round id matches and the sender is the leader.
    pub fn handle_begin(&mut self, sender: Id, round_id: Id) {
        let leader = self.group_holder.group().leader();
        if sender != leader {
            tracing::warn!(%sender, "begin from a non-leader sender ignored");
            return;
        }
        let matches = matches!(&self.prepare_state, PrepareState::RoundCreated(id) if *id == round_id);
        if !matches {
            tracing::warn!(%round_id, "begin for an unknown or mismatched round ignored");
            return;
        }
        if let Some(round) = &mut self.current_round {
            if round.start() {
                if let Some(cb) = &mut self.on_round_starting {
                    cb(round);
                }
            }
        }
    }

    /// `handle_data` (spec.md §4.1): validates the envelope and forwards
    /// the payload to the current round.
    pub fn handle_data(&mut self, sender: Id, session_id: Id, payload: Vec<u8>) -> Result<()> {
        if session_id != self.session_id {
            return Err(Error::ProtocolViolation {
                sender,
                reason: "data for a foreign session".to_string(),
            });
        }
        if !self.group_holder.group().contains(sender) {
            return Err(Error::ProtocolViolation {
                sender,
                reason: "data from a non-member".to_string(),
            });
        }
        let round = self.current_round.as_mut().ok_or_else(|| Error::ProtocolViolation {
            sender,
            reason: "data with no active round".to_string(),
        })?;
        if !round.is_started() {
            return Err(Error::ProtocolViolation {
                sender,
                reason: "data before round start".to_string(),
            });
        }
        if let Some(handler) = &mut self.on_data {
            handler(round, sender, payload);
        }
        Ok(())
    }

    /// Stops the current round (if any) with `reason`, trims the send
    /// queue on success, fires `RoundFinished`, and re-enters any
    /// deferred prepare. Returns the round's bad-member list. The
    /// stopped round stays reachable through [`Self::current_round`]
    /// until a later prepare replaces it, so callers can still inspect
    /// why it ended.
    pub fn stop_round(&mut self, reason: StopReason, successful: bool) -> Option<Vec<Id>> {
        let (round_id, bad_members) = {
            let round = self.current_round.as_mut()?;
            if !round.stop(reason, successful) {
                return None;
            }
            (round.round_id, round.bad_members().to_vec())
        };
        if successful {
            self.commit_send_queue();
        }
        if let Some(cb) = &mut self.on_round_finished {
            cb(self.current_round.as_ref().expect("just stopped above"));
        }
        if matches!(&self.prepare_state, PrepareState::RoundCreated(id) if *id == round_id) {
            self.prepare_state = PrepareState::Idle;
        }
        self.try_deferred_prepare();
        Some(bad_members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::credentials::{DiffieHellmanPublic, VerificationKey};
    use crate::identity::PublicIdentity;
    use crate::net::test_util::RecordingNetwork;
    use crate::session::scheduler::ManualScheduler;
    use ed25519_dalek::Keypair;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn keypair(seed: u64) -> Keypair {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        Keypair::generate(&mut rng)
    }

    fn private_ident(id: Id, seed: u64) -> PrivateIdentity {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let mut dh_bytes = [0u8; 32];
        use rand::RngCore;
        rng.fill_bytes(&mut dh_bytes);
        PrivateIdentity::new(id, keypair(seed), x25519_dalek::StaticSecret::from(dh_bytes), false)
    }

    fn public_ident(id: Id) -> PublicIdentity {
        PublicIdentity::new(id, VerificationKey(vec![1]), DiffieHellmanPublic::empty(), false)
    }

    fn session_with(group: Group, local: Id) -> (Session, std::sync::Arc<RecordingNetwork>) {
        let network = std::sync::Arc::new(RecordingNetwork::new());
        for member in group.roster() {
            if member.id != local {
                network.connections.connect(member.id);
            }
        }
        let net_box: Box<dyn Network> = Box::new(network.clone());
        let session = Session::new(
            Id::from_counter(1000),
            group,
            private_ident(local, local.as_bytes()[19] as u64 + 1),
            RoundKind::Plain,
            net_box,
            Box::new(ManualScheduler::new()),
        );
        (session, network)
    }

    fn small_group(leader: Id, members: &[Id]) -> Group {
        let roster = members.iter().map(|&id| public_ident(id)).collect();
        Group::new(roster, leader, SubgroupPolicy::CompleteGroup)
    }

    #[test]
    fn send_queues_until_a_round_succeeds() {
        let leader = Id::from_counter(1);
        let local = Id::from_counter(2);
        let group = small_group(leader, &[leader, local, Id::from_counter(3)]);
        let (mut session, _net) = session_with(group, local);

        session.start();
        session.send(b"hello".to_vec());
        let (data, more) = session.get_data(64);
        assert_eq!(data, b"hello");
        assert!(!more);

        // failing round: queue must still hold the message
        let request = PrepareRequest {
            session_id: session.session_id(),
            round_id: Id::from_counter(1),
            interrupt: false,
            group: None,
        };
        assert_eq!(
            session.handle_prepare(request),
            PrepareOutcome::Responded(Id::from_counter(1))
        );
        session.stop_round(StopReason::Other("network error".to_string()), false);
        let (data_again, _) = session.get_data(64);
        assert_eq!(data_again, b"hello");
    }

    #[test]
    fn oversize_message_is_dropped_and_does_not_block_smaller_ones() {
        let leader = Id::from_counter(1);
        let local = Id::from_counter(2);
        let group = small_group(leader, &[leader, local]);
        let (mut session, _net) = session_with(group, local);
        session.start();
        session.send(vec![0u8; 100]);
        session.send(b"small".to_vec());
        let (data, more) = session.get_data(10);
        assert_eq!(data, b"small");
        assert!(!more);
    }

    #[test]
    fn more_is_true_only_when_a_message_did_not_fit() {
        let leader = Id::from_counter(1);
        let local = Id::from_counter(2);
        let group = small_group(leader, &[leader, local]);
        let (mut session, _net) = session_with(group, local);
        session.start();
        session.send(b"aaaa".to_vec());
        session.send(b"bbbb".to_vec());
        let (data, more) = session.get_data(4);
        assert_eq!(data, b"aaaa");
        assert!(more);
    }

    #[test]
    fn prepare_while_round_running_is_deferred_and_interrupt_stops_it() {
        let leader = Id::from_counter(1);
        let local = Id::from_counter(2);
        let group = small_group(leader, &[leader, local, Id::from_counter(3)]);
        let (mut session, _net) = session_with(group, local);
        session.start();

        let first = PrepareRequest {
            session_id: session.session_id(),
            round_id: Id::from_counter(1),
            interrupt: false,
            group: None,
        };
        session.handle_prepare(first);
        session.handle_begin(leader, Id::from_counter(1));
        assert!(session.current_round().unwrap().is_started());

        let second = PrepareRequest {
            session_id: session.session_id(),
            round_id: Id::from_counter(2),
            interrupt: true,
            group: None,
        };
        // The group stays sufficient, so stopping round 1 immediately
        // re-enters the deferred request and creates round 2.
        let outcome = session.handle_prepare(second);
        assert_eq!(outcome, PrepareOutcome::Responded(Id::from_counter(2)));
        assert_eq!(session.current_round().unwrap().round_id, Id::from_counter(2));
        assert!(!session.current_round().unwrap().is_started());
    }

    #[test]
    fn interrupt_defers_outright_when_the_group_is_not_yet_sufficient_again() {
        let leader = Id::from_counter(1);
        let local = Id::from_counter(2);
        let group = small_group(leader, &[leader, local, Id::from_counter(3)]);
        let (mut session, network) = session_with(group, local);
        session.start();

        let first = PrepareRequest {
            session_id: session.session_id(),
            round_id: Id::from_counter(1),
            interrupt: false,
            group: None,
        };
        session.handle_prepare(first);
        session.handle_begin(leader, Id::from_counter(1));

        // The third member drops, so the group is no longer sufficient.
        network.connections.disconnect(Id::from_counter(3));

        let second = PrepareRequest {
            session_id: session.session_id(),
            round_id: Id::from_counter(2),
            interrupt: true,
            group: None,
        };
        let outcome = session.handle_prepare(second);
        assert_eq!(outcome, PrepareOutcome::Deferred);
        assert_eq!(session.current_round().unwrap().round_id, Id::from_counter(1));
        assert!(session.current_round().unwrap().is_stopped());
        assert!(session.current_round().unwrap().interrupted());
    }

    #[test]
    fn insufficient_group_defers_prepare() {
        let leader = Id::from_counter(1);
        let local = Id::from_counter(2);
        // Only two members: below MinimumRoundSize of 3.
        let group = small_group(leader, &[leader, local]);
        let (mut session, _net) = session_with(group, local);
        session.start();

        let request = PrepareRequest {
            session_id: session.session_id(),
            round_id: Id::from_counter(1),
            interrupt: false,
            group: None,
        };
        assert_eq!(session.handle_prepare(request), PrepareOutcome::Deferred);
    }

    #[test]
    fn re_delivering_the_same_prepare_is_idempotent() {
        let leader = Id::from_counter(1);
        let local = Id::from_counter(2);
        let group = small_group(leader, &[leader, local, Id::from_counter(3)]);
        let (mut session, _net) = session_with(group, local);
        session.start();
        let request = PrepareRequest {
            session_id: session.session_id(),
            round_id: Id::from_counter(1),
            interrupt: false,
            group: None,
        };
        let first = session.handle_prepare(request.clone());
        let second = session.handle_prepare(request);
        assert_eq!(first, second);
    }

    #[test]
    fn begin_from_a_non_leader_is_ignored() {
        let leader = Id::from_counter(1);
        let local = Id::from_counter(2);
        let group = small_group(leader, &[leader, local, Id::from_counter(3)]);
        let (mut session, _net) = session_with(group, local);
        session.start();
        let request = PrepareRequest {
            session_id: session.session_id(),
            round_id: Id::from_counter(1),
            interrupt: false,
            group: None,
        };
        session.handle_prepare(request);
        session.handle_begin(Id::from_counter(3), Id::from_counter(1));
        assert!(!session.current_round().unwrap().is_started());
    }

    #[test]
    fn stop_trims_queue_only_on_success() {
        let leader = Id::from_counter(1);
        let local = Id::from_counter(2);
        let group = small_group(leader, &[leader, local, Id::from_counter(3)]);
        let (mut session, _net) = session_with(group, local);
        session.start();
        session.send(b"payload".to_vec());
        session.get_data(64);

        let request = PrepareRequest {
            session_id: session.session_id(),
            round_id: Id::from_counter(1),
            interrupt: false,
            group: None,
        };
        session.handle_prepare(request);
        session.stop_round(StopReason::Finished, true);
        let (data, _) = session.get_data(64);
        assert!(data.is_empty());
    }

    #[test]
    fn send_after_stop_is_a_silent_no_op() {
        let leader = Id::from_counter(1);
        let local = Id::from_counter(2);
        let group = small_group(leader, &[leader, local, Id::from_counter(3)]);
        let (mut session, _net) = session_with(group, local);
        session.start();
        session.stop();
        session.send(b"too late".to_vec());
        let (data, _) = session.get_data(64);
        assert!(data.is_empty());
    }
}
