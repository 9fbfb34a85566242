// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event broker
//!
//! Senders publish into the shared [`EventLog`]; a single dispatcher drains
//! it. Each dispatch cycle snapshots the log length under the append lock,
//! then walks every subscription's delta `[cursor, snapshot)` through that
//! subscription's filter without holding the append lock, so publishers are
//! never slowed down by listeners.

use crate::config::BrokerConfig;
use crate::dispatch::{DispatchReport, DispatchTask};
use crate::dump;
use crate::error::{BrokerError, PublishError};
use crate::listener::{Listener, Sender, SenderHandle};
use crate::subscription::{ImmediateSubscription, Subscription, SubscriptionId};
use evboard_core::{
    Clock, Event, EventAddress, EventDraft, EventFilter, EventLog, EventSource, FilterCriteria,
    Id, Interner, LogView, StateFilter, StringTable, SystemClock,
};
use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, trace, warn};

static NEXT_BROKER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
struct DispatchState {
    subscriptions: Vec<Subscription>,
}

pub(crate) struct Inner<C: Clock> {
    id: u64,
    config: BrokerConfig,
    span: tracing::Span,
    interner: Arc<dyn Interner>,
    clock: C,
    log: EventLog,
    senders: RwLock<Vec<Option<Arc<dyn Sender>>>>,
    immediate: RwLock<Vec<ImmediateSubscription>>,
    dispatch: Mutex<DispatchState>,
    lifecycle: Mutex<Option<DispatchTask>>,
    running: AtomicBool,
    next_subscription: AtomicU64,
}

impl<C: Clock> Inner<C> {
    /// Entry point of the dispatch task
    pub(crate) fn dispatch_if_running(&self) {
        let mut state = self.dispatch.lock().unwrap_or_else(|e| e.into_inner());
        // Checked under the dispatch lock so no cycle starts once stop() holds it
        if self.running.load(Ordering::SeqCst) {
            self.cycle(&mut state);
        }
    }

    fn cycle(&self, state: &mut DispatchState) -> DispatchReport {
        let now = self.clock.now_ms();
        let snapshot = self.log.snapshot();

        let mut report = DispatchReport {
            now,
            log_len: snapshot.snapshot_len(),
            ..DispatchReport::default()
        };

        for subscription in &mut state.subscriptions {
            if let Some(count) = subscription.deliver(&snapshot, now, self.config.notify_idle) {
                report.notified += 1;
                report.delivered += count;
            }
        }

        if report.delivered > 0 {
            trace!(
                now,
                log_len = report.log_len,
                delivered = report.delivered,
                "dispatch cycle"
            );
        }
        report
    }

    fn sender_registered(&self, handle: &SenderHandle) -> bool {
        handle.broker == self.id
            && self
                .senders
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .get(handle.slot)
                .is_some_and(Option::is_some)
    }

    fn resolve(&self, name: &str) -> Result<Id, BrokerError> {
        match self.interner.lookup(name) {
            Some(id) => Ok(id),
            None if self.config.intern_unknown_names => {
                warn!("unknown name '{}', interning it", name);
                Ok(self.interner.intern(name))
            }
            None => Err(BrokerError::UnresolvedName(name.to_string())),
        }
    }

    fn listener_count(&self) -> usize {
        let windowed = self
            .dispatch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .subscriptions
            .len();
        let immediate = self
            .immediate
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len();
        windowed + immediate
    }

    fn listeners(&self) -> Vec<Arc<dyn Listener>> {
        let mut listeners: Vec<Arc<dyn Listener>> = self
            .dispatch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .subscriptions
            .iter()
            .map(|s| Arc::clone(s.listener()))
            .collect();
        listeners.extend(
            self.immediate
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .map(|s| Arc::clone(&s.listener)),
        );
        listeners
    }

    fn senders(&self) -> Vec<Arc<dyn Sender>> {
        self.senders
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .flatten()
            .cloned()
            .collect()
    }
}

/// Owns the event log and routes events from senders to listeners
///
/// Cloning is cheap; clones share the same broker.
pub struct EventBroker<C: Clock = SystemClock> {
    inner: Arc<Inner<C>>,
}

impl EventBroker<SystemClock> {
    /// A broker with default configuration, its own string table and a
    /// system clock starting now
    pub fn with_defaults() -> Self {
        Self::new(
            BrokerConfig::default(),
            Arc::new(StringTable::new()),
            SystemClock::new(),
        )
    }
}

impl<C: Clock> EventBroker<C> {
    pub fn new(config: BrokerConfig, interner: Arc<dyn Interner>, clock: C) -> Self {
        let span = tracing::info_span!("broker", name = %config.name);
        let log = EventLog::with_chunk_size(config.chunk_size);
        Self {
            inner: Arc::new(Inner {
                id: NEXT_BROKER_ID.fetch_add(1, Ordering::Relaxed),
                config,
                span,
                interner,
                clock,
                log,
                senders: RwLock::new(Vec::new()),
                immediate: RwLock::new(Vec::new()),
                dispatch: Mutex::new(DispatchState::default()),
                lifecycle: Mutex::new(None),
                running: AtomicBool::new(false),
                next_subscription: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.inner.config
    }

    pub fn interner(&self) -> &Arc<dyn Interner> {
        &self.inner.interner
    }

    pub fn clock(&self) -> &C {
        &self.inner.clock
    }

    /// Intern a name through the broker's interner
    pub fn intern(&self, name: &str) -> Id {
        self.inner.interner.intern(name)
    }

    // -- senders -------------------------------------------------------------

    /// Authorize a component to publish
    ///
    /// No id is interned here; the sender's name is interned on first publish.
    pub fn register_sender(&self, sender: Arc<dyn Sender>) -> Result<SenderHandle, BrokerError> {
        let _span = self.inner.span.enter();

        let handle = {
            let mut senders = self.inner.senders.write().unwrap_or_else(|e| e.into_inner());
            let active = senders.iter().flatten().count();
            if active >= self.inner.config.max_senders {
                warn!(
                    "#sender exceeds available space '{}'",
                    self.inner.config.max_senders
                );
                return Err(BrokerError::CapacityExceeded {
                    kind: "sender",
                    limit: self.inner.config.max_senders,
                });
            }
            senders.push(Some(Arc::clone(&sender)));
            SenderHandle::new(self.inner.id, senders.len() - 1, sender.name())
        };

        info!("'{}' sends", sender.name());
        if self.is_running() {
            sender.on_start();
        }
        Ok(handle)
    }

    /// Withdraw a sender's authorization; later publishes with the handle fail
    pub fn unregister_sender(&self, handle: &SenderHandle) -> bool {
        if handle.broker != self.inner.id {
            return false;
        }
        let mut senders = self.inner.senders.write().unwrap_or_else(|e| e.into_inner());
        match senders.get_mut(handle.slot) {
            Some(slot @ Some(_)) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    pub fn sender_count(&self) -> usize {
        self.inner
            .senders
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .flatten()
            .count()
    }

    // -- listeners -----------------------------------------------------------

    /// Register a windowed listener, reporting failure as `false`
    ///
    /// See [`subscribe`](Self::subscribe) for the error cases; each one is
    /// logged as a warning here.
    pub fn register_listener(
        &self,
        listener: Arc<dyn Listener>,
        address: &str,
        time_span_ms: u64,
        state_filter: StateFilter,
    ) -> bool {
        match self.subscribe(listener, address, time_span_ms, state_filter) {
            Ok(_) => true,
            Err(e) => {
                let _span = self.inner.span.enter();
                warn!("listener not registered: {}", e);
                false
            }
        }
    }

    /// Register a windowed listener
    ///
    /// The new subscription starts with cursor 0, so its first cycle offers
    /// everything already in the log.
    pub fn subscribe(
        &self,
        listener: Arc<dyn Listener>,
        address: &str,
        time_span_ms: u64,
        state_filter: StateFilter,
    ) -> Result<SubscriptionId, BrokerError> {
        let _span = self.inner.span.enter();
        let (address, criteria) = self.resolve_address(address, time_span_ms, state_filter)?;
        self.check_listener_capacity()?;

        let id = self.next_subscription_id();
        info!("'{}' receives '{}'", listener.name(), address);
        {
            let mut state = self.inner.dispatch.lock().unwrap_or_else(|e| e.into_inner());
            state.subscriptions.push(Subscription::new(
                id,
                address,
                Arc::clone(&listener),
                criteria,
            ));
        }

        if self.is_running() {
            listener.on_start();
        }
        Ok(id)
    }

    /// Register a listener for zero-latency delivery
    ///
    /// `on_event` is called on the publishing thread for every matching
    /// event, right after it is appended. There is no time window.
    pub fn register_immediate_listener(
        &self,
        listener: Arc<dyn Listener>,
        address: &str,
        state_filter: StateFilter,
    ) -> Result<SubscriptionId, BrokerError> {
        let _span = self.inner.span.enter();
        let (address, criteria) = self.resolve_address(address, 0, state_filter)?;
        self.check_listener_capacity()?;

        let id = self.next_subscription_id();
        info!("'{}' receives '{}' immediately", listener.name(), address);
        self.inner
            .immediate
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(ImmediateSubscription {
                id,
                listener: Arc::clone(&listener),
                criteria,
                enabled: true,
            });

        if self.is_running() {
            listener.on_start();
        }
        Ok(id)
    }

    /// Remove a subscription of either kind
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed_windowed = {
            let mut state = self.inner.dispatch.lock().unwrap_or_else(|e| e.into_inner());
            let before = state.subscriptions.len();
            state.subscriptions.retain(|s| s.id != id);
            before != state.subscriptions.len()
        };
        let removed_immediate = {
            let mut immediate = self.inner.immediate.write().unwrap_or_else(|e| e.into_inner());
            let before = immediate.len();
            immediate.retain(|s| s.id != id);
            before != immediate.len()
        };
        removed_windowed || removed_immediate
    }

    /// Pause or resume a subscription of either kind
    ///
    /// A paused windowed subscription keeps its cursor moving, so events
    /// that arrive while it is paused are never delivered to it.
    pub fn set_enabled(&self, id: SubscriptionId, enabled: bool) -> bool {
        let _span = self.inner.span.enter();
        let found = {
            let mut state = self.inner.dispatch.lock().unwrap_or_else(|e| e.into_inner());
            state
                .subscriptions
                .iter_mut()
                .find(|s| s.id == id)
                .map(|s| s.set_enabled(enabled))
                .is_some()
        };
        let found = found || {
            let mut immediate = self.inner.immediate.write().unwrap_or_else(|e| e.into_inner());
            immediate
                .iter_mut()
                .find(|s| s.id == id)
                .map(|s| s.enabled = enabled)
                .is_some()
        };
        if found {
            debug!("{} {}", id, if enabled { "enabled" } else { "disabled" });
        }
        found
    }

    pub fn is_enabled(&self, id: SubscriptionId) -> Option<bool> {
        let windowed = self
            .inner
            .dispatch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .subscriptions
            .iter()
            .find(|s| s.id == id)
            .map(Subscription::is_enabled);
        windowed.or_else(|| {
            self.inner
                .immediate
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.enabled)
        })
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listener_count()
    }

    /// Read cursor of a windowed subscription
    pub fn cursor(&self, id: SubscriptionId) -> Option<usize> {
        self.inner
            .dispatch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .subscriptions
            .iter()
            .find(|s| s.id == id)
            .map(Subscription::cursor)
    }

    fn resolve_address(
        &self,
        address: &str,
        time_span_ms: u64,
        state_filter: StateFilter,
    ) -> Result<(EventAddress, FilterCriteria), BrokerError> {
        let address = EventAddress::parse(address)?;
        let sender_ids = address
            .senders()
            .iter()
            .map(|name| self.inner.resolve(name))
            .collect::<Result<Vec<_>, _>>()?;
        let event_ids = address
            .events()
            .iter()
            .map(|name| self.inner.resolve(name))
            .collect::<Result<Vec<_>, _>>()?;

        let criteria = FilterCriteria::any()
            .senders(sender_ids)
            .events(event_ids)
            .within(time_span_ms)
            .state(state_filter);
        Ok((address, criteria))
    }

    fn check_listener_capacity(&self) -> Result<(), BrokerError> {
        let limit = self.inner.config.max_listeners;
        if self.inner.listener_count() >= limit {
            warn!("#listener exceeds available space '{}'", limit);
            return Err(BrokerError::CapacityExceeded {
                kind: "listener",
                limit,
            });
        }
        Ok(())
    }

    fn next_subscription_id(&self) -> SubscriptionId {
        SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed))
    }

    // -- publishing ----------------------------------------------------------

    /// Append an event to the log
    ///
    /// The sender id comes from `handle`; an unset time is stamped from the
    /// pipeline clock. Blocks only on the append lock. Immediate listeners
    /// run on this thread after the lock is released.
    pub fn publish(
        &self,
        handle: &SenderHandle,
        draft: EventDraft,
    ) -> Result<Arc<Event>, PublishError> {
        if !self.inner.sender_registered(handle) {
            let _span = self.inner.span.enter();
            warn!("dropping event from unregistered sender '{}'", handle.name());
            return Err(PublishError::UnregisteredSender(handle.name().to_string()));
        }

        let sender_id = handle.sender_id(self.inner.interner.as_ref());
        let event = draft.into_event(sender_id, self.inner.clock.now_ms());
        let (index, event) = self.inner.log.append(event);
        trace!(
            index,
            sender = handle.name(),
            event_id = event.event_id,
            time = event.time,
            "published"
        );

        // Called without the lock, so a listener may publish from on_event
        let listeners: Vec<Arc<dyn Listener>> = self
            .inner
            .immediate
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|s| s.accepts(&event))
            .map(|s| Arc::clone(&s.listener))
            .collect();
        for listener in listeners {
            listener.on_event(&event);
        }

        Ok(event)
    }

    // -- dispatch ------------------------------------------------------------

    /// Run one dispatch cycle now
    ///
    /// Used by the dispatch task, and by embedders that drive dispatch
    /// themselves instead of calling [`start`](Self::start).
    pub fn dispatch(&self) -> DispatchReport {
        let _span = self.inner.span.enter();
        let mut state = self.inner.dispatch.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.cycle(&mut state)
    }

    /// Start the dispatch task on the current tokio runtime
    ///
    /// Calls `on_start` on every sender and listener first.
    pub fn start(&self) -> Result<(), BrokerError> {
        let _span = self.inner.span.enter();
        let mut lifecycle = self.inner.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        if self.inner.running.load(Ordering::SeqCst) {
            warn!("already running");
            return Ok(());
        }

        info!("start event board worker");
        let task = DispatchTask::spawn(
            Arc::downgrade(&self.inner),
            self.inner.config.dispatch_interval,
            self.inner.span.clone(),
        )?;

        for sender in self.inner.senders() {
            sender.on_start();
        }
        for listener in self.inner.listeners() {
            listener.on_start();
        }

        *lifecycle = Some(task);
        self.inner.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stop the dispatch task
    ///
    /// Waits for an in-progress cycle, runs a final cycle when
    /// `flush_on_stop` is set, then calls `on_stop` on every listener and
    /// sender. Must not be called from inside a listener callback.
    pub fn stop(&self) {
        let _span = self.inner.span.enter();
        if self.stop_dispatch().is_none() {
            warn!("not running");
        }
    }

    /// Like [`stop`](Self::stop), and also waits for the task to exit
    pub async fn shutdown(&self) {
        let task = {
            let _span = self.inner.span.enter();
            self.stop_dispatch()
        };
        if let Some(task) = task {
            task.join().await;
        }
    }

    fn stop_dispatch(&self) -> Option<DispatchTask> {
        let mut lifecycle = self.inner.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            return None;
        }

        info!("stop event board worker");
        let mut task = lifecycle.take();
        if let Some(task) = task.as_mut() {
            task.signal();
        }

        {
            // Blocks until the task's current cycle, if any, has finished
            let mut state = self.inner.dispatch.lock().unwrap_or_else(|e| e.into_inner());
            if self.inner.config.flush_on_stop {
                let report = self.inner.cycle(&mut state);
                debug!(delivered = report.delivered, "final dispatch cycle");
            }
        }

        for listener in self.inner.listeners() {
            listener.on_stop();
        }
        for sender in self.inner.senders() {
            sender.on_stop();
        }
        task
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Stop dispatch, empty the log and rewind every cursor
    ///
    /// Registrations are kept.
    pub fn clear(&self) {
        let _span = self.inner.span.enter();
        drop(self.stop_dispatch());

        let mut state = self.inner.dispatch.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.log.clear();
        for subscription in &mut state.subscriptions {
            subscription.rewind();
        }
        info!("event board cleared");
    }

    // -- inspection ----------------------------------------------------------

    pub fn log_len(&self) -> usize {
        self.inner.log.len()
    }

    /// A lock-free view of everything published so far
    pub fn snapshot(&self) -> LogView {
        self.inner.log.snapshot()
    }

    /// An ad hoc filter over the whole log
    pub fn query(&self, criteria: FilterCriteria, reference_time: u64) -> EventFilter<LogView> {
        let mut filter = EventFilter::new(self.snapshot(), criteria);
        filter.set_reference_time(reference_time);
        filter
    }

    /// Write the whole log as a table
    pub fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        let mut view = self.snapshot();
        self.dump_view(&mut view, out)
    }

    /// Write a view as a table
    pub fn dump_view(&self, view: &mut dyn EventSource, out: &mut dyn Write) -> io::Result<()> {
        dump::write_table(view, self.inner.interner.as_ref(), out).map(|_| ())
    }
}

impl<C: Clock> Clone for EventBroker<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> fmt::Debug for EventBroker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBroker")
            .field("name", &self.inner.config.name)
            .field("running", &self.is_running())
            .field("log_len", &self.log_len())
            .field("senders", &self.sender_count())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
