// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulate command
//!
//! Runs a broker with synthetic sender threads and one listener that writes
//! everything it receives to an event sink.

use crate::names;
use anyhow::{Context, Result};
use clap::Args;
use evboard_broker::{BrokerConfig, EventBroker, Listener, NamedSender, PublishError, SenderHandle};
use evboard_core::{
    Clock, EventDraft, EventSource, Id, Payload, StateFilter, StringTable, SystemClock,
};
use evboard_storage::{EventSink, SinkError, SinkFormat, SinkVersion};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};

const EVENT_NAMES: [&str; 3] = ["onset", "level", "offset"];

#[derive(Args)]
pub struct SimulateArgs {
    /// Where to record the events the listener receives
    #[arg(long)]
    pub out: PathBuf,
    /// Broker config (default: <config dir>/evboard/broker.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of sender threads
    #[arg(long, default_value_t = 2)]
    pub senders: usize,
    /// Events published by each sender
    #[arg(long, default_value_t = 100)]
    pub events: usize,
    /// Dispatch interval, e.g. 10ms (overrides the config)
    #[arg(long)]
    pub interval: Option<humantime::Duration>,
    /// ascii or binary
    #[arg(long, default_value = "binary")]
    pub format: SinkFormat,
    /// Record layout version to write
    #[arg(
        long,
        default_value_t = SinkVersion::DEFAULT.as_u16(),
        value_parser = clap::value_parser!(u16).range(1..=2)
    )]
    pub format_version: u16,
    /// Listener address, e.g. "sensor0:onset,offset"
    #[arg(long, default_value = "*")]
    pub address: String,
    /// Listener time window in ms (0 = no window)
    #[arg(long, default_value_t = 0)]
    pub span: u64,
    /// all, completed, continued, zerodur or nonzerodur
    #[arg(long, default_value = "all")]
    pub state: StateFilter,
    /// Also write the name table, for `show --names`
    #[arg(long)]
    pub names: Option<PathBuf>,
}

/// Listener that persists every delivery
struct Recorder {
    sink: Mutex<Option<EventSink>>,
    failure: Mutex<Option<SinkError>>,
    recorded: AtomicUsize,
}

impl Recorder {
    fn new(sink: EventSink) -> Self {
        Self {
            sink: Mutex::new(Some(sink)),
            failure: Mutex::new(None),
            recorded: AtomicUsize::new(0),
        }
    }

    /// Close the sink, reporting the first write failure if there was one
    ///
    /// A failed sink was already dropped by the write that failed.
    fn finish(&self) -> Result<u64, SinkError> {
        if let Some(e) = self.failure.lock().unwrap_or_else(|e| e.into_inner()).take() {
            return Err(e);
        }
        match self.sink.lock().unwrap_or_else(|e| e.into_inner()).take() {
            Some(sink) => sink.close(),
            None => Ok(self.recorded.load(Ordering::SeqCst) as u64),
        }
    }
}

impl Listener for Recorder {
    fn on_events(&self, events: &mut dyn EventSource, _count: usize, _now_ms: u64) {
        let mut slot = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        let Some(sink) = slot.as_mut() else {
            return;
        };
        match sink.write_view(events) {
            Ok(written) => {
                self.recorded.fetch_add(written, Ordering::SeqCst);
            }
            Err(e) => {
                error!("recording to {} failed: {}", sink.path().display(), e);
                // Stop recording; the file is closed here and the error kept for finish()
                slot.take();
                let mut failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
                failure.get_or_insert(e);
            }
        }
    }

    fn on_stop(&self) {
        if let Some(sink) = self.sink.lock().unwrap_or_else(|e| e.into_inner()).as_mut() {
            if let Err(e) = sink.flush() {
                error!("flushing {} failed: {}", sink.path().display(), e);
            }
        }
    }

    fn name(&self) -> &str {
        "recorder"
    }
}

pub async fn simulate(args: SimulateArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(interval) = args.interval {
        config.dispatch_interval = interval.into();
    }

    let table = StringTable::new();
    let broker = EventBroker::new(config, Arc::new(table.clone()), SystemClock::new());
    let event_ids: Vec<Id> = EVENT_NAMES.iter().map(|name| broker.intern(name)).collect();

    let handles = (0..args.senders)
        .map(|i| {
            let name = format!("sensor{}", i);
            broker.intern(&name);
            broker.register_sender(NamedSender::new(name))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let version = SinkVersion::from_u16(args.format_version)?;
    let sink = EventSink::open(&args.out, args.format, version)?;
    let recorder = Arc::new(Recorder::new(sink));
    broker.subscribe(recorder.clone(), &args.address, args.span, args.state)?;

    broker.start()?;
    info!(
        senders = args.senders,
        events = args.events,
        "simulation started"
    );

    let producers: Vec<_> = handles
        .into_iter()
        .enumerate()
        .map(|(index, handle)| {
            let broker = broker.clone();
            let event_ids = event_ids.clone();
            let count = args.events;
            tokio::task::spawn_blocking(move || produce(&broker, &handle, &event_ids, index, count))
        })
        .collect();

    let mut published = 0;
    for producer in producers {
        published += producer.await.context("sender thread panicked")??;
    }

    broker.shutdown().await;
    let recorded = recorder.finish()?;

    if let Some(path) = &args.names {
        names::save(&table, path)?;
    }

    println!(
        "published {} events from {} senders",
        published, args.senders
    );
    println!("recorded {} events to {}", recorded, args.out.display());
    Ok(())
}

fn produce<C: Clock>(
    broker: &EventBroker<C>,
    handle: &SenderHandle,
    event_ids: &[Id],
    index: usize,
    count: usize,
) -> Result<usize, PublishError> {
    for k in 0..count {
        let mut draft = EventDraft::new(event_ids[k % event_ids.len()])
            .lasting((k % 4) as u64 * 10)
            .with_payload(Payload::Tuple(vec![index as f32, k as f32]))
            .with_prob(1.0 / (1 + k % 3) as f32);
        if k % 5 == 4 {
            draft = draft.continued();
        }
        broker.publish(handle, draft)?;

        // Let dispatch cycles interleave with publishing
        if k % 16 == 15 {
            std::thread::sleep(Duration::from_millis(1));
        }
    }
    Ok(count)
}

fn load_config(path: Option<&Path>) -> Result<BrokerConfig> {
    match path {
        Some(path) => Ok(BrokerConfig::load(path)?),
        None => match default_config_path() {
            Some(path) => Ok(BrokerConfig::load_or_default(&path)?),
            None => Ok(BrokerConfig::default()),
        },
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("evboard").join("broker.toml"))
}

#[cfg(test)]
#[path = "simulate_tests.rs"]
mod tests;
