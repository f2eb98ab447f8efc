//! Event dispatcher.
//!
//! The [`Monitor`] owns every piece of mutable state: the connection
//! machine (and through it the reader), the endpoint registry, the
//! auto-clear scheduler, the current verdict and the presentation sink.
//! After [`Monitor::start`] it runs as a single tokio task that consumes
//! three channels:
//!
//! 1. reader events, in arrival order
//! 2. clear deadlines from the auto-clear scheduler
//! 3. operator commands from the [`MonitorHandle`]
//!
//! The task prefers them in that order, so a readout that is already
//! queued is always shown before a clear deadline or a command is taken.
//!
//! # Lifecycle
//!
//! 1. Build the monitor with a reader and a sink
//! 2. Call `start()` to spawn the dispatcher and get a handle
//! 3. Drive it through the handle
//! 4. Call `shutdown()` (or drop the handle) to disconnect and stop
//!
//! # Examples
//!
//! ```
//! use siac_hardware::mock::MockReader;
//! use siac_monitor::{ConnectionState, Monitor, RecordingSink};
//!
//! #[tokio::main]
//! async fn main() -> siac_core::Result<()> {
//!     let (reader, _device) = MockReader::with_endpoints(["COM3"]);
//!     let monitor = Monitor::new(reader, RecordingSink::new());
//!
//!     let handle = monitor.start();
//!     handle.connect(0).await?;
//!
//!     let snapshot = handle.snapshot().await?;
//!     assert_eq!(snapshot.connection_state, ConnectionState::Connected);
//!
//!     handle.shutdown().await
//! }
//! ```

use serde::{Deserialize, Serialize};
use siac_core::{BatteryEvaluator, BatteryVerdict, CardReading, Error, Result};
use siac_hardware::{AnyReader, DeviceEndpoint, ReaderEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::auto_clear::{AutoClearScheduler, ClearDeadline};
use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::connection::{ConnectionMachine, ConnectionState};
use crate::endpoints::EndpointRegistry;
use crate::presentation::PresentationSink;

/// Point-in-time view of the monitor's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub connection_state: ConnectionState,
    pub connected_endpoint: Option<DeviceEndpoint>,
    pub endpoints: Vec<DeviceEndpoint>,
    /// Id of the endpoint preselected in the list: the first one found.
    pub default_endpoint: Option<usize>,
    /// Verdict currently on display.
    pub current_verdict: Option<BatteryVerdict>,
    pub clear_armed: bool,
}

/// Operator command sent to the dispatcher.
#[derive(Debug)]
enum MonitorCommand {
    RefreshEndpoints(oneshot::Sender<Vec<DeviceEndpoint>>),
    Connect {
        id: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    Disconnect(oneshot::Sender<()>),
    Snapshot(oneshot::Sender<MonitorSnapshot>),
    Shutdown,
}

/// Handle for driving a started [`Monitor`].
///
/// Dropping the handle stops the monitor the same way `shutdown` does.
#[derive(Debug)]
pub struct MonitorHandle {
    commands: mpsc::Sender<MonitorCommand>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> MonitorCommand,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| Error::MonitorStopped)?;
        reply_rx.await.map_err(|_| Error::MonitorStopped)
    }

    /// Enumerate endpoints again and publish the new list.
    pub async fn refresh_endpoints(&self) -> Result<Vec<DeviceEndpoint>> {
        self.request(MonitorCommand::RefreshEndpoints).await
    }

    /// Connect to the endpoint with `id` from the last enumeration.
    ///
    /// # Errors
    ///
    /// Returns the connect error (already shown to the operator), or
    /// [`Error::MonitorStopped`] if the dispatcher is gone.
    pub async fn connect(&self, id: usize) -> Result<()> {
        self.request(|reply| MonitorCommand::Connect { id, reply })
            .await?
    }

    /// Disconnect; a no-op when not connected.
    pub async fn disconnect(&self) -> Result<()> {
        self.request(MonitorCommand::Disconnect).await
    }

    pub async fn snapshot(&self) -> Result<MonitorSnapshot> {
        self.request(MonitorCommand::Snapshot).await
    }

    /// Disconnect, disarm the clear timer and wait for the dispatcher to
    /// finish.
    pub async fn shutdown(self) -> Result<()> {
        // A closed channel means the dispatcher already stopped.
        let _ = self.commands.send(MonitorCommand::Shutdown).await;

        match self.task.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => {
                error!("Monitor task failed: {}", e);
                Err(Error::MonitorStopped)
            }
        }
    }
}

/// The battery monitor.
pub struct Monitor<S> {
    connection: ConnectionMachine,
    registry: EndpointRegistry,
    scheduler: AutoClearScheduler,
    deadlines: mpsc::Receiver<ClearDeadline>,
    evaluator: BatteryEvaluator,
    clock: Box<dyn Clock>,
    sink: S,
    config: MonitorConfig,
    current: Option<BatteryVerdict>,
}

impl<S> Monitor<S>
where
    S: PresentationSink + 'static,
{
    /// Create a monitor with the default configuration and the system clock.
    pub fn new(reader: impl Into<AnyReader>, sink: S) -> Self {
        Self::assemble(reader.into(), sink, MonitorConfig::default(), Box::new(SystemClock))
    }

    /// Create a builder for a monitor with custom configuration or clock.
    pub fn builder(reader: impl Into<AnyReader>, sink: S) -> MonitorBuilder<S> {
        MonitorBuilder {
            reader: reader.into(),
            sink,
            config: MonitorConfig::default(),
            clock: Box::new(SystemClock),
        }
    }

    fn assemble(reader: AnyReader, sink: S, config: MonitorConfig, clock: Box<dyn Clock>) -> Self {
        let (scheduler, deadlines) = AutoClearScheduler::new(config.clear_after());

        Self {
            connection: ConnectionMachine::new(reader),
            registry: EndpointRegistry::new(),
            scheduler,
            deadlines,
            evaluator: BatteryEvaluator::new(config.battery_policy),
            clock,
            sink,
            config,
            current: None,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Spawn the dispatcher task.
    ///
    /// The endpoint list is enumerated and published before the first
    /// command is taken. Must be called from within a tokio runtime.
    pub fn start(self) -> MonitorHandle {
        let (commands_tx, commands_rx) = mpsc::channel(self.config.event_channel_capacity);
        let task = tokio::spawn(self.run(commands_rx));

        MonitorHandle {
            commands: commands_tx,
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<MonitorCommand>) {
        let mut events = self.connection.subscribe();
        if events.is_none() {
            warn!("Reader events were already taken; device events will not be shown");
        }

        self.refresh_endpoints();
        info!("Monitor started");

        loop {
            tokio::select! {
                biased;

                event = next_event(&mut events) => match event {
                    Some(event) => self.handle_reader_event(event).await,
                    None => {
                        warn!("Reader event channel closed");
                        events = None;
                    }
                },

                Some(deadline) = self.deadlines.recv() => self.handle_deadline(deadline),

                command = commands.recv() => match command {
                    Some(MonitorCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
            }
        }

        self.connection.disconnect(&mut self.sink).await;
        self.scheduler.disarm();
        info!("Monitor stopped");
    }

    async fn handle_reader_event(&mut self, event: ReaderEvent) {
        debug!("Reader event: {}", event.kind());

        match event {
            ReaderEvent::CardRead(cards) => self.on_cards_read(&cards),
            ReaderEvent::DeviceStateChanged { old, new } => {
                self.connection
                    .on_device_state_changed(old, new, &mut self.sink)
            }
            ReaderEvent::DeviceChanged(descriptor) => {
                self.connection
                    .on_device_changed(&descriptor, &mut self.sink)
            }
            ReaderEvent::ConfigurationRead(outcome) => {
                self.connection
                    .on_configuration_read(&outcome, &mut self.sink);
            }
            ReaderEvent::Error { message, cause } => {
                self.connection
                    .on_error(&message, cause.as_deref(), &mut self.sink)
                    .await
            }
            ReaderEvent::LogMessage(text) => debug!("Reader: {}", text),
        }
    }

    /// Show a verdict per card, then restart the clear timer once.
    fn on_cards_read(&mut self, cards: &[CardReading]) {
        if cards.is_empty() {
            debug!("Readout without cards ignored");
            return;
        }

        let today = self.clock.today();
        for card in cards {
            let verdict = self.evaluator.evaluate(card, today);
            debug!(
                "Card {} read: voltage {} ({}), battery age {} ({})",
                verdict.card_id,
                verdict.voltage.voltage_text(),
                verdict.voltage.status,
                verdict.age.battery_date_text(),
                verdict.age.status
            );
            self.sink
                .show_verdict(&verdict.card_id, &verdict.voltage, &verdict.age);
            self.current = Some(verdict);
        }

        self.scheduler.arm();
    }

    fn handle_deadline(&mut self, deadline: ClearDeadline) {
        if self.scheduler.fire(deadline) {
            debug!("Clearing display");
            self.current = None;
            self.sink.clear_display();
        } else {
            warn!(
                "Ignoring stale clear deadline (generation {}, current {})",
                deadline.generation,
                self.scheduler.generation()
            );
        }
    }

    async fn handle_command(&mut self, command: MonitorCommand) {
        match command {
            MonitorCommand::RefreshEndpoints(reply) => {
                self.refresh_endpoints();
                let _ = reply.send(self.registry.endpoints().to_vec());
            }
            MonitorCommand::Connect { id, reply } => {
                let result = self
                    .connection
                    .connect(&self.registry, id, &mut self.sink)
                    .await;
                let _ = reply.send(result);
            }
            MonitorCommand::Disconnect(reply) => {
                self.connection.disconnect(&mut self.sink).await;
                let _ = reply.send(());
            }
            MonitorCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            // Handled by the dispatcher loop.
            MonitorCommand::Shutdown => {}
        }
    }

    fn refresh_endpoints(&mut self) {
        let count = self.registry.refresh(self.connection.reader()).len();
        info!("Found {} reading device endpoint(s)", count);
        self.sink.set_endpoint_list(&self.registry.entries());
    }

    fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            connection_state: self.connection.state(),
            connected_endpoint: self.connection.connected_endpoint().cloned(),
            endpoints: self.registry.endpoints().to_vec(),
            default_endpoint: self.registry.default_selection().map(|endpoint| endpoint.id),
            current_verdict: self.current.clone(),
            clear_armed: self.scheduler.is_armed(),
        }
    }
}

/// Next reader event, or never if there is no receiver.
async fn next_event(events: &mut Option<mpsc::Receiver<ReaderEvent>>) -> Option<ReaderEvent> {
    match events {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

/// Builder for a [`Monitor`] with custom configuration or clock.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chrono::NaiveDate;
/// use siac_hardware::mock::MockReader;
/// use siac_monitor::{FixedClock, Monitor, MonitorConfig, RecordingSink};
///
/// let (reader, _device) = MockReader::new();
/// let monitor = Monitor::builder(reader, RecordingSink::new())
///     .config(MonitorConfig::default().with_clear_after(Duration::from_secs(2)))
///     .clock(FixedClock(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()))
///     .build()
///     .unwrap();
///
/// assert_eq!(monitor.config().clear_after(), Duration::from_secs(2));
/// ```
pub struct MonitorBuilder<S> {
    reader: AnyReader,
    sink: S,
    config: MonitorConfig,
    clock: Box<dyn Clock>,
}

impl<S> MonitorBuilder<S>
where
    S: PresentationSink + 'static,
{
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Build the monitor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn build(self) -> Result<Monitor<S>> {
        self.config.validate()?;
        Ok(Monitor::assemble(self.reader, self.sink, self.config, self.clock))
    }
}
