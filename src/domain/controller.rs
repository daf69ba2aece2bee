//! Connection Lifecycle Controller
//!
//! Drives availability check → device selection → GATT connect → service
//! and characteristic resolution → steady state, plus the
//! disconnect → reset → retry loop. Steps run strictly in sequence; a
//! later step never starts before the previous one resolved.
//!
//! Session state (`led_on`, click count, stored handles) lives on the
//! controller instance rather than in globals; handles die with the
//! session value so nothing stale survives a reconnect.

use crate::domain::error::LifecycleError;
use crate::domain::models::{Command, LifecycleState};
use crate::domain::presenter::Presenter;
use crate::infrastructure::bridge::{
    protocol, BleBridge, CharacteristicHandle, DeviceHandle, ServiceHandle,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Fixed identifiers and timing the controller works with.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub user_service: Uuid,
    pub led_characteristic: Uuid,
    pub button_characteristic: Uuid,
    pub psdi_service: Uuid,
    pub psdi_characteristic: Uuid,
    /// Delay before re-querying availability after a negative answer.
    pub availability_recheck: Duration,
}

/// Sending half handed to whoever triggers controller actions.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl ControllerHandle {
    pub fn toggle_led(&self) {
        self.send(Command::ToggleLed);
    }

    pub fn reconnect(&self) {
        self.send(Command::Reconnect);
    }

    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }

    pub fn send(&self, command: Command) {
        let _ = self.commands.send(command);
    }
}

/// How a session ended, as opposed to failing.
enum SessionEnd {
    Disconnected,
    Shutdown,
}

/// Handles retained for the lifetime of one GATT session.
struct Session<D: DeviceHandle> {
    // Held so the GATT session outlives the handles resolved from it.
    _device: D,
    led: <D::Service as ServiceHandle>::Characteristic,
    button_events: mpsc::UnboundedReceiver<Vec<u8>>,
    /// `Some` while the disconnect listener is attached; taking it is the
    /// idempotent detach.
    disconnects: Option<mpsc::UnboundedReceiver<()>>,
}

pub struct Controller<B: BleBridge, P: Presenter> {
    bridge: B,
    presenter: P,
    config: ControllerConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    state: LifecycleState,
    led_on: bool,
    click_count: u64,
}

impl<B: BleBridge, P: Presenter> Controller<B, P> {
    pub fn new(bridge: B, presenter: P, config: ControllerConfig) -> (Self, ControllerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                bridge,
                presenter,
                config,
                commands: rx,
                state: LifecycleState::Init,
                led_on: false,
                click_count: 0,
            },
            ControllerHandle { commands: tx },
        )
    }

    /// Run the lifecycle until shutdown. A step failure parks the
    /// controller in the error state; a manual reconnect restarts it, a
    /// shutdown surfaces the failure to the caller.
    pub async fn run(mut self) -> Result<(), LifecycleError> {
        loop {
            match self.run_session().await {
                Ok(SessionEnd::Shutdown) => {
                    info!("controller shutting down");
                    return Ok(());
                }
                Ok(SessionEnd::Disconnected) => {
                    debug!("restarting lifecycle after disconnect");
                }
                Err(err) => {
                    self.set_state(LifecycleState::Error);
                    warn!(code = err.code(), message = err.message(), "lifecycle failed");
                    self.presenter.show_error(err.code(), err.message(), false);
                    if !self.await_manual_reconnect().await {
                        return Err(err);
                    }
                }
            }
        }
    }

    /// One pass from availability check to the end of a session.
    async fn run_session(&mut self) -> Result<SessionEnd, LifecycleError> {
        self.set_state(LifecycleState::CheckingAvailability);
        loop {
            let available = self
                .bridge
                .availability()
                .await
                .map_err(LifecycleError::Availability)?;
            if available {
                break;
            }
            // Not a failure, just "ask again later": keep the busy
            // indicator up while waiting.
            self.presenter.show_error("", "Bluetooth not available", true);
            if let Some(end) = self.recheck_delay().await {
                return Ok(end);
            }
        }
        self.presenter.set_connected(false);

        self.set_state(LifecycleState::AwaitingDeviceSelection);
        let mut device = self
            .bridge
            .request_device()
            .await
            .map_err(LifecycleError::Selection)?;
        info!(name = device.name(), id = device.id(), "device selected");

        self.set_state(LifecycleState::Connecting);
        device.connect().await.map_err(LifecycleError::Connect)?;

        self.set_state(LifecycleState::ResolvingServices);
        let user_service = device
            .primary_service(self.config.user_service)
            .await
            .map_err(LifecycleError::Resolve)?;
        let psdi_service = device
            .primary_service(self.config.psdi_service)
            .await
            .map_err(LifecycleError::Resolve)?;

        let mut button = user_service
            .characteristic(self.config.button_characteristic)
            .await
            .map_err(LifecycleError::Resolve)?;
        let led = user_service
            .characteristic(self.config.led_characteristic)
            .await
            .map_err(LifecycleError::Resolve)?;
        let psdi = psdi_service
            .characteristic(self.config.psdi_characteristic)
            .await
            .map_err(LifecycleError::Resolve)?;

        // PSDI is read exactly once per session.
        let psdi_value = psdi.read().await.map_err(LifecycleError::Read)?;
        let secondary_id = protocol::psdi_hex(&psdi_value);
        info!(psdi = %secondary_id, "device identifier read");
        self.presenter.set_device_identity(device.name(), device.id());
        self.presenter.set_device_secondary_id(&secondary_id);

        let button_events = button.subscribe().await.map_err(LifecycleError::Resolve)?;
        let disconnects = device
            .subscribe_disconnects()
            .await
            .map_err(LifecycleError::Resolve)?;

        // Every session starts with the LED switched off.
        self.led_on = false;
        led.write(&protocol::led_payload(false))
            .await
            .map_err(LifecycleError::Write)?;
        self.presenter.set_led_on(false);

        // Connected is reported only once everything above succeeded.
        self.presenter.set_connected(true);
        self.set_state(LifecycleState::Ready);

        let mut session = Session {
            _device: device,
            led,
            button_events,
            disconnects: Some(disconnects),
        };
        self.steady_state(&mut session).await
    }

    async fn steady_state(
        &mut self,
        session: &mut Session<B::Device>,
    ) -> Result<SessionEnd, LifecycleError> {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::ToggleLed) => self.toggle_led(session).await?,
                    Some(Command::Reconnect) => {
                        info!("manual reconnect requested");
                        self.reset_session(session);
                        return Ok(SessionEnd::Disconnected);
                    }
                    Some(Command::Shutdown) | None => return Ok(SessionEnd::Shutdown),
                },
                payload = session.button_events.recv() => match payload {
                    Some(payload) => self.on_button_notification(&payload),
                    None => {
                        // The notification channel dying means the link is
                        // gone even if no disconnect event arrived.
                        warn!("notification channel closed");
                        self.reset_session(session);
                        return Ok(SessionEnd::Disconnected);
                    }
                },
                _ = wait_disconnect(&mut session.disconnects) => {
                    info!("device disconnected");
                    self.reset_session(session);
                    return Ok(SessionEnd::Disconnected);
                }
            }
        }
    }

    /// Flip the LED: local flag and presenter first, then one write. The
    /// flag is intentionally not rolled back when the write fails.
    async fn toggle_led(
        &mut self,
        session: &mut Session<B::Device>,
    ) -> Result<(), LifecycleError> {
        self.led_on = !self.led_on;
        self.presenter.set_led_on(self.led_on);
        debug!(on = self.led_on, "writing LED state");
        session
            .led
            .write(&protocol::led_payload(self.led_on))
            .await
            .map_err(LifecycleError::Write)
    }

    fn on_button_notification(&mut self, payload: &[u8]) {
        match protocol::button_pressed(payload) {
            Some(true) => self.presenter.set_button_pressed(true),
            Some(false) => {
                // A click is counted on release, not on press.
                self.presenter.set_button_pressed(false);
                self.click_count += 1;
                self.presenter.increment_click_count();
            }
            None => debug!("empty button notification ignored"),
        }
    }

    /// Per-session reset on the way out of `Ready`. The listener detach is
    /// an `Option::take`, so a duplicate disconnect is a no-op. The click
    /// count deliberately survives.
    fn reset_session(&mut self, session: &mut Session<B::Device>) {
        self.set_state(LifecycleState::Disconnected);
        self.presenter.set_connected(false);
        drop(session.disconnects.take());
        self.led_on = false;
        self.presenter.set_led_on(false);
        self.presenter.set_button_pressed(false);
    }

    /// Fixed-delay availability recheck. Commands other than shutdown are
    /// not actionable without a device and are dropped.
    async fn recheck_delay(&mut self) -> Option<SessionEnd> {
        let delay = sleep(self.config.availability_recheck);
        tokio::pin!(delay);
        loop {
            tokio::select! {
                _ = &mut delay => return None,
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => return Some(SessionEnd::Shutdown),
                    Some(other) => debug!(?other, "ignored while Bluetooth is unavailable"),
                },
            }
        }
    }

    /// Park in the error state until a reconnect is requested. Returns
    /// false when shutdown was requested instead.
    async fn await_manual_reconnect(&mut self) -> bool {
        loop {
            match self.commands.recv().await {
                Some(Command::Reconnect) => return true,
                Some(Command::ToggleLed) => debug!("toggle ignored without a device"),
                Some(Command::Shutdown) | None => return false,
            }
        }
    }

    fn set_state(&mut self, next: LifecycleState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "lifecycle transition");
            self.state = next;
        }
    }
}

async fn wait_disconnect(disconnects: &mut Option<mpsc::UnboundedReceiver<()>>) {
    match disconnects {
        Some(rx) => {
            // Either a disconnect event or the backend dropping its sender
            // ends the session.
            let _ = rx.recv().await;
        }
        None => std::future::pending().await,
    }
}
