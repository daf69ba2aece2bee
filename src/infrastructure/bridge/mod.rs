//! BLE Bridge Module
//!
//! Capability traits over the host Bluetooth stack, mirroring the shape of
//! a GATT client API: availability query and device selection on the
//! bridge, connect/service lookup on the device, characteristic lookup on
//! the service, and read/write/notify on the characteristic.
//!
//! Notifications and disconnect events are delivered through channels;
//! dropping a receiver detaches the listener, so detach is idempotent by
//! construction.
//!
//! ## Modules
//!
//! - [`protocol`] - Peripheral UUIDs and wire values
//! - [`btleplug`] - Production backend over the system Bluetooth stack

pub mod btleplug;
pub mod protocol;

use crate::domain::error::BridgeError;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Entry point into the host Bluetooth stack.
#[allow(async_fn_in_trait)]
pub trait BleBridge {
    type Device: DeviceHandle;

    /// Whether Bluetooth is usable right now. `Ok(false)` is not an error;
    /// callers are expected to re-query later.
    async fn availability(&self) -> Result<bool, BridgeError>;

    /// Select one peripheral and hand back its handle. Fails when the
    /// selection is canceled or nothing matching turns up.
    async fn request_device(&self) -> Result<Self::Device, BridgeError>;
}

/// One discovered peripheral. Valid for at most one GATT session.
#[allow(async_fn_in_trait)]
pub trait DeviceHandle {
    type Service: ServiceHandle;

    fn name(&self) -> &str;
    fn id(&self) -> &str;

    /// Establish the GATT session.
    async fn connect(&mut self) -> Result<(), BridgeError>;

    async fn primary_service(&self, uuid: Uuid) -> Result<Self::Service, BridgeError>;

    /// Channel yielding one message per physical disconnect. Dropping the
    /// receiver detaches the listener.
    async fn subscribe_disconnects(&mut self)
        -> Result<mpsc::UnboundedReceiver<()>, BridgeError>;
}

#[allow(async_fn_in_trait)]
pub trait ServiceHandle {
    type Characteristic: CharacteristicHandle;

    async fn characteristic(&self, uuid: Uuid) -> Result<Self::Characteristic, BridgeError>;
}

#[allow(async_fn_in_trait)]
pub trait CharacteristicHandle {
    async fn read(&self) -> Result<Vec<u8>, BridgeError>;

    async fn write(&self, payload: &[u8]) -> Result<(), BridgeError>;

    /// Start notifications; raw payloads arrive on the returned channel
    /// until the session ends or the receiver is dropped.
    async fn subscribe(&mut self) -> Result<mpsc::UnboundedReceiver<Vec<u8>>, BridgeError>;
}
