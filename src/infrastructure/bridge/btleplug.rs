//! btleplug Backend
//!
//! Bridge implementation over the system Bluetooth stack. Device selection
//! is a filtered scan with a deadline standing in for an interactive
//! chooser; notification and disconnect delivery are forwarded into
//! channels by small spawned tasks that end when their receiver is dropped.

use crate::domain::error::BridgeError;
use crate::infrastructure::bridge::{
    BleBridge, CharacteristicHandle, DeviceHandle, ServiceHandle,
};
use btleplug::api::{
    Central, CentralEvent, CentralState, Characteristic, Manager as _, Peripheral as _,
    ScanFilter, Service, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Delay between peripheral-list polls while selecting.
const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// How device selection narrows the scan.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Service the peripheral must advertise.
    pub user_service: Uuid,
    /// Optional advertised-name substring match.
    pub name_filter: Option<String>,
    /// Give up on selection after this long.
    pub scan_timeout: Duration,
}

pub struct BtleplugBridge {
    adapter: Adapter,
    config: SelectionConfig,
}

impl BtleplugBridge {
    /// Acquire the first Bluetooth adapter. Failure here is the
    /// initialization failure class: nothing else can proceed without an
    /// adapter.
    pub async fn new(config: SelectionConfig) -> Result<Self, BridgeError> {
        let manager = Manager::new().await?;
        let mut adapters = manager.adapters().await?;
        if adapters.is_empty() {
            return Err(BridgeError::new("no-adapter", "no Bluetooth adapter found"));
        }
        let adapter = adapters.remove(0);
        Ok(Self { adapter, config })
    }

    async fn find_matching(&self) -> Result<Option<BtleplugDevice>, BridgeError> {
        for peripheral in self.adapter.peripherals().await? {
            let Some(properties) = peripheral.properties().await? else {
                continue;
            };
            if !properties.services.contains(&self.config.user_service) {
                continue;
            }
            let name = properties.local_name.unwrap_or_default();
            if let Some(filter) = &self.config.name_filter {
                if !name.contains(filter.as_str()) {
                    continue;
                }
            }
            info!(%name, "matching peripheral found");
            let id = peripheral.address().to_string();
            return Ok(Some(BtleplugDevice {
                adapter: self.adapter.clone(),
                peripheral,
                name: if name.is_empty() {
                    "Unknown".to_string()
                } else {
                    name
                },
                id,
            }));
        }
        Ok(None)
    }
}

impl BleBridge for BtleplugBridge {
    type Device = BtleplugDevice;

    async fn availability(&self) -> Result<bool, BridgeError> {
        // A powered-off adapter still enumerates, so ask for its power
        // state. Backends that cannot answer report `Unknown`, which
        // counts as usable.
        let state = self.adapter.adapter_state().await?;
        Ok(!matches!(state, CentralState::PoweredOff))
    }

    async fn request_device(&self) -> Result<BtleplugDevice, BridgeError> {
        let filter = ScanFilter {
            services: vec![self.config.user_service],
        };
        self.adapter.start_scan(filter).await?;
        debug!(timeout = ?self.config.scan_timeout, "scanning for peripheral");

        let deadline = Instant::now() + self.config.scan_timeout;
        let selected = loop {
            if let Some(found) = self.find_matching().await? {
                break found;
            }
            if Instant::now() >= deadline {
                let _ = self.adapter.stop_scan().await;
                return Err(BridgeError::new(
                    "selection-timeout",
                    "no matching peripheral found",
                ));
            }
            sleep(SCAN_POLL_INTERVAL).await;
        };

        if let Err(err) = self.adapter.stop_scan().await {
            warn!(%err, "could not stop scan");
        }
        Ok(selected)
    }
}

pub struct BtleplugDevice {
    adapter: Adapter,
    peripheral: Peripheral,
    name: String,
    id: String,
}

impl DeviceHandle for BtleplugDevice {
    type Service = BtleplugService;

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &str {
        &self.id
    }

    async fn connect(&mut self) -> Result<(), BridgeError> {
        self.peripheral.connect().await?;
        // Populate the service cache up front; primary_service is then a
        // plain lookup.
        self.peripheral.discover_services().await?;
        Ok(())
    }

    async fn primary_service(&self, uuid: Uuid) -> Result<BtleplugService, BridgeError> {
        self.peripheral
            .services()
            .into_iter()
            .find(|service| service.uuid == uuid)
            .map(|service| BtleplugService {
                peripheral: self.peripheral.clone(),
                service,
            })
            .ok_or_else(|| {
                BridgeError::new("service-not-found", format!("service {uuid} not found"))
            })
    }

    async fn subscribe_disconnects(
        &mut self,
    ) -> Result<mpsc::UnboundedReceiver<()>, BridgeError> {
        let mut events = self.adapter.events().await?;
        let target = self.peripheral.id();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if tx.is_closed() {
                    break;
                }
                if let CentralEvent::DeviceDisconnected(id) = event {
                    if id == target && tx.send(()).is_err() {
                        break;
                    }
                }
            }
        });
        Ok(rx)
    }
}

pub struct BtleplugService {
    peripheral: Peripheral,
    service: Service,
}

impl ServiceHandle for BtleplugService {
    type Characteristic = BtleplugCharacteristic;

    async fn characteristic(&self, uuid: Uuid) -> Result<BtleplugCharacteristic, BridgeError> {
        self.service
            .characteristics
            .iter()
            .find(|characteristic| characteristic.uuid == uuid)
            .cloned()
            .map(|characteristic| BtleplugCharacteristic {
                peripheral: self.peripheral.clone(),
                characteristic,
            })
            .ok_or_else(|| {
                BridgeError::new(
                    "characteristic-not-found",
                    format!("characteristic {uuid} not found"),
                )
            })
    }
}

pub struct BtleplugCharacteristic {
    peripheral: Peripheral,
    characteristic: Characteristic,
}

impl CharacteristicHandle for BtleplugCharacteristic {
    async fn read(&self) -> Result<Vec<u8>, BridgeError> {
        Ok(self.peripheral.read(&self.characteristic).await?)
    }

    async fn write(&self, payload: &[u8]) -> Result<(), BridgeError> {
        self.peripheral
            .write(&self.characteristic, payload, WriteType::WithResponse)
            .await?;
        Ok(())
    }

    async fn subscribe(&mut self) -> Result<mpsc::UnboundedReceiver<Vec<u8>>, BridgeError> {
        self.peripheral.subscribe(&self.characteristic).await?;
        let mut notifications = self.peripheral.notifications().await?;
        let uuid = self.characteristic.uuid;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(notification) = notifications.next().await {
                if notification.uuid == uuid && tx.send(notification.value).is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }
}

impl From<btleplug::Error> for BridgeError {
    fn from(err: btleplug::Error) -> Self {
        use btleplug::Error;
        let code = match &err {
            Error::PermissionDenied => "permission-denied",
            Error::DeviceNotFound => "device-not-found",
            Error::NotConnected => "not-connected",
            Error::NoSuchCharacteristic => "no-such-characteristic",
            Error::NotSupported(_) => "not-supported",
            Error::TimedOut(_) => "timed-out",
            _ => "bridge-error",
        };
        BridgeError::new(code, err.to_string())
    }
}
