/// States of one connection lifecycle attempt.
///
/// `Error` is terminal for the attempt; only a manual reconnect or a
/// shutdown leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Init,
    CheckingAvailability,
    AwaitingDeviceSelection,
    Connecting,
    ResolvingServices,
    Ready,
    Disconnected,
    Error,
}

/// External triggers accepted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Flip the LED and write the new state to the peripheral.
    ToggleLed,
    /// Tear the current session down (or leave the error state) and restart
    /// the lifecycle from the availability check.
    Reconnect,
    /// Stop the controller.
    Shutdown,
}
