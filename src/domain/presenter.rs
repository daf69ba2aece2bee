/// Rendering surface the controller reports into.
///
/// The controller never draws anything itself; every visible state change
/// goes through one of these setters. Implementations must not call back
/// into the controller.
pub trait Presenter {
    /// Connected/disconnected banner plus showing or hiding the device
    /// controls.
    fn set_connected(&mut self, connected: bool);

    /// Momentary pressed/released visual for the peripheral button.
    fn set_button_pressed(&mut self, pressed: bool);

    fn set_led_on(&mut self, on: bool);

    /// One more completed click (counted on release).
    fn increment_click_count(&mut self);

    /// Failure display. `code` may be empty for plain status messages such
    /// as "Bluetooth not available"; `keep_loading` keeps the busy
    /// indicator visible while the controller retries.
    fn show_error(&mut self, code: &str, message: &str, keep_loading: bool);

    fn set_device_identity(&mut self, name: &str, id: &str);

    /// PSDI value, already rendered as lowercase hex.
    fn set_device_secondary_id(&mut self, hex: &str);
}
