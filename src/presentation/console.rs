//! Console Presenter
//!
//! Terminal rendering of controller state, standing in for the status
//! panel and device controls.

use crate::domain::presenter::Presenter;

#[derive(Debug, Default)]
pub struct ConsolePresenter {
    click_count: u64,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for ConsolePresenter {
    fn set_connected(&mut self, connected: bool) {
        if connected {
            println!("Device connected (type `led` to toggle, `quit` to exit)");
        } else {
            println!("Device disconnected");
        }
    }

    fn set_button_pressed(&mut self, pressed: bool) {
        println!("Button: {}", if pressed { "pressed" } else { "released" });
    }

    fn set_led_on(&mut self, on: bool) {
        println!("LED: {}", if on { "on" } else { "off" });
    }

    fn increment_click_count(&mut self) {
        self.click_count += 1;
        println!("Clicks: {}", self.click_count);
    }

    fn show_error(&mut self, code: &str, message: &str, keep_loading: bool) {
        if code.is_empty() {
            // Status message, not a failure
            if keep_loading {
                println!("{message} (retrying...)");
            } else {
                println!("{message}");
            }
        } else {
            println!("Error\n{code}\n{message}");
        }
    }

    fn set_device_identity(&mut self, name: &str, id: &str) {
        println!("Device: {name} ({id})");
    }

    fn set_device_secondary_id(&mut self, hex: &str) {
        println!("PSDI: {hex}");
    }
}
