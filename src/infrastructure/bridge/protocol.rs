//! Peripheral Protocol
//!
//! Fixed service/characteristic UUIDs and the wire values the LED/button
//! peripheral firmware speaks. The UUIDs must match the firmware exactly;
//! they can be overridden through settings for rebuilt firmware.

/// User service: hosts the LED and button characteristics.
pub const USER_SERVICE_UUID: &str = "9f5e638c-edd8-4c26-9502-c0629f85ede5";

/// LED characteristic: accepts a single on/off byte.
pub const LED_CHARACTERISTIC_UUID: &str = "e9062e71-9e62-4bc6-b0d3-35cdcd9b027b";

/// Button characteristic: notifies a single state byte on press/release.
pub const BUTTON_CHARACTERISTIC_UUID: &str = "62fbd229-6edd-4d1a-b554-5c4e1bb29169";

/// PSDI service: fixed per-device identifier, read once per session.
pub const PSDI_SERVICE_UUID: &str = "e625601e-9e55-4597-a598-76018a0d293d";

/// PSDI characteristic UUID.
pub const PSDI_CHARACTERISTIC_UUID: &str = "26e2b12b-85f0-4f3f-9fdd-91d114270e6e";

/// LED payload: `0x01` switches on, `0x00` switches off.
pub fn led_payload(on: bool) -> [u8; 1] {
    if on {
        [0x01]
    } else {
        [0x00]
    }
}

/// Interpret a button notification. Only byte 0 carries state; non-zero
/// means pressed. Empty payloads carry nothing and are skipped.
pub fn button_pressed(payload: &[u8]) -> Option<bool> {
    payload.first().map(|byte| *byte != 0)
}

/// Render PSDI bytes as lowercase hex, two characters per byte, no
/// separators.
pub fn psdi_hex(value: &[u8]) -> String {
    hex::encode(value)
}
