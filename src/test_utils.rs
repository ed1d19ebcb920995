/*
 * Test utilities and fixtures for smcread
 *
 * Shared simulated controllers and raw values used by the unit tests of
 * several modules.
 */

use crate::key::TypeTag;
use crate::reader::RawValue;
use crate::sim::SimulatedController;

/// A controller with a package sensor, two hot cores, an idle core, a fan and a counter
pub fn sample_controller() -> SimulatedController {
    SimulatedController::new()
        .with_key(*b"TC0P", TypeTag::SP78, &[0x14, 0x00])
        .with_key(*b"TC1C", TypeTag::SP78, &[0x28, 0x00])
        .with_key(*b"TC2C", TypeTag::SP78, &[0x32, 0x00])
        .with_key(*b"TC3C", TypeTag::SP78, &[0x00, 0x00])
        .with_key(*b"F0Ac", TypeTag::FPE2, &[0x17, 0x70])
        .with_key(*b"BNum", TypeTag::UI8, &[0x2a])
}

/// Raw value with the given tag and payload
pub fn raw_value(tag: &[u8; 4], data: &[u8]) -> RawValue {
    RawValue::new(TypeTag::from_bytes(*tag), data)
}
