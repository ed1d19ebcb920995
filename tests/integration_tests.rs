/*
 * Integration tests for smcread
 *
 * These tests drive complete reads through the public API against the
 * simulated controller: open, key info, byte fetch, decode, close.
 */

use smcread::config::{load_config, save_config_to, validate_config};
use smcread::key::{decode_type_tag, encode_key};
use smcread::sim::{OpenFailure, SimulatedController, STATUS_NOT_FOUND};
use smcread::wire::{SMC_CMD_READ_BYTES, SMC_CMD_READ_KEYINFO};
use smcread::{
    read_key, Controller, CpuKeys, Key, Metric, SensorReader, Session, SizePolicy, SmcConfig,
    SmcError, TypeTag,
};
use serial_test::serial;
use tempfile::TempDir;

fn mac_controller() -> SimulatedController {
    SimulatedController::new()
        .with_key(*b"TC0P", TypeTag::SP78, &[0x14, 0x00])
        .with_key(*b"TC1C", TypeTag::SP78, &[0x3c, 0x80])
        .with_key(*b"TC2C", TypeTag::SP78, &[0x3e, 0x00])
        .with_key(*b"TC3C", TypeTag::SP78, &[0x3d, 0x00])
        .with_key(*b"TC4C", TypeTag::SP78, &[0x3f, 0x80])
        .with_key(*b"F0Ac", TypeTag::FPE2, &[0x1f, 0x40])
        .with_key(*b"FNum", TypeTag::UI8, &[0x02])
        .with_key(*b"B0Ct", TypeTag::UI16, &[0x01, 0x2c])
        .with_key(*b"MSAc", TypeTag::from_bytes(*b"flt "), &[0x00, 0x00, 0x80, 0x3f])
}

#[test]
fn test_read_sensor_end_to_end() {
    let reader = SensorReader::new(mac_controller());
    assert_eq!(reader.read_sensor("TC0P"), 20.0);
    assert_eq!(reader.read_sensor("F0Ac"), 2000.0);
    assert_eq!(reader.read_sensor("FNum"), 2.0);
    assert_eq!(reader.read_sensor("B0Ct"), 300.0);
}

#[test]
fn test_read_sensor_phase_order() {
    let reader = SensorReader::new(mac_controller());
    reader.read_sensor("TC0P");

    let requests = reader.controller().requests();
    assert_eq!(reader.controller().commands(), vec![SMC_CMD_READ_KEYINFO, SMC_CMD_READ_BYTES]);
    assert!(requests.iter().all(|r| r.key == encode_key(b"TC0P")));
    assert_eq!(requests[1].key_info.data_size, 2);
    assert_eq!(requests[1].key_info.data_type, 0);
}

#[test]
fn test_malformed_key_is_fallback_not_crash() {
    let reader = SensorReader::new(mac_controller());
    // valid shape, unknown to the controller
    assert_eq!(reader.read_sensor("BAD!"), 0.0);
    // wrong shape, rejected before any session
    assert_eq!(reader.read_sensor("BAD"), 0.0);
    assert_eq!(reader.read_sensor("BAD!!"), 0.0);
    assert!(matches!(reader.read("BAD"), Err(SmcError::InvalidKey(_))));
    assert_eq!(reader.controller().opens(), 1);
}

#[test]
fn test_unsupported_type_tag_is_zero() {
    let reader = SensorReader::new(mac_controller());
    let reading = reader.read("MSAc").unwrap();
    assert_eq!(reading.data_type, "flt ");
    assert_eq!(reading.value, 0.0);
}

#[test]
fn test_key_info_failure_never_fetches() {
    let sim = mac_controller().fail_command(SMC_CMD_READ_KEYINFO, STATUS_NOT_FOUND);
    let reader = SensorReader::new(sim);
    assert_eq!(reader.read_sensor("TC0P"), 0.0);
    assert_eq!(reader.controller().commands(), vec![SMC_CMD_READ_KEYINFO]);
}

#[test]
fn test_fetch_failure_surfaces_status() {
    let sim = mac_controller().fail_command(SMC_CMD_READ_BYTES, -42);
    let mut session = Session::open(&sim).unwrap();
    let err = read_key(&mut session, Key::new("TC0P").unwrap(), SizePolicy::Trust).unwrap_err();
    assert!(matches!(err, SmcError::CallFailed(-42)));
}

#[test]
fn test_strict_size_policy() {
    let sim = mac_controller().report_fetch_size(1);
    let strict = SensorReader::new(sim).with_size_policy(SizePolicy::Strict);
    assert!(matches!(strict.read("TC0P"), Err(SmcError::SizeMismatch { expected: 2, actual: 1, .. })));
    assert_eq!(strict.read_sensor("TC0P"), 0.0);

    let trusting = SensorReader::new(mac_controller().report_fetch_size(1));
    assert_eq!(trusting.read_sensor("TC0P"), 20.0);
}

#[test]
fn test_open_failures_are_zero() {
    let reader = SensorReader::new(mac_controller().fail_open(OpenFailure::ServiceNotFound));
    assert!(matches!(reader.read("TC0P"), Err(SmcError::ServiceNotFound(_))));
    assert_eq!(reader.read_sensor("TC0P"), 0.0);

    let reader = SensorReader::new(mac_controller().fail_open(OpenFailure::ConnectionRefused(-3)));
    assert!(matches!(reader.read("TC0P"), Err(SmcError::ConnectionFailed(-3))));
}

#[test]
fn test_opens_match_closes_across_outcomes() {
    let reader = SensorReader::new(mac_controller().report_fetch_size(9).with_key(
        *b"XL32",
        TypeTag::UI32,
        &[0; 4],
    ))
    .with_size_policy(SizePolicy::Strict);

    for name in ["TC0P", "NONE", "BAD", "F0Ac", "MSAc", "TC1C", "toolong"] {
        reader.read_sensor(name);
    }
    reader.read_many(["TC0P", "NONE", "FNum"]);
    reader.cpu_temperature(&CpuKeys::default());

    let sim = reader.controller();
    assert!(sim.opens() > 0);
    assert_eq!(sim.opens(), sim.closes());
    assert_eq!(sim.open_sessions(), 0);
}

#[test]
fn test_session_reused_for_several_reads() {
    let sim = mac_controller();
    {
        let mut session = Session::open(&sim).unwrap();
        for name in ["TC0P", "F0Ac", "FNum"] {
            let raw = read_key(&mut session, Key::new(name).unwrap(), SizePolicy::Trust).unwrap();
            assert!(raw.size > 0);
        }
        assert_eq!(sim.open_sessions(), 1);
    }
    assert_eq!(sim.opens(), 1);
    assert_eq!(sim.closes(), 1);
}

#[test]
fn test_cpu_temperature_aggregate() {
    let reader = SensorReader::new(mac_controller());
    let temp = reader.cpu_temperature(&CpuKeys::default());
    assert_eq!(temp.cores, vec![60.5, 62.0, 61.0, 63.5]);
    assert_eq!(temp.main, Some(61.75));
    assert_eq!(temp.max, Some(63.5));
}

#[test]
fn test_round_trip_through_public_api() {
    for name in ["TC0P", "sp78", "ui8 ", "#KEY", "F0Ac"] {
        assert_eq!(decode_type_tag(encode_key(Key::new(name).unwrap().as_bytes())).to_string(), name);
    }
}

#[test]
fn test_simulator_open_without_reads() {
    let sim = mac_controller();
    let conn = sim.open().unwrap();
    sim.close(conn);
    assert_eq!(sim.opens(), sim.closes());
}

#[test]
#[serial]
fn test_config_drives_reader() {
    let dir = TempDir::new().unwrap();
    let old = std::env::var("XDG_CONFIG_HOME").ok();
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    let cfg = SmcConfig {
        metric: Metric::F,
        size_policy: SizePolicy::Strict,
        cpu_keys: CpuKeys {
            package: "TC0P".into(),
            cores: vec!["TC1C".into(), "TC2C".into()],
        },
    };
    save_config_to(&dir.path().join("smcread").join("config.json"), &cfg).unwrap();
    let loaded = load_config().unwrap();

    match old {
        Some(v) => std::env::set_var("XDG_CONFIG_HOME", v),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }

    assert_eq!(loaded, cfg);
    assert!(validate_config(&loaded).is_ok());

    let reader = SensorReader::new(mac_controller()).with_size_policy(loaded.size_policy);
    let temp = reader.cpu_temperature(&loaded.cpu_keys);
    assert_eq!(temp.main, Some(61.25));
    let (main_f, unit) = loaded.metric.convert_temp(temp.main.unwrap());
    assert_eq!(unit, "°F");
    assert!((main_f - 142.25).abs() < 1e-9);
}
