//! Loading and saving device snapshots on disk.

use std::fs;

use rtu_slave_sim::snapshot::{load_dir, load_file, save_dir};
use rtu_slave_sim::{ModbusSlave, SimError, Simulator, REGISTER_COUNT};

#[test]
fn test_load_dir_names_devices_by_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("boiler.json"),
        r#"{"ID_Slave": 1, "Registros": [10, 20], "Entradas": [true, false, true], "Saidas": []}"#,
    )
    .unwrap();
    fs::write(dir.path().join("pump.json"), r#"{"ID_Slave": 2}"#).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let sim = load_dir(dir.path()).unwrap();
    assert_eq!(sim.names().collect::<Vec<_>>(), vec!["boiler", "pump"]);

    let boiler = sim.get("boiler").unwrap().device();
    assert_eq!(boiler.address(), 1);
    assert_eq!(&boiler.registers()[..3], &[10, 20, 0]);
    assert_eq!(&boiler.discrete_inputs()[..3], &[true, false, true]);
    assert_eq!(sim.get("pump").unwrap().address(), 2);
}

#[test]
fn test_load_dir_skips_malformed_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("good.json"), r#"{"ID_Slave": 5}"#).unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

    let sim = load_dir(dir.path()).unwrap();
    assert_eq!(sim.len(), 1);
    assert!(sim.get("good").is_some());
}

#[test]
fn test_load_dir_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("dados");
    assert!(matches!(
        load_dir(&missing),
        Err(SimError::DataDirMissing { .. })
    ));
}

#[test]
fn test_save_then_load_preserves_memory() {
    let dir = tempfile::tempdir().unwrap();

    let mut slave = ModbusSlave::new(3);
    slave.device_mut().set_register(REGISTER_COUNT - 1, 0xFFFF).unwrap();
    slave.device_mut().set_coil(10, true).unwrap();
    slave.device_mut().set_discrete_input(63, true).unwrap();

    let mut sim = Simulator::new();
    sim.insert("meter", slave);
    assert_eq!(save_dir(dir.path(), &sim).unwrap(), 1);

    let restored = load_file(&dir.path().join("meter.json")).unwrap();
    assert_eq!(&restored, sim.get("meter").unwrap().device());
}

#[test]
fn test_saved_file_uses_snapshot_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = Simulator::new();
    sim.insert("dev", ModbusSlave::new(7));
    save_dir(dir.path(), &sim).unwrap();

    let text = fs::read_to_string(dir.path().join("dev.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["ID_Slave"], 7);
    assert_eq!(value["Registros"].as_array().map(Vec::len), Some(100));
    assert_eq!(value["Entradas"].as_array().map(Vec::len), Some(64));
    assert_eq!(value["Saidas"].as_array().map(Vec::len), Some(64));
    // pretty-printed
    assert!(text.contains('\n'));
}

#[test]
fn test_served_writes_survive_save() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = Simulator::new();
    sim.insert("dev", ModbusSlave::new(1));

    // FC06 write 0x002A to register 0x10
    let reply = sim.deliver_chunk(&[0x01, 0x06, 0x00, 0x10, 0x00, 0x2A, 0x09, 0xD0]);
    assert!(reply.is_some());
    save_dir(dir.path(), &sim).unwrap();

    let restored = load_dir(dir.path()).unwrap();
    assert_eq!(
        restored.get("dev").unwrap().device().registers()[0x10],
        0x002A
    );
}
