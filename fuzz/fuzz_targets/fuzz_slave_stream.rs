#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rtu_slave_sim::{verify_crc, ModbusSlave, Simulator};

#[derive(Debug, Arbitrary)]
struct Input {
    addresses: Vec<u8>,
    chunks: Vec<Vec<u8>>,
}

fuzz_target!(|input: Input| {
    let mut simulator: Simulator = input
        .addresses
        .iter()
        .take(8)
        .enumerate()
        .map(|(i, &address)| (format!("dev{}", i), ModbusSlave::new(address)))
        .collect();

    for chunk in input.chunks.iter().take(64) {
        if let Some(response) = simulator.deliver_chunk(chunk) {
            assert!(verify_crc(&response));
            assert!(response.len() <= 256);
            assert!(input.addresses.contains(&response[0]));
        }
    }
});
