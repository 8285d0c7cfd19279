#![no_main]

use libfuzzer_sys::fuzz_target;
use rvlift::{LowLevelIl, RiscVArchitecture};

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let (Ok(rv32), Ok(rv64)) = (RiscVArchitecture::rv32(), RiscVArchitecture::rv64()) else {
        return;
    };

    // First eight bytes pick the address
    let mut addr = [0u8; 8];
    addr.copy_from_slice(&data[..8]);
    let addr = u64::from_le_bytes(addr);
    let code = &data[8..];

    for arch in [&rv32, &rv64] {
        let addr = addr & if arch.address_size() == 4 { 0xFFFF_FFFF } else { u64::MAX };
        let mut il = LowLevelIl::new();
        let decoded = arch.instruction_info(code, addr).is_some();
        match arch.instruction_il(code, addr, &mut il) {
            Some(length) => {
                assert!(decoded);
                assert_eq!(length, 4);
                assert!(!il.is_empty());
                let _ = il.to_text();
            }
            None => assert!(!decoded && il.is_empty()),
        }
    }
});
