#![no_main]

use libfuzzer_sys::fuzz_target;
use rvlift::{tokens_to_string, RiscVArchitecture};

fuzz_target!(|data: &[u8]| {
    let (Ok(rv32), Ok(rv64)) = (RiscVArchitecture::rv32(), RiscVArchitecture::rv64()) else {
        return;
    };

    for arch in [&rv32, &rv64] {
        // Walk the buffer, skipping one word on failure
        let mut offset = 0;
        let mut count = 0;
        while offset < data.len() && count < 100 {
            let addr = 0x1000 + offset as u64;
            let bytes = &data[offset..];
            let info = arch.instruction_info(bytes, addr);
            let text = arch.instruction_text(bytes, addr);

            match (info, text) {
                (Some(info), Some((tokens, length))) => {
                    // Fixed-width encodings only
                    assert_eq!(info.length, 4);
                    assert_eq!(length, 4);
                    assert!(info.branches.len() <= 2);
                    assert!(!tokens_to_string(&tokens).is_empty());
                }
                (None, None) => {}
                (info, text) => panic!("queries disagree: {:?} vs {:?}", info, text),
            }
            offset += 4;
            count += 1;
        }
    }
});
