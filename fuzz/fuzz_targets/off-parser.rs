#![no_main]
use libfuzzer_sys::fuzz_target;

use surfio::io::off::Reader;

fuzz_target!(|data: &[u8]| {
    let _ = Reader::new(data).read();
});
