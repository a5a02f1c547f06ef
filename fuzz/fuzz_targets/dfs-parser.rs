#![no_main]
use libfuzzer_sys::fuzz_target;

use surfio::io::dfs::Reader;

fuzz_target!(|data: &[u8]| {
    let _ = Reader::new(data).read();
});
