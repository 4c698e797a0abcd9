#![no_main]

use libfuzzer_sys::fuzz_target;
use lumu_dns_log::EnvFile;

fuzz_target!(|data: &str| {
    // 크래시나 패닉 없이 파싱되어야 하며, 키마다 값은 하나만 남는다
    let env = EnvFile::parse(data);
    assert!(env.len() <= data.lines().count());
});
