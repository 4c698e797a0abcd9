#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lumu_dns_log::LineExtractor;

/// 쿼리 문법의 각 구성요소를 임의로 채운 라인
#[derive(Arbitrary, Debug)]
struct QueryLine<'a> {
    prefix: &'a str,
    octets: [u8; 4],
    port: u16,
    hostname: &'a str,
    suffix: &'a str,
}

fuzz_target!(|input: (&[u8], QueryLine<'_>)| {
    let Ok(extractor) = LineExtractor::new() else {
        return;
    };
    let (raw, line) = input;

    // 임의 바이트는 패닉 없이 Some 또는 None이어야 한다
    if let Some(record) = extractor.extract_bytes(raw) {
        assert!(!record.timestamp.is_empty());
        assert_eq!(record.hostname, record.hostname.trim());
    }

    // 문법에 맞춘 라인은 IP를 그대로 보존해야 한다
    let [a, b, c, d] = line.octets;
    let ip = format!("{a}.{b}.{c}.{d}");
    let text = format!(
        "{} client @0x1 {}#{} ({}): query: {}",
        line.prefix, ip, line.port, line.hostname, line.suffix
    );
    if !line.hostname.contains(')') && !line.prefix.contains('\n') {
        if let Some(record) = extractor.extract(&text) {
            assert!(!record.client_ip.is_empty());
        }
    }
});
