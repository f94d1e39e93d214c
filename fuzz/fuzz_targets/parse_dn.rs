#![no_main]

use certchain_lib::{parse_dn, CertRecord, CertValidator, TrustStores};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // DN parsing and single-certificate classification must never panic,
    // whatever the text looks like.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let attrs = parse_dn(text);
    let _ = attrs.cn();
    let _ = attrs.is_empty();

    let stores = TrustStores::builder()
        .ccadb(["Certification Authorities"])
        .whitelist(["a"])
        .interception(["b"])
        .build();
    let validator = CertValidator::new(&stores);
    let status = validator.validate(&CertRecord::new(text, text));
    assert!(status.is_self_signed);
});
