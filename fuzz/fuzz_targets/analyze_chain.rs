#![no_main]

use certchain_lib::{chain_from_pem, is_pem, Chain, ChainValidator, TrustStores};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Chain ingestion may reject input, but accepted chains must analyze
    // without panicking and keep the report self-consistent.
    let chain = if is_pem(data) {
        chain_from_pem(data)
    } else {
        Chain::from_json(data)
    };
    let Ok(chain) = chain else {
        return;
    };

    let stores = TrustStores::new();
    let report = ChainValidator::new(&stores).analyze(&chain);
    assert_eq!(report.length, chain.len());
    assert!(report.mismatches <= report.total_pairs);
    assert!(report.subchains.subchains.len() <= report.subchains.count);
    let _ = certchain_lib::display_report(&report);
});
