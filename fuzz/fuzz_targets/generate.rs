#![no_main]

use libfuzzer_sys::fuzz_target;
use webidl_bindgen::{BindingsCodegen, GeneratorConfig};
use webidl_core::Interface;

fuzz_target!(|data: &[u8]| {
    // Only well-formed interface descriptions reach the generator
    if let Ok(interface) = serde_json::from_slice::<Interface>(data) {
        // Generation may fail with a typed error but must never panic
        let config = GeneratorConfig::new().with_format_output(false);
        let _ = BindingsCodegen::new(config).try_generate(&interface);
    }
});
