//! Fuzz target for generation config parsing and key normalization.

#![no_main]

use libfuzzer_sys::fuzz_target;
use gg_decode::models::ModelConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = ModelConfig::from_json(json) {
        let _ = config.eos_token_id();
        let _ = config.get("text_config.eosTokenId.0");
    }
});
