//! Fuzz target for engine descriptor parsing and inspection.
//!
//! Arbitrary bytes must never panic the parser, the shape inspector or the
//! cache probe; they may only return errors.

#![no_main]

use libfuzzer_sys::fuzz_target;
use gg_decode::engine::{
    inspect_context_window, probe_cache_capability, ContextDefaults, EngineDescriptor,
    FeatureNames,
};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(descriptor) = EngineDescriptor::from_json(json) {
        let names = FeatureNames::default();
        let _ = inspect_context_window(&descriptor, &names.input_ids, &ContextDefaults::default());
        let _ = probe_cache_capability(&descriptor, &names);
    }
});
