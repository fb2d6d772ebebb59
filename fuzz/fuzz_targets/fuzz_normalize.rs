#![no_main]
use exo_core::normalize::Normalizer;
use exo_traits::ManualClock;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let normalizer = Normalizer::new(Arc::new(ManualClock::new(0)));
    if let Ok(sample) = normalizer.normalize(&raw) {
        assert!(sample.emg.is_finite());
        assert!(sample.accel.x.is_finite() && sample.gyro.y.is_finite());
    }
});
