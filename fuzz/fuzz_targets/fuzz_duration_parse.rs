#![no_main]

use libfuzzer_sys::fuzz_target;
use xacml_types::{DayTimeDuration, Duration, YearMonthDuration};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must never panic; anything accepted must re-parse from its
    // rendering to an equal value.
    if let Ok(duration) = text.parse::<Duration>() {
        let rendered = duration.to_string();
        let reparsed: Duration = rendered
            .parse()
            .unwrap_or_else(|e| panic!("rendering {rendered:?} of {text:?} did not parse: {e}"));
        assert_eq!(reparsed, duration, "round-trip changed {text:?}");
    }

    if let Ok(duration) = text.parse::<YearMonthDuration>() {
        let reparsed: YearMonthDuration = duration.to_string().parse().expect("canonical form parses");
        assert_eq!(reparsed, duration);
    }

    if let Ok(duration) = text.parse::<DayTimeDuration>() {
        let reparsed: DayTimeDuration = duration.to_string().parse().expect("canonical form parses");
        assert_eq!(reparsed, duration);
    }
});
