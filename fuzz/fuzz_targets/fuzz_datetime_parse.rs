#![no_main]

use libfuzzer_sys::fuzz_target;
use xacml_types::{Date, DateTime, Time};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(value) = text.parse::<DateTime>() {
        let reparsed: DateTime = value.to_string().parse().expect("canonical form parses");
        assert_eq!(reparsed, value, "round-trip changed {text:?}");
        let _ = value.to_utc();
        let _ = value.era();
    }

    if let Ok(value) = text.parse::<Date>() {
        let reparsed: Date = value.to_string().parse().expect("canonical form parses");
        assert_eq!(reparsed, value, "round-trip changed {text:?}");
    }

    if let Ok(value) = text.parse::<Time>() {
        let reparsed: Time = value.to_string().parse().expect("canonical form parses");
        assert_eq!(reparsed, value, "round-trip changed {text:?}");
    }
});
