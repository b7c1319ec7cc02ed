#![no_main]

use std::cmp::Ordering;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xacml_types::{DateTime, TimeZone, ValueError};

// ============================================================================
// Arbitrary Implementations
// ============================================================================

/// Fuzzer-friendly date-time fields, folded into legal ranges.
#[derive(Debug, Clone, Copy, Arbitrary)]
struct FuzzDateTime {
    year: i16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    millis: u16,
    zone: Option<i16>,
}

impl FuzzDateTime {
    fn build(self) -> Option<DateTime> {
        let zone = match self.zone {
            Some(minutes) => Some(TimeZone::new(i32::from(minutes) % 1441).ok()?),
            None => None,
        };
        DateTime::new(
            i32::from(self.year),
            u32::from(self.month % 12) + 1,
            u32::from(self.day % 28) + 1,
            u32::from(self.hour % 24),
            u32::from(self.minute % 60),
            u32::from(self.second % 60),
            u32::from(self.millis % 1000),
            zone,
        )
        .ok()
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    a: FuzzDateTime,
    b: FuzzDateTime,
    c: FuzzDateTime,
}

fuzz_target!(|input: Input| {
    let (Some(a), Some(b), Some(c)) = (input.a.build(), input.b.build(), input.c.build()) else {
        return;
    };

    let ab = a.try_cmp(&b);
    let ba = b.try_cmp(&a);

    // Antisymmetry, and ambiguity is symmetric.
    match (&ab, &ba) {
        (Ok(x), Ok(y)) => assert_eq!(*x, y.reverse(), "{a} vs {b}"),
        (Err(ValueError::AmbiguousComparison { .. }), Err(ValueError::AmbiguousComparison { .. })) => {}
        other => panic!("asymmetric comparison of {a} and {b}: {other:?}"),
    }

    assert_eq!(a.try_cmp(&a).ok(), Some(Ordering::Equal));

    // Transitivity where all three pairs are decided.
    if let (Ok(Ordering::Less), Ok(Ordering::Less)) = (a.try_cmp(&b), b.try_cmp(&c)) {
        if let Ok(ac) = a.try_cmp(&c) {
            assert_eq!(ac, Ordering::Less, "{a} < {b} < {c}");
        }
    }
});
