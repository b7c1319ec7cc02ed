#![no_main]

use libfuzzer_sys::fuzz_target;
use xacml_datatypes::{Source, default_factory};

fuzz_target!(|data: &[u8]| {
    let factory = default_factory();
    let text = String::from_utf8_lossy(data);
    let sources = [
        Source::Text(text.to_string()),
        Source::Bytes(data.to_vec()),
        Source::Sequence(vec![Source::Text(text.to_string()), Source::Text(text.to_string())]),
    ];

    for id in factory.identifiers() {
        let data_type = factory.get(id.as_str()).expect("listed identifiers resolve");
        for source in &sources {
            let Ok(value) = data_type.convert_value(source) else {
                continue;
            };

            // A converted value always renders, and the rendering converts
            // back to an equal value.
            let rendered = data_type.render_value(&value).expect("value matches its datatype");
            let reparsed = data_type
                .convert_value(&Source::Text(rendered.clone()))
                .unwrap_or_else(|e| panic!("{id}: rendering {rendered:?} did not convert: {e}"));
            assert_eq!(reparsed, value, "{id}: {rendered:?}");
        }
    }
});
