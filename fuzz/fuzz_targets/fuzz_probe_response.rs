//! Fuzz target: probe response framing and parsing
//!
//! Drives arbitrary byte sequences through `LineReader` and every parser
//! that consumes its lines, asserting that nothing panics and that
//! accepted values are well-formed.
//!
//! cargo fuzz run fuzz_probe_response

#![no_main]

use libfuzzer_sys::fuzz_target;
use nh4meter::error::Field;
use nh4meter::sensors::protocol::{
    compensated_read, conductivity_field, parse_conductivity, parse_decimal, LineReader,
    MAX_RESPONSE_LEN,
};

fuzz_target!(|data: &[u8]| {
    let mut reader = LineReader::new();

    for &b in data {
        let line = match reader.push(b) {
            Ok(Some(line)) => line,
            Ok(None) => continue,
            Err(_) => {
                reader.reset();
                continue;
            }
        };
        assert!(line.len() <= MAX_RESPONSE_LEN);

        if let Ok(t) = parse_decimal(&line, Field::Temperature) {
            assert!(t.is_finite());
            // Any response that fits the buffer must fit the echo request.
            assert!(compensated_read(&line).is_ok());
        }
        if let Ok(ec) = conductivity_field(&line) {
            assert!(!ec.contains(','));
        }
        let _ = parse_conductivity(&line);
    }
});
