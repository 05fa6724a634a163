#![no_main]

use libfuzzer_sys::fuzz_target;

// Builds mappings with intentional duplicate keys, scalar and composite. Input bytes can
// break the quoting, so the only requirement is that decoding and error rendering never panic.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }
    let s = String::from_utf8_lossy(data);

    let yaml_top = format!("'{s}': 1\n'{s}': 2\n");
    let yaml_seq = format!("? ['{s}', 1]\n: a\n? ['{s}', 1]\n: b\n");
    let yaml_map = format!("? {{x: '{s}', y: 1}}\n: a\n? {{y: 1, x: '{s}'}}\n: b\n");

    for yaml in [&yaml_top, &yaml_seq, &yaml_map] {
        if let Err(err) = yaml_keys::from_str(yaml) {
            let _ = err.to_string();
        }
    }

    if let Ok(value) = yaml_keys::from_str(&s) {
        let _ = yaml_keys::to_flow_string(&value);
    }
});
