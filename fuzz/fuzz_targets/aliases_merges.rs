#![no_main]

use libfuzzer_sys::fuzz_target;

// Biases inputs toward anchors, aliases and merge keys (<<). Decoding may fail, but must
// never panic, and a successful decode must equal itself.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }
    let s = String::from_utf8_lossy(data);

    let yaml_alias = format!("a: &A {s}\nb: *A\nseq: &S [1, 2, 3]\nseq_alias: *S\n");
    let yaml_merge = format!(
        "base1: &B1 {{k: 1, v: {s}}}\nbase2: &B2 {{k: 2, w: {s}}}\nmerged: {{<<: [*B1, *B2], extra: 3}}\n"
    );
    let yaml_key = format!("base: &K [{s}]\n? *K\n: aliased key\n");

    for yaml in [&yaml_alias, &yaml_merge, &yaml_key] {
        if let Ok(value) = yaml_keys::from_str(yaml) {
            assert_eq!(value, value.clone());
        }
    }
    let _raw = yaml_keys::from_multiple(&s);
});
