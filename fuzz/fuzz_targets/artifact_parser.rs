#![no_main]

use iterbench::artifact::ArtifactId;
use iterbench::parser::parse_output;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Artifacts are read lossily, so every byte string is a possible input
    let text = String::from_utf8_lossy(data);
    let _ = parse_output(&text);

    // A decoded name re-encodes to a name that decodes identically
    if let Some(id) = ArtifactId::parse(&text) {
        assert_eq!(ArtifactId::parse(&id.file_name()), Some(id));
    }
});
