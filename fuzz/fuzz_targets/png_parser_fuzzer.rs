#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(image) = png_parser::decode(data) {
        let metadata = image.metadata();
        assert_eq!(
            image.pixels().len(),
            metadata.width as usize * metadata.height as usize * metadata.channels
        );
    }

    let _ = png_parser::read_chunks(data);
});
