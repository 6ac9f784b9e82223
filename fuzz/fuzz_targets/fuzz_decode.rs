#![no_main]

use libfuzzer_sys::fuzz_target;
use wire_transport::ByteBuffer;

fuzz_target!(|data: &[u8]| {
    // Every decoder must either succeed or fail cleanly on arbitrary input
    let _ = ByteBuffer::from(data).get_vle();
    let _ = ByteBuffer::from(data).get_string();
    let _ = ByteBuffer::from(data).get_byte_array();

    let mut buf = ByteBuffer::from(data);
    let start = buf.position();
    if buf.get_string_array().is_err() {
        assert_eq!(buf.position(), start);
    }

    // Mixed reads until the buffer runs dry
    let mut buf = ByteBuffer::from(data);
    while buf.has_remaining() {
        let before = buf.position();
        let progressed = match buf.get_u8() {
            Ok(tag) if tag % 3 == 0 => buf.get_u16().is_ok(),
            Ok(tag) if tag % 3 == 1 => buf.get_string().is_ok(),
            Ok(_) => buf.get_vle().is_ok(),
            Err(_) => false,
        };
        if !progressed {
            break;
        }
        assert!(buf.position() > before);
        assert!(buf.position() <= buf.limit());
    }
});
