
use byteorder::{LittleEndian, WriteBytesExt};
use item::Item;

/// One hand-built property record: `(type code, name, payload bytes)`.
pub(crate) type RawProp<'a> = (u8, &'a str, Vec<u8>);

/// Builds a byte-string buffer by hand, independent of the writer.
///
/// `pad` extra zero bytes are inserted between the fixed header and the
/// property count, with `header_size` adjusted to match.
pub(crate) fn raw_buffer(key: &str, pad: usize, props: &[RawProp<'_>]) -> Vec<u8> {
    let header_size = 4 + 4 + 2 + 2 + key.len() + 1 + 4 + 4 + 8 + pad;
    let mut body = Vec::new();
    body.write_u32::<LittleEndian>(props.len() as u32).unwrap();
    for (code, name, payload) in props {
        let record_len = 2 + 1 + name.len() + 1 + payload.len();
        body.write_u16::<LittleEndian>(record_len as u16).unwrap();
        body.write_u8(*code).unwrap();
        body.extend_from_slice(name.as_bytes());
        body.push(0);
        body.extend_from_slice(payload);
    }
    let total = header_size + body.len();

    let mut buf = Vec::new();
    buf.write_u32::<LittleEndian>(total as u32).unwrap();
    buf.write_u32::<LittleEndian>(header_size as u32).unwrap();
    buf.write_u16::<LittleEndian>(0).unwrap();
    buf.write_u16::<LittleEndian>((key.len() + 1) as u16).unwrap();
    buf.extend_from_slice(key.as_bytes());
    buf.push(0);
    buf.write_i32::<LittleEndian>(1).unwrap();
    buf.write_i32::<LittleEndian>(2).unwrap();
    buf.write_i64::<LittleEndian>(3).unwrap();
    buf.extend(std::iter::repeat(0u8).take(pad));
    buf.extend_from_slice(&body);
    buf
}

pub(crate) fn i32_payload(v: i32) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

/// An item exercising every property type.
pub(crate) fn full_item() -> Item {
    let mut it = Item::new("audio.track");
    it.set_pid(4321)
        .set_uid(10_057)
        .set_timestamp(1_700_000_000_123_456_789)
        .set_pkg_name("com.example.player")
        .set_pkg_version_code(77);
    it.set_int32("channels", 2)
        .unwrap()
        .set_int64("frames", -9_000_000_000)
        .unwrap()
        .set_double("gain", -3.25)
        .unwrap()
        .set_rate("underruns", 12, 1_000)
        .unwrap()
        .set_cstring("encoding", "pcm_16bit")
        .unwrap()
        .set_value("marker", item::Value::None)
        .unwrap();
    it
}
