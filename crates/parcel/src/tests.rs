use super::*;
use item::{Item, MetricsError, Value};

// -------------------- Helpers --------------------

fn full_item() -> Item {
    let mut it = Item::new("media.codec");
    it.set_pid(77)
        .set_uid(1013)
        .set_pkg_name("com.example.video")
        .set_pkg_version_code(123_456_789_012)
        .set_timestamp(-42);
    it.set_int32("width", 1920)
        .unwrap()
        .set_int64("bitrate", 8_000_000_000)
        .unwrap()
        .set_double("fps", 29.97)
        .unwrap()
        .set_rate("drops", 3, 600)
        .unwrap()
        .set_cstring("mime", "video/avc")
        .unwrap();
    it
}

fn round_trip(it: &Item) -> Item {
    let mut p = Parcel::new();
    write_to_parcel(it, &mut p).unwrap();
    let mut p = Parcel::from_bytes(p.into_bytes());
    let back = read_from_parcel(&mut p).unwrap();
    assert_eq!(p.data_avail(), 0);
    back
}

// -------------------- Container --------------------

#[test]
fn cstring_is_padded_to_four_bytes() {
    for (s, expected_len) in [("", 4), ("abc", 4), ("abcd", 8), ("abcdefg", 8)] {
        let mut p = Parcel::new();
        p.write_cstring(s).unwrap();
        assert_eq!(p.data_size(), expected_len, "string {:?}", s);
        assert_eq!(p.read_cstring().unwrap(), s);
        assert_eq!(p.data_avail(), 0);
    }
}

#[test]
fn cstring_with_interior_nul_is_rejected() {
    let mut p = Parcel::new();
    let err = p.write_cstring("a\0b").unwrap_err();
    assert!(matches!(err, MetricsError::InvalidArgument(_)));
    assert_eq!(p.data_size(), 0);
}

#[test]
fn short_reads_fail_without_moving() {
    let mut p = Parcel::from_bytes(vec![1, 2, 3]);
    assert!(matches!(p.read_i32(), Err(MetricsError::Malformed(_))));
    assert!(matches!(p.read_i64(), Err(MetricsError::Malformed(_))));
    assert!(matches!(p.read_cstring(), Err(MetricsError::Malformed(_))));
    assert_eq!(p.data_position(), 0);
}

#[test]
fn cstring_with_truncated_padding_fails() {
    // "ab\0" needs one padding byte that is missing
    let mut p = Parcel::from_bytes(b"ab\0".to_vec());
    assert!(matches!(p.read_cstring(), Err(MetricsError::Malformed(_))));
}

#[test]
fn fixed_width_values_are_little_endian() {
    let mut p = Parcel::new();
    p.write_i32(0x0102_0304);
    p.write_i64(-2);
    p.write_f64(1.0);
    let bytes = p.as_bytes();
    assert_eq!(&bytes[0..4], &[4, 3, 2, 1]);
    assert_eq!(&bytes[4..12], &[0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    assert_eq!(&bytes[12..20], &1.0f64.to_le_bytes());
}

// -------------------- Item layout --------------------

#[test]
fn single_property_layout() {
    let mut it = Item::new("k");
    it.set_pid(1)
        .set_uid(2)
        .set_pkg_name("p")
        .set_pkg_version_code(3)
        .set_timestamp(4);
    it.set_int32("a", 5).unwrap();

    let mut p = Parcel::new();
    write_to_parcel(&it, &mut p).unwrap();

    #[rustfmt::skip]
    let expected: Vec<u8> = vec![
        0, 0, 0, 0,                 // version
        b'k', 0, 0, 0,              // key
        1, 0, 0, 0,                 // pid
        2, 0, 0, 0,                 // uid
        b'p', 0, 0, 0,              // pkg_name
        3, 0, 0, 0, 0, 0, 0, 0,     // pkg_version_code
        4, 0, 0, 0, 0, 0, 0, 0,     // timestamp
        1, 0, 0, 0,                 // count
        b'a', 0, 0, 0,              // name
        1, 0, 0, 0,                 // type = Int32
        5, 0, 0, 0,                 // value
    ];
    assert_eq!(p.as_bytes(), expected.as_slice());
}

// -------------------- Round trips --------------------

#[test]
fn round_trip_every_parcelable_type() {
    let it = full_item();
    assert_eq!(round_trip(&it), it);
}

#[test]
fn round_trip_empty_item() {
    let it = Item::new("");
    assert_eq!(round_trip(&it), it);
}

#[test]
fn round_trip_uid_high_bit() {
    let mut it = Item::new("k");
    it.set_uid(u32::MAX);
    assert_eq!(round_trip(&it).uid(), u32::MAX);
}

#[test]
fn several_items_in_one_parcel() {
    let a = full_item();
    let mut b = Item::new("second");
    b.set_cstring("s", "x").unwrap();

    let mut p = Parcel::new();
    write_to_parcel(&a, &mut p).unwrap();
    write_to_parcel(&b, &mut p).unwrap();

    assert_eq!(read_from_parcel(&mut p).unwrap(), a);
    assert_eq!(read_from_parcel(&mut p).unwrap(), b);
    assert_eq!(p.data_avail(), 0);
}

// -------------------- Encode failures --------------------

#[test]
fn none_property_is_unsupported_and_rolled_back() {
    let mut p = Parcel::new();
    write_to_parcel(&full_item(), &mut p).unwrap();
    let before = p.clone();

    let mut it = Item::new("k");
    it.set_int32("ok", 1).unwrap();
    it.set_value("none", Value::None).unwrap();
    let err = write_to_parcel(&it, &mut p).unwrap_err();

    assert!(matches!(err, MetricsError::Unsupported(_)));
    assert_eq!(p, before);
}

#[test]
fn interior_nul_in_key_is_rolled_back() {
    let mut p = Parcel::new();
    let it = Item::new("bad\0key");
    assert!(matches!(
        write_to_parcel(&it, &mut p),
        Err(MetricsError::InvalidArgument(_))
    ));
    assert_eq!(p.data_size(), 0);
}

// -------------------- Decode failures --------------------

fn encoded(it: &Item) -> Vec<u8> {
    let mut p = Parcel::new();
    write_to_parcel(it, &mut p).unwrap();
    p.into_bytes()
}

#[test]
fn unknown_version_is_unsupported() {
    let mut bytes = encoded(&full_item());
    bytes[0..4].copy_from_slice(&1i32.to_le_bytes());
    let mut p = Parcel::from_bytes(bytes);
    assert!(matches!(
        read_from_parcel(&mut p),
        Err(MetricsError::Unsupported(_))
    ));
    assert_eq!(p.data_position(), 0);
}

#[test]
fn negative_count_is_malformed() {
    let mut it = Item::new("k");
    it.set_pkg_name("p");
    let mut bytes = encoded(&it);
    // version, key, pid, uid, pkg, version code, timestamp
    let count_at = 4 + 4 + 4 + 4 + 4 + 8 + 8;
    bytes[count_at..count_at + 4].copy_from_slice(&(-1i32).to_le_bytes());
    let mut p = Parcel::from_bytes(bytes);
    assert!(matches!(
        read_from_parcel(&mut p),
        Err(MetricsError::Malformed(_))
    ));
}

#[test]
fn unknown_type_is_unsupported() {
    let mut it = Item::new("k");
    it.set_pkg_name("p");
    it.set_int32("a", 5).unwrap();
    let mut bytes = encoded(&it);
    // after count comes the name "a" (4 bytes), then the type
    let type_at = 4 + 4 + 4 + 4 + 4 + 8 + 8 + 4 + 4;
    bytes[type_at..type_at + 4].copy_from_slice(&17i32.to_le_bytes());
    let mut p = Parcel::from_bytes(bytes);
    assert!(matches!(
        read_from_parcel(&mut p),
        Err(MetricsError::Unsupported(_))
    ));
}

#[test]
fn none_type_on_the_wire_is_unsupported() {
    let mut p = Parcel::new();
    p.write_i32(PARCEL_VERSION);
    p.write_cstring("k").unwrap();
    p.write_i32(0);
    p.write_i32(0);
    p.write_cstring("").unwrap();
    p.write_i64(0);
    p.write_i64(0);
    p.write_i32(1);
    p.write_cstring("n").unwrap();
    p.write_i32(0);
    assert!(matches!(
        read_from_parcel(&mut p),
        Err(MetricsError::Unsupported(_))
    ));
}

#[test]
fn truncated_parcel_is_malformed() {
    let bytes = encoded(&full_item());
    for cut in [0, 3, 10, bytes.len() / 2, bytes.len() - 1] {
        let mut p = Parcel::from_bytes(bytes[..cut].to_vec());
        assert!(
            matches!(read_from_parcel(&mut p), Err(MetricsError::Malformed(_))),
            "cut at {}",
            cut
        );
        assert_eq!(p.data_position(), 0);
    }
}
