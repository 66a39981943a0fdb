//! End-to-end parsing of whole context files assembled in memory, plus a
//! gated pass over a real title when one is available locally.

use mediastation::cursor::Writer;
use mediastation::{AssetKind, AssetPayload, Context, EngineVersion, Error, FourCc, SessionContext, Title};

/// A 4.0 session; first-generation titles never declare a version and use
/// older layouts throughout.
fn session() -> SessionContext {
    let mut session = SessionContext::new();
    session.set_version(EngineVersion::new(4, 0, 0));
    session
}

const UINT16: u16 = 0x0003;
const INT16: u16 = 0x0010;
const UINT32: u16 = 0x0004;
const FLOAT64: u16 = 0x0011;
const STRING: u16 = 0x0012;
const POINT: u16 = 0x000f;
const BOUNDING_BOX: u16 = 0x000d;
const REFERENCE: u16 = 0x001b;

fn u16_datum(w: &mut Writer, v: u16) {
    w.write_u16(UINT16);
    w.write_u16(v);
}

fn u32_datum(w: &mut Writer, v: u32) {
    w.write_u16(UINT32);
    w.write_u32(v);
}

fn i16_datum(w: &mut Writer, v: i16) {
    w.write_u16(INT16);
    w.write_i16(v);
}

fn f64_datum(w: &mut Writer, v: f64) {
    w.write_u16(FLOAT64);
    w.write_f64(v);
}

fn string_datum(w: &mut Writer, s: &str) {
    w.write_u16(STRING);
    u16_datum(w, s.len() as u16);
    w.write_bytes(s.as_bytes());
}

fn point_datum(w: &mut Writer, x: i16, y: i16) {
    w.write_u16(POINT);
    i16_datum(w, x);
    i16_datum(w, y);
}

fn bbox_datum(w: &mut Writer, x: i16, y: i16, width: i16, height: i16) {
    w.write_u16(BOUNDING_BOX);
    point_datum(w, x, y);
    point_datum(w, width, height);
}

fn reference_datum(w: &mut Writer, fourcc: &[u8; 4]) {
    w.write_u16(REFERENCE);
    w.write_tag(fourcc);
}

fn chunk(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_tag(fourcc);
    w.write_u32(payload.len() as u32);
    w.write_bytes(payload);
    w.into_bytes()
}

/// Header sections each live in their own `igod` chunk, opened by the
/// header-marker datum.
fn header_chunk(payload: &[u8]) -> Vec<u8> {
    let mut w = Writer::new();
    u16_datum(&mut w, 0x000d);
    w.write_bytes(payload);
    chunk(b"igod", &w.into_bytes())
}

fn subfile(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut list = Vec::new();
    for c in chunks {
        if list.len() % 2 == 1 {
            list.push(0);
        }
        list.extend_from_slice(c);
    }

    let mut w = Writer::new();
    w.write_tag(b"RIFF");
    w.write_u32((16 + 8 + 4 + list.len()) as u32);
    w.write_tag(b"IMTS");
    w.write_tag(b"rate");
    w.write_u32(4);
    w.write_u32(0);
    w.write_tag(b"LIST");
    w.write_u32((4 + list.len()) as u32);
    w.write_tag(b"data");
    w.write_bytes(&list);
    w.into_bytes()
}

fn context_file(subfiles: &[Vec<u8>]) -> Vec<u8> {
    let mut body = Vec::new();
    for s in subfiles {
        if body.len() % 2 == 1 {
            body.push(0);
        }
        body.extend_from_slice(s);
    }

    let mut w = Writer::new();
    w.write_tag(b"II\x00\x00");
    w.write_u32(0);
    w.write_u32(subfiles.len() as u32);
    w.write_u32((16 + body.len()) as u32);
    w.write_bytes(&body);
    w.into_bytes()
}

fn parameters_section(file_number: u32, name: &str) -> Vec<u8> {
    let mut w = Writer::new();
    u16_datum(&mut w, 0x000e);
    u32_datum(&mut w, file_number);
    u16_datum(&mut w, 0x0bb9);
    u32_datum(&mut w, file_number);
    string_datum(&mut w, name);
    u16_datum(&mut w, 0);
    w.into_bytes()
}

fn palette_section(fill: u8) -> Vec<u8> {
    let mut w = Writer::new();
    u16_datum(&mut w, 0x05aa);
    w.write_bytes(&[fill; 0x300]);
    u16_datum(&mut w, 0);
    w.into_bytes()
}

fn end_section() -> Vec<u8> {
    let mut w = Writer::new();
    u16_datum(&mut w, 0x0010);
    u16_datum(&mut w, 0);
    u16_datum(&mut w, 0);
    w.into_bytes()
}

#[test]
fn parse_context_with_image_asset() {
    let mut asset = Writer::new();
    u16_datum(&mut asset, 0x0011); // asset header section
    u32_datum(&mut asset, 7); // file number
    u32_datum(&mut asset, 0x0007); // image
    u32_datum(&mut asset, 100); // id
    u16_datum(&mut asset, 0x001b);
    reference_datum(&mut asset, b"a123");
    u16_datum(&mut asset, 0x001c);
    bbox_datum(&mut asset, 0, 0, 3, 2);
    u16_datum(&mut asset, 0); // end of sections

    // Uncompressed 3x2 bitmap: header datums, marker, then pixels.
    let mut bitmap = Writer::new();
    u32_datum(&mut bitmap, 0x16); // header size
    point_datum(&mut bitmap, 3, 2);
    u32_datum(&mut bitmap, 0); // uncompressed
    u32_datum(&mut bitmap, 3); // stride
    bitmap.write_bytes(&[0, 0, 1, 2, 3, 4, 5, 6]);

    let data = context_file(&[subfile(&[
        header_chunk(&parameters_section(7, "Test_7x00")),
        header_chunk(&palette_section(0x42)),
        header_chunk(&asset.into_bytes()),
        header_chunk(&end_section()),
        chunk(b"a123", &bitmap.into_bytes()),
    ])]);

    let context = Context::read(&data, &session()).expect("context should parse");

    let parameters = context.parameters.as_ref().expect("parameters section");
    assert_eq!(parameters.file_number, 7);
    assert_eq!(parameters.name.as_deref(), Some("Test_7x00"));

    let palette = context.palette.as_ref().expect("palette section");
    assert!(palette.iter().all(|&b| b == 0x42));

    assert_eq!(context.assets.len(), 1);
    let asset = context.asset_by_id(100).expect("asset 100");
    assert_eq!(asset.kind, AssetKind::Image);
    let AssetPayload::Image(Some(image)) = &asset.payload else {
        panic!("image payload not filled: {:?}", asset.payload);
    };
    assert_eq!((image.width(), image.height()), (3, 2));
    assert_eq!(image.decode().unwrap().pixels, [1, 2, 3, 4, 5, 6]);

    assert!(context.asset_by_chunk(FourCc(*b"a123")).is_some());
}

#[test]
fn title_routes_cache_subfile_to_owning_asset() {
    let mut asset = Writer::new();
    u16_datum(&mut asset, 0x0011);
    u32_datum(&mut asset, 7);
    u32_datum(&mut asset, 0x0005); // sound
    u32_datum(&mut asset, 200);
    u16_datum(&mut asset, 0x0001); // sound encoding
    u32_datum(&mut asset, 0x0010); // pcm
    u16_datum(&mut asset, 0x0033); // sound info
    u32_datum(&mut asset, 2); // chunk count
    f64_datum(&mut asset, 22050.0);
    u16_datum(&mut asset, 0x0021); // has own subfile
    u32_datum(&mut asset, 1);
    u16_datum(&mut asset, 0x001b);
    reference_datum(&mut asset, b"a200");
    u16_datum(&mut asset, 0);

    let context_data = context_file(&[subfile(&[
        header_chunk(&parameters_section(7, "Sounds_7x00")),
        header_chunk(&palette_section(0)),
        header_chunk(&asset.into_bytes()),
        header_chunk(&end_section()),
    ])]);

    // The asset's audio lives in a separate cache file.
    let cache_data = context_file(&[subfile(&[
        chunk(b"a200", &[1, 1, 2, 2]),
        chunk(b"a200", &[3, 3, 4, 4]),
    ])]);

    let mut title = Title::new(session());
    let index = title.read_context(&context_data).expect("context should parse");
    assert_eq!(index, 0);
    title.read_cache_context(&cache_data).expect("cache should parse");

    let asset = title.asset_by_chunk(FourCc(*b"a200")).expect("asset by chunk");
    assert_eq!(asset.id, 200);
    let AssetPayload::Sound(sound) = &asset.payload else {
        panic!("sound payload expected: {:?}", asset.payload);
    };
    assert_eq!(sound.chunks(), [vec![1, 1, 2, 2], vec![3, 3, 4, 4]]);

    assert!(title.context_by_file_number(7).is_some());
    assert!(title.context_by_file_number(8).is_none());
}

#[test]
fn context_without_header_chunk_is_rejected() {
    let data = context_file(&[subfile(&[chunk(b"a123", &[0, 0, 1, 2])])]);
    match Context::read(&data, &session()) {
        Err(Error::HeaderlessContext { fourcc }) => assert_eq!(fourcc.as_str(), "a123"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn header_only_context_parses_to_nothing() {
    let mut w = Writer::new();
    w.write_tag(b"II\x00\x00");
    w.write_u32(0);
    w.write_u32(0);
    w.write_u32(16);
    let data = w.into_bytes();

    let context = Context::read(&data, &session()).expect("header-only file");
    assert!(context.assets.is_empty());
    assert!(context.parameters.is_none());
}

/// Parse every context file of a locally installed title. Point
/// `MEDIASTATION_TITLE_DIR` at a directory of CXT files to enable.
#[test]
fn parse_real_title_contexts() {
    let _ = env_logger::builder().is_test(true).try_init();
    let Ok(dir) = std::env::var("MEDIASTATION_TITLE_DIR") else {
        eprintln!("skipping: MEDIASTATION_TITLE_DIR not set");
        return;
    };

    let mut title = Title::new(session());
    let mut parsed = 0;
    let entries = std::fs::read_dir(&dir).expect("title directory");
    for entry in entries {
        let path = entry.expect("directory entry").path();
        let is_context = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("cxt"))
            .unwrap_or(false);
        if !is_context {
            continue;
        }
        let data = std::fs::read(&path).expect("context file");
        title
            .read_context(&data)
            .unwrap_or_else(|err| panic!("{}: {err}", path.display()));
        parsed += 1;
    }

    assert!(parsed > 0, "no CXT files found in {dir}");
    let assets: usize = title.contexts.iter().map(|c| c.assets.len()).sum();
    eprintln!("parsed {parsed} contexts holding {assets} assets");
}
