use bnk::chunks::Chunk;
use bnk::cursor::Writer;
use bnk::{Bank, ChunkIndex, DecodeOptions, Error, HircObject, ObjectKind, Silent, Step};

fn chunk(w: &mut Writer, magic: &[u8; 4], payload: &[u8]) {
    w.write_magic(magic);
    w.write_u32(payload.len() as u32);
    w.write_bytes(payload);
}

fn record(kind: u8, body: &[u8]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_u8(kind);
    w.write_u32(body.len() as u32);
    w.write_bytes(body);
    w.into_bytes()
}

fn hirc(records: &[Vec<u8>]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_u32(records.len() as u32);
    for r in records {
        w.write_bytes(r);
    }
    w.into_bytes()
}

fn event(id: u32, actions: &[u32]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_u32(id);
    w.write_id_list(actions).unwrap();
    w.into_bytes()
}

fn settings(id: u32, volume: f32) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_u32(id);
    w.write_u8(1);
    w.write_u8(0x00);
    w.write_f32(volume);
    w.into_bytes()
}

/// Index plus data with sub-files packed back to back, which is not the
/// layout the packer would pick.
fn packed_sub_files(files: &[(u32, Vec<u8>)]) -> (Vec<u8>, Vec<u8>) {
    let mut didx = Writer::new();
    let mut data = Vec::new();
    for (id, bytes) in files {
        didx.write_u32(*id);
        didx.write_u32(data.len() as u32);
        didx.write_u32(bytes.len() as u32);
        data.extend_from_slice(bytes);
    }
    (didx.into_bytes(), data)
}

fn bank(files: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let (didx, data) = packed_sub_files(files);
    let mut w = Writer::new();
    chunk(&mut w, b"BKHD", &[0x48, 0, 0, 0, 0x39, 0x30, 0, 0]);
    chunk(&mut w, b"DIDX", &didx);
    chunk(&mut w, b"DATA", &data);
    chunk(
        &mut w,
        b"HIRC",
        &hirc(&[
            record(1, &settings(100, -6.0)),
            record(4, &event(200, &[300, 301])),
            record(14, &[0x2c, 1, 0, 0, 9, 9, 9]),
        ]),
    );
    chunk(&mut w, b"STID", &[1, 0, 0, 0, 1, 0, 0, 0, 0x39, 0x30, 0, 0, 2, b'U', b'I']);
    chunk(&mut w, b"ENVS", &[7; 5]);
    w.into_bytes()
}

fn parse(bytes: &[u8]) -> Bank {
    Bank::parse_with(bytes, &DecodeOptions::default(), &mut Silent).unwrap()
}

fn payload_of<'a>(bytes: &'a [u8], magic: &[u8; 4]) -> &'a [u8] {
    let index = ChunkIndex::parse(bytes).unwrap();
    let entry = index.find(magic).unwrap();
    index.payload(bytes, entry).unwrap()
}

#[test]
fn unedited_bank_round_trips() {
    let bytes = bank(&[(1, vec![1; 5]), (2, vec![2; 3])]);
    let bank = parse(&bytes);

    let tags: Vec<[u8; 4]> = bank.chunks().iter().map(Chunk::magic).collect();
    assert_eq!(tags, [*b"BKHD", *b"DIDX", *b"DATA", *b"HIRC", *b"STID", *b"ENVS"]);
    assert_eq!(bank.header().unwrap().bank_id, 12345);
    assert_eq!(bank.strings().unwrap().name_of(12345), Some("UI"));

    let hirc = bank.hierarchy().unwrap();
    assert_eq!(hirc.entries.len(), 3);
    assert!(matches!(hirc.get(100).unwrap().object, HircObject::Settings(_)));
    assert_eq!(hirc.get(0x12c).unwrap().object.kind(), ObjectKind::Attenuation);
    assert_eq!(hirc.get(0x12c).unwrap().tail, [9, 9, 9]);

    assert_eq!(bank.to_bytes_with(&mut Silent).unwrap(), bytes);
}

#[test]
fn unknown_chunks_pass_through() {
    let mut w = Writer::new();
    chunk(&mut w, b"BKHD", &[0; 8]);
    chunk(&mut w, b"PLAT", &[1, 2, 3]);
    chunk(&mut w, b"INIT", &[]);
    let bytes = w.into_bytes();

    let bank = parse(&bytes);
    assert!(bank.chunks()[1].is_opaque());
    assert!(bank.chunks()[2].is_opaque());
    assert_eq!(bank.to_bytes_with(&mut Silent).unwrap(), bytes);
}

#[test]
fn replacement_follows_packer_alignment() {
    let bytes = bank(&[(10, vec![0xa; 14136]), (20, vec![0xb; 13183])]);
    let mut bank = parse(&bytes);

    // Same size, different content: only the layout rule moves anything.
    bank.replace(10, vec![0xc; 14136]).unwrap();
    let out = bank.to_bytes_with(&mut Silent).unwrap();

    let reread = parse(&out);
    let table = reread.sub_files().unwrap().descriptor_table();
    assert_eq!(table, [(10, 0, 14136), (20, 14144, 13183)]);
    assert_eq!(payload_of(&out, b"DATA").len(), 14144 + 13183);
    assert_eq!(&payload_of(&out, b"DATA")[14136..14144], &[0; 8]);
}

#[test]
fn replacement_leaves_everything_else_alone() {
    let files = [(1, vec![1; 6]), (2, vec![2; 6]), (3, vec![3; 6])];
    let bytes = bank(&files);
    let mut bank = parse(&bytes);
    bank.replace(2, vec![0xff; 21]).unwrap();
    let out = bank.to_bytes_with(&mut Silent).unwrap();

    let reread = parse(&out);
    let ids: Vec<u32> = reread.sub_files().unwrap().ids().collect();
    assert_eq!(ids, [1, 2, 3]);
    assert_eq!(reread.lookup(1), Some(&files[0].1[..]));
    assert_eq!(reread.lookup(2), Some(&[0xff; 21][..]));
    assert_eq!(reread.lookup(3), Some(&files[2].1[..]));

    for magic in [b"BKHD", b"HIRC", b"STID", b"ENVS"] {
        assert_eq!(payload_of(&out, magic), payload_of(&bytes, magic));
    }
}

#[test]
fn short_object_body_does_not_derail_later_records() {
    // First event claims two actions but carries one.
    let mut broken = Writer::new();
    broken.write_u32(7);
    broken.write_u32(2);
    broken.write_u32(8);
    let payload = hirc(&[record(4, &broken.into_bytes()), record(1, &settings(9, 0.5))]);

    let mut w = Writer::new();
    chunk(&mut w, b"BKHD", &[0; 8]);
    chunk(&mut w, b"HIRC", &payload);
    let bytes = w.into_bytes();

    let bank = parse(&bytes);
    let hirc = bank.hierarchy().unwrap();
    assert!(matches!(hirc.entries[0].object, HircObject::Undecoded { .. }));
    assert!(matches!(hirc.entries[1].object, HircObject::Settings(_)));
    assert_eq!(bank.to_bytes_with(&mut Silent).unwrap(), bytes);
}

#[test]
fn unknown_object_kind_fails_the_bank() {
    let mut w = Writer::new();
    chunk(&mut w, b"BKHD", &[0; 8]);
    chunk(&mut w, b"HIRC", &hirc(&[record(4, &event(1, &[])), record(0x30, &[0; 4])]));
    let err = Bank::parse_with(&w.into_bytes(), &DecodeOptions::default(), &mut Silent)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownObjectKind { offset: 41, kind: 0x30 }));
}

#[test]
fn raw_hierarchy_skips_object_decoding() {
    let mut w = Writer::new();
    chunk(&mut w, b"BKHD", &[0; 8]);
    chunk(&mut w, b"HIRC", &hirc(&[record(0x30, &[0; 4])]));
    let bytes = w.into_bytes();

    let options = DecodeOptions {
        decode_hierarchy: false,
        ..DecodeOptions::default()
    };
    let bank = Bank::parse_with(&bytes, &options, &mut Silent).unwrap();
    assert!(bank.hierarchy().is_none());
    assert!(bank.chunks()[1].is_opaque());
    assert_eq!(bank.to_bytes_with(&mut Silent).unwrap(), bytes);
}

#[test]
fn metadata_with_unexpected_layout_stays_opaque() {
    let mut w = Writer::new();
    chunk(&mut w, b"BKHD", &[0; 8]);
    chunk(&mut w, b"STMG", &[1, 2, 3]);
    // Valid name table followed by bytes the layout does not describe.
    chunk(&mut w, b"STID", &[1, 0, 0, 0, 0, 0, 0, 0, 0xee]);
    let bytes = w.into_bytes();

    let mut fallbacks = Vec::new();
    let bank = Bank::parse_with(&bytes, &DecodeOptions::default(), &mut |s: &Step| {
        if let Step::ChunkFallback { magic, .. } = s {
            fallbacks.push(*magic);
        }
    })
    .unwrap();
    assert_eq!(fallbacks, [*b"STMG", *b"STID"]);
    assert!(bank.globals().is_none());
    assert!(bank.strings().is_none());
    assert_eq!(bank.to_bytes_with(&mut Silent).unwrap(), bytes);
}

#[test]
fn compare_sub_files_across_banks() {
    let a = parse(&bank(&[(1, vec![1; 4]), (2, vec![2; 4]), (3, vec![3; 4])]));
    let b = parse(&bank(&[(3, vec![3; 4]), (2, vec![9; 4]), (4, vec![4; 4])]));
    let (a, b) = (a.sub_files().unwrap(), b.sub_files().unwrap());

    assert_eq!(a.differing_ids(b), [2]);
    assert_eq!(a.same_content(b, 3), Some(true));
    assert_eq!(a.same_content(b, 1), None);
}

#[test]
fn dump_names_chunks_and_objects() {
    let bank = parse(&bank(&[(1, vec![1; 4])]));
    let json = serde_json::to_value(bank.chunks()).unwrap();
    assert_eq!(json[0]["chunk"], "Header");
    assert_eq!(json[3]["chunk"], "Hierarchy");
    assert_eq!(json[3]["entries"][1]["object"]["type"], "Event");
    assert_eq!(json[3]["entries"][1]["object"]["action_ids"][1], 301);
    assert_eq!(json[5]["chunk"], "Opaque");
    assert_eq!(json[5]["magic"], "ENVS");
}
