//! Fixture generator for bank tests and manual CLI runs.
//!
//! Generates small synthetic banks into `tests/fixtures/`:
//!
//!   - `sfx.bnk`: header, two embedded sub-files, a hierarchy with sounds,
//!     events and actions, a bank name table and one unknown chunk.
//!   - `music.bnk`: header and a hierarchy with a bus, a segment, a switch
//!     container and a playlist; no embedded sub-files.
//!
//! # Usage
//!
//! ```
//! cargo run -p bnk --bin gen_fixtures
//! cargo run -p bnk-cli -- info crates/formats/bnk/tests/fixtures/sfx.bnk
//! ```

use bnk::chunks::{BankName, Bkhd, Stid};
use bnk::cursor::Writer;
use bnk::hierarchy::common::{CurvePoint, Param, Rtpc};
use bnk::hierarchy::{
    Action, AudioBus, Event, EventAction, Fade, Hirc, HircEntry, HircObject, MusicPlaylist,
    MusicSegment, MusicSwitch, MusicTiming, ObjectKind, PlaybackSettings, PlaylistElement,
    PlaylistTransition, Positioning, PositionSource, Sfx, SfxStorage, SwitchAssociation,
};
use bnk::writer::{assemble_bank, OutputChunk};
use bnk::{Silent, SubFileMarshaller};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

const BANK_VERSION: u32 = 0x48;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(FIXTURES_DIR)?;

    write("sfx.bnk", build_sfx_bank()?)?;
    write("music.bnk", build_music_bank()?)?;

    Ok(())
}

fn write(name: &str, data: Vec<u8>) -> std::io::Result<()> {
    let path = format!("{FIXTURES_DIR}/{name}");
    std::fs::write(&path, &data)?;
    println!("wrote {name} ({} bytes)", data.len());
    Ok(())
}

// ── Sub-files ────────────────────────────────────────────────────────────────

/// A RIFF/WAVE sub-file with a silent `data` chunk of `samples` bytes.
fn build_wem(channels: u16, sample_rate: u32, samples: usize) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_magic(b"RIFF");
    w.write_u32(0);
    w.write_magic(b"WAVE");
    w.write_magic(b"fmt ");
    w.write_u32(16);
    w.write_u16(0xffff);
    w.write_u16(channels);
    w.write_u32(sample_rate);
    w.write_u32(sample_rate * u32::from(channels));
    w.write_u16(channels * 2);
    w.write_u16(16);
    w.write_magic(b"data");
    w.write_u32(samples as u32);
    w.write_zeros(samples);
    let riff_size = (w.position() - 8) as u32;
    w.patch_u32(4, riff_size);
    w.into_bytes()
}

// ── Hierarchy ────────────────────────────────────────────────────────────────

fn settings(parent_id: u32) -> PlaybackSettings {
    PlaybackSettings {
        override_parent: false,
        effects: None,
        output_bus: 0x1000_0001,
        parent_id,
        override_priority: false,
        offset_priority_at_max_distance: false,
        params: vec![Param {
            kind: 0x00,
            value: (-3.0f32).to_bits(),
        }],
        unknown: 0,
        positioning: None,
        override_game_aux: false,
        use_game_aux: false,
        override_user_aux: false,
        user_aux_buses: None,
        playback_limit: None,
        limit_method: 0,
        virtual_voice_behavior: 0,
        override_limit: false,
        override_virtual_voice: false,
        state_groups: Vec::new(),
        rtpcs: Vec::new(),
    }
}

fn timing() -> MusicTiming {
    MusicTiming {
        unknown0: [0; 4],
        unknown1: 1000.0,
        unknown2: [0; 8],
        tempo: 120.0,
        time_signature: (4, 4),
        unknown3: 0,
        unknown4: [0; 4],
    }
}

fn fade(time_ms: i32) -> Fade {
    Fade {
        time_ms,
        curve: 4,
        offset_ms: 0,
    }
}

fn entry(object: HircObject) -> HircEntry {
    HircEntry::new(object)
}

fn build_sfx_hierarchy(sub_files: &SubFileMarshaller) -> Vec<HircEntry> {
    let mut entries = vec![entry(HircObject::Untyped {
        kind: ObjectKind::ActorMixer,
        id: 0x2000_0001,
    })];

    for (i, (id, offset, size)) in sub_files.descriptor_table().into_iter().enumerate() {
        let mut sfx_settings = settings(0x2000_0001);
        if i == 1 {
            sfx_settings.positioning = Some(Positioning::ThreeD {
                attenuation_id: 0x3000_0001,
                spatialization: true,
                source: PositionSource::GameDefined {
                    update_per_frame: false,
                },
            });
        }
        entries.push(entry(HircObject::Sfx(Sfx {
            id: 0x4000_0000 + i as u32,
            unknown: [1, 0, 0, 0],
            storage: SfxStorage::Embedded {
                offset,
                length: size,
            },
            audio_file_id: id,
            source_id: id,
            sound_type: 0,
            settings: sfx_settings,
        })));
        entries.push(entry(HircObject::EventAction(EventAction {
            id: 0x5000_0000 + i as u32,
            scope: 3,
            action: Action::Other(0x04),
            game_object_id: 0x4000_0000 + i as u32,
            unknown0: 0,
            params: Vec::new(),
            unknown1: 0,
        })));
    }

    entries.push(entry(HircObject::EventAction(EventAction {
        id: 0x5000_0100,
        scope: 2,
        action: Action::SetState {
            group_id: 0x6000_0001,
            state_id: 0x6000_0002,
        },
        game_object_id: 0,
        unknown0: 0,
        params: vec![Param {
            kind: 0x0e,
            value: 250,
        }],
        unknown1: 0,
    })));
    entries.push(entry(HircObject::Event(Event {
        id: 0x7000_0001,
        action_ids: vec![0x5000_0000, 0x5000_0100],
    })));
    entries.push(HircEntry {
        object: HircObject::Untyped {
            kind: ObjectKind::Attenuation,
            id: 0x3000_0001,
        },
        tail: vec![0; 12],
    });
    entries
}

fn build_music_hierarchy() -> Vec<HircEntry> {
    let segment_ids = [0x8000_0001, 0x8000_0002];
    let mut entries = vec![entry(HircObject::AudioBus(AudioBus {
        id: 0x1000_0001,
        parent_bus_id: 0,
        params: vec![Param {
            kind: 0x06,
            value: 0.0,
        }],
        priority_equal: 0,
        limit_reached: 0,
        max_instances: 0,
        override_limit: false,
        unknown: 0,
        ducking_recover_ms: 500,
        max_duck_volume: -96.0,
        ducked_buses: Vec::new(),
        effects: None,
        rtpcs: vec![Rtpc {
            parameter_id: 0x9000_0001,
            y_axis: 0,
            curve_id: None,
            unknown0: 0,
            unknown1: 4,
            points: vec![
                CurvePoint {
                    x: 0.0,
                    y: -12.0,
                    curve: 4,
                },
                CurvePoint {
                    x: 100.0,
                    y: 0.0,
                    curve: 4,
                },
            ],
        }],
        state_groups: Vec::new(),
    }))];

    for id in segment_ids {
        entries.push(HircEntry {
            object: HircObject::MusicSegment(MusicSegment {
                id,
                settings: settings(0x8000_0100),
                children: Vec::new(),
            }),
            // Segment duration and markers are not decoded.
            tail: [0u8; 8]
                .into_iter()
                .chain(4000.0f64.to_le_bytes())
                .chain(0u32.to_le_bytes())
                .collect(),
        });
    }

    entries.push(entry(HircObject::MusicSwitchContainer(MusicSwitch {
        id: 0x8000_0100,
        settings: settings(0),
        children: vec![0x8000_0200],
        timing: timing(),
        transitions: Vec::new(),
        switch_type: 1,
        group_id: 0x6000_0001,
        default_switch: 0,
        continue_playing: true,
        associations: vec![SwitchAssociation {
            switch_id: 0x6000_0002,
            music_object_id: 0x8000_0200,
        }],
    })));

    entries.push(entry(HircObject::MusicPlaylistContainer(MusicPlaylist {
        id: 0x8000_0200,
        settings: settings(0x8000_0100),
        segments: segment_ids.to_vec(),
        timing: timing(),
        transitions: vec![PlaylistTransition {
            source_id: segment_ids[0],
            destination_id: segment_ids[1],
            source_fade_out: fade(500),
            unknown0: 0,
            unknown1: 0,
            play_post_exit: 1,
            destination_fade_in: fade(500),
            unknown2: 0,
            unknown3: 0,
            unknown4: 0,
            play_pre_entry: 1,
            unknown5: 0,
            has_segment: 0,
            segment_id: 0,
            segment_fade_in: fade(0),
            segment_fade_out: fade(0),
            segment_play_pre_entry: 0,
            segment_play_post_exit: 0,
        }],
        elements: segment_ids
            .iter()
            .enumerate()
            .map(|(i, &segment_id)| PlaylistElement {
                segment_id,
                element_id: 0x8000_0300 + i as u32,
                children: 0,
                playlist_type: -1,
                loop_count: 1,
                weight: 50000,
                avoid_repeat: 0,
                unknown: 0,
                random_type: 0,
            })
            .collect(),
    })));
    entries
}

// ── Banks ────────────────────────────────────────────────────────────────────

fn header(bank_id: u32) -> Vec<u8> {
    Bkhd {
        version: BANK_VERSION,
        bank_id,
        reserved: vec![0; 8],
    }
    .to_bytes()
}

fn build_sfx_bank() -> bnk::Result<Vec<u8>> {
    let sub_files = SubFileMarshaller::from_files([
        (0x0a00_0001, build_wem(1, 48000, 960)),
        (0x0a00_0002, build_wem(2, 44100, 1763)),
    ])?;
    let hirc = Hirc {
        entries: build_sfx_hierarchy(&sub_files),
        trailing: Vec::new(),
    };
    let stid = Stid {
        unknown: 1,
        banks: vec![BankName {
            bank_id: 0x00c0_ffee,
            name: "Sfx".into(),
        }],
    };

    assemble_bank(&[
        OutputChunk::owned(*b"BKHD", header(0x00c0_ffee)),
        OutputChunk::owned(*b"DIDX", sub_files.didx_payload()),
        OutputChunk::borrowed(*b"DATA", sub_files.concatenated_blob()),
        OutputChunk::owned(*b"HIRC", hirc.to_bytes(&mut Silent)?),
        OutputChunk::owned(*b"STID", stid.to_bytes()?),
        OutputChunk::owned(*b"XTRA", vec![0xde, 0xad, 0xbe, 0xef]),
    ])
}

fn build_music_bank() -> bnk::Result<Vec<u8>> {
    let hirc = Hirc {
        entries: build_music_hierarchy(),
        trailing: Vec::new(),
    };
    assemble_bank(&[
        OutputChunk::owned(*b"BKHD", header(0x00da_0001)),
        OutputChunk::owned(*b"HIRC", hirc.to_bytes(&mut Silent)?),
    ])
}
