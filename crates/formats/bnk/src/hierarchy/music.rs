//! Interactive music objects: segments, switch containers and playlists.

use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::{len_u32, Result};

use super::sound::PlaybackSettings;

/// Kind 10: a music segment. Everything after the child list is kept as the
/// entry's tail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicSegment {
    pub id: u32,
    pub settings: PlaybackSettings,
    pub children: Vec<u32>,
}

impl MusicSegment {
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            id: c.read_u32()?,
            settings: PlaybackSettings::read(c)?,
            children: c.read_id_list()?,
        })
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(self.id);
        self.settings.write(w)?;
        w.write_id_list(&self.children)
    }
}

/// Tempo and meter block shared by switch containers and playlists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MusicTiming {
    pub unknown0: [u8; 4],
    pub unknown1: f32,
    pub unknown2: [u8; 8],
    pub tempo: f32,
    pub time_signature: (u8, u8),
    pub unknown3: u8,
    pub unknown4: [u8; 4],
}

impl MusicTiming {
    fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            unknown0: c.read_array()?,
            unknown1: c.read_f32()?,
            unknown2: c.read_array()?,
            tempo: c.read_f32()?,
            time_signature: (c.read_u8()?, c.read_u8()?),
            unknown3: c.read_u8()?,
            unknown4: c.read_array()?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.write_bytes(&self.unknown0);
        w.write_f32(self.unknown1);
        w.write_bytes(&self.unknown2);
        w.write_f32(self.tempo);
        w.write_u8(self.time_signature.0);
        w.write_u8(self.time_signature.1);
        w.write_u8(self.unknown3);
        w.write_bytes(&self.unknown4);
    }
}

/// Fade applied at one side of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fade {
    pub time_ms: i32,
    pub curve: u32,
    pub offset_ms: i32,
}

impl Fade {
    fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            time_ms: c.read_i32()?,
            curve: c.read_u32()?,
            offset_ms: c.read_i32()?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.write_i32(self.time_ms);
        w.write_u32(self.curve);
        w.write_i32(self.offset_ms);
    }
}

/// Kind 12: picks a child from a switch or state value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicSwitch {
    pub id: u32,
    pub settings: PlaybackSettings,
    pub children: Vec<u32>,
    pub timing: MusicTiming,
    pub transitions: Vec<SwitchTransition>,
    pub switch_type: u32,
    pub group_id: u32,
    pub default_switch: u32,
    pub continue_playing: bool,
    pub associations: Vec<SwitchAssociation>,
}

/// Rule for moving between two children of a [`MusicSwitch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwitchTransition {
    pub source_id: u32,
    pub destination_id: u32,
    pub source_fade_out: Fade,
    pub exit_source_at: u32,
    pub next_cue_id: u32,
    pub play_post_exit: u8,
    pub destination_fade_in: Fade,
    pub cue_filter_id: u32,
    pub destination_playlist_id: u32,
    pub sync_to: u16,
    pub play_pre_entry: u8,
    pub custom_cue_filter: u8,
    /// Read and written even when no transition object is used.
    pub has_transition_object: u8,
    pub transition_object_id: u32,
    pub transition_fade_in: Fade,
    pub transition_play_pre_entry: u8,
    pub transition_play_post_exit: u8,
}

impl SwitchTransition {
    fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            source_id: c.read_u32()?,
            destination_id: c.read_u32()?,
            source_fade_out: Fade::read(c)?,
            exit_source_at: c.read_u32()?,
            next_cue_id: c.read_u32()?,
            play_post_exit: c.read_u8()?,
            destination_fade_in: Fade::read(c)?,
            cue_filter_id: c.read_u32()?,
            destination_playlist_id: c.read_u32()?,
            sync_to: c.read_u16()?,
            play_pre_entry: c.read_u8()?,
            custom_cue_filter: c.read_u8()?,
            has_transition_object: c.read_u8()?,
            transition_object_id: c.read_u32()?,
            transition_fade_in: Fade::read(c)?,
            transition_play_pre_entry: c.read_u8()?,
            transition_play_post_exit: c.read_u8()?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.write_u32(self.source_id);
        w.write_u32(self.destination_id);
        self.source_fade_out.write(w);
        w.write_u32(self.exit_source_at);
        w.write_u32(self.next_cue_id);
        w.write_u8(self.play_post_exit);
        self.destination_fade_in.write(w);
        w.write_u32(self.cue_filter_id);
        w.write_u32(self.destination_playlist_id);
        w.write_u16(self.sync_to);
        w.write_u8(self.play_pre_entry);
        w.write_u8(self.custom_cue_filter);
        w.write_u8(self.has_transition_object);
        w.write_u32(self.transition_object_id);
        self.transition_fade_in.write(w);
        w.write_u8(self.transition_play_pre_entry);
        w.write_u8(self.transition_play_post_exit);
    }
}

/// Which child plays for a given switch or state value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwitchAssociation {
    pub switch_id: u32,
    pub music_object_id: u32,
}

impl MusicSwitch {
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        let id = c.read_u32()?;
        let settings = PlaybackSettings::read(c)?;
        let children = c.read_id_list()?;
        let timing = MusicTiming::read(c)?;
        let transitions = read_list(c, 72, SwitchTransition::read)?;
        let switch_type = c.read_u32()?;
        let group_id = c.read_u32()?;
        let default_switch = c.read_u32()?;
        let continue_playing = c.read_bool()?;
        let associations = read_list(c, 8, |c| {
            Ok(SwitchAssociation {
                switch_id: c.read_u32()?,
                music_object_id: c.read_u32()?,
            })
        })?;
        Ok(Self {
            id,
            settings,
            children,
            timing,
            transitions,
            switch_type,
            group_id,
            default_switch,
            continue_playing,
            associations,
        })
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(self.id);
        self.settings.write(w)?;
        w.write_id_list(&self.children)?;
        self.timing.write(w);
        w.write_u32(len_u32(self.transitions.len(), "switch transitions")?);
        for t in &self.transitions {
            t.write(w);
        }
        w.write_u32(self.switch_type);
        w.write_u32(self.group_id);
        w.write_u32(self.default_switch);
        w.write_bool(self.continue_playing);
        w.write_u32(len_u32(self.associations.len(), "switch associations")?);
        for a in &self.associations {
            w.write_u32(a.switch_id);
            w.write_u32(a.music_object_id);
        }
        Ok(())
    }
}

/// Kind 13: plays segments in a sequenced or random order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicPlaylist {
    pub id: u32,
    pub settings: PlaybackSettings,
    pub segments: Vec<u32>,
    pub timing: MusicTiming,
    pub transitions: Vec<PlaylistTransition>,
    pub elements: Vec<PlaylistElement>,
}

/// Rule for moving between two segments of a [`MusicPlaylist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaylistTransition {
    pub source_id: u32,
    pub destination_id: u32,
    pub source_fade_out: Fade,
    pub unknown0: i32,
    pub unknown1: i32,
    pub play_post_exit: u8,
    pub destination_fade_in: Fade,
    pub unknown2: i32,
    pub unknown3: i32,
    pub unknown4: i16,
    pub play_pre_entry: u8,
    pub unknown5: u8,
    pub has_segment: u8,
    pub segment_id: u32,
    pub segment_fade_in: Fade,
    pub segment_fade_out: Fade,
    pub segment_play_pre_entry: u8,
    pub segment_play_post_exit: u8,
}

impl PlaylistTransition {
    fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            source_id: c.read_u32()?,
            destination_id: c.read_u32()?,
            source_fade_out: Fade::read(c)?,
            unknown0: c.read_i32()?,
            unknown1: c.read_i32()?,
            play_post_exit: c.read_u8()?,
            destination_fade_in: Fade::read(c)?,
            unknown2: c.read_i32()?,
            unknown3: c.read_i32()?,
            unknown4: c.read_i16()?,
            play_pre_entry: c.read_u8()?,
            unknown5: c.read_u8()?,
            has_segment: c.read_u8()?,
            segment_id: c.read_u32()?,
            segment_fade_in: Fade::read(c)?,
            segment_fade_out: Fade::read(c)?,
            segment_play_pre_entry: c.read_u8()?,
            segment_play_post_exit: c.read_u8()?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.write_u32(self.source_id);
        w.write_u32(self.destination_id);
        self.source_fade_out.write(w);
        w.write_i32(self.unknown0);
        w.write_i32(self.unknown1);
        w.write_u8(self.play_post_exit);
        self.destination_fade_in.write(w);
        w.write_i32(self.unknown2);
        w.write_i32(self.unknown3);
        w.write_i16(self.unknown4);
        w.write_u8(self.play_pre_entry);
        w.write_u8(self.unknown5);
        w.write_u8(self.has_segment);
        w.write_u32(self.segment_id);
        self.segment_fade_in.write(w);
        self.segment_fade_out.write(w);
        w.write_u8(self.segment_play_pre_entry);
        w.write_u8(self.segment_play_post_exit);
    }
}

/// One node of a playlist tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaylistElement {
    pub segment_id: u32,
    pub element_id: u32,
    pub children: u32,
    pub playlist_type: i32,
    pub loop_count: u16,
    /// Weight times 1000.
    pub weight: u32,
    pub avoid_repeat: u16,
    pub unknown: u8,
    pub random_type: u8,
}

impl PlaylistElement {
    fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            segment_id: c.read_u32()?,
            element_id: c.read_u32()?,
            children: c.read_u32()?,
            playlist_type: c.read_i32()?,
            loop_count: c.read_u16()?,
            weight: c.read_u32()?,
            avoid_repeat: c.read_u16()?,
            unknown: c.read_u8()?,
            random_type: c.read_u8()?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.write_u32(self.segment_id);
        w.write_u32(self.element_id);
        w.write_u32(self.children);
        w.write_i32(self.playlist_type);
        w.write_u16(self.loop_count);
        w.write_u32(self.weight);
        w.write_u16(self.avoid_repeat);
        w.write_u8(self.unknown);
        w.write_u8(self.random_type);
    }
}

impl MusicPlaylist {
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            id: c.read_u32()?,
            settings: PlaybackSettings::read(c)?,
            segments: c.read_id_list()?,
            timing: MusicTiming::read(c)?,
            transitions: read_list(c, 84, PlaylistTransition::read)?,
            elements: read_list(c, 26, PlaylistElement::read)?,
        })
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(self.id);
        self.settings.write(w)?;
        w.write_id_list(&self.segments)?;
        self.timing.write(w);
        w.write_u32(len_u32(self.transitions.len(), "playlist transitions")?);
        for t in &self.transitions {
            t.write(w);
        }
        w.write_u32(len_u32(self.elements.len(), "playlist elements")?);
        for e in &self.elements {
            e.write(w);
        }
        Ok(())
    }
}

/// Read a u32 count and that many fixed-size records. `record_size` only caps
/// the up-front allocation.
fn read_list<'a, T>(
    c: &mut Cursor<'a>,
    record_size: usize,
    mut read: impl FnMut(&mut Cursor<'a>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = c.read_u32()? as usize;
    let mut items = Vec::with_capacity(count.min(c.remaining() / record_size));
    for _ in 0..count {
        items.push(read(c)?);
    }
    Ok(items)
}
