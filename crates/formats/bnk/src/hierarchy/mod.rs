//! The `HIRC` chunk: a table of typed, length-prefixed objects.
//!
//! Every record is `kind: u8, length: u32, body[length]`. The body is decoded
//! from its own slice, so the next record always starts `length` bytes after
//! the length field no matter how much of the body the schema understood.
//! Bytes the schema did not cover are kept on the entry and written back
//! unchanged.

mod action;
mod bus;
pub mod common;
mod kind;
mod music;
mod object;
mod settings;
mod sfx;
pub mod sound;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::{len_u32, Error, Result};
use crate::progress::{BodyFit, Progress, Step};

pub use action::{Action, Event, EventAction};
pub use bus::{AudioBus, DuckedBus};
pub use kind::ObjectKind;
pub use music::{
    Fade, MusicPlaylist, MusicSegment, MusicSwitch, MusicTiming, PlaylistElement,
    PlaylistTransition, SwitchAssociation, SwitchTransition,
};
pub use object::HircObject;
pub use settings::Settings;
pub use sfx::{Sfx, SfxStorage};
pub use sound::{PlaybackLimit, PlaybackSettings, PositionSource, Positioning};

/// One record of the object table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HircEntry {
    pub object: HircObject,
    /// Body bytes after the decoded fields.
    #[serde(skip)]
    pub tail: Vec<u8>,
}

impl HircEntry {
    pub fn new(object: HircObject) -> Self {
        Self {
            object,
            tail: Vec::new(),
        }
    }
}

/// Parsed `HIRC` chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hirc {
    pub entries: Vec<HircEntry>,
    /// Bytes after the last counted record.
    #[serde(skip)]
    pub trailing: Vec<u8>,
}

impl Hirc {
    /// Parse a `HIRC` payload.
    ///
    /// An unknown kind byte aborts the whole parse: without a known kind the
    /// record cannot be told apart from garbage. `UnknownObjectKind::offset`
    /// is relative to the payload.
    pub fn parse(payload: &[u8], progress: &mut dyn Progress) -> Result<Self> {
        let mut c = Cursor::new(payload);
        let count = c.read_u32()? as usize;
        // Smallest record is a kind byte and a zero length.
        let mut entries = Vec::with_capacity(count.min(c.remaining() / 5));

        for index in 0..count {
            let offset = c.position();
            let raw_kind = c.read_u8()?;
            let kind = ObjectKind::from_u8(raw_kind).ok_or(Error::UnknownObjectKind {
                offset,
                kind: raw_kind,
            })?;
            let length = c.read_u32()?;
            let body = c.read_bytes(length as usize)?;

            let (entry, fit) = decode_entry(kind, body)?;

            progress.step(&Step::ObjectDecoded {
                index,
                kind,
                offset,
                length,
                fit,
            });
            entries.push(entry);
        }

        Ok(Self {
            entries,
            trailing: c.read_rest().to_vec(),
        })
    }

    /// Serialize back into a `HIRC` payload.
    pub fn to_bytes(&self, progress: &mut dyn Progress) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        w.write_u32(len_u32(self.entries.len(), "hierarchy object count")?);

        for (index, entry) in self.entries.iter().enumerate() {
            let kind = entry.object.kind();
            let mut body = Writer::new();
            entry.object.write(&mut body)?;
            body.write_bytes(&entry.tail);
            let body = body.into_bytes();
            let length = len_u32(body.len(), "hierarchy object body")?;

            w.write_u8(kind.as_u8());
            w.write_u32(length);
            w.write_bytes(&body);
            progress.step(&Step::ObjectEncoded {
                index,
                kind,
                length,
            });
        }

        w.write_bytes(&self.trailing);
        Ok(w.into_bytes())
    }

    /// First entry whose object has the given id.
    pub fn get(&self, id: u32) -> Option<&HircEntry> {
        self.entries.iter().find(|e| e.object.id() == Some(id))
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut HircEntry> {
        self.entries.iter_mut().find(|e| e.object.id() == Some(id))
    }

    /// Number of entries of each kind.
    pub fn kind_counts(&self) -> BTreeMap<ObjectKind, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.object.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Entries kept undecoded because their body was shorter than the schema.
    pub fn undecoded(&self) -> impl Iterator<Item = &HircEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.object, HircObject::Undecoded { .. }))
    }
}

/// Decode one record body, falling back to [`HircObject::Undecoded`] when the
/// schema does not reproduce `body`.
fn decode_entry(kind: ObjectKind, body: &[u8]) -> Result<(HircEntry, BodyFit)> {
    let undecoded = |fit| {
        let object = HircObject::Undecoded {
            kind,
            body: body.to_vec(),
        };
        (HircEntry::new(object), fit)
    };

    let mut bc = Cursor::new(body);
    let object = match HircObject::read(kind, &mut bc) {
        Ok(object) => object,
        Err(Error::TruncatedInput { .. }) => return Ok(undecoded(BodyFit::Overrun)),
        Err(e) => return Err(e),
    };
    let unread = bc.remaining();
    let entry = HircEntry {
        object,
        tail: bc.read_rest().to_vec(),
    };

    // Flag bytes other than 0/1 do not survive decoding.
    let mut w = Writer::with_capacity(body.len());
    entry.object.write(&mut w)?;
    w.write_bytes(&entry.tail);
    if w.into_bytes() != body {
        return Ok(undecoded(BodyFit::Mismatch));
    }

    let fit = if unread == 0 {
        BodyFit::Exact
    } else {
        BodyFit::Underrun { unread }
    };
    Ok((entry, fit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Silent;

    fn record(kind: u8, body: &[u8]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_u8(kind);
        w.write_u32(body.len() as u32);
        w.write_bytes(body);
        w.into_bytes()
    }

    fn payload(records: &[Vec<u8>]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_u32(records.len() as u32);
        for r in records {
            w.write_bytes(r);
        }
        w.into_bytes()
    }

    fn event_body(id: u32, actions: &[u32]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_u32(id);
        w.write_id_list(actions).unwrap();
        w.into_bytes()
    }

    #[test]
    fn tail_bytes_are_kept() {
        let mut body = event_body(1, &[2, 3]);
        body.extend_from_slice(&[0xde, 0xad]);
        let data = payload(&[record(4, &body), record(7, &[9, 0, 0, 0])]);

        let mut steps = Vec::new();
        let hirc = Hirc::parse(&data, &mut |s: &Step| steps.push(s.clone())).unwrap();
        assert_eq!(hirc.entries.len(), 2);
        assert_eq!(hirc.entries[0].tail, [0xde, 0xad]);
        assert_eq!(hirc.entries[1].object.id(), Some(9));
        assert!(matches!(
            steps[0],
            Step::ObjectDecoded {
                fit: BodyFit::Underrun { unread: 2 },
                ..
            }
        ));
        assert!(matches!(
            steps[1],
            Step::ObjectDecoded {
                offset: 27,
                fit: BodyFit::Exact,
                ..
            }
        ));

        assert_eq!(hirc.to_bytes(&mut Silent).unwrap(), data);
    }

    #[test]
    fn short_body_resyncs_on_declared_length() {
        // Claims three actions but the body only holds one.
        let mut w = Writer::new();
        w.write_u32(5);
        w.write_u32(3);
        w.write_u32(6);
        let broken = w.into_bytes();
        let data = payload(&[record(4, &broken), record(4, &event_body(8, &[]))]);

        let hirc = Hirc::parse(&data, &mut Silent).unwrap();
        assert_eq!(
            hirc.entries[0].object,
            HircObject::Undecoded {
                kind: ObjectKind::Event,
                body: broken.clone()
            }
        );
        assert_eq!(hirc.entries[1].object.id(), Some(8));
        assert_eq!(hirc.undecoded().count(), 1);
        assert_eq!(hirc.to_bytes(&mut Silent).unwrap(), data);
    }

    #[test]
    fn non_canonical_flag_keeps_body() {
        // Sfx: id, unknown, streamed storage, file id, source id, sound type,
        // then playback settings whose override flag is 2.
        let mut w = Writer::new();
        w.write_u32(1);
        w.write_bytes(&[0; 4]);
        w.write_u32(1);
        w.write_u32(10);
        w.write_u32(10);
        w.write_u8(0);
        crate::hierarchy::sound::tests::minimal().write(&mut w).unwrap();
        let mut body = w.into_bytes();
        body[21] = 2;
        let data = payload(&[record(2, &body)]);

        let mut fits = Vec::new();
        let hirc = Hirc::parse(&data, &mut |s: &Step| {
            if let Step::ObjectDecoded { fit, .. } = s {
                fits.push(*fit);
            }
        })
        .unwrap();
        assert_eq!(fits, [BodyFit::Mismatch]);
        assert!(matches!(hirc.entries[0].object, HircObject::Undecoded { .. }));
        assert_eq!(hirc.to_bytes(&mut Silent).unwrap(), data);
    }

    #[test]
    fn unknown_kind_aborts() {
        let data = payload(&[record(4, &event_body(1, &[])), record(19, &[0; 4])]);
        let err = Hirc::parse(&data, &mut Silent).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownObjectKind { offset: 17, kind: 19 }
        ));
    }

    #[test]
    fn declared_length_past_payload_is_truncated() {
        let mut data = payload(&[record(4, &event_body(1, &[]))]);
        data.truncate(data.len() - 2);
        assert!(matches!(
            Hirc::parse(&data, &mut Silent),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn trailing_bytes_survive() {
        let mut data = payload(&[record(14, &[1, 0, 0, 0])]);
        data.extend_from_slice(&[0, 0, 0]);
        let hirc = Hirc::parse(&data, &mut Silent).unwrap();
        assert_eq!(hirc.trailing, [0, 0, 0]);
        assert_eq!(hirc.kind_counts()[&ObjectKind::Attenuation], 1);
        assert_eq!(hirc.to_bytes(&mut Silent).unwrap(), data);
    }

    #[test]
    fn edited_object_gets_new_length() {
        let data = payload(&[record(4, &event_body(1, &[2]))]);
        let mut hirc = Hirc::parse(&data, &mut Silent).unwrap();
        if let Some(HircEntry {
            object: HircObject::Event(event),
            ..
        }) = hirc.get_mut(1)
        {
            event.action_ids.push(3);
        }
        let out = hirc.to_bytes(&mut Silent).unwrap();
        assert_eq!(&out[5..9], &16u32.to_le_bytes());
        assert_eq!(out.len(), data.len() + 4);
    }
}
