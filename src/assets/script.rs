//! Compiled scripts: per-asset event handlers and standalone functions.
//! The bytecode itself is kept as raw bytes; only the framing around it
//! is decoded here.

use crate::cursor::Cursor;
use crate::datum::{self, Datum};
use crate::error::Result;
use crate::version::SessionContext;

/// Function IDs on the wire are relative to this base.
const FUNCTION_ID_BASE: u32 = 19900;

/// The trigger that causes an event handler to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Time,
    MouseDown,
    SoundEnd,
    MovieEnd,
}

impl EventKind {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            5 => Some(Self::Time),
            6 => Some(Self::MouseDown),
            14 => Some(Self::SoundEnd),
            21 => Some(Self::MovieEnd),
            _ => None,
        }
    }
}

/// A bytecode handler attached to an asset header.
#[derive(Debug, Clone)]
pub struct EventHandler {
    pub event_type: u32,
    /// An event-specific argument (a time, an asset id, ...).
    pub argument: Datum,
    pub code: Vec<u8>,
}

impl EventHandler {
    pub fn read(c: &mut Cursor) -> Result<Self> {
        let event_type = datum::read_u32(c)?;
        let argument = Datum::read(c)?;
        let length = datum::read_u32(c)?;
        let code = c.read_bytes(length as usize)?.to_vec();
        Ok(Self {
            event_type,
            argument,
            code,
        })
    }

    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_raw(self.event_type)
    }
}

/// A standalone compiled function, stored in its own context section.
#[derive(Debug, Clone)]
pub struct Function {
    pub id: u32,
    pub file_id: u32,
    pub code: Vec<u8>,
}

impl Function {
    pub fn read(c: &mut Cursor, session: &SessionContext) -> Result<Self> {
        let id = datum::read_u32(c)? + FUNCTION_ID_BASE;
        let file_id = datum::read_u32(c)?;
        let length = datum::read_u32(c)?;
        let code = c.read_bytes(length as usize)?.to_vec();
        if !session.is_first_generation() {
            datum::expect_u32(c, 0x00, "end-of-function flag")?;
        }
        Ok(Self { id, file_id, code })
    }
}
