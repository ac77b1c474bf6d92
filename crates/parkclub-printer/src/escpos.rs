//! ESC/POS command builder.
//!
//! Thermal printers take a plain byte stream: UTF-8 text lines interleaved
//! with fixed escape sequences. [`EscPos`] appends both to a buffer so a
//! ticket is rendered once and then written in one go.
//!
//! # Examples
//!
//! ```
//! use parkclub_printer::escpos::{Align, EscPos};
//!
//! let mut job = EscPos::new();
//! job.align(Align::Center).bold(true).line("TICKET").bold(false);
//! job.qr("20250819-080000-1234").unwrap();
//! job.feed(3);
//!
//! let bytes = job.finish();
//! assert_eq!(&bytes[..3], &[0x1B, 0x61, 0x01]);
//! ```

use crate::error::{PrinterError, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Line separator used on every ticket (32 columns).
pub const SEPARATOR: &str = "--------------------------------";

/// Largest QR payload a single `GS ( k` store command can carry.
pub const MAX_QR_PAYLOAD: usize = 0xFFFF - 3;

/// Raw command bytes.
pub mod cmd {
    pub const BOLD_ON: [u8; 3] = [0x1B, 0x45, 0x01];
    pub const BOLD_OFF: [u8; 3] = [0x1B, 0x45, 0x00];

    pub const SIZE_DOUBLE: [u8; 3] = [0x1D, 0x21, 0x11];
    pub const SIZE_NORMAL: [u8; 3] = [0x1D, 0x21, 0x00];

    pub const ALIGN_LEFT: [u8; 3] = [0x1B, 0x61, 0x00];
    pub const ALIGN_CENTER: [u8; 3] = [0x1B, 0x61, 0x01];
    pub const ALIGN_RIGHT: [u8; 3] = [0x1B, 0x61, 0x02];

    pub const FONT_SMALL: [u8; 3] = [0x1B, 0x4D, 0x01];
    pub const FONT_NORMAL: [u8; 3] = [0x1B, 0x4D, 0x00];

    /// QR: select model 2.
    pub const QR_MODEL_2: [u8; 9] = [0x1D, 0x28, 0x6B, 0x04, 0x00, 0x31, 0x41, 0x32, 0x00];
    /// QR: module size 8 dots.
    pub const QR_MODULE_SIZE_8: [u8; 8] = [0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x43, 0x08];
    /// QR: error correction level L.
    pub const QR_ERROR_CORRECTION_L: [u8; 8] = [0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x45, 0x30];
    /// QR: store data header, followed by `pL pH` and `31 50 30`.
    pub const QR_STORE_PREFIX: [u8; 3] = [0x1D, 0x28, 0x6B];
    pub const QR_STORE_FN: [u8; 3] = [0x31, 0x50, 0x30];
    /// QR: print stored symbol.
    pub const QR_PRINT: [u8; 8] = [0x1D, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x51, 0x30];
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// ESC/POS job buffer.
#[derive(Debug, Default, Clone)]
pub struct EscPos {
    buf: BytesMut,
}

impl EscPos {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(512),
        }
    }

    /// Append raw bytes.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.put_slice(bytes);
        self
    }

    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.raw(if on { &cmd::BOLD_ON } else { &cmd::BOLD_OFF })
    }

    /// Double width and height, or back to normal size.
    pub fn double_size(&mut self, on: bool) -> &mut Self {
        self.raw(if on {
            &cmd::SIZE_DOUBLE
        } else {
            &cmd::SIZE_NORMAL
        })
    }

    pub fn align(&mut self, align: Align) -> &mut Self {
        self.raw(match align {
            Align::Left => &cmd::ALIGN_LEFT,
            Align::Center => &cmd::ALIGN_CENTER,
            Align::Right => &cmd::ALIGN_RIGHT,
        })
    }

    pub fn small_font(&mut self, on: bool) -> &mut Self {
        self.raw(if on {
            &cmd::FONT_SMALL
        } else {
            &cmd::FONT_NORMAL
        })
    }

    /// Append one text line (UTF-8, newline terminated).
    pub fn line(&mut self, text: &str) -> &mut Self {
        self.buf.put_slice(text.as_bytes());
        self.buf.put_u8(b'\n');
        self
    }

    /// Append an empty line.
    pub fn blank(&mut self) -> &mut Self {
        self.buf.put_u8(b'\n');
        self
    }

    pub fn separator(&mut self) -> &mut Self {
        self.line(SEPARATOR)
    }

    /// Append `lines` empty lines so the ticket clears the tear bar.
    pub fn feed(&mut self, lines: usize) -> &mut Self {
        for _ in 0..lines {
            self.blank();
        }
        self
    }

    /// Append a QR code symbol holding `data`.
    ///
    /// # Errors
    ///
    /// Returns [`PrinterError::QrPayloadTooLarge`] if `data` is longer than
    /// [`MAX_QR_PAYLOAD`] bytes.
    pub fn qr(&mut self, data: &str) -> Result<&mut Self> {
        let payload = data.as_bytes();
        if payload.len() > MAX_QR_PAYLOAD {
            return Err(PrinterError::QrPayloadTooLarge {
                len: payload.len(),
                max: MAX_QR_PAYLOAD,
            });
        }

        let len = payload.len() + 3;
        let p_l = (len % 256) as u8;
        let p_h = (len / 256) as u8;

        self.raw(&cmd::QR_MODEL_2)
            .raw(&cmd::QR_MODULE_SIZE_8)
            .raw(&cmd::QR_ERROR_CORRECTION_L)
            .raw(&cmd::QR_STORE_PREFIX)
            .raw(&[p_l, p_h])
            .raw(&cmd::QR_STORE_FN)
            .raw(payload)
            .raw(&cmd::QR_PRINT);

        Ok(self)
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish the job.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}
