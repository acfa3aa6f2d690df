// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telnet text codec for the `WattBox` command interface.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;

const IAC: u8 = 255;
const SB: u8 = 250;
const SE: u8 = 240;
const WILL: u8 = 251;
const DONT: u8 = 254;

const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Frames the device's text stream at a configurable delimiter.
///
/// The login dialogue ends its prompts without a newline, so the delimiter
/// is switched per read: the prompt text during the handshake, `\n` for
/// command responses. Each frame includes its delimiter.
///
/// Telnet command sequences are dropped on arrival. Option negotiation is
/// never answered; the device works with a client that refuses every
/// option. Outgoing lines are terminated with CRLF.
#[derive(Debug)]
pub struct TelnetCodec {
    delimiter: Vec<u8>,
    text: BytesMut,
    searched: usize,
}

impl TelnetCodec {
    /// Creates a codec that frames at `delimiter`.
    #[must_use]
    pub fn new(delimiter: &[u8]) -> Self {
        Self {
            delimiter: delimiter.to_vec(),
            text: BytesMut::new(),
            searched: 0,
        }
    }

    /// Changes the delimiter for the next frame.
    pub fn set_delimiter(&mut self, delimiter: &[u8]) {
        if self.delimiter != delimiter {
            self.delimiter = delimiter.to_vec();
            self.searched = 0;
        }
    }

    /// Drops decoded text that has not been framed yet.
    pub fn clear(&mut self) {
        self.text.clear();
        self.searched = 0;
    }

    /// Splits off the buffered text up to and including the delimiter.
    pub fn take_frame(&mut self) -> Option<String> {
        let start = self.searched.min(self.text.len());
        match find(&self.text[start..], &self.delimiter) {
            Some(pos) => {
                let frame = self.text.split_to(start + pos + self.delimiter.len());
                self.searched = 0;
                Some(String::from_utf8_lossy(&frame).into_owned())
            }
            None => {
                // A delimiter may straddle two reads
                self.searched = self
                    .text
                    .len()
                    .saturating_sub(self.delimiter.len().saturating_sub(1));
                None
            }
        }
    }

    /// Moves data bytes from `src` into the text buffer. An incomplete
    /// telnet command stays in `src` until the rest of it arrives.
    fn absorb(&mut self, src: &mut BytesMut) {
        while !src.is_empty() {
            let Some(iac) = src.iter().position(|&b| b == IAC) else {
                self.text.extend_from_slice(src);
                src.clear();
                return;
            };
            self.text.extend_from_slice(&src[..iac]);
            src.advance(iac);

            let Some(len) = command_len(src) else {
                return;
            };
            if src[1] == IAC {
                self.text.put_u8(IAC);
            }
            src.advance(len);
        }
    }
}

/// Length of the telnet command at the start of `buf`, or `None` while it
/// is incomplete.
fn command_len(buf: &[u8]) -> Option<usize> {
    match *buf.get(1)? {
        WILL..=DONT => (buf.len() >= 3).then_some(3),
        SB => buf
            .get(2..)?
            .windows(2)
            .position(|w| w == [IAC, SE])
            .map(|pos| pos + 4),
        _ => Some(2),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

impl Decoder for TelnetCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        self.absorb(src);
        Ok(self.take_frame())
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, ProtocolError> {
        let frame = self.decode(src)?;
        // A truncated telnet command carries no text
        src.clear();
        Ok(frame)
    }
}

impl Encoder<&str> for TelnetCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: &str, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        dst.reserve(line.len() + LINE_TERMINATOR.len());
        dst.put_slice(line.as_bytes());
        dst.put_slice(LINE_TERMINATOR);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut TelnetCodec, chunks: &[&[u8]]) -> Vec<String> {
        let mut src = BytesMut::new();
        let mut frames = Vec::new();
        for chunk in chunks {
            src.extend_from_slice(chunk);
            while let Some(frame) = codec.decode(&mut src).unwrap() {
                frames.push(frame);
            }
        }
        frames
    }

    #[test]
    fn frames_at_delimiter() {
        let mut codec = TelnetCodec::new(b"\n");
        let frames = decode_all(&mut codec, &[b"?Firmware=2.8.0.0\r\n?Model=WB"]);
        assert_eq!(frames, ["?Firmware=2.8.0.0\r\n"]);
        assert_eq!(decode_all(&mut codec, &[b"\r\n"]), ["?Model=WB\r\n"]);
    }

    #[test]
    fn frames_at_prompt_split_across_reads() {
        let mut codec = TelnetCodec::new(b"Username: ");
        let frames = decode_all(&mut codec, &[b"Welcome\r\nUser", b"name: "]);
        assert_eq!(frames, ["Welcome\r\nUsername: "]);
    }

    #[test]
    fn delimiter_change_finds_buffered_text() {
        let mut codec = TelnetCodec::new(b"Password: ");
        assert!(decode_all(&mut codec, &[b"\r\nSuccessfully Logged In!"]).is_empty());

        codec.set_delimiter(b"Successfully Logged In!");
        assert_eq!(
            codec.take_frame().as_deref(),
            Some("\r\nSuccessfully Logged In!")
        );
    }

    #[test]
    fn strips_negotiation() {
        // IAC DO ECHO, IAC WILL SGA
        let mut codec = TelnetCodec::new(b"\n");
        let frames = decode_all(&mut codec, &[&[IAC, 253, 1, b'O', IAC, WILL, 3, b'K', b'\n']]);
        assert_eq!(frames, ["OK\n"]);
    }

    #[test]
    fn negotiation_split_across_reads() {
        let mut codec = TelnetCodec::new(b"\n");
        let frames = decode_all(&mut codec, &[&[b'a', IAC], &[253], &[24, b'b', b'\n']]);
        assert_eq!(frames, ["ab\n"]);
    }

    #[test]
    fn strips_subnegotiation() {
        let mut codec = TelnetCodec::new(b"\n");
        let frames = decode_all(&mut codec, &[&[IAC, SB, 24, 1], &[IAC, SE, b'x', b'\n']]);
        assert_eq!(frames, ["x\n"]);
    }

    #[test]
    fn unescapes_iac() {
        let mut codec = TelnetCodec::new(b"\n");
        let mut src = BytesMut::from(&[IAC, IAC, b'\n'][..]);
        let frame = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(frame.as_bytes(), "\u{FFFD}\n".as_bytes());
    }

    #[test]
    fn clear_drops_unframed_text() {
        let mut codec = TelnetCodec::new(b"\n");
        assert!(decode_all(&mut codec, &[b"stale"]).is_empty());
        codec.clear();
        assert_eq!(decode_all(&mut codec, &[b"?Hostname=WattBox\n"]), ["?Hostname=WattBox\n"]);
    }

    #[test]
    fn eof_discards_truncated_command() {
        let mut codec = TelnetCodec::new(b"\n");
        let mut src = BytesMut::from(&[IAC, WILL][..]);
        assert_eq!(codec.decode_eof(&mut src).unwrap(), None);
        assert!(src.is_empty());
    }

    #[test]
    fn encodes_with_crlf() {
        let mut codec = TelnetCodec::new(b"\n");
        let mut dst = BytesMut::new();
        codec.encode("!OutletSet=3,ON", &mut dst).unwrap();
        assert_eq!(&dst[..], b"!OutletSet=3,ON\r\n");
    }
}
