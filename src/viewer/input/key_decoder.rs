//! # Key Decoder
//!
//! Turns raw terminal bytes into semantic key events.
//!
//! Terminals deliver arrow keys as three-byte ANSI sequences (`ESC [ A`
//! up, `B` down, `C` cursor forward/right, `D` cursor back/left).
//! The decoder consumes one byte at a time and never waits for a
//! continuation byte: every byte either completes an event, advances the
//! sequence, or resets the machine to [`DecoderState::Idle`].
//!
//! ```text
//! Idle ──ESC──▶ SawEscape ──'['──▶ SawBracket ──A/B/C/D──▶ Idle (+ arrow)
//!   ▲               │                  │
//!   └───other───────┘◀─────other───────┘            (byte discarded)
//! ```

/// Byte sent by the terminal for Ctrl+C in raw mode
pub const CTRL_C: u8 = 0x03;

/// ANSI escape
pub const ESC: u8 = 0x1B;

/// Control Sequence Introducer second byte
pub const BRACKET: u8 = b'[';

/// Semantic key event produced by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Up,
    Down,
    Left,
    Right,
    Char(char),
    Interrupt,
}

/// Position of the decoder inside an escape sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    #[default]
    Idle,
    SawEscape,
    SawBracket,
}

/// Byte-at-a-time escape sequence decoder
#[derive(Debug, Default)]
pub struct KeyDecoder {
    state: DecoderState,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current machine position
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Feed one byte, returning the event it completes, if any.
    ///
    /// Ctrl+C is recognized in every state so an interrupt can never be
    /// swallowed by a half-finished escape sequence.
    pub fn feed(&mut self, byte: u8) -> Option<KeyEvent> {
        if byte == CTRL_C {
            self.state = DecoderState::Idle;
            return Some(KeyEvent::Interrupt);
        }

        match self.state {
            DecoderState::Idle => match byte {
                ESC => {
                    self.state = DecoderState::SawEscape;
                    None
                }
                0x20..=0x7E => Some(KeyEvent::Char(byte as char)),
                _ => {
                    tracing::trace!(byte, "dropping non-printable byte");
                    None
                }
            },
            DecoderState::SawEscape => {
                self.state = if byte == BRACKET {
                    DecoderState::SawBracket
                } else {
                    tracing::trace!(byte, "dropping malformed escape sequence");
                    DecoderState::Idle
                };
                None
            }
            DecoderState::SawBracket => {
                self.state = DecoderState::Idle;
                match byte {
                    b'A' => Some(KeyEvent::Up),
                    b'B' => Some(KeyEvent::Down),
                    b'C' => Some(KeyEvent::Right),
                    b'D' => Some(KeyEvent::Left),
                    _ => {
                        tracing::trace!(byte, "dropping unknown CSI sequence");
                        None
                    }
                }
            }
        }
    }

    /// Feed a whole read buffer, collecting every completed event in order
    pub fn feed_all(&mut self, bytes: &[u8]) -> Vec<KeyEvent> {
        bytes.iter().filter_map(|&b| self.feed(b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_sequences_should_emit_one_event_and_return_to_idle() {
        let cases = [
            (b'A', KeyEvent::Up),
            (b'B', KeyEvent::Down),
            (b'C', KeyEvent::Right),
            (b'D', KeyEvent::Left),
        ];

        for (last, expected) in cases {
            let mut decoder = KeyDecoder::new();
            let events = decoder.feed_all(&[ESC, BRACKET, last]);
            assert_eq!(events, vec![expected]);
            assert_eq!(decoder.state(), DecoderState::Idle);
        }
    }

    #[test]
    fn escape_followed_by_other_byte_should_emit_nothing() {
        for byte in (0u8..=255).filter(|&b| b != BRACKET && b != CTRL_C) {
            let mut decoder = KeyDecoder::new();
            assert_eq!(decoder.feed(ESC), None);
            assert_eq!(decoder.feed(byte), None, "byte {byte:#04x}");
            assert_eq!(decoder.state(), DecoderState::Idle);
        }
    }

    #[test]
    fn decoder_should_stay_usable_after_malformed_sequence() {
        let mut decoder = KeyDecoder::new();
        let events = decoder.feed_all(&[ESC, b'x', b'q', ESC, BRACKET, b'Z', b'w']);
        assert_eq!(events, vec![KeyEvent::Char('q'), KeyEvent::Char('w')]);
    }

    #[test]
    fn lone_escape_should_wait_without_emitting() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.feed_all(&[ESC]).is_empty());
        assert_eq!(decoder.state(), DecoderState::SawEscape);
    }

    #[test]
    fn interrupt_should_be_emitted_from_every_state() {
        let prefixes: [&[u8]; 3] = [&[], &[ESC], &[ESC, BRACKET]];

        for prefix in prefixes {
            let mut decoder = KeyDecoder::new();
            assert!(decoder.feed_all(prefix).is_empty());
            assert_eq!(decoder.feed(CTRL_C), Some(KeyEvent::Interrupt));
            assert_eq!(decoder.state(), DecoderState::Idle);
        }
    }

    #[test]
    fn printable_bytes_should_become_chars() {
        let mut decoder = KeyDecoder::new();
        assert_eq!(
            decoder.feed_all(b"r +~"),
            vec![
                KeyEvent::Char('r'),
                KeyEvent::Char(' '),
                KeyEvent::Char('+'),
                KeyEvent::Char('~'),
            ]
        );
    }

    #[test]
    fn control_and_high_bytes_should_be_dropped() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.feed_all(&[b'\r', b'\n', 0x7F, 0x80, 0xFF]).is_empty());
        assert_eq!(decoder.state(), DecoderState::Idle);
    }
}
