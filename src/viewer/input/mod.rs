//! Keyboard input: byte decoding and the pump thread feeding the renderer.

pub mod input_pump;
pub mod key_decoder;

pub use input_pump::{InputPump, PumpExit, POLL_INTERVAL};
pub use key_decoder::{DecoderState, KeyDecoder, KeyEvent};
