//! The duplex byte channel a [`super::Session`] is built on (§4.8, §9: "raw
//! function pointers... become small capability interfaces").

/// A single request/response exchange's transport. `send` carries one whole
/// request frame; `recv` fills `buf` with one whole response frame and
/// returns the number of bytes written. Either returning failure is a
/// transport-level `COMM` error (§7) — no retries are attempted.
pub trait Transport {
    fn send(&mut self, bytes: &[u8]) -> bool;
    fn recv(&mut self, buf: &mut [u8]) -> Option<usize>;
}
