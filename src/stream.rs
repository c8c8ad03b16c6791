//! Byte-stream adapters: arbitrary-length data in, whole RS blocks out.
//!
//! ```text
//! Send: bytes -> message-size chunks -> encode -> [parity | payload] bytes -> W
//! Recv: R -> block-size chunks -> decode -> payload bytes
//! ```
//!
//! One byte carries one symbol, so these only work for fields of at most 256
//! elements. There is no length framing: the zero padding that
//! [`EncodeWriter::finish`] adds to the last block comes back out of the
//! [`DecodeReader`].

use std::io::{self, Read, Write};

use log::{debug, warn};

use crate::decoder::{DecodeOutcome, Decoder};
use crate::encoder::Encoder;
use crate::{Error, Symbol};

/// Largest field whose symbols fit in a byte.
const BYTE_FIELD_SIZE: usize = 256;

fn check_byte_field(field_size: usize) -> Result<(), Error> {
    if field_size > BYTE_FIELD_SIZE {
        return Err(Error::SymbolTooWide(field_size));
    }
    Ok(())
}

// --- EncodeWriter ---

/// Buffers writes of any size into message-sized chunks and writes each
/// encoded block to the inner writer.
///
/// Call [`finish`](EncodeWriter::finish) to emit the last, zero-padded block;
/// dropping the writer discards a pending partial chunk.
///
/// Buffered bytes stay buffered until their block has been written, so a
/// failed write can be retried. A block the inner writer failed on part-way
/// may be written again in full on retry.
#[derive(Debug)]
pub struct EncodeWriter<W: Write> {
    inner: W,
    encoder: Encoder,
    block: Vec<Symbol>,
    /// Payload bytes not yet forming a full chunk.
    leftovers: Vec<u8>,
    out: Vec<u8>,
    blocks_written: u64,
}

impl<W: Write> EncodeWriter<W> {
    pub fn new(inner: W, encoder: Encoder) -> Result<Self, Error> {
        check_byte_field(encoder.field().size())?;
        let block_size = encoder.block_size();
        let message_size = encoder.message_size();
        Ok(Self {
            inner,
            block: vec![0; block_size],
            leftovers: Vec::with_capacity(message_size),
            out: vec![0; block_size],
            blocks_written: 0,
            encoder,
        })
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Full blocks emitted so far.
    pub fn blocks_written(&self) -> u64 {
        self.blocks_written
    }

    /// Pad and write the pending partial chunk, then flush. On error the
    /// chunk is kept and the call can be repeated.
    pub fn try_finish(&mut self) -> io::Result<()> {
        if !self.leftovers.is_empty() {
            let pending = self.leftovers.len();
            let message_size = self.encoder.message_size();
            debug!(
                "padding final block: {pending} of {message_size} payload bytes, {} zero bytes",
                message_size - pending
            );
            self.write_block(&[])?;
        }
        self.inner.flush()
    }

    /// [`try_finish`](EncodeWriter::try_finish) and hand back the inner
    /// writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.try_finish()?;
        Ok(self.inner)
    }

    /// Encode `leftovers` followed by `tail`, at most `message_size` bytes in
    /// total, as one block; the rest of the payload is zero. Leftovers are
    /// cleared only once the block is out.
    fn write_block(&mut self, tail: &[u8]) -> io::Result<()> {
        let parity = self.encoder.parity_size();
        self.block.fill(0);
        let payload = self.leftovers.iter().chain(tail);
        for (dst, &b) in self.block[parity..].iter_mut().zip(payload) {
            *dst = b as Symbol;
        }

        self.encoder.encode(&mut self.block)?;

        for (dst, &sym) in self.out.iter_mut().zip(&self.block) {
            *dst = sym as u8;
        }
        self.inner.write_all(&self.out)?;
        self.leftovers.clear();
        self.blocks_written += 1;
        Ok(())
    }
}

impl<W: Write> Write for EncodeWriter<W> {
    /// Returns `Err` only when nothing from `buf` was taken. A failure after
    /// some blocks went out is reported as a short write instead.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let message_size = self.encoder.message_size();
        let mut consumed = 0;

        // Complete leftovers from a previous write first.
        if !self.leftovers.is_empty() {
            let take = (message_size - self.leftovers.len()).min(buf.len());
            if self.leftovers.len() + take < message_size {
                self.leftovers.extend_from_slice(&buf[..take]);
                return Ok(take);
            }
            self.write_block(&buf[..take])?;
            consumed = take;
        }

        while buf.len() - consumed >= message_size {
            if let Err(e) = self.write_block(&buf[consumed..consumed + message_size]) {
                if consumed == 0 {
                    return Err(e);
                }
                return Ok(consumed);
            }
            consumed += message_size;
        }

        self.leftovers.extend_from_slice(&buf[consumed..]);
        Ok(buf.len())
    }

    /// Flushes the inner writer only. A partial chunk stays buffered until
    /// more data arrives or [`EncodeWriter::finish`] is called.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// --- DecodeReader ---

/// Counters kept by a [`DecodeReader`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Blocks read and decoded.
    pub blocks: u64,
    /// Symbols repaired across all blocks.
    pub corrected_symbols: u64,
    /// Blocks whose syndromes stayed nonzero after correction.
    pub uncorrectable_blocks: u64,
}

/// Reads whole blocks from the inner reader, decodes them, and serves only
/// the payload bytes.
///
/// Errors from the inner reader leave the partially read block in place, so
/// the read can be retried. A truncated block, or an uncorrectable block in
/// strict mode, ends the stream: every later read returns the same error.
/// Payload already decoded before a failure is always served first.
#[derive(Debug)]
pub struct DecodeReader<R: Read> {
    inner: R,
    decoder: Decoder,
    block: Vec<Symbol>,
    raw: Vec<u8>,
    /// Bytes of the next block already in `raw`.
    raw_filled: usize,
    /// Decoded payload of the current block.
    payload: Vec<u8>,
    payload_pos: usize,
    strict: bool,
    eof: bool,
    /// Error to report on the next read.
    pending: Option<Error>,
    stats: StreamStats,
}

impl<R: Read> DecodeReader<R> {
    pub fn new(inner: R, decoder: Decoder) -> Result<Self, Error> {
        check_byte_field(decoder.field().size())?;
        let block_size = decoder.block_size();
        let message_size = decoder.message_size();
        Ok(Self {
            inner,
            block: vec![0; block_size],
            raw: vec![0; block_size],
            raw_filled: 0,
            payload: Vec::with_capacity(message_size),
            payload_pos: 0,
            strict: false,
            eof: false,
            pending: None,
            stats: StreamStats::default(),
            decoder,
        })
    }

    /// When set, an uncorrectable block fails the read with
    /// [`Error::Uncorrectable`] instead of being logged and passed through.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read exactly one block into `raw`. Returns false on clean EOF.
    fn read_block(&mut self) -> Result<bool, Error> {
        let expected = self.raw.len();
        while self.raw_filled < expected {
            match self.inner.read(&mut self.raw[self.raw_filled..]) {
                Ok(0) => break,
                Ok(n) => self.raw_filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        match std::mem::replace(&mut self.raw_filled, 0) {
            0 => Ok(false),
            n if n == expected => Ok(true),
            actual => Err(Error::TruncatedBlock { expected, actual }),
        }
    }

    /// Decode the next block into `payload`. Returns false on clean EOF.
    fn next_block(&mut self) -> Result<bool, Error> {
        if !self.read_block()? {
            self.eof = true;
            return Ok(false);
        }

        for (dst, &b) in self.block.iter_mut().zip(&self.raw) {
            *dst = b as Symbol;
        }

        let index = self.stats.blocks;
        self.stats.blocks += 1;

        match self.decoder.decode(&mut self.block)? {
            DecodeOutcome::Unchanged => {}
            DecodeOutcome::Corrected { symbols } => {
                debug!("block {index}: corrected {symbols} symbols");
                self.stats.corrected_symbols += symbols as u64;
            }
            DecodeOutcome::PossiblyUncorrectable => {
                self.stats.uncorrectable_blocks += 1;
                if self.strict {
                    return Err(Error::Uncorrectable { block: index });
                }
                warn!("block {index}: too many errors to correct, passing through");
            }
        }

        let parity = self.decoder.parity_size();
        self.payload.clear();
        self.payload
            .extend(self.block[parity..].iter().map(|&sym| sym as u8));
        self.payload_pos = 0;
        Ok(true)
    }

    /// Hand out the pending error. Stream-ending errors stay pending.
    fn take_error(&mut self) -> Option<Error> {
        let err = self.pending.take()?;
        self.pending = stream_ending(&err);
        Some(err)
    }
}

/// Copy of an error after which no further block can be served.
fn stream_ending(err: &Error) -> Option<Error> {
    match *err {
        Error::TruncatedBlock { expected, actual } => Some(Error::TruncatedBlock { expected, actual }),
        Error::Uncorrectable { block } => Some(Error::Uncorrectable { block }),
        _ => None,
    }
}

impl<R: Read> Read for DecodeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(err) = self.take_error() {
            return Err(err.into());
        }

        let mut written = 0;
        while written < buf.len() {
            if self.payload_pos == self.payload.len() {
                if self.eof {
                    break;
                }
                match self.next_block() {
                    Ok(true) => {}
                    Ok(false) => break,
                    // Serve what this call already has; report next time.
                    Err(err) if written > 0 => {
                        self.pending = Some(err);
                        break;
                    }
                    Err(err) => {
                        self.pending = stream_ending(&err);
                        return Err(err.into());
                    }
                }
            }

            let available = &self.payload[self.payload_pos..];
            let n = available.len().min(buf.len() - written);
            buf[written..written + n].copy_from_slice(&available[..n]);
            self.payload_pos += n;
            written += n;
        }

        Ok(written)
    }
}
