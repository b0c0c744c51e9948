//! Chunked zlib inflate.
//!
//! An [`Inflater`] owns one decompressor context and two fixed-size staging
//! buffers. Compressed input is read one chunk at a time and each chunk is
//! drained through the output buffer into a growing sink, so peak working
//! memory depends only on the configured chunk sizes and the size of the
//! result.

use crate::{InflateConfig, InflateError, Result};
use flate2::{Decompress, DecompressError, FlushDecompress, Status};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Compression method nibble for deflate.
const ZLIB_DEFLATE: u8 = 8;
/// Preset dictionary flag in the FLG byte.
const ZLIB_FDICT: u8 = 0x20;

/// A single-use inflate session.
///
/// The session is consumed by [`Inflater::inflate`], which releases the
/// decompressor context and staging buffers on every exit path.
pub struct Inflater {
    stream: Decompress,
    input: Box<[u8]>,
    output: Box<[u8]>,
    max_output: Option<usize>,
}

impl Inflater {
    /// Creates a session with the given configuration.
    pub fn new(config: &InflateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            stream: Decompress::new(true),
            input: vec![0u8; config.input_chunk].into_boxed_slice(),
            output: vec![0u8; config.output_chunk].into_boxed_slice(),
            max_output: config.max_output,
        })
    }

    /// Inflates the whole zlib stream read from `source`.
    ///
    /// Returns the complete decompressed bytes, or an error with no partial
    /// output. Bytes following the end of the stream are left unread or
    /// ignored.
    pub fn inflate<R: Read>(self, mut source: R) -> Result<Vec<u8>> {
        let Self {
            mut stream,
            mut input,
            mut output,
            max_output,
        } = self;

        let mut sink = Vec::new();

        let header = read_header(&mut source)?;
        drain(&mut stream, &header, &mut output, &mut sink, max_output)?;

        loop {
            let read = source.read(&mut input)?;
            if read == 0 {
                return Err(InflateError::Truncated {
                    consumed: stream.total_in(),
                });
            }
            tracing::trace!(read, "read compressed chunk");

            if drain(&mut stream, &input[..read], &mut output, &mut sink, max_output)? {
                tracing::debug!(
                    compressed = stream.total_in(),
                    inflated = sink.len(),
                    "inflate complete"
                );
                return Ok(sink);
            }
        }
    }
}

/// Reads the two-byte zlib header.
///
/// A well-formed header with FDICT set is answered with `NeedDictionary`
/// carrying the DICTID that follows it.
fn read_header<R: Read>(source: &mut R) -> Result<[u8; 2]> {
    let mut header = [0u8; 2];
    fill(source, &mut header, 0)?;

    let (cmf, flg) = (header[0], header[1]);
    let well_formed = (u16::from(cmf) * 256 + u16::from(flg)) % 31 == 0
        && cmf & 0x0f == ZLIB_DEFLATE
        && cmf >> 4 <= 7;
    if well_formed && flg & ZLIB_FDICT != 0 {
        let mut dict_id = [0u8; 4];
        fill(source, &mut dict_id, header.len() as u64)?;
        let err = InflateError::NeedDictionary {
            adler: u32::from_be_bytes(dict_id),
        };
        tracing::warn!(error = %err, "inflate failed");
        return Err(err);
    }

    Ok(header)
}

/// Fills `buf` from `source`, reporting a short source as truncation.
fn fill<R: Read>(source: &mut R, buf: &mut [u8], consumed: u64) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let read = source.read(&mut buf[filled..])?;
        if read == 0 {
            return Err(InflateError::Truncated {
                consumed: consumed + filled as u64,
            });
        }
        filled += read;
    }
    Ok(())
}

/// Feeds `pending` to the decompressor, draining output into the sink.
///
/// Returns true once the stream has ended.
fn drain(
    stream: &mut Decompress,
    mut pending: &[u8],
    output: &mut [u8],
    sink: &mut Vec<u8>,
    limit: Option<usize>,
) -> Result<bool> {
    loop {
        let before_in = stream.total_in();
        let before_out = stream.total_out();

        let result = stream.decompress(pending, output, FlushDecompress::None);
        let status = result.map_err(|e| classify(e, stream.total_in()))?;

        let consumed = (stream.total_in() - before_in) as usize;
        let produced = (stream.total_out() - before_out) as usize;
        pending = &pending[consumed..];
        append(sink, &output[..produced], limit)?;

        if matches!(status, Status::StreamEnd) {
            if !pending.is_empty() {
                tracing::trace!(trailing = pending.len(), "ignoring bytes after stream end");
            }
            return Ok(true);
        }

        // A full output buffer may hide more pending output.
        if produced == output.len() {
            continue;
        }
        if pending.is_empty() {
            return Ok(false);
        }
        if consumed == 0 && produced == 0 {
            return Err(InflateError::DataCorruption {
                offset: stream.total_in(),
                message: "decompressor made no progress".to_string(),
            });
        }
    }
}

/// Maps a decompressor fault onto the error taxonomy.
///
/// `offset` is the count of compressed bytes consumed when the fault was
/// reported.
fn classify(err: DecompressError, offset: u64) -> InflateError {
    let kind = match err.needs_dictionary() {
        Some(adler) => InflateError::NeedDictionary { adler },
        None => InflateError::DataCorruption {
            offset,
            message: err.to_string(),
        },
    };
    tracing::warn!(error = %kind, "inflate failed");
    kind
}

/// Appends produced bytes to the sink, enforcing the output limit.
fn append(sink: &mut Vec<u8>, bytes: &[u8], limit: Option<usize>) -> Result<()> {
    if bytes.is_empty() {
        return Ok(());
    }
    if let Some(limit) = limit {
        if sink.len().saturating_add(bytes.len()) > limit {
            return Err(InflateError::OutputLimit { limit });
        }
    }
    sink.try_reserve(bytes.len())
        .map_err(|e| InflateError::Memory(e.to_string()))?;
    sink.extend_from_slice(bytes);
    Ok(())
}

/// Inflates a zlib stream from `source` with the default configuration.
pub fn inflate_reader<R: Read>(source: R) -> Result<Vec<u8>> {
    inflate_reader_with(source, &InflateConfig::default())
}

/// Inflates a zlib stream from `source`.
pub fn inflate_reader_with<R: Read>(source: R, config: &InflateConfig) -> Result<Vec<u8>> {
    Inflater::new(config)?.inflate(source)
}

/// Inflates the stored object at `path` with the default configuration.
pub fn inflate_path(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    inflate_path_with(path, &InflateConfig::default())
}

/// Inflates the stored object at `path`.
///
/// The file handle is closed before this returns, whatever the outcome.
pub fn inflate_path_with(path: impl AsRef<Path>, config: &InflateConfig) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let inflater = Inflater::new(config)?;
    let file = File::open(path)?;
    tracing::debug!(path = %path.display(), "inflating object");
    inflater.inflate(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::{self, Cursor, Write};

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn compress_stored(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::none());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn generate_data(size: usize) -> Vec<u8> {
        (0..size).map(|i| ((i * 7) % 251) as u8).collect()
    }

    /// Reader that yields some bytes, then fails.
    struct FailingReader {
        data: Cursor<Vec<u8>>,
        fail_after: usize,
        served: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served >= self.fail_after {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "source closed"));
            }
            let max = buf.len().min(self.fail_after - self.served);
            let n = self.data.read(&mut buf[..max])?;
            self.served += n;
            Ok(n)
        }
    }

    #[test]
    fn test_inflate_roundtrip() {
        let data = b"Hello, World!".to_vec();
        let out = inflate_reader(Cursor::new(compress(&data))).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_inflate_empty_plaintext() {
        let out = inflate_reader(Cursor::new(compress(b""))).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_inflate_large_object() {
        let data = generate_data(1024 * 1024);
        let out = inflate_reader(Cursor::new(compress(&data))).unwrap();
        assert_eq!(out.len(), data.len());
        assert_eq!(out, data);
    }

    #[test]
    fn test_inflate_tiny_chunks() {
        // One-byte staging buffers force the full-output inner loop.
        let data = generate_data(4096);
        let config = InflateConfig::default().with_chunk_size(1);
        let out = inflate_reader_with(Cursor::new(compress(&data)), &config).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_inflate_uneven_chunks() {
        let data = generate_data(100_000);
        let config = InflateConfig {
            input_chunk: 7,
            output_chunk: 8192,
            max_output: None,
        };
        let out = inflate_reader_with(Cursor::new(compress(&data)), &config).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_inflate_empty_source_truncated() {
        let result = inflate_reader(Cursor::new(Vec::new()));
        assert!(matches!(result, Err(InflateError::Truncated { consumed: 0 })));
    }

    #[test]
    fn test_inflate_missing_trailer_truncated() {
        let mut compressed = compress(b"some object content");
        compressed.truncate(compressed.len() - 4);
        let result = inflate_reader(Cursor::new(compressed));
        assert!(matches!(result, Err(InflateError::Truncated { .. })));
    }

    #[test]
    fn test_inflate_half_stream_truncated() {
        let mut compressed = compress(&generate_data(50_000));
        compressed.truncate(compressed.len() / 2);
        let result = inflate_reader(Cursor::new(compressed));
        assert!(matches!(result, Err(InflateError::Truncated { .. })));
    }

    #[test]
    fn test_inflate_bad_header() {
        let mut compressed = compress(b"payload");
        compressed[0] ^= 0xFF;
        let result = inflate_reader(Cursor::new(compressed));
        assert!(matches!(result, Err(InflateError::DataCorruption { .. })));
    }

    #[test]
    fn test_inflate_reserved_block_type() {
        let mut compressed = compress(&generate_data(10_000));
        // BFINAL=1, BTYPE=11 is reserved.
        compressed[2] = 0xFF;
        let result = inflate_reader(Cursor::new(compressed));
        assert!(matches!(result, Err(InflateError::DataCorruption { .. })));
    }

    #[test]
    fn test_inflate_preset_dictionary_rejected() {
        // FDICT header followed by DICTID 1.
        let stream = vec![0x78, 0xBB, 0x00, 0x00, 0x00, 0x01, 0x03, 0x00];
        let err = inflate_reader(Cursor::new(stream)).unwrap_err();
        assert!(err.is_stream_fault());
        assert!(matches!(err, InflateError::NeedDictionary { adler: 1 }));
    }

    #[test]
    fn test_inflate_preset_dictionary_truncated_id() {
        let result = inflate_reader(Cursor::new(vec![0x78, 0xBB, 0x00, 0x00]));
        assert!(matches!(result, Err(InflateError::Truncated { consumed: 4 })));
    }

    #[test]
    fn test_inflate_fdict_with_bad_check_bits() {
        // FDICT is set but the header checksum is wrong.
        let stream = vec![0x78, 0xBC, 0x00, 0x00, 0x00, 0x01, 0x03, 0x00];
        let result = inflate_reader(Cursor::new(stream));
        assert!(matches!(result, Err(InflateError::DataCorruption { .. })));
    }

    #[test]
    fn test_inflate_corrupt_stored_payload() {
        // Level 0 keeps the plaintext verbatim inside stored blocks.
        let data = generate_data(8192);
        let mut compressed = compress_stored(&data);
        let marker = &data[4096..4160];
        let pos = compressed
            .windows(marker.len())
            .position(|w| w == marker)
            .expect("stored payload present");
        compressed[pos] ^= 0x01;

        let result = inflate_reader(Cursor::new(compressed));
        assert!(matches!(result, Err(InflateError::DataCorruption { .. })));
    }

    #[test]
    fn test_inflate_corrupt_middle_of_stream() {
        let data = generate_data(16 * 1024);
        let mut compressed = compress(&data);
        let mid = compressed.len() / 2;
        compressed[mid] ^= 0xFF;

        let err = inflate_reader(Cursor::new(compressed)).unwrap_err();
        assert!(err.is_stream_fault());
    }

    #[test]
    fn test_inflate_checksum_mismatch() {
        let mut compressed = compress(&generate_data(4096));
        let len = compressed.len();
        compressed[len - 1] ^= 0xFF;

        match inflate_reader(Cursor::new(compressed)) {
            Err(InflateError::DataCorruption { offset, .. }) => {
                assert!(offset >= (len - 4) as u64, "offset {} before trailer", offset);
            }
            other => panic!("expected checksum mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_inflate_fault_offset_past_header() {
        let mut compressed = compress(&generate_data(10_000));
        compressed[2] = 0xFF;
        match inflate_reader(Cursor::new(compressed)) {
            Err(InflateError::DataCorruption { offset, .. }) => assert!(offset >= 2),
            other => panic!("expected data error, got {:?}", other),
        }
    }

    #[test]
    fn test_inflate_io_error() {
        let compressed = compress(&generate_data(100_000));
        let reader = FailingReader {
            data: Cursor::new(compressed),
            fail_after: 100,
            served: 0,
        };
        let result = inflate_reader(reader);
        assert!(matches!(result, Err(InflateError::Io(_))));
    }

    #[test]
    fn test_inflate_output_limit() {
        let data = generate_data(10_000);
        let config = InflateConfig::default().with_max_output(1000);
        let result = inflate_reader_with(Cursor::new(compress(&data)), &config);
        assert!(matches!(result, Err(InflateError::OutputLimit { limit: 1000 })));

        let config = InflateConfig::default().with_max_output(10_000);
        let out = inflate_reader_with(Cursor::new(compress(&data)), &config).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_inflate_trailing_bytes_ignored() {
        let data = b"object".to_vec();
        let mut compressed = compress(&data);
        compressed.extend_from_slice(b"garbage after stream");
        let out = inflate_reader(Cursor::new(compressed)).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_inflate_invalid_config() {
        let config = InflateConfig::default().with_chunk_size(0);
        let result = inflate_reader_with(Cursor::new(compress(b"x")), &config);
        assert!(matches!(result, Err(InflateError::Init(_))));
    }

    #[test]
    fn test_inflate_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("object");
        let data = generate_data(20_000);
        std::fs::write(&path, compress(&data)).unwrap();

        let out = inflate_path(&path).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_inflate_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = inflate_path(dir.path().join("missing"));
        match result {
            Err(InflateError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected I/O error, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use proptest::prelude::*;
    use std::io::{Cursor, Write};

    fn compress_level(data: &[u8], level: u32) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    proptest! {
        /// Property: inflate recovers any zlib-compressed plaintext
        #[test]
        fn prop_inflate_roundtrip(
            data in prop::collection::vec(any::<u8>(), 0..20000),
            level in 0u32..=9,
            chunk in 1usize..512,
        ) {
            let compressed = compress_level(&data, level);
            let config = InflateConfig::default().with_chunk_size(chunk);
            let out = inflate_reader_with(Cursor::new(compressed), &config).unwrap();
            prop_assert_eq!(out, data);
        }

        /// Property: any strict prefix of a stream is reported, never accepted
        #[test]
        fn prop_prefix_never_succeeds(
            data in prop::collection::vec(any::<u8>(), 1..5000),
            cut in any::<prop::sample::Index>(),
        ) {
            let compressed = compress_level(&data, 6);
            let len = cut.index(compressed.len());
            let result = inflate_reader(Cursor::new(compressed[..len].to_vec()));
            prop_assert!(result.is_err());
        }

        /// Property: a damaged stream never yields different bytes
        #[test]
        fn prop_corruption_detected(
            data in prop::collection::vec(any::<u8>(), 1..5000),
            at in any::<prop::sample::Index>(),
            mask in 1u8..=255,
        ) {
            let mut compressed = compress_level(&data, 6);
            let i = at.index(compressed.len());
            compressed[i] ^= mask;
            if let Ok(out) = inflate_reader(Cursor::new(compressed)) {
                prop_assert_eq!(out, data);
            }
        }

        /// Property: arbitrary input never panics
        #[test]
        fn prop_invalid_input_no_panic(data in prop::collection::vec(any::<u8>(), 0..1000)) {
            let _ = inflate_reader(Cursor::new(data));
        }
    }
}
