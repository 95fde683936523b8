use crate::layer_build::domain::ContentDigest;
use sha2::{Digest, Sha256};
use std::io::{self, Write};

/// Write adapter that hashes every byte accepted by its inner writer
pub struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
    bytes_written: u64,
}

impl<W> HashingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes_written: 0,
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Returns the inner writer and the SHA-256 of everything written through it
    pub fn finalize(self) -> (W, ContentDigest) {
        let digest = ContentDigest::sha256(hex::encode(self.hasher.finalize()));
        (self.inner, digest)
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        self.bytes_written = self
            .bytes_written
            .saturating_add(written.try_into().unwrap_or(u64::MAX));
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashes_written_bytes() {
        let mut writer = HashingWriter::new(Vec::new());
        writer.write_all(b"hello ").unwrap();
        writer.write_all(b"world").unwrap();
        assert_eq!(writer.bytes_written(), 11);

        let (inner, digest) = writer.finalize();
        assert_eq!(inner, b"hello world");
        assert_eq!(
            digest.to_string(),
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_empty_digest() {
        let (_, digest) = HashingWriter::new(Vec::<u8>::new()).finalize();
        assert_eq!(
            digest.hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    /// Accepts at most three bytes per call
    struct ShortWriter(Vec<u8>);

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(3);
            self.0.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_short_writes_hash_only_accepted_bytes() {
        let mut writer = HashingWriter::new(ShortWriter(Vec::new()));
        assert_eq!(writer.write(b"abcdef").unwrap(), 3);
        writer.write_all(b"def").unwrap();

        let (inner, digest) = writer.finalize();
        assert_eq!(inner.0, b"abcdef");
        let (_, expected) = {
            let mut reference = HashingWriter::new(Vec::new());
            reference.write_all(b"abcdef").unwrap();
            reference.finalize()
        };
        assert_eq!(digest, expected);
    }
}
