/// Archive adapters for the compressed layer blob
mod hashing_writer;
mod tarball_encoder;

pub use hashing_writer::HashingWriter;
pub use tarball_encoder::TarballEncoder;
