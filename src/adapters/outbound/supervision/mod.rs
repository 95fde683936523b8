/// Process supervision adapters
mod s6_writer;

pub use s6_writer::S6SupervisionWriter;
