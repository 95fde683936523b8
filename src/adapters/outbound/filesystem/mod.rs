/// Filesystem adapters: the in-memory build tree and host file I/O
mod directory_loader;
mod index_writer;
mod memory_tree;

pub use directory_loader::DirectoryLoader;
pub use index_writer::{IndexWriter, INDEX_FILE_NAME};
pub use memory_tree::InMemoryTree;
