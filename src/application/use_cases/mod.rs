/// Use cases module containing application business logic orchestration
mod assemble_filesystem;
mod build_layer;

pub use assemble_filesystem::AssembleFilesystemUseCase;
pub use build_layer::BuildLayerUseCase;
