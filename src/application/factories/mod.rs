mod generator_factory;

pub use generator_factory::SbomGeneratorFactory;
