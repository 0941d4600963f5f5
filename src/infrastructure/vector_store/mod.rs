pub mod local_vector_index;

pub use local_vector_index::{IndexManifest, LocalVectorIndex};
