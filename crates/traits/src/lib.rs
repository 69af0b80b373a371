pub mod fallback;
pub mod resource;
pub mod sink;

pub use fallback::{ChainExhausted, Failure, Resolved, Strategy, StrategyChain};
pub use resource::{
    AssetSource, FetchRequest, FetchedAsset, InMemoryAssetSource, ResourceError,
    SharedResourceData,
};
pub use sink::{Delivered, DeliveryError, DocumentSink};
