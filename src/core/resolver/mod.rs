pub mod cache;
pub mod resolver;
pub mod schema;
pub mod store;

pub use cache::{PublisherIdentityCache, ResolverCache};
pub use resolver::{ConfigResolver, RegisteredPubs, ResolverError};
pub use schema::{BidderSchema, FieldSpec, FieldType};
pub use store::{InMemoryStore, KvStore, SqlStore, Tier};
