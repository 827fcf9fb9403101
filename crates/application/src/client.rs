//! Client-side data layer: a deduplicating query cache and optimistic
//! mutations over any [`DataSource`](crate::DataSource).

mod collection;
mod inbox;
mod optimistic;
mod query_cache;

pub use collection::{ResourceCollection, Toaster, TracingToaster};
pub use inbox::NotificationInbox;
pub use optimistic::{Entry, EntryKey, Mutation, MutationKind, MutationState, OptimisticCollection};
pub use query_cache::{QueryCache, QuerySnapshot};
