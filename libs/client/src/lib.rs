//! Recipe Box client SDK
//!
//! State and transport for a Recipe Box front end: a tab-scoped session,
//! a single-slot notification channel, an HTTP gateway that normalises every
//! answer into [`ApiResponse`], stores for auth, search and favorites, and a
//! route guard. Nothing here is global; every component is built from an
//! explicit [`SessionContext`] and cloned where it is needed.
//!
//! ```no_run
//! use client::{ApiClient, MemoryStorage, Notifier, SessionContext, stores::RecipeStore};
//! use std::sync::Arc;
//!
//! async fn example() -> Result<(), client::ClientError> {
//!     let session = SessionContext::new(Arc::new(MemoryStorage::default()));
//!     let api = ApiClient::new("http://localhost:3000", session.clone())?;
//!     let recipes = RecipeStore::new(api, Notifier::default());
//!     recipes.search("pasta").await;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod gateway;
pub mod icons;
pub mod models;
pub mod notification;
pub mod router;
pub mod session;
pub mod storage;
pub mod stores;

pub use error::ClientError;
pub use gateway::{ApiClient, ApiResponse};
pub use notification::{Notification, NotificationKind, Notifier};
pub use router::{Navigation, Route, RouteAccess, RouteGuard};
pub use session::SessionContext;
pub use storage::{MemoryStorage, SessionStorage};
pub use stores::ActionResult;
