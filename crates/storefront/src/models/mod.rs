//! Domain models and session keys.

pub mod cart;
pub mod notification;
pub mod order;
pub mod product;
pub mod user;

pub use cart::CartLine;
pub use notification::Notification;
pub use order::{NewOrder, Order, OrderItem};
pub use product::{Category, Product, ProductColor};
pub use user::{CurrentUser, User};

/// Keys used for typed session values.
///
/// Collected in one place so handlers and extractors cannot drift apart.
pub mod session_keys {
    /// The signed-in user (`CurrentUser`).
    pub const CURRENT_USER: &str = "current_user";
    /// CSRF state for the in-flight OAuth authorization request.
    pub const OAUTH_STATE: &str = "oauth_state";
}
