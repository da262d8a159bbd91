//! Domain models returned by the repository layer.
//!
//! These are typed records, decoded once at the database boundary. Handlers
//! serialize them directly; password material never appears here. The `New*`
//! types are request bodies for the write endpoints.

pub mod catalog;
pub mod shopping_list;
pub mod user;

pub use catalog::{NewProduct, NewStore, Product, ProductSummary, Store};
pub use shopping_list::{
    ListItem, ListProductRow, ListProductView, NewListItem, NewShoppingList, ShoppingList,
    ShoppingListUpdate,
};
pub use user::User;
