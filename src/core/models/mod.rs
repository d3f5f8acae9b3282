pub mod category;
pub mod transaction;
pub mod user;

pub use category::Category;
pub use transaction::{Currency, Transaction, TxType};
pub use user::AuthUser;
