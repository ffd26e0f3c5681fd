pub use admin::*;
pub use user::*;
pub use view::*;

mod admin;
mod user;
mod view;
