pub mod create_user;
pub mod delete_user;
pub mod get_user;
pub mod health;
pub mod invoke;
pub mod list_users;

pub use create_user::create_user;
pub use delete_user::delete_user;
pub use get_user::get_user;
pub use list_users::list_users;
