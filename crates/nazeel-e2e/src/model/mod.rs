//! Value records built from UI text.

mod order;
mod user;

pub use order::{
    format_date_time, parse_date_time, split_list, truncate_to_minute, Order, OrderItem,
    OrderStatus, DATE_TIME_FORMAT,
};
pub use user::User;
