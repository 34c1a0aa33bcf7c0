pub mod memo;
pub mod memo_tag_relation;
pub mod tag;
pub mod user;

pub use tag::TagScope;
