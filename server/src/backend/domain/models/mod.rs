pub mod child;
pub mod chore;
pub mod daily_record;
pub mod member;
