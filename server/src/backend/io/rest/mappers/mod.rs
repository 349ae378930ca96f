pub mod child_mapper;
pub mod chore_mapper;
pub mod daily_record_mapper;
pub mod member_mapper;
