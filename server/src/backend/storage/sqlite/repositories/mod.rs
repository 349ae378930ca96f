// Repository modules
pub mod assignment_repository;
pub mod child_repository;
pub mod chore_repository;
pub mod daily_record_repository;
pub mod member_repository;

// Re-export repository types
pub use assignment_repository::AssignmentRepository;
pub use child_repository::ChildRepository;
pub use chore_repository::ChoreRepository;
pub use daily_record_repository::DailyRecordRepository;
pub use member_repository::MemberRepository;
