//! Query functions per table. Each returns raw rows; mapping to domain
//! types happens in [`crate::pg_store`].

pub mod availability_repo;
pub mod booking_repo;
pub mod resource_repo;
pub mod tag_repo;

pub use availability_repo::AvailabilityRepo;
pub use booking_repo::BookingRepo;
pub use resource_repo::ResourceRepo;
pub use tag_repo::TagRepo;
