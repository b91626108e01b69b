pub mod test_repo;

pub use test_repo::TestRepo;
