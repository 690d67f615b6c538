pub mod blame;
pub mod history;
pub mod locate;
pub mod repository;

#[cfg(test)]
pub mod test_support;

pub use repository::GitRepository;
