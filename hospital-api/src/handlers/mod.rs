pub mod cohorts;
pub mod health;
pub mod outreach;
pub mod sessions;

#[cfg(test)]
pub(crate) mod test_support;
