pub mod submit_score;
pub mod top_scores;

#[cfg(test)]
pub(crate) mod test_support;
