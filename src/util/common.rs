use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Create random string with a given length
pub fn random_string(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
