use crate::core::Error;
use bcrypt::DEFAULT_COST;

/// Create hash by bcrypt
pub fn hash_password(password: &str) -> Result<String, Error> {
    bcrypt::hash(password, DEFAULT_COST).map_err(Error::Bcrypt)
}

/// Verify the password against the stored bcrypt hash
pub fn verify_password(password: &str, hashed_password: &str) -> Result<(), Error> {
    let matched = bcrypt::verify(password, hashed_password).map_err(Error::Bcrypt)?;
    if matched {
        Ok(())
    } else {
        Err(Error::WrongPassword)
    }
}

// ========================// tests //======================== //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::common;

    #[test]
    fn test_password() {
        let password = common::random_string(7);
        let hashed_password = hash_password(&password).unwrap();

        assert!(verify_password(&password, &hashed_password).is_ok());
        assert!(verify_password("wrong", &hashed_password).is_err());
    }
}
