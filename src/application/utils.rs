use crate::utils::error::{EtlError, Result};

/// Splits a full name into `(first_name, last_name)`.
///
/// A single token is used for both names; otherwise the last token is the
/// last name and everything before it the first name.
pub fn split_user_full_name(user: Option<&str>) -> Result<(String, String)> {
    let user = match user {
        Some(user) if !user.trim().is_empty() => user,
        _ => {
            return Err(EtlError::ImproperlyConfigured {
                message: "User name is empty".to_string(),
            })
        }
    };

    let name_tokens: Vec<&str> = user.split(' ').collect();
    match name_tokens.as_slice() {
        [] => Err(EtlError::ImproperlyConfigured {
            message: "User name is empty".to_string(),
        }),
        [single] => Ok((single.to_string(), single.to_string())),
        [first @ .., last] => Ok((first.join(" "), last.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_tokens() {
        let (first, last) = split_user_full_name(Some("Paul Iusztin")).unwrap();
        assert_eq!(first, "Paul");
        assert_eq!(last, "Iusztin");
    }

    #[test]
    fn test_many_tokens() {
        let (first, last) = split_user_full_name(Some("Mary Ann Van Dyke")).unwrap();
        assert_eq!(first, "Mary Ann Van");
        assert_eq!(last, "Dyke");
    }

    #[test]
    fn test_single_token_is_both_names() {
        let (first, last) = split_user_full_name(Some("Plato")).unwrap();
        assert_eq!(first, "Plato");
        assert_eq!(last, "Plato");
    }

    #[test]
    fn test_empty_names_are_rejected() {
        assert!(split_user_full_name(None).is_err());
        assert!(split_user_full_name(Some("")).is_err());
        assert!(split_user_full_name(Some("   ")).is_err());
    }
}
