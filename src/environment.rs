use std::env;
use std::str::FromStr;

/// Retrieves an environment variable and splits it into a vector of strings based on a delimiter.
///
/// # Arguments
/// - `var`: The name of the environment variable.
/// - `delimiter`: The character to split the environment variable's value by.
///
/// # Returns
/// - `Vec<String>`, empty when the variable is unset
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn get_env_var_parsed<T: FromStr>(var: &str) -> Option<T> {
    env::var(var).ok().and_then(|v| v.trim().parse().ok())
}

/// Reads a floating point environment variable; `None` if unset or unparseable.
pub fn get_env_var_as_f64(var: &str) -> Option<f64> {
    get_env_var_parsed(var)
}

pub fn get_env_var_as_f32(var: &str) -> Option<f32> {
    get_env_var_parsed(var)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_variables() {
        assert!(get_env_var_as_vec("DILIGENCE_TEST_UNSET_VEC", ';').is_empty());
        assert_eq!(get_env_var_as_f64("DILIGENCE_TEST_UNSET_F64"), None);
        assert_eq!(get_env_var_as_f32("DILIGENCE_TEST_UNSET_F32"), None);
    }
}
