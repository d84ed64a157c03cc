/// A trait to abstract over environment variable access.
///
/// Only [`Environment::read_os`] needs to be implemented. Tests use a fake
/// environment instead of the process environment.
pub trait Environment {
    /// Try reading the environment variable as an OS string.
    fn read_os(&self, key: &str) -> Option<std::ffi::OsString>;

    /// Determine whether the environment variable is defined with a non-empty
    /// value.
    fn is_non_empty(&self, key: &str) -> bool {
        self.read_os(key).is_some_and(|v| !v.is_empty())
    }
}

/// The process environment.
#[derive(Debug, Default)]
pub struct Env();

impl Environment for Env {
    fn read_os(&self, key: &str) -> Option<std::ffi::OsString> {
        std::env::var_os(key)
    }
}

/// Determine whether output may use color.
///
/// Following <https://no-color.org>, a non-empty `NO_COLOR` disables color.
pub fn use_color<E: Environment>(env: &E) -> bool {
    !env.is_non_empty("NO_COLOR")
}

#[cfg(test)]
mod test {
    use super::{use_color, Environment};
    use std::collections::HashMap;

    struct FakeEnv {
        bindings: HashMap<String, String>,
    }

    impl FakeEnv {
        fn new() -> Self {
            Self {
                bindings: HashMap::new(),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> &mut Self {
            self.bindings.insert(key.to_string(), value.to_string());
            self
        }
    }

    impl Environment for FakeEnv {
        fn read_os(&self, key: &str) -> Option<std::ffi::OsString> {
            self.bindings.get(key).map(|v| v.into())
        }
    }

    #[test]
    fn test_no_color() {
        let mut env = FakeEnv::new();
        assert!(use_color(&env));

        env.set("NO_COLOR", "");
        assert!(use_color(&env));

        env.set("NO_COLOR", "1");
        assert!(!use_color(&env));
    }
}
