/// Sets or clears an environment variable and restores the previous value on drop.
pub(crate) struct EnvVarGuard {
    key: String,
    original: Option<String>,
}

impl EnvVarGuard {
    pub(crate) fn new(key: &str, value: &str) -> Self {
        let original = std::env::var(key).ok();
        unsafe { std::env::set_var(key, value) };
        EnvVarGuard {
            key: key.to_owned(),
            original,
        }
    }

    pub(crate) fn unset(key: &str) -> Self {
        let original = std::env::var(key).ok();
        unsafe { std::env::remove_var(key) };
        EnvVarGuard {
            key: key.to_owned(),
            original,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.original {
            Some(val) => unsafe { std::env::set_var(&self.key, val) },
            None => unsafe { std::env::remove_var(&self.key) },
        }
    }
}
