// Utility functions

use std::sync::{Mutex, MutexGuard};

/// Extension trait for Result that provides convenient error context methods.
/// Converts any error to a String with a descriptive message prefix.
///
/// # Example
/// ```ignore
/// use crate::utils::ResultExt;
///
/// let record = store.get_submission(&id)
///     .with_context("Failed to load submission")?;
/// ```
pub trait ResultExt<T> {
    /// Converts the error to a String with context message.
    fn with_context(self, msg: &str) -> Result<T, String>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn with_context(self, msg: &str) -> Result<T, String> {
        self.map_err(|e| format!("{}: {}", msg, e))
    }
}

/// Macro for common error mapping pattern.
/// Converts `result.map_err(|e| format!("Message: {}", e))` to `map_err_str!(result, "Message")`.
#[macro_export]
macro_rules! map_err_str {
    ($expr:expr, $msg:literal) => {
        $expr.map_err(|e| format!("{}: {}", $msg, e))
    };
}

/// Safely acquire a mutex lock, recovering from poisoning by returning the guard.
/// The registry maps it guards stay usable even if a handler panicked mid-update.
pub fn lock_mutex_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Mutex was poisoned, recovering: {}", poisoned);
            poisoned.into_inner()
        }
    }
}

/// Format a whole amount with thousands separators, e.g. `38800` -> `38,800`
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert_eq!(result.with_context("Failed to open").unwrap_err(), "Failed to open: gone");
    }

    #[test]
    fn test_map_err_str() {
        let result: Result<u8, String> = Err("boom".to_string());
        let mapped = map_err_str!(result, "Parse failed");
        assert_eq!(mapped.unwrap_err(), "Parse failed: boom");
    }

    #[test]
    fn test_lock_mutex_recover() {
        let mutex = std::sync::Arc::new(Mutex::new(1));
        let poisoner = std::sync::Arc::clone(&mutex);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison");
        })
        .join();

        assert!(mutex.is_poisoned());
        assert_eq!(*lock_mutex_recover(&mutex), 1);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(38_800), "38,800");
        assert_eq!(format_amount(1_234_567), "1,234,567");
    }
}
