//! Sensitive data masking for logs.
//!
//! Request parameters and response bodies routinely carry session tokens,
//! request signatures and auth cookies. [`SensitiveDataMasker`] rewrites them
//! before they are logged.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Patterns for detecting sensitive data.
static PATTERNS: LazyLock<Vec<SensitivePattern>> = LazyLock::new(|| {
    vec![
        // Session tokens in query strings, forms and JSON bodies
        SensitivePattern {
            name: "session_token",
            regex: Regex::new(
                r#"(?i)(access_key|access_token|accesstoken|refresh_token|refreshtoken)["\s:=]+["']?([a-zA-Z0-9_\-%.]{8,})["']?"#,
            )
            .unwrap(),
            group: 2,
        },
        // Auth cookies
        SensitivePattern {
            name: "auth_cookie",
            regex: Regex::new(
                r#"(?i)(SESSDATA|bili_jct|DedeUserID__ckMd5)["\s:=]+["']?([^\s"';&,]{4,})["']?"#,
            )
            .unwrap(),
            group: 2,
        },
        // Request signatures
        SensitivePattern {
            name: "signature",
            regex: Regex::new(r#"(?i)\bsign["\s:=]+["']?([a-f0-9]{32})"#).unwrap(),
            group: 1,
        },
        // Bearer tokens
        SensitivePattern {
            name: "bearer_token",
            regex: Regex::new(r"(?i)bearer\s+([a-zA-Z0-9._-]{20,})").unwrap(),
            group: 1,
        },
    ]
});

struct SensitivePattern {
    #[allow(dead_code)]
    name: &'static str,
    regex: Regex,
    group: usize,
}

/// Masks sensitive data in strings.
#[derive(Debug, Clone)]
pub struct SensitiveDataMasker {
    /// Minimum length of string to consider for partial display
    min_length: usize,
    /// Characters to show at start of masked value
    show_start: usize,
    /// Characters to show at end of masked value
    show_end: usize,
    /// Mask character
    mask_char: char,
}

impl Default for SensitiveDataMasker {
    fn default() -> Self {
        Self::new()
    }
}

impl SensitiveDataMasker {
    /// Create a new masker with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_length: 8,
            show_start: 3,
            show_end: 3,
            mask_char: '*',
        }
    }

    /// Create a masker with custom settings.
    #[must_use]
    pub fn with_settings(min_length: usize, show_start: usize, show_end: usize) -> Self {
        Self {
            min_length,
            show_start,
            show_end,
            mask_char: '*',
        }
    }

    /// Mask a known sensitive value.
    ///
    /// # Example
    ///
    /// ```
    /// use bilirq_telemetry::masking::SensitiveDataMasker;
    ///
    /// let masker = SensitiveDataMasker::new();
    /// let masked = masker.mask_value("0123456789abcdef");
    /// assert_eq!(masked, "012***def");
    /// ```
    #[must_use]
    pub fn mask_value(&self, value: &str) -> String {
        let chars: Vec<char> = value.chars().collect();
        let mask = self.mask_char.to_string().repeat(3);
        if chars.len() < self.min_length {
            return self.mask_char.to_string().repeat(chars.len().max(3));
        }

        let start: String = chars[..self.show_start.min(chars.len())].iter().collect();
        let end: String = if chars.len() > self.show_end {
            chars[chars.len() - self.show_end..].iter().collect()
        } else {
            String::new()
        };

        format!("{start}{mask}{end}")
    }

    /// Mask every sensitive value found in a string.
    ///
    /// # Example
    ///
    /// ```
    /// use bilirq_telemetry::masking::SensitiveDataMasker;
    ///
    /// let masker = SensitiveDataMasker::new();
    /// let masked = masker.mask_string("access_key=abcdefghijklmnop&ts=1");
    /// assert!(masked.contains("***"));
    /// assert!(masked.ends_with("&ts=1"));
    /// ```
    #[must_use]
    pub fn mask_string<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let mut result = Cow::Borrowed(input);

        for pattern in PATTERNS.iter() {
            if !pattern.regex.is_match(&result) {
                continue;
            }
            let replaced = pattern
                .regex
                .replace_all(&result, |caps: &Captures<'_>| self.mask_group(caps, pattern.group))
                .into_owned();
            result = Cow::Owned(replaced);
        }

        result
    }

    fn mask_group(&self, caps: &Captures<'_>, group: usize) -> String {
        let Some(whole) = caps.get(0) else {
            return String::new();
        };
        match caps.get(group) {
            Some(secret) => {
                let start = secret.start() - whole.start();
                let end = secret.end() - whole.start();
                let text = whole.as_str();
                format!(
                    "{}{}{}",
                    &text[..start],
                    self.mask_value(secret.as_str()),
                    &text[end..]
                )
            }
            None => whole.as_str().to_string(),
        }
    }

    /// Check if a string contains sensitive patterns.
    #[must_use]
    pub fn contains_sensitive(&self, input: &str) -> bool {
        PATTERNS.iter().any(|p| p.regex.is_match(input))
    }
}

/// A wrapper type for sensitive values that masks them in Display/Debug.
#[derive(Clone)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a value as sensitive.
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Get the inner value (use with caution).
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume and return the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T> std::fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: serde::Serialize> serde::Serialize for Sensitive<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}
