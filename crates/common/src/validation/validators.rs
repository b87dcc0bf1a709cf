// Field validators - URL, path, e-mail, phone and upload checks
use once_cell::sync::Lazy;
use regex::Regex;

use super::{FileUpload, ValidationResult};

/// Static email regex pattern compiled once at first use
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$")
        .expect("EMAIL_REGEX pattern is valid and well-formed")
});

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\d{7,15}$").expect("PHONE_REGEX pattern is valid and well-formed"));

// `..` followed by a separator, literal or percent-encoded
static TRAVERSAL_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\.|%2e){2}(?:/|\\|%2f|%5c)")
        .expect("TRAVERSAL_SEGMENT pattern is valid and well-formed")
});

// a bare `..` or one closing the path
static TRAILING_TRAVERSAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|/|\\|%2f|%5c)(?:\.|%2e){2}$")
        .expect("TRAILING_TRAVERSAL pattern is valid and well-formed")
});

static WINDOWS_DRIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z]:[\\/]").expect("WINDOWS_DRIVE pattern is valid and well-formed")
});

/// Characters that may not appear in a file name
pub const ILLEGAL_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\0'];

/// Extensions that trigger an advisory on upload
pub const EXECUTABLE_EXTENSIONS: &[&str] =
    &["exe", "bat", "cmd", "com", "msi", "dll", "scr", "ps1", "sh", "vbs", "js", "jar", "app"];

/// Maximum length of an e-mail address (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

const MAX_EMAIL_LOCAL_LENGTH: usize = 64;

/// URL sanitizer
#[derive(Debug, Clone)]
pub struct UrlSanitizer {
    allowed_schemes: Vec<String>,
    allow_data_urls: bool,
}

impl Default for UrlSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlSanitizer {
    /// Create a URL sanitizer accepting `http`, `https` and `data:` with a warning
    pub fn new() -> Self {
        Self {
            allowed_schemes: vec!["http".to_string(), "https".to_string()],
            allow_data_urls: true,
        }
    }

    /// Set allowed schemes
    pub fn allowed_schemes(mut self, schemes: Vec<String>) -> Self {
        self.allowed_schemes = schemes.into_iter().map(|s| s.to_ascii_lowercase()).collect();
        self
    }

    /// Accept or reject `data:` URLs
    pub fn allow_data_urls(mut self, allow: bool) -> Self {
        self.allow_data_urls = allow;
        self
    }

    pub fn sanitize(&self, value: &str) -> ValidationResult<String> {
        let trimmed = value.trim();
        let mut warnings = Vec::new();

        // Browsers ignore embedded whitespace and control characters in schemes
        let compact: String = trimmed
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .collect::<String>()
            .to_ascii_lowercase();
        if compact.starts_with("javascript:") {
            return ValidationResult::rejected("JavaScript URLs are not allowed");
        }

        let parsed = match url::Url::parse(trimmed) {
            Ok(parsed) => parsed,
            Err(_) => return ValidationResult::rejected("Invalid URL format"),
        };

        let scheme = parsed.scheme();
        if scheme == "javascript" {
            return ValidationResult::rejected("JavaScript URLs are not allowed");
        }

        if scheme == "data" && self.allow_data_urls {
            warnings.push("Data URLs can embed arbitrary content".to_string());
        } else if !self.allowed_schemes.iter().any(|allowed| allowed == scheme) {
            return ValidationResult::rejected(format!("URL scheme '{}' is not allowed", scheme));
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            warnings.push("URL contains embedded credentials".to_string());
        }

        ValidationResult::from_parts(Some(parsed.to_string()), Vec::new(), warnings)
    }
}

/// File path sanitizer
///
/// The cleaned path is produced even when the input is rejected, so callers
/// can log or display a safe rendition.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSanitizer;

impl PathSanitizer {
    pub fn new() -> Self {
        Self
    }

    pub fn sanitize(&self, value: &str) -> ValidationResult<String> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let normalized = collapse_percent_escapes(value);

        if has_traversal(&normalized) {
            errors.push("Path contains directory traversal patterns".to_string());
        }
        if value.contains('\0') {
            errors.push("Path contains null bytes".to_string());
        }
        if is_absolute(value) {
            warnings.push("Path is absolute".to_string());
        }

        ValidationResult::from_parts(Some(clean_path(&normalized)), errors, warnings)
    }
}

/// Strip illegal file name characters, then traversal sequences until none remain.
pub(crate) fn clean_path(value: &str) -> String {
    let mut current: String = value.chars().filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c)).collect();
    loop {
        let next = TRAVERSAL_SEGMENT.replace_all(&current, "").into_owned();
        let next = TRAILING_TRAVERSAL.replace(&next, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn has_traversal(value: &str) -> bool {
    TRAVERSAL_SEGMENT.is_match(value) || TRAILING_TRAVERSAL.is_match(value)
}

// `%252e` decodes to `%2e` on a second pass, so fold `%25` away first.
fn collapse_percent_escapes(value: &str) -> String {
    let mut current = value.to_string();
    loop {
        let lower = current.to_ascii_lowercase();
        let Some(idx) = lower.find("%25") else {
            return current;
        };
        current.replace_range(idx..idx + 3, "%");
    }
}

fn is_absolute(value: &str) -> bool {
    value.starts_with('/') || value.starts_with('\\') || WINDOWS_DRIVE.is_match(value)
}

/// Email validator
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl EmailValidator {
    /// Create a new email validator
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, value: &str) -> ValidationResult<String> {
        let normalized = value.trim().to_lowercase();

        if normalized.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(&normalized) {
            return ValidationResult::rejected("Invalid email format");
        }

        let Some((local, domain)) = normalized.rsplit_once('@') else {
            return ValidationResult::rejected("Invalid email format");
        };
        if local.len() > MAX_EMAIL_LOCAL_LENGTH
            || domain.contains("..")
            || domain.starts_with(['.', '-'])
        {
            return ValidationResult::rejected("Invalid email format");
        }

        let mut warnings = Vec::new();
        if local.contains("..") {
            warnings.push("Email local part contains consecutive dots".to_string());
        }

        ValidationResult::from_parts(Some(normalized), Vec::new(), warnings)
    }
}

/// Phone number validator
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneValidator;

impl PhoneValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, value: &str) -> ValidationResult<String> {
        let cleaned: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '-' | '.'))
            .collect();

        if cleaned.chars().any(char::is_alphabetic) {
            return ValidationResult::rejected("Phone number must not contain letters");
        }
        if !PHONE_REGEX.is_match(&cleaned) {
            return ValidationResult::rejected("Invalid phone number format");
        }

        ValidationResult::from_parts(Some(cleaned), Vec::new(), Vec::new())
    }
}

/// Upload metadata validator
#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed_mime_types: Vec<String>,
    max_bytes: u64,
}

impl UploadValidator {
    pub fn new(allowed_mime_types: &[String], max_bytes: u64) -> Self {
        Self {
            allowed_mime_types: allowed_mime_types.iter().map(|m| m.to_ascii_lowercase()).collect(),
            max_bytes,
        }
    }

    pub fn validate(&self, file: &FileUpload) -> ValidationResult<FileUpload> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let mime_type =
            file.mime_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if !self.allowed_mime_types.contains(&mime_type) {
            errors.push(format!("File type '{}' is not allowed", mime_type));
        }

        if file.size > self.max_bytes {
            errors.push(format!(
                "File size {} bytes exceeds maximum of {} bytes",
                file.size, self.max_bytes
            ));
        } else if file.size == 0 {
            warnings.push("File is empty".to_string());
        }

        let normalized = collapse_percent_escapes(&file.name);
        if has_traversal(&normalized) {
            warnings.push("Path traversal sequences were removed from the file name".to_string());
        }
        let name = clean_path(&normalized).trim().to_string();
        if name.is_empty() {
            errors.push("File name is required".to_string());
        } else if let Some(ext) = executable_extension(&name) {
            warnings.push(format!("File has an executable extension '.{}'", ext));
        }

        let sanitized = FileUpload { name, size: file.size, mime_type };
        ValidationResult::from_parts(Some(sanitized), errors, warnings)
    }
}

fn executable_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    EXECUTABLE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}
