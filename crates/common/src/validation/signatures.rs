// Attack signature table and matcher
//
// The built-in table is data: adding a pattern is a one-line change that is
// easy to audit. Patterns are compiled once per process; custom patterns are
// compiled when a `Sanitizer` is constructed.
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

/// Category of attack a signature detects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureClass {
    /// SQL injection (statement stacking, tautologies, comment truncation)
    SqlInjection,
    /// Shell command injection (separators, substitution, destructive commands)
    CommandInjection,
    /// Script injection (inline scripts, `javascript:` URLs, event handlers)
    ScriptInjection,
}

impl SignatureClass {
    /// Error message reported when a signature of this class matches
    pub fn message(self) -> &'static str {
        match self {
            Self::SqlInjection => "Potential SQL injection detected",
            Self::CommandInjection => "Potential command injection detected",
            Self::ScriptInjection => "Potential script injection detected",
        }
    }
}

impl fmt::Display for SignatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SqlInjection => write!(f, "sql_injection"),
            Self::CommandInjection => write!(f, "command_injection"),
            Self::ScriptInjection => write!(f, "script_injection"),
        }
    }
}

/// A signature as configured: its class and an uncompiled regex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSpec {
    pub class: SignatureClass,
    pub pattern: String,
}

impl SignatureSpec {
    pub fn new(class: SignatureClass, pattern: impl Into<String>) -> Self {
        Self { class, pattern: pattern.into() }
    }
}

const BUILTIN_SIGNATURES: &[(SignatureClass, &str)] = &[
    // SQL injection
    (SignatureClass::SqlInjection, r"(?i)\b(?:drop|truncate|alter)\s+(?:table|database|schema|view)\b"),
    (SignatureClass::SqlInjection, r"(?i)\bunion\s+(?:all\s+)?select\b"),
    (SignatureClass::SqlInjection, r"(?i)'\s*(?:or|and)\s+'?\w+'?\s*=\s*'?\w+"),
    (SignatureClass::SqlInjection, r"(?i)'\s*;\s*(?:select|drop|delete|insert|update|exec|shutdown)\b"),
    (SignatureClass::SqlInjection, r"(?i);\s*(?:drop|truncate|shutdown|delete\s+from|insert\s+into)\b"),
    (SignatureClass::SqlInjection, r"(?:'|;)\s*(?:--|/\*|#)"),
    (SignatureClass::SqlInjection, r"(?i)\bexec(?:ute)?\s+(?:xp_|sp_)\w+"),
    (SignatureClass::SqlInjection, r"(?i)\b(?:sleep|benchmark|pg_sleep)\s*\(\s*\d+|\bwaitfor\s+delay\b"),
    // Command injection
    (SignatureClass::CommandInjection, r"`[^`]*`"),
    (SignatureClass::CommandInjection, r"\$\([^)]*\)|\$\{[^}]*\}"),
    (SignatureClass::CommandInjection, r"(?i)\brm\s+-[a-z]*[rf]"),
    // Statement separators and pipes
    (SignatureClass::CommandInjection, r"[;|]"),
    (
        SignatureClass::CommandInjection,
        r"(?i)&&\s*(?:rm|cat|ls|wget|curl|nc|netcat|bash|sh|zsh|chmod|chown|kill|python\d?|perl|ruby|php|whoami|uname|nslookup|ping)\b",
    ),
    (SignatureClass::CommandInjection, r"/(?:etc/(?:passwd|shadow)|bin/(?:ba|z)?sh)\b"),
    (SignatureClass::CommandInjection, r">\s*/dev/(?:tcp|udp)/"),
    // Script injection
    (SignatureClass::ScriptInjection, r"(?i)<\s*script\b"),
    (SignatureClass::ScriptInjection, r"(?i)\b(?:javascript|vbscript)\s*:"),
    (SignatureClass::ScriptInjection, r"(?i)\bon(?:error|load|click|mouseover|focus|blur|submit|change|input)\s*="),
    (SignatureClass::ScriptInjection, r"(?i)<\s*(?:iframe|object|embed)\b"),
    (SignatureClass::ScriptInjection, r"(?i)\beval\s*\("),
];

#[derive(Debug)]
struct CompiledSignature {
    class: SignatureClass,
    regex: Regex,
}

static COMPILED_BUILTINS: Lazy<Vec<CompiledSignature>> = Lazy::new(|| {
    BUILTIN_SIGNATURES
        .iter()
        .map(|(class, pattern)| CompiledSignature {
            class: *class,
            regex: Regex::new(pattern).expect("built-in signature pattern is valid and well-formed"),
        })
        .collect()
});

/// Built-in signatures followed by any configured custom ones
#[derive(Debug)]
pub(crate) struct SignatureSet {
    custom: Vec<CompiledSignature>,
}

impl SignatureSet {
    pub(crate) fn builtin_only() -> Self {
        Self { custom: Vec::new() }
    }

    pub(crate) fn with_custom(specs: &[SignatureSpec]) -> CommonResult<Self> {
        let custom = specs
            .iter()
            .map(|spec| {
                Regex::new(&spec.pattern)
                    .map(|regex| CompiledSignature { class: spec.class, regex })
                    .map_err(|err| {
                        CommonError::config_field(
                            "custom_signatures",
                            format!("invalid {} pattern '{}': {}", spec.class, spec.pattern, err),
                        )
                    })
            })
            .collect::<CommonResult<Vec<_>>>()?;
        Ok(Self { custom })
    }

    /// Classes whose signatures match `text`, once each, in detection order
    pub(crate) fn matched_classes(&self, text: &str) -> Vec<SignatureClass> {
        let mut matched = Vec::new();
        for signature in COMPILED_BUILTINS.iter().chain(self.custom.iter()) {
            if !matched.contains(&signature.class) && signature.regex.is_match(text) {
                matched.push(signature.class);
            }
        }
        matched
    }

    pub(crate) fn len(&self) -> usize {
        COMPILED_BUILTINS.len() + self.custom.len()
    }
}
