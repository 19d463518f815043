//! Error code definitions

/// Lexical and syntax errors (E0xxx)
pub mod syntax {
    pub const UNEXPECTED_TOKEN: &str = "E0001";
    pub const UNTERMINATED_COMMENT: &str = "E0002";
    pub const INVALID_CHARACTER: &str = "E0003";
    pub const MISSING_PACKAGE_CLAUSE: &str = "E0004";
    pub const EXPECTED_TYPE: &str = "E0005";
    pub const EXPECTED_EXPRESSION: &str = "E0006";
    pub const MISPLACED_IMPORT: &str = "E0007";
    pub const UNEXPECTED_EOF: &str = "E0008";
    pub const NESTING_TOO_DEEP: &str = "E0009";
    pub const INVALID_UTF8: &str = "E0010";
}

/// Package loading errors (E1xxx)
pub mod load {
    pub const NO_GO_FILES: &str = "E1002";
    pub const PACKAGE_MISMATCH: &str = "E1003";
}

/// Constant evaluation warnings (W0xxx)
pub mod constants {
    pub const UNRESOLVED_CONSTANT: &str = "W0001";
    pub const CONSTANT_CYCLE: &str = "W0002";
}
