use {
    crate::PolicyVersion,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// Which input list a parsed policy document came from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DocumentKind {
    Source,
    Override,
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Source => f.write_str("source"),
            Self::Override => f.write_str("override"),
        }
    }
}

/// The statement fields scanned for version-gated syntax.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PolicyField {
    ConditionValue,
    PrincipalIdentifier,
    NotPrincipalIdentifier,
    Resource,
    NotResource,
}

impl Display for PolicyField {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::ConditionValue => f.write_str("condition values"),
            Self::PrincipalIdentifier => f.write_str("principal identifiers"),
            Self::NotPrincipalIdentifier => f.write_str("not_principal identifiers"),
            Self::Resource => f.write_str("resources"),
            Self::NotResource => f.write_str("not_resources"),
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum AssemblerError {
    DuplicateSid(String),
    InvalidEffect(String),
    InvalidPolicyVersion(String),
    ParseError {
        kind: DocumentKind,
        index: usize,
        message: String,
    },
    RenderError(String),
    UnsupportedVersionFeature {
        field: PolicyField,
        value: String,
        version: PolicyVersion,
    },
}

impl Display for AssemblerError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::DuplicateSid(sid) => write!(f, "duplicate Sid ({}); remove the Sid or ensure Sids are unique", sid),
            Self::InvalidEffect(effect) => write!(f, "Invalid effect: {}", effect),
            Self::InvalidPolicyVersion(version) => write!(f, "Invalid policy version: {}", version),
            Self::ParseError {
                kind,
                index,
                message,
            } => write!(f, "invalid JSON in {} policy document {}: {}", kind, index, message),
            Self::RenderError(message) => write!(f, "failed to render policy document: {}", message),
            Self::UnsupportedVersionFeature {
                field,
                value,
                version,
            } => write!(
                f,
                "found &{{ sequence in {} ({}), which is not supported in document version {}",
                field, value, version
            ),
        }
    }
}

impl Error for AssemblerError {}

#[cfg(test)]
mod tests {
    use {
        crate::{AssemblerError, DocumentKind, PolicyField, PolicyVersion},
        pretty_assertions::{assert_eq, assert_ne},
    };

    #[test_log::test]
    fn test_display() {
        let _ = format!("{:?}", AssemblerError::DuplicateSid("1".to_string()));
        assert_eq!(
            AssemblerError::DuplicateSid("1".to_string()).to_string(),
            "duplicate Sid (1); remove the Sid or ensure Sids are unique"
        );

        assert_eq!(AssemblerError::InvalidEffect("Maybe".to_string()).to_string(), "Invalid effect: Maybe");
        assert_eq!(
            AssemblerError::InvalidPolicyVersion("2020-01-01".to_string()).to_string(),
            "Invalid policy version: 2020-01-01"
        );

        let e = AssemblerError::ParseError {
            kind: DocumentKind::Override,
            index: 2,
            message: "EOF while parsing an object at line 1 column 1".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "invalid JSON in override policy document 2: EOF while parsing an object at line 1 column 1"
        );

        assert_eq!(
            AssemblerError::RenderError("key must be a string".to_string()).to_string(),
            "failed to render policy document: key must be a string"
        );

        let e = AssemblerError::UnsupportedVersionFeature {
            field: PolicyField::NotResource,
            value: "arn:aws:s3:::foo/home/&{aws:username}".to_string(),
            version: PolicyVersion::V2008_10_17,
        };
        assert_eq!(
            e.to_string(),
            "found &{ sequence in not_resources (arn:aws:s3:::foo/home/&{aws:username}), which is not supported in \
             document version 2008-10-17"
        );
    }

    #[test_log::test]
    fn test_eq() {
        let e1a = AssemblerError::DuplicateSid("foo".to_string());
        let e1b = AssemblerError::DuplicateSid("foo".to_string());
        let e2 = AssemblerError::DuplicateSid("bar".to_string());
        let e3 = AssemblerError::InvalidEffect("foo".to_string());
        let e4a = AssemblerError::ParseError {
            kind: DocumentKind::Source,
            index: 0,
            message: "foo".to_string(),
        };
        let e4b = AssemblerError::ParseError {
            kind: DocumentKind::Override,
            index: 0,
            message: "foo".to_string(),
        };

        assert_eq!(e1a, e1b);
        assert_ne!(e1a, e2);
        assert_ne!(e1a, e3);
        assert_ne!(e4a, e4b);
        assert_ne!(e3, e4a);
    }
}
