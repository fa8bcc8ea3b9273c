use {
    crate::{
        merge::{merge_overrides, merge_sources},
        render::render,
        sid::check_duplicate_sids,
        version_rules::apply_version_rules,
        AssemblerError, PolicyDocument, PolicyVersion, RenderedPolicy, Statement, StatementInput,
    },
    derive_builder::Builder,
    log::debug,
};

/// Everything needed to assemble one policy document.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq)]
pub struct PolicyDocumentInput {
    /// The policy language version. Unset renders as the latest version unless a source document supplies one.
    #[builder(setter(into), default)]
    version: PolicyVersion,

    #[builder(setter(into, strip_option), default)]
    policy_id: Option<String>,

    #[builder(setter(into, each(name = "statement")), default)]
    statements: Vec<StatementInput>,

    /// JSON policy documents whose statements go ahead of this document's own. Blank entries are skipped.
    #[builder(setter(into, each(name = "source_document", into)), default)]
    source_documents: Vec<String>,

    /// JSON policy documents applied, in order, after the sources are merged. Blank entries are skipped.
    #[builder(setter(into, each(name = "override_document", into)), default)]
    override_documents: Vec<String>,
}

impl PolicyDocumentInput {
    #[inline]
    pub fn builder() -> PolicyDocumentInputBuilder {
        PolicyDocumentInputBuilder::default()
    }

    #[inline]
    pub fn version(&self) -> PolicyVersion {
        self.version
    }

    #[inline]
    pub fn policy_id(&self) -> Option<&str> {
        self.policy_id.as_deref()
    }

    #[inline]
    pub fn statements(&self) -> &[StatementInput] {
        &self.statements
    }

    #[inline]
    pub fn source_documents(&self) -> &[String] {
        &self.source_documents
    }

    #[inline]
    pub fn override_documents(&self) -> &[String] {
        &self.override_documents
    }

    #[inline]
    pub fn assemble(&self) -> Result<RenderedPolicy, AssemblerError> {
        assemble(self)
    }
}

/// Build the final policy document without rendering it.
///
/// Statements are normalized and checked against the version rules, the source documents are merged underneath, the
/// override documents are applied on top, and finally sids are checked for uniqueness. The first error stops
/// assembly.
///
/// When the input leaves the version unset and a source document supplies one, the input statements are checked
/// again against the inherited version.
pub fn assemble_document(input: &PolicyDocumentInput) -> Result<PolicyDocument, AssemblerError> {
    let normalized: Vec<Statement> = input.statements.iter().map(StatementInput::normalize).collect();
    let statement = apply_rules_to_all(&normalized, input.version)?;

    let current = PolicyDocument {
        version: input.version,
        id: input.policy_id.clone(),
        statement,
    };

    let mut merged = merge_sources(current, &input.source_documents)?;
    if merged.version != input.version {
        debug!("Rechecking {} statement(s) against inherited policy version {}", normalized.len(), merged.version);
        let rechecked = apply_rules_to_all(&normalized, merged.version)?;

        // Source statements come first; the input statements are the tail.
        let start = merged.statement.len() - rechecked.len();
        merged.statement.truncate(start);
        merged.statement.extend(rechecked);
    }

    let merged = merge_overrides(merged, &input.override_documents)?;
    check_duplicate_sids(&merged.statement)?;

    debug!("Assembled policy document with {} statement(s)", merged.statement.len());
    Ok(merged)
}

fn apply_rules_to_all(statements: &[Statement], version: PolicyVersion) -> Result<Vec<Statement>, AssemblerError> {
    statements.iter().map(|statement| apply_version_rules(statement, version)).collect()
}

/// Assemble and render a policy document.
pub fn assemble(input: &PolicyDocumentInput) -> Result<RenderedPolicy, AssemblerError> {
    render(&assemble_document(input)?)
}

#[cfg(test)]
mod tests {
    use {
        crate::{assemble_document, AssemblerError, PolicyDocumentInput, PolicyVersion, StatementInput},
        pretty_assertions::assert_eq,
    };

    #[test_log::test]
    fn test_builder() {
        let input = PolicyDocumentInput::builder()
            .version(PolicyVersion::V2008_10_17)
            .policy_id("id")
            .statement(StatementInput::builder().action("s3:*").build().unwrap())
            .source_document("{}")
            .override_document("")
            .build()
            .unwrap();

        assert_eq!(input.version(), PolicyVersion::V2008_10_17);
        assert_eq!(input.policy_id(), Some("id"));
        assert_eq!(input.statements().len(), 1);
        assert_eq!(input.source_documents(), &["{}".to_string()]);
        assert_eq!(input.override_documents(), &[String::new()]);

        let input = PolicyDocumentInput::builder().build().unwrap();
        assert_eq!(input, PolicyDocumentInput::default());
        assert_eq!(input.version(), PolicyVersion::None);
    }

    #[test_log::test]
    fn test_error_order() {
        // Version rules run before any document is parsed.
        let input = PolicyDocumentInput::builder()
            .version(PolicyVersion::V2008_10_17)
            .statement(StatementInput::builder().resource("arn:aws:s3:::&{aws:username}").build().unwrap())
            .source_document("not json")
            .build()
            .unwrap();
        assert!(matches!(assemble_document(&input).unwrap_err(), AssemblerError::UnsupportedVersionFeature { .. }));

        // Parsing happens before the duplicate check.
        let input = PolicyDocumentInput::builder()
            .statement(StatementInput::builder().sid("1").build().unwrap())
            .statement(StatementInput::builder().sid("1").build().unwrap())
            .override_document("not json")
            .build()
            .unwrap();
        assert!(matches!(assemble_document(&input).unwrap_err(), AssemblerError::ParseError { .. }));
    }

    #[test_log::test]
    fn test_unset_version_inherits_source() {
        let input = PolicyDocumentInput::builder()
            .source_document(r#"{"Version": "2008-10-17", "Statement": []}"#)
            .build()
            .unwrap();
        assert_eq!(assemble_document(&input).unwrap().version(), PolicyVersion::V2008_10_17);
    }
}
