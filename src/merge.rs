use {
    crate::{AssemblerError, DocumentKind, PolicyDocument},
    log::{debug, trace},
    std::str::FromStr,
};

/// Parse one source or override document. A blank document is treated as absent.
pub(crate) fn parse_document(
    kind: DocumentKind,
    index: usize,
    json: &str,
) -> Result<Option<PolicyDocument>, AssemblerError> {
    if json.trim().is_empty() {
        trace!("Skipping empty {} policy document {}", kind, index);
        return Ok(None);
    }

    match PolicyDocument::from_str(json) {
        Ok(document) => Ok(Some(document)),
        Err(e) => {
            debug!("Failed to parse {} policy document {}: {}", kind, index, e);
            Err(AssemblerError::ParseError {
                kind,
                index,
                message: e.to_string(),
            })
        }
    }
}

fn parse_documents(kind: DocumentKind, documents: &[String]) -> Result<Vec<PolicyDocument>, AssemblerError> {
    let mut result = Vec::with_capacity(documents.len());
    for (index, json) in documents.iter().enumerate() {
        if let Some(document) = parse_document(kind, index, json)? {
            result.push(document);
        }
    }
    Ok(result)
}

/// Merge a source document underneath the current document.
///
/// The result holds the source's statements followed by the current document's statements. Nothing is reconciled by
/// sid here. The version and id are taken from the source only where the current document leaves them unset.
pub fn merge_source(current: &PolicyDocument, source: &PolicyDocument) -> PolicyDocument {
    let mut statement = Vec::with_capacity(source.statement.len() + current.statement.len());
    statement.extend(source.statement.iter().cloned());
    statement.extend(current.statement.iter().cloned());

    trace!(
        "Merged {} source statement(s) ahead of {} current statement(s)",
        source.statement.len(),
        current.statement.len()
    );

    let version = if current.version.is_some() {
        current.version
    } else {
        source.version
    };

    let id = match current.non_empty_id() {
        Some(_) => current.id.clone(),
        None => source.non_empty_id().map(str::to_string).or_else(|| current.id.clone()),
    };

    PolicyDocument {
        version,
        id,
        statement,
    }
}

/// Patch an already-merged document with an override document.
///
/// An override statement with a sid replaces the statement with that sid in place, or is appended if there is none.
/// An override statement without a sid is always appended. A non-empty override id replaces the merged id, and a set
/// override version raises the merged version if it is newer.
pub fn merge_override(merged: &PolicyDocument, override_doc: &PolicyDocument) -> PolicyDocument {
    let mut statement = merged.statement.clone();

    for candidate in override_doc.statement.iter() {
        if candidate.has_sid() {
            if let Some(pos) = statement.iter().position(|s| s.sid() == candidate.sid()) {
                trace!("Override statement {:?} replaces statement at position {}", candidate.sid(), pos);
                statement[pos] = candidate.clone();
                continue;
            }
        }

        trace!("Override statement {:?} appended at position {}", candidate.sid(), statement.len());
        statement.push(candidate.clone());
    }

    let version = if override_doc.version > merged.version.or_latest() {
        override_doc.version
    } else {
        merged.version
    };

    let id = match override_doc.non_empty_id() {
        Some(id) => Some(id.to_string()),
        None => merged.id.clone(),
    };

    PolicyDocument {
        version,
        id,
        statement,
    }
}

/// Parse the source documents and merge them underneath `current`, first document first.
///
/// Where several sources set a version or id and the current document does not, the last source wins.
pub(crate) fn merge_sources(current: PolicyDocument, sources: &[String]) -> Result<PolicyDocument, AssemblerError> {
    let sources = parse_documents(DocumentKind::Source, sources)?;
    Ok(sources.iter().rev().fold(current, |acc, source| merge_source(&acc, source)))
}

/// Parse the override documents and apply them to `merged` in order.
pub(crate) fn merge_overrides(merged: PolicyDocument, overrides: &[String]) -> Result<PolicyDocument, AssemblerError> {
    let overrides = parse_documents(DocumentKind::Override, overrides)?;
    Ok(overrides.iter().fold(merged, |acc, override_doc| merge_override(&acc, override_doc)))
}

#[cfg(test)]
mod tests {
    use {
        super::{merge_override, merge_overrides, merge_source, merge_sources, parse_document},
        crate::{AssemblerError, DocumentKind, PolicyDocument, PolicyVersion, Statement},
        pretty_assertions::assert_eq,
    };

    fn stmt(sid: &str, action: &str) -> Statement {
        Statement::builder().sid(sid).action(action).build().unwrap()
    }

    fn doc(statements: Vec<Statement>) -> PolicyDocument {
        PolicyDocument::builder().statement(statements).build().unwrap()
    }

    fn actions(document: &PolicyDocument) -> Vec<String> {
        document.statement().iter().map(|s| s.action().unwrap().to_string()).collect()
    }

    #[test_log::test]
    fn test_source_concatenation() {
        let current = doc(vec![stmt("c1", "c:1"), stmt("", "c:2")]);
        let source = doc(vec![stmt("", "s:1"), stmt("s2", "s:2")]);

        let merged = merge_source(&current, &source);
        assert_eq!(actions(&merged), vec!["s:1", "s:2", "c:1", "c:2"]);

        // Shared sids are kept as-is; the duplicate check rejects them later.
        let source = doc(vec![stmt("c1", "s:1")]);
        let merged = merge_source(&current, &source);
        assert_eq!(actions(&merged), vec!["s:1", "c:1", "c:2"]);
    }

    #[test_log::test]
    fn test_source_header_inheritance() {
        let current = doc(vec![]);
        let source =
            PolicyDocument::builder().version(PolicyVersion::V2008_10_17).id("SourceId").build().unwrap();

        let merged = merge_source(&current, &source);
        assert_eq!(merged.version(), PolicyVersion::V2008_10_17);
        assert_eq!(merged.id(), Some("SourceId"));

        let current =
            PolicyDocument::builder().version(PolicyVersion::V2012_10_17).id("CurrentId").build().unwrap();
        let merged = merge_source(&current, &source);
        assert_eq!(merged.version(), PolicyVersion::V2012_10_17);
        assert_eq!(merged.id(), Some("CurrentId"));
    }

    #[test_log::test]
    fn test_override_replace_and_append() {
        let merged = doc(vec![stmt("", "ec2:*"), stmt("SidToOverwrite", "s3:*"), stmt("Keep", "sqs:*")]);
        let override_doc = doc(vec![stmt("", "sns:*"), stmt("SidToOverwrite", "s3:Get*"), stmt("New", "kms:*")]);

        let result = merge_override(&merged, &override_doc);
        assert_eq!(actions(&result), vec!["ec2:*", "s3:Get*", "sqs:*", "sns:*", "kms:*"]);
        assert_eq!(result.statement()[1].sid(), "SidToOverwrite");
    }

    #[test_log::test]
    fn test_override_header() {
        let merged = PolicyDocument::builder().version(PolicyVersion::V2008_10_17).id("Base").build().unwrap();

        let override_doc =
            PolicyDocument::builder().version(PolicyVersion::V2012_10_17).id("Override").build().unwrap();
        let result = merge_override(&merged, &override_doc);
        assert_eq!(result.version(), PolicyVersion::V2012_10_17);
        assert_eq!(result.id(), Some("Override"));

        // Versions are never lowered and empty ids are ignored.
        let override_doc = PolicyDocument::builder().version(PolicyVersion::V2008_10_17).id("").build().unwrap();
        let result = merge_override(&result, &override_doc);
        assert_eq!(result.version(), PolicyVersion::V2012_10_17);
        assert_eq!(result.id(), Some("Override"));

        let unset = PolicyDocument::default();
        let result = merge_override(&unset, &override_doc);
        assert_eq!(result.version(), PolicyVersion::None);
    }

    #[test_log::test]
    fn test_parse_document() {
        assert_eq!(parse_document(DocumentKind::Source, 0, "").unwrap(), None);
        assert_eq!(parse_document(DocumentKind::Source, 0, "  \n").unwrap(), None);

        let parsed = parse_document(DocumentKind::Override, 1, r#"{"Statement": {"Action": "s3:*"}}"#).unwrap();
        assert_eq!(parsed.unwrap().statement().len(), 1);

        let e = parse_document(DocumentKind::Override, 3, "{").unwrap_err();
        match e {
            AssemblerError::ParseError {
                kind,
                index,
                message,
            } => {
                assert_eq!(kind, DocumentKind::Override);
                assert_eq!(index, 3);
                assert!(message.starts_with("EOF while parsing an object"));
            }
            _ => panic!("Expected ParseError: {:?}", e),
        }
    }

    #[test_log::test]
    fn test_document_lists() {
        let current = doc(vec![stmt("c", "c:*")]);
        let sources = vec![
            r#"{"Id": "first", "Statement": [{"Sid": "a", "Action": "a:*"}]}"#.to_string(),
            String::new(),
            r#"{"Id": "last", "Statement": [{"Sid": "b", "Action": "b:*"}]}"#.to_string(),
        ];

        let merged = merge_sources(current, &sources).unwrap();
        assert_eq!(actions(&merged), vec!["a:*", "b:*", "c:*"]);
        assert_eq!(merged.id(), Some("last"));

        let overrides = vec![
            r#"{"Statement": [{"Sid": "a", "Action": "a:Get*"}]}"#.to_string(),
            r#"{"Statement": [{"Sid": "a", "Action": "a:List*"}, {"Action": "z:*"}]}"#.to_string(),
        ];
        let result = merge_overrides(merged, &overrides).unwrap();
        assert_eq!(actions(&result), vec!["a:List*", "b:*", "c:*", "z:*"]);

        let e = merge_sources(PolicyDocument::default(), &["{}".to_string(), "nope".to_string()]).unwrap_err();
        assert!(e.to_string().starts_with("invalid JSON in source policy document 1: "));
    }
}
