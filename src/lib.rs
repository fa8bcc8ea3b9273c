#![warn(clippy::all)]
pub(crate) mod assembler;
pub(crate) mod condition;
pub(crate) mod effect;
pub(crate) mod error;
pub(crate) mod merge;
pub(crate) mod normalize;
pub(crate) mod policy;
pub(crate) mod principal;
pub(crate) mod render;
pub(crate) mod sid;
pub(crate) mod statement;
pub(crate) mod version_rules;

#[macro_use]
pub(crate) mod serutil;

pub use {
    assembler::{
        assemble, assemble_document, PolicyDocumentInput, PolicyDocumentInputBuilder, PolicyDocumentInputBuilderError,
    },
    condition::{Condition, ConditionMap},
    effect::Effect,
    error::{AssemblerError, DocumentKind, PolicyField},
    merge::{merge_override, merge_source},
    normalize::{ConditionInput, PrincipalInput, StatementInput, StatementInputBuilder, StatementInputBuilderError},
    policy::{PolicyDocument, PolicyDocumentBuilder, PolicyDocumentBuilderError, PolicyVersion},
    principal::{Principal, SpecifiedPrincipal},
    render::{render, RenderedPolicy},
    serutil::StringList,
    statement::{Statement, StatementBuilder, StatementBuilderError},
};
