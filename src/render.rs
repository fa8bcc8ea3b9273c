use {
    crate::{AssemblerError, PolicyDocument},
    log::error,
};

/// The rendered IAM JSON for an assembled policy document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedPolicy {
    json: String,
    minified_json: String,
}

impl RenderedPolicy {
    /// The document pretty-printed with a two-space indent.
    #[inline]
    pub fn json(&self) -> &str {
        &self.json
    }

    /// The same document without insignificant whitespace.
    #[inline]
    pub fn minified_json(&self) -> &str {
        &self.minified_json
    }
}

fn render_error(e: serde_json::Error) -> AssemblerError {
    error!("Failed to render policy document: {}", e);
    AssemblerError::RenderError(e.to_string())
}

/// Render a policy document in both pretty and minified form.
///
/// `Version` is always present, `Id` only when non-empty, and `Statement` only when there is at least one statement.
/// Rendering the same document twice gives byte-identical output.
pub fn render(document: &PolicyDocument) -> Result<RenderedPolicy, AssemblerError> {
    let json = serde_json::to_string_pretty(document).map_err(render_error)?;
    let minified_json = serde_json::to_string(document).map_err(render_error)?;

    Ok(RenderedPolicy {
        json,
        minified_json,
    })
}
