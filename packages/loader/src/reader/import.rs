//! Resolution of `<import resource="..."/>` elements.

use std::sync::Arc;

use roxmltree::Node;

use super::context::ParsingContext;
use crate::config::RESOURCE_ATTRIBUTE;
use crate::error::{LoaderError, ProblemKind};
use crate::resource::{apply_relative_path, is_absolute_uri, ResolvedResources};
use crate::xml::get_text_attribute;

/// Failure of a relative import, split by what went wrong.
enum RelativeImportError {
    /// The current resource's own location could not be determined.
    CurrentLocation(LoaderError),
    /// Building or loading the imported resource failed.
    Load(LoaderError),
}

/// Load the definitions an `<import>` element points at.
///
/// An empty location or an unresolvable placeholder is reported and nothing
/// else happens. Every other outcome, including a failed load, ends with an
/// import event carrying whatever was resolved.
pub fn resolve_import(node: Node<'_, '_>, context: &mut ParsingContext<'_>) {
    let Some(raw_location) = get_text_attribute(node, RESOURCE_ATTRIBUTE) else {
        context.error(
            ProblemKind::Validation,
            "Resource location must not be empty",
            node,
        );
        return;
    };

    let environment = context.environment();
    let location = match environment.resolve_required_placeholders(raw_location) {
        Ok(location) => location,
        Err(e) => {
            context.error_with_cause(
                ProblemKind::Resolution,
                format!("Failed to resolve placeholders in resource location [{raw_location}]"),
                node,
                &e,
            );
            return;
        }
    };

    let mut resolved = ResolvedResources::new();
    let absolute = context.resource_loader().is_url(&location) || is_absolute_uri(&location);

    if absolute {
        let reader = context.reader();
        match reader.load_location(&location, &mut resolved, context) {
            Ok(count) => {
                tracing::trace!(
                    count,
                    location = %location,
                    "Imported component definitions from URL location"
                );
            }
            Err(e) => context.error_with_cause(
                ProblemKind::Resolution,
                format!("Failed to import component definitions from URL location [{location}]"),
                node,
                &e,
            ),
        }
    } else {
        match import_relative(&location, &mut resolved, context) {
            Ok(count) => {
                tracing::trace!(
                    count,
                    location = %location,
                    "Imported component definitions from relative location"
                );
            }
            Err(RelativeImportError::CurrentLocation(e)) => context.error_with_cause(
                ProblemKind::Io,
                "Failed to resolve current resource location",
                node,
                &e,
            ),
            Err(RelativeImportError::Load(e)) => context.error_with_cause(
                ProblemKind::Resolution,
                format!(
                    "Failed to import component definitions from relative location \
                     [{location}]"
                ),
                node,
                &e,
            ),
        }
    }

    context.fire_import_resolved(&location, &resolved);
}

/// Try the location relative to the current resource, then fall back to
/// applying it to the current resource's absolute location.
fn import_relative(
    location: &str,
    resolved: &mut ResolvedResources,
    context: &mut ParsingContext<'_>,
) -> Result<usize, RelativeImportError> {
    let current = Arc::clone(context.resource());
    let relative = current
        .create_relative(location)
        .map_err(RelativeImportError::Load)?;
    let reader = context.reader();

    if relative.exists() {
        let count = reader
            .load_resource_in(Arc::clone(&relative), context)
            .map_err(RelativeImportError::Load)?;
        resolved.insert(relative);
        return Ok(count);
    }

    let base = current
        .absolute_location()
        .map_err(RelativeImportError::CurrentLocation)?;
    let fallback = apply_relative_path(&base, location);
    tracing::debug!(
        location = %location,
        fallback = %fallback,
        "Relative resource does not exist, trying location derived from current resource"
    );
    reader
        .load_location(&fallback, resolved, context)
        .map_err(RelativeImportError::Load)
}

