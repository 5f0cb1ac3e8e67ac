//! Result envelope shared by every domain query and mutation.

use crate::error::ServiceResult;

pub trait Envelope: Sized {
    fn failure(error: String) -> Self;
}

/// Folds a service result into an envelope, hiding internal errors behind `fallback`.
pub fn fold<T, O, F>(result: ServiceResult<T>, fallback: &str, on_ok: F) -> O
where
    O: Envelope,
    F: FnOnce(T) -> O,
{
    match result {
        Ok(value) => on_ok(value),
        Err(err) => O::failure(err.public_message(fallback)),
    }
}

/// Declares an output object with `ok`, `error` and optional payload fields.
#[macro_export]
macro_rules! output {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Default, async_graphql::SimpleObject)]
        pub struct $name {
            pub ok: bool,
            pub error: Option<String>,
            $($(#[$fmeta])* pub $field: Option<$ty>,)*
        }

        impl $name {
            pub fn success() -> Self {
                Self { ok: true, ..Default::default() }
            }
        }

        impl $crate::output::Envelope for $name {
            fn failure(error: String) -> Self {
                Self { ok: false, error: Some(error), ..Default::default() }
            }
        }
    };
}

crate::output!(
    /// Envelope for operations with no payload.
    CoreOutput {}
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;

    crate::output!(ValueOutput { value: i32 });

    #[test]
    fn success_uses_callback() {
        let out: ValueOutput = fold(Ok(7), "nope", |value| ValueOutput {
            value: Some(value),
            ..ValueOutput::success()
        });
        assert!(out.ok);
        assert_eq!(out.value, Some(7));
        assert!(out.error.is_none());
    }

    #[test]
    fn failure_carries_domain_message() {
        let out: CoreOutput = fold(
            Err::<(), _>(ServiceError::Forbidden("Access denied.")),
            "Failed to edit order.",
            |_| CoreOutput::success(),
        );
        assert!(!out.ok);
        assert_eq!(out.error.as_deref(), Some("Access denied."));
    }
}
