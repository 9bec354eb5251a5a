use std::fmt;

/// An operation a resource type may declare a URL template for.
///
/// The six standard kinds cover plain CRUD. Anything else is a [`Operation::Custom`] kind
/// declared ad hoc by the types that need it, such as [`Operation::COUNTER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetOne,
    GetMany,
    Create,
    Update,
    Patch,
    Delete,
    Custom(&'static str),
}

impl Operation {
    pub const COUNTER: Self = Self::Custom("COUNTER");
    pub const CREATE_OBJECT: Self = Self::Custom("CREATE_OBJECT");
    pub const SET_SETTLED: Self = Self::Custom("SET_SETTLED");
    pub const ATTACHMENTS: Self = Self::Custom("ATTACHMENTS");
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GetOne => "GET_ONE",
            Self::GetMany => "GET_MANY",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Custom(name) => name,
        };
        f.write_str(name)
    }
}

/// Static per-type metadata: which operations a resource supports and where they live.
///
/// Templates are paths relative to the API base URL with `{placeholder}` tokens, e.g.
/// `/companies/{companySlug}/contacts/{contactId}`.
pub trait Descriptor {
    /// Name used in logs and error messages.
    const NAME: &'static str;

    const TEMPLATES: &'static [(Operation, &'static str)];

    /// Looks up the template for `operation`. A miss is not an error here; callers decide
    /// whether an unsupported operation is fatal or just a branch.
    fn template(operation: Operation) -> Option<&'static str> {
        Self::TEMPLATES
            .iter()
            .find(|(op, _)| *op == operation)
            .map(|(_, template)| *template)
    }

    fn supports(operation: Operation) -> bool {
        Self::template(operation).is_some()
    }
}

/// Declares a resource type's name, URL templates and the fields that can fill placeholders
/// in those templates.
///
/// ```ignore
/// resource! {
///     Contact as "Contact",
///     templates: {
///         Operation::GetOne => "/companies/{companySlug}/contacts/{contactId}",
///     },
///     fields: { "contactId" => contact_id },
/// }
/// ```
#[macro_export]
macro_rules! resource {
    (
        $ty:ty as $name:literal,
        templates: { $($op:expr => $template:literal),* $(,)? },
        fields: { $($placeholder:literal => $field:ident),* $(,)? } $(,)?
    ) => {
        impl $crate::descriptor::Descriptor for $ty {
            const NAME: &'static str = $name;
            const TEMPLATES: &'static [($crate::descriptor::Operation, &'static str)] =
                &[$(($op, $template)),*];
        }

        impl $crate::path::PathFields for $ty {
            #[allow(unused_variables)]
            fn path_field(&self, name: &str) -> Option<String> {
                match name {
                    $($placeholder => $crate::path::PathValue::path_value(&self.$field),)*
                    _ => None,
                }
            }
        }
    };
}
