pub use kind_derive::*;

/// A type that implements `Kind` is capable of describing itself to the structured
/// logger, typically by returning the name of its type (or, for an enum, `Type::Variant`).
///
/// The easiest way to implement this is via the derive macro:
///
/// ```
/// use kind::Kind;
///
/// #[derive(Kind)]
/// struct NoCompatibleNode {}
///
/// #[derive(Kind)]
/// enum BindError {
///     Transient,
///     Terminal(String),
/// }
///
/// assert_eq!("NoCompatibleNode", NoCompatibleNode {}.kind());
/// assert_eq!("BindError::Transient", BindError::Transient.kind());
/// assert_eq!("BindError::Terminal", BindError::Terminal("x".to_string()).kind());
/// ```
///
/// This derivation does not work on unions; implement `Kind` by hand for those.
pub trait Kind {
    fn kind(&self) -> String;
}

macro_rules! impl_kind {
    ($i:ident) => {
        impl Kind for $i {
            fn kind(&self) -> String {
                stringify!($i).to_string()
            }
        }
    };
}

impl_kind!(String);
impl_kind!(u8);
impl_kind!(u16);
impl_kind!(u32);
impl_kind!(u64);
impl_kind!(u128);
impl_kind!(i8);
impl_kind!(i16);
impl_kind!(i32);
impl_kind!(i64);
impl_kind!(i128);
impl_kind!(f32);
impl_kind!(f64);

impl<T> Kind for Vec<T>
where
    T: Kind,
{
    fn kind(&self) -> String {
        if self.is_empty() {
            "List[]".to_string()
        } else {
            format!("List[{}]", self.get(0).unwrap().kind())
        }
    }
}
