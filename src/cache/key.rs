//! Cache Key Module
//!
//! Builds namespaced cache keys from a prefix and scalar parameters.

/// Separator placed between the prefix and each parameter.
pub const KEY_DELIMITER: &str = ":";

// == Key Param ==
/// A scalar that can take part in a cache key.
///
/// Returning `None` drops the parameter from the key entirely.
pub trait KeyParam {
    fn key_part(&self) -> Option<String>;
}

impl KeyParam for str {
    fn key_part(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl KeyParam for String {
    fn key_part(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl<T: KeyParam + ?Sized> KeyParam for &T {
    fn key_part(&self) -> Option<String> {
        (**self).key_part()
    }
}

impl<T: KeyParam> KeyParam for Option<T> {
    fn key_part(&self) -> Option<String> {
        self.as_ref().and_then(KeyParam::key_part)
    }
}

macro_rules! impl_display_key_param {
    ($($ty:ty),*) => {
        $(
            impl KeyParam for $ty {
                fn key_part(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

impl_display_key_param!(bool, i32, i64, u8, u16, u32, u64, usize, f32, f64);

// == Generate ==
/// Joins `prefix` and every present parameter with [`KEY_DELIMITER`].
///
/// The prefix is always followed by the delimiter, so a key with no
/// parameters is `"prefix:"`. Parameter values containing the delimiter can
/// alias other tuples; callers pick values that don't.
pub fn generate_cache_key<I>(prefix: &str, params: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    let parts: Vec<String> = params.into_iter().flatten().collect();
    format!("{}{}{}", prefix, KEY_DELIMITER, parts.join(KEY_DELIMITER))
}

/// Builds a cache key from a prefix and any number of [`KeyParam`] values.
///
/// ```
/// use placebook::cache_key;
///
/// let key = cache_key!("bookmarks", "g1", None::<&str>, true);
/// assert_eq!(key, "bookmarks:g1:true");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr $(, $param:expr)* $(,)?) => {{
        let params: ::std::vec::Vec<::std::option::Option<::std::string::String>> =
            vec![$($crate::cache::KeyParam::key_part(&$param)),*];
        $crate::cache::generate_cache_key($prefix, params)
    }};
}
