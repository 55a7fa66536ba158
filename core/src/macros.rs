/// Declares a preference key whose reduction keeps the last contributed value.
///
/// Sibling contributions are folded left to right, so the right-most sibling that
/// contributes wins. This is the reduction used by toolbar-like channels where only
/// one value can be shown at a time.
///
/// # Usage
///
/// ```ignore
/// last_value_preference!(
///     /// Title shown by the closest navigation container.
///     pub TitleKey: Option<String> = None
/// );
/// ```
#[macro_export]
macro_rules! last_value_preference {
    ($(#[$meta:meta])* $vis:vis $name:ident : $value:ty = $default:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::PreferenceKey for $name {
            type Value = $value;

            fn default_value() -> Self::Value {
                $default
            }

            fn reduce(value: &mut Self::Value, next: Self::Value) {
                *value = next;
            }
        }
    };
}
